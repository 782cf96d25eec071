//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod respawn;
pub mod schedule;
pub mod session;
pub mod spawner;
pub mod state;
pub mod target;
pub mod tick;

pub use respawn::{activate_prop, check_falls, finish_respawn, reset_prop, start_respawn};
pub use schedule::{Scheduler, Task, TaskHandle, TaskOwner};
pub use session::{add_score, end_session, restart_session, start_session};
pub use spawner::{clear_props, destroy_prop, populate_props, register_loose_prop, spawn_prop_at};
pub use state::{
    Debris, EndReason, GameEvent, GameState, Prop, PropId, PropPart, PropState, RemovalReason,
    Session, SessionPhase, Target, TargetId, TargetState,
};
pub use target::{Contact, handle_contact, spawn_target};
pub use tick::{PropMotion, TickInput, run_ticks, tick};
