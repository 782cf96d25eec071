//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::{Quat, Vec3};

use super::respawn::{check_falls, finish_respawn, reset_prop};
use super::schedule::{Task, TaskOwner};
use super::session::{countdown_tick, spawn_tick};
use super::spawner::populate_props;
use super::state::{GameState, PropId, RemovalReason};
use super::target::{Contact, expire_target, handle_contact, remove_target, update_debris};
use crate::consts::SIM_DT;

/// Pose reported by the physics engine for one prop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropMotion {
    pub id: PropId,
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl PropMotion {
    /// Motion with no rotation or spin
    pub fn at(id: PropId, position: Vec3, linear_velocity: Vec3) -> Self {
        Self {
            id,
            position,
            rotation: Quat::IDENTITY,
            linear_velocity,
            angular_velocity: Vec3::ZERO,
        }
    }
}

/// Engine input for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Contacts reported since the last tick
    pub contacts: Vec<Contact>,
    /// Prop poses from the physics engine
    pub prop_motion: Vec<PropMotion>,
}

impl TickInput {
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty() && self.prop_motion.is_empty()
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
        self.prop_motion.clear();
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;

    // Sync poses; suspended or deactivated props ignore the engine
    for motion in &input.prop_motion {
        if let Some(prop) = state.prop_mut(motion.id) {
            if prop.kinematic || !prop.is_active() {
                continue;
            }
            prop.position = motion.position;
            prop.rotation = motion.rotation;
            prop.linear_velocity = motion.linear_velocity;
            prop.angular_velocity = motion.angular_velocity;
        }
    }

    for contact in &input.contacts {
        handle_contact(state, *contact);
    }

    run_due_tasks(state);
    check_falls(state);
    update_debris(state, dt);

    // Ensure deterministic ordering
    state.normalize_order();
}

/// Run `count` ticks with the same input
pub fn run_ticks(state: &mut GameState, input: &TickInput, count: u64) {
    for _ in 0..count {
        tick(state, input, SIM_DT);
    }
}

/// Dispatch every scheduled task that is due
fn run_due_tasks(state: &mut GameState) {
    while let Some((owner, task)) = state.scheduler.pop_due(state.time_ticks) {
        match (task, owner) {
            (Task::PopulateProps, _) => {
                populate_props(state);
            }
            (Task::CountdownTick, TaskOwner::Session(token)) => countdown_tick(state, token),
            (Task::SpawnTarget, TaskOwner::Session(token)) => spawn_tick(state, token),
            (Task::ExpireTarget(id), _) => {
                expire_target(state, id);
            }
            (Task::RemoveTarget(id), _) => {
                remove_target(state, id, RemovalReason::Broken);
            }
            (Task::ResetProp(id), _) => {
                reset_prop(state, id);
            }
            (Task::FinishRespawn(id), _) => {
                finish_respawn(state, id);
            }
            (task, owner) => {
                log::warn!("Task {:?} with owner {:?} dropped", task, owner);
            }
        }
    }
}
