//! Game state and core simulation types
//!
//! Every entity is an explicit record with an explicit state enum, owned by
//! `GameState`. Nothing here talks to an engine.

use glam::{Quat, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::schedule::{Scheduler, Task, TaskOwner};
use crate::secs_to_ticks;
use crate::settings::{RespawnSettings, Settings};

pub type TargetId = u32;
pub type PropId = u32;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Never started
    #[default]
    Idle,
    /// Countdown running, targets spawning
    Active,
    /// Finished; final score is on display
    Over,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Countdown reached zero
    TimeUp,
    /// Launcher pressed mid-game
    Manual,
}

/// One play-through
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub phase: SessionPhase,
    pub remaining_secs: f32,
    pub score: u32,
    /// Cancellation token for this session's scheduled tasks
    pub token: u32,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    pub fn is_over(&self) -> bool {
        self.phase == SessionPhase::Over
    }

    pub fn owner(&self) -> TaskOwner {
        TaskOwner::Session(self.token)
    }
}

/// Target lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargetState {
    /// Default record state; `spawn_target` builds targets already armed,
    /// so no registered target is ever `Idle`
    #[default]
    Idle,
    /// Collidable, waiting to be hit
    Armed,
    /// Hit once; breaking, no longer collidable
    Hit,
    /// Gone
    Removed,
}

/// A disposable scoring volume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    /// Token of the session that spawned it
    pub session: u32,
    pub position: Vec3,
    pub rotation: Quat,
    pub diameter: f32,
    pub thickness: f32,
    pub color: [f32; 4],
    pub score_value: u32,
    pub state: TargetState,
}

impl Target {
    pub fn accepts_contact(&self) -> bool {
        self.state == TargetState::Armed
    }

    pub fn owner(&self) -> TaskOwner {
        TaskOwner::Target(self.id)
    }
}

/// Why a target went away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalReason {
    /// Lifetime ran out
    Expired,
    /// Break grace period finished
    Broken,
    /// Session ended
    SessionEnded,
}

/// Prop respawn lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PropState {
    /// On the table or in hand
    #[default]
    Idle,
    /// Dropped below the floor; a reset is pending
    Falling,
    /// Consumed by a target; waiting to come back
    Respawning,
}

/// One nested part of a prop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropPart {
    pub name: String,
    pub active: bool,
    /// Part carries a grab handle
    pub grabbable: bool,
    /// Grab handle currently accepts hands
    pub grab_enabled: bool,
}

/// A throwable prop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prop {
    pub id: PropId,
    pub template: String,
    /// Index into the anchor list (loose props have none)
    pub anchor: Option<usize>,
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Physics response suspended
    pub kinematic: bool,
    /// Flat list of parts; index 0 is the root
    pub parts: Vec<PropPart>,
    pub state: PropState,
    /// Props without respawn settings are destroyed when they hit a target
    pub respawn: Option<RespawnSettings>,
}

impl Prop {
    /// Root part active
    pub fn is_active(&self) -> bool {
        self.parts.first().is_some_and(|p| p.active)
    }

    /// Any grab handle enabled
    pub fn is_grabbable(&self) -> bool {
        self.parts.iter().any(|p| p.grabbable && p.grab_enabled)
    }

    /// Activate or deactivate every part
    pub fn set_all_active(&mut self, active: bool) {
        for part in &mut self.parts {
            part.active = active;
        }
    }

    /// Enable or disable every grab handle
    pub fn set_grab_enabled(&mut self, enabled: bool) {
        for part in self.parts.iter_mut().filter(|p| p.grabbable) {
            part.grab_enabled = enabled;
        }
    }

    pub fn owner(&self) -> TaskOwner {
        TaskOwner::Prop(self.id)
    }
}

/// A break-effect piece (visual only, not gameplay-affecting)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debris {
    pub pos: Vec3,
    pub vel: Vec3,
    pub scale: f32,
    /// Seconds left
    pub life: f32,
}

/// Tracks the props the spawner created
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropSpawner {
    pub tracked: Vec<PropId>,
}

/// Something the host may want to react to (HUD, audio, logs)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    SessionStarted { duration_secs: f32 },
    CountdownTicked { remaining_secs: f32 },
    ScoreChanged { score: u32 },
    SessionEnded { final_score: u32, reason: EndReason },
    TargetSpawned { id: TargetId, position: Vec3 },
    TargetHit { id: TargetId, points: u32 },
    TargetBroken { id: TargetId, position: Vec3 },
    TargetRemoved { id: TargetId, reason: RemovalReason },
    /// Contact on a target that was not armed
    ContactIgnored { id: TargetId },
    PropSpawned { id: PropId, anchor: Option<usize> },
    PropReset { id: PropId },
    PropRespawnStarted { id: PropId },
    PropRespawned { id: PropId },
    PropDestroyed { id: PropId },
    PropsCleared { count: usize },
}

/// Complete game state (deterministic)
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub session: Session,
    pub spawner: PropSpawner,
    /// Live targets (sorted by id for determinism)
    pub targets: Vec<Target>,
    /// Live props (sorted by id for determinism)
    pub props: Vec<Prop>,
    pub debris: Vec<Debris>,
    pub scheduler: Scheduler,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new world; queues the spawn-on-start populate if enabled
    pub fn new(settings: Settings) -> Self {
        let seed = settings.seed;
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            session: Session::default(),
            spawner: PropSpawner::default(),
            targets: Vec::new(),
            props: Vec::new(),
            debris: Vec::new(),
            scheduler: Scheduler::new(),
            events: Vec::new(),
            next_id: 1,
            settings,
        };

        if state.settings.props.spawn_on_start {
            let due = state.due_in(state.settings.props.spawn_delay_secs);
            state
                .scheduler
                .schedule(due, TaskOwner::World, Task::PopulateProps);
        }

        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Seeded RNG shared by all placement decisions
    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Tick at which something `secs` from now falls due
    pub fn due_in(&self, secs: f32) -> u64 {
        self.time_ticks + secs_to_ticks(secs)
    }

    /// Seconds since the world was created
    pub fn elapsed_secs(&self) -> f32 {
        self.time_ticks as f32 * crate::consts::SIM_DT
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn target(&self, id: TargetId) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn target_mut(&mut self, id: TargetId) -> Option<&mut Target> {
        self.targets.iter_mut().find(|t| t.id == id)
    }

    pub fn prop(&self, id: PropId) -> Option<&Prop> {
        self.props.iter().find(|p| p.id == id)
    }

    pub fn prop_mut(&mut self, id: PropId) -> Option<&mut Prop> {
        self.props.iter_mut().find(|p| p.id == id)
    }

    /// Targets still collidable
    pub fn armed_targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|t| t.accepts_contact())
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.targets.sort_by_key(|t| t.id);
        self.props.sort_by_key(|p| p.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_queues_populate() {
        let state = GameState::new(Settings::default());
        assert!(state.scheduler.is_pending(TaskOwner::World, Task::PopulateProps));
        assert_eq!(state.scheduler.next_due(), Some(120));
        assert_eq!(state.session.phase, SessionPhase::Idle);
    }

    #[test]
    fn test_no_populate_when_disabled() {
        let mut settings = Settings::default();
        settings.props.spawn_on_start = false;
        let state = GameState::new(settings);
        assert!(state.scheduler.is_empty());
    }

    #[test]
    fn test_prop_part_helpers() {
        let mut prop = Prop {
            id: 1,
            template: "dart".into(),
            anchor: Some(0),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            kinematic: false,
            parts: vec![
                PropPart {
                    name: "body".into(),
                    active: true,
                    grabbable: true,
                    grab_enabled: true,
                },
                PropPart {
                    name: "tip".into(),
                    active: false,
                    grabbable: false,
                    grab_enabled: false,
                },
            ],
            state: PropState::Idle,
            respawn: None,
        };
        assert!(prop.is_active());
        assert!(prop.is_grabbable());

        prop.set_grab_enabled(false);
        assert!(!prop.is_grabbable());
        prop.set_all_active(false);
        assert!(!prop.is_active());

        prop.set_all_active(true);
        prop.set_grab_enabled(true);
        assert!(prop.parts.iter().all(|p| p.active));
        // Parts without a handle stay handle-less
        assert!(!prop.parts[1].grab_enabled);
    }
}
