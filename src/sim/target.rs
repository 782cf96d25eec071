//! Targets: spawn, contact, break effect and removal

use glam::{Quat, Vec3};
use rand::Rng;
use rand_pcg::Pcg32;

use super::respawn::start_respawn;
use super::schedule::{Task, TaskOwner};
use super::session::add_score;
use super::spawner::destroy_prop;
use super::state::{
    Debris, GameEvent, GameState, PropId, RemovalReason, Target, TargetId, TargetState,
};
use crate::consts::*;

/// Something touched a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub target: TargetId,
    /// The prop that touched it, if it was one
    pub other: Option<PropId>,
}

impl Contact {
    pub fn prop(target: TargetId, prop: PropId) -> Self {
        Self {
            target,
            other: Some(prop),
        }
    }
}

/// Spawn a target at a random point in the spawn volume, lying face-up
pub fn spawn_target(state: &mut GameState) -> Option<TargetId> {
    let Some(area) = state.settings.spawn_area else {
        log::warn!("No spawn area configured - target not spawned");
        return None;
    };

    let half = area.size * 0.5;
    let rng = state.rng();
    let offset = Vec3::new(
        jitter(rng, half.x),
        jitter(rng, half.y),
        jitter(rng, half.z),
    );
    let position = area.center + offset;

    let shape = state.settings.target;
    let score_value = state.settings.session.score_per_hit;
    let lifetime = state.settings.session.target_lifetime_secs;
    let id = state.next_entity_id();

    let target = Target {
        id,
        session: state.session.token,
        position,
        rotation: Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
        diameter: shape.diameter,
        thickness: shape.thickness,
        color: shape.color,
        score_value,
        state: TargetState::Armed,
    };
    let owner = target.owner();
    state.targets.push(target);

    let due = state.due_in(lifetime);
    state.scheduler.schedule(due, owner, Task::ExpireTarget(id));
    log::debug!("Target {} spawned at {:?}", id, position);
    state.emit(GameEvent::TargetSpawned { id, position });
    Some(id)
}

/// Resolve a contact; returns true if it scored a hit
///
/// Only the first contact on an armed target counts. The touching prop loses
/// its grab handles and either goes through its respawn path or, without
/// one, is destroyed.
pub fn handle_contact(state: &mut GameState, contact: Contact) -> bool {
    let id = contact.target;
    let Some(target) = state.target_mut(id) else {
        log::debug!("Contact on missing target {} ignored", id);
        return false;
    };
    if !target.accepts_contact() {
        log::debug!("Target {} already hit", id);
        state.emit(GameEvent::ContactIgnored { id });
        return false;
    }
    target.state = TargetState::Hit;
    let points = target.score_value;
    let owner_session = target.session;

    if let Some(prop_id) = contact.other {
        consume_prop(state, prop_id);
    }

    log::info!("Target {} hit! +{}", id, points);
    state.emit(GameEvent::TargetHit { id, points });
    if owner_session == state.session.token {
        add_score(state, points);
    } else {
        log::debug!(
            "Target {} belongs to session {} - no score for session {}",
            id,
            owner_session,
            state.session.token
        );
    }
    break_target(state, id);
    true
}

/// Take a prop out of play after it hit a target
fn consume_prop(state: &mut GameState, id: PropId) {
    let Some(prop) = state.prop_mut(id) else {
        log::debug!("Colliding prop {} already gone", id);
        return;
    };
    prop.set_grab_enabled(false);
    if prop.respawn.is_some() {
        prop.set_all_active(false);
        start_respawn(state, id);
    } else {
        log::info!("Destroying colliding prop {}", id);
        destroy_prop(state, id);
    }
}

/// Scatter debris and schedule final removal after the grace period
fn break_target(state: &mut GameState, id: TargetId) {
    let Some(center) = state.target(id).map(|t| t.position) else {
        return;
    };
    let effect = state.settings.break_effect;

    for _ in 0..effect.piece_count {
        let rng = state.rng();
        let pos = center + random_in_unit_sphere(rng) * BREAK_SCATTER_RADIUS;
        let scale = rng.random_range(BREAK_PIECE_MIN_SCALE..BREAK_PIECE_MAX_SCALE);
        let vel = explosion_velocity(
            pos,
            center,
            effect.explosion_force,
            effect.explosion_radius,
        );
        state.debris.push(Debris {
            pos,
            vel,
            scale,
            life: effect.piece_lifetime_secs,
        });
    }

    let due = state.due_in(effect.removal_grace_secs());
    state
        .scheduler
        .schedule(due, TaskOwner::Target(id), Task::RemoveTarget(id));
    state.emit(GameEvent::TargetBroken {
        id,
        position: center,
    });
}

/// Lifetime timeout: unhit targets expire, broken ones finish early
pub fn expire_target(state: &mut GameState, id: TargetId) -> bool {
    let reason = match state.target(id).map(|t| t.state) {
        Some(TargetState::Hit) => RemovalReason::Broken,
        Some(_) => RemovalReason::Expired,
        None => return false,
    };
    remove_target(state, id, reason)
}

/// Drop a target record and anything it still has scheduled
pub fn remove_target(state: &mut GameState, id: TargetId, reason: RemovalReason) -> bool {
    let Some(index) = state.targets.iter().position(|t| t.id == id) else {
        return false;
    };
    let mut target = state.targets.remove(index);
    target.state = TargetState::Removed;
    state.scheduler.cancel_owner(target.owner());
    log::debug!("Target {} removed ({:?})", id, reason);
    state.emit(GameEvent::TargetRemoved { id, reason });
    true
}

/// Remove every live target
pub fn clear_targets(state: &mut GameState, reason: RemovalReason) -> usize {
    let ids: Vec<TargetId> = state.targets.iter().map(|t| t.id).collect();
    ids.into_iter()
        .filter(|&id| remove_target(state, id, reason))
        .count()
}

/// Advance break debris (visual only)
pub fn update_debris(state: &mut GameState, dt: f32) {
    for piece in state.debris.iter_mut() {
        piece.pos += piece.vel * dt;
        piece.vel.y -= DEBRIS_GRAVITY * dt;
        piece.life -= dt;
    }
    state.debris.retain(|p| p.life > 0.0);
}

fn jitter(rng: &mut Pcg32, half: f32) -> f32 {
    if half > 0.0 {
        rng.random_range(-half..half)
    } else {
        0.0
    }
}

fn random_in_unit_sphere(rng: &mut Pcg32) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        if v.length_squared() <= 1.0 {
            return v;
        }
    }
}

/// Outward push that falls off linearly to zero at `radius`
fn explosion_velocity(pos: Vec3, center: Vec3, force: f32, radius: f32) -> Vec3 {
    let offset = pos - center;
    let dir = offset.try_normalize().unwrap_or(Vec3::Y);
    let falloff = if radius > 0.0 {
        (1.0 - offset.length() / radius).max(0.0)
    } else {
        0.0
    };
    dir * force * falloff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{PropTemplate, Settings, SpawnVolume};
    use crate::sim::session::start_session;
    use crate::sim::spawner::register_loose_prop;
    use crate::sim::state::PropState;

    fn active_world() -> GameState {
        let mut settings = Settings::default();
        settings.props.spawn_on_start = false;
        let mut state = GameState::new(settings);
        start_session(&mut state);
        state
    }

    #[test]
    fn test_spawn_inside_volume_face_up() {
        let mut state = active_world();
        let area = state.settings.spawn_area.unwrap();
        for _ in 0..50 {
            let id = spawn_target(&mut state).unwrap();
            let t = state.target(id).unwrap();
            let local = t.position - area.center;
            assert!(local.x.abs() <= area.size.x / 2.0);
            assert_eq!(local.y, 0.0); // zero-height volume
            assert!(local.z.abs() <= area.size.z / 2.0);
            assert_eq!(t.state, TargetState::Armed);
            assert!((t.rotation * Vec3::Y).z > 0.99);
        }
    }

    #[test]
    fn test_no_spawn_area_skips_spawn() {
        let mut state = active_world();
        state.settings.spawn_area = None;
        assert!(spawn_target(&mut state).is_none());
    }

    #[test]
    fn test_double_contact_scores_once() {
        let mut state = active_world();
        let id = state.targets[0].id;
        let prop = state.spawner.tracked[0];

        assert!(handle_contact(&mut state, Contact::prop(id, prop)));
        assert!(!handle_contact(&mut state, Contact::prop(id, prop)));
        assert!(!handle_contact(&mut state, Contact { target: id, other: None }));

        assert_eq!(state.session.score, 10);
        assert_eq!(state.target(id).unwrap().state, TargetState::Hit);
    }

    #[test]
    fn test_target_scores_only_for_its_own_session() {
        let mut settings = Settings::default();
        settings.props.spawn_on_start = false;
        let mut state = GameState::new(settings);
        let stale = spawn_target(&mut state).unwrap();
        start_session(&mut state);
        let fresh = state
            .targets
            .iter()
            .find(|t| t.session == state.session.token)
            .map(|t| t.id)
            .unwrap();

        assert!(handle_contact(&mut state, Contact { target: stale, other: None }));
        assert_eq!(state.session.score, 0);
        assert_eq!(state.target(stale).unwrap().state, TargetState::Hit);

        assert!(handle_contact(&mut state, Contact { target: fresh, other: None }));
        assert_eq!(state.session.score, 10);
    }

    #[test]
    fn test_hit_sends_prop_to_respawn() {
        let mut state = active_world();
        let id = state.targets[0].id;
        let prop_id = state.spawner.tracked[0];

        handle_contact(&mut state, Contact::prop(id, prop_id));
        let prop = state.prop(prop_id).unwrap();
        assert_eq!(prop.state, PropState::Respawning);
        assert!(!prop.is_active());
        assert!(!prop.is_grabbable());
    }

    #[test]
    fn test_hit_destroys_prop_without_respawn() {
        let mut state = active_world();
        let id = state.targets[0].id;
        let rock = register_loose_prop(&mut state, &PropTemplate::simple("rock"), Vec3::ZERO);

        handle_contact(&mut state, Contact::prop(id, rock));
        assert!(state.prop(rock).is_none());
        assert_eq!(state.session.score, 10);
    }

    #[test]
    fn test_hit_spawns_debris_and_schedules_removal() {
        let mut state = active_world();
        let id = state.targets[0].id;
        handle_contact(&mut state, Contact { target: id, other: None });

        assert_eq!(state.debris.len(), 5);
        for piece in &state.debris {
            assert!((0.1..0.3).contains(&piece.scale));
            assert_eq!(piece.life, 3.0);
        }
        assert!(state
            .scheduler
            .is_pending(TaskOwner::Target(id), Task::RemoveTarget(id)));
    }

    #[test]
    fn test_expire_removes_unhit_target() {
        let mut state = active_world();
        let id = state.targets[0].id;
        assert!(expire_target(&mut state, id));
        assert!(state.target(id).is_none());
        assert_eq!(state.scheduler.pending_for(TaskOwner::Target(id)), 0);
        assert!(state.events.contains(&GameEvent::TargetRemoved {
            id,
            reason: RemovalReason::Expired
        }));
        assert!(!expire_target(&mut state, id));
    }

    #[test]
    fn test_contact_on_removed_target_is_ignored() {
        let mut state = active_world();
        let id = state.targets[0].id;
        expire_target(&mut state, id);
        assert!(!handle_contact(&mut state, Contact { target: id, other: None }));
        assert_eq!(state.session.score, 0);
    }

    #[test]
    fn test_debris_expires() {
        let mut state = active_world();
        let id = state.targets[0].id;
        handle_contact(&mut state, Contact { target: id, other: None });
        for _ in 0..4 {
            update_debris(&mut state, 1.0);
        }
        assert!(state.debris.is_empty());
    }

    #[test]
    fn test_full_height_volume_spreads_vertically() {
        let mut state = active_world();
        state.settings.spawn_area = Some(SpawnVolume {
            center: Vec3::ZERO,
            size: Vec3::splat(1.0),
        });
        let ids: Vec<TargetId> = (0..20).filter_map(|_| spawn_target(&mut state)).collect();
        let ys: Vec<f32> = ids
            .iter()
            .map(|id| state.target(*id).unwrap().position.y)
            .collect();
        assert!(ys.iter().all(|y| y.abs() <= 0.5));
        assert!(ys.iter().any(|y| *y != 0.0));
    }
}
