//! Per-prop respawn controller
//!
//! Two paths bring a prop back to its anchor:
//! - Falling: the prop dropped below `fall_y`; a reset is scheduled after a
//!   short stabilization delay. `PropState::Falling` debounces the schedule.
//! - Consumed: a target swallowed the prop; `start_respawn` waits the same
//!   delay, then restores it in place or has the spawner rebuild it.

use glam::Vec3;

use super::schedule::Task;
use super::spawner::{destroy_prop, spawn_prop_at};
use super::state::{GameEvent, GameState, PropId, PropState};
use crate::settings::RespawnMode;

/// A prop became active; snap it to its anchor so it never starts mid-air
pub fn activate_prop(state: &mut GameState, id: PropId) -> bool {
    reset_prop(state, id)
}

/// Teleport a prop to its anchor and zero its velocity
///
/// Clears a pending fall reset even when the prop has no anchor.
pub fn reset_prop(state: &mut GameState, id: PropId) -> bool {
    let Some(prop) = state.prop(id) else {
        log::debug!("Reset for missing prop {} ignored", id);
        return false;
    };
    let anchor = prop
        .anchor
        .and_then(|i| state.settings.props.anchors.get(i))
        .map(|a| (a.position, a.rotation));

    let Some(prop) = state.prop_mut(id) else {
        return false;
    };
    if prop.state == PropState::Falling {
        prop.state = PropState::Idle;
    }
    let Some((position, rotation)) = anchor else {
        log::warn!("Prop {} has no anchor - reset skipped", id);
        return false;
    };

    // Suspend physics response so a holding hand cannot fight the teleport
    prop.kinematic = true;
    prop.position = position;
    prop.rotation = rotation;
    prop.linear_velocity = Vec3::ZERO;
    prop.angular_velocity = Vec3::ZERO;
    prop.kinematic = false;

    log::debug!("Prop {} reset to anchor", id);
    state.emit(GameEvent::PropReset { id });
    true
}

/// Schedule resets for props that fell below their threshold
///
/// Returns the props newly marked as falling.
pub fn check_falls(state: &mut GameState) -> Vec<PropId> {
    let fallen: Vec<(PropId, f32)> = state
        .props
        .iter()
        .filter(|p| p.state == PropState::Idle && p.is_active())
        .filter_map(|p| {
            let respawn = p.respawn?;
            (respawn.auto_respawn && p.position.y < respawn.fall_y)
                .then_some((p.id, respawn.respawn_delay_secs))
        })
        .collect();

    for &(id, delay) in &fallen {
        if let Some(prop) = state.prop_mut(id) {
            prop.state = PropState::Falling;
            let owner = prop.owner();
            let due = state.due_in(delay);
            state.scheduler.schedule(due, owner, Task::ResetProp(id));
            log::info!("Prop {} fell out of bounds, reset queued", id);
        }
    }
    fallen.into_iter().map(|(id, _)| id).collect()
}

/// Begin bringing back a prop consumed by a target (no-op while already respawning)
pub fn start_respawn(state: &mut GameState, id: PropId) -> bool {
    let Some(prop) = state.prop_mut(id) else {
        log::debug!("Respawn for missing prop {} ignored", id);
        return false;
    };
    let Some(respawn) = prop.respawn else {
        log::warn!("Prop {} has no respawn settings", id);
        return false;
    };
    if prop.state == PropState::Respawning {
        log::debug!("Prop {} already respawning", id);
        return false;
    }

    prop.state = PropState::Respawning;
    let owner = prop.owner();
    // A pending fall reset is superseded
    state.scheduler.cancel_owner(owner);
    let due = state.due_in(respawn.respawn_delay_secs);
    state.scheduler.schedule(due, owner, Task::FinishRespawn(id));
    state.emit(GameEvent::PropRespawnStarted { id });
    true
}

/// Complete a respawn; returns the id of the prop now standing at the anchor
pub fn finish_respawn(state: &mut GameState, id: PropId) -> Option<PropId> {
    let prop = state.prop(id)?;
    if prop.state != PropState::Respawning {
        log::debug!("Prop {} is not respawning", id);
        return None;
    }
    let mode = prop.respawn.map(|r| r.mode).unwrap_or_default();
    let anchor = prop.anchor;
    log::info!("Respawning prop {}", id);

    let respawned = match (mode, anchor) {
        (RespawnMode::Recreate, Some(anchor)) => {
            destroy_prop(state, id);
            spawn_prop_at(state, anchor)
        }
        _ => {
            if let Some(prop) = state.prop_mut(id) {
                prop.set_all_active(true);
            }
            reset_prop(state, id);
            if let Some(prop) = state.prop_mut(id) {
                prop.set_grab_enabled(true);
                prop.state = PropState::Idle;
            }
            Some(id)
        }
    };

    if let Some(new_id) = respawned {
        log::info!("Prop {} respawned as {}", id, new_id);
        state.emit(GameEvent::PropRespawned { id: new_id });
    }
    respawned
}
