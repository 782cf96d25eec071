//! Prop spawner
//!
//! Places throwable props at the configured anchors and tracks them so a
//! session can clear them again.

use glam::{Quat, Vec3};
use rand::Rng;

use super::respawn::activate_prop;
use super::schedule::TaskOwner;
use super::state::{GameEvent, GameState, Prop, PropId, PropPart, PropState};
use crate::settings::PropTemplate;

/// Clear tracked props, then spawn one prop per anchor up to the configured count
pub fn populate_props(state: &mut GameState) -> Vec<PropId> {
    clear_props(state);

    let props = &state.settings.props;
    if props.templates.is_empty() {
        log::warn!("No prop templates configured - nothing to spawn");
        return Vec::new();
    }
    if props.count > props.anchors.len() {
        log::warn!(
            "Prop count {} exceeds anchor count {}, spawning {}",
            props.count,
            props.anchors.len(),
            props.anchors.len()
        );
    }
    let count = props.count.min(props.anchors.len());

    let spawned: Vec<PropId> = (0..count)
        .filter_map(|anchor| spawn_prop_at(state, anchor))
        .collect();
    log::info!("Populated {} props", spawned.len());
    spawned
}

/// Destroy every tracked prop
pub fn clear_props(state: &mut GameState) -> usize {
    let tracked = std::mem::take(&mut state.spawner.tracked);
    let count = tracked.len();
    for id in tracked {
        remove_prop_record(state, id);
    }
    if count > 0 {
        log::info!("Cleared {} props", count);
        state.emit(GameEvent::PropsCleared { count });
    }
    count
}

/// Build one prop from a random template at `anchor` and start tracking it
pub fn spawn_prop_at(state: &mut GameState, anchor: usize) -> Option<PropId> {
    let template_count = state.settings.props.templates.len();
    if template_count == 0 {
        log::warn!("No prop templates configured");
        return None;
    }
    let Some(pose) = state.settings.props.anchors.get(anchor) else {
        log::warn!("Anchor {} does not exist", anchor);
        return None;
    };
    let (position, rotation) = (pose.position, pose.rotation);

    let index = state.rng().random_range(0..template_count);
    let template = state.settings.props.templates[index].clone();
    let respawn = state.settings.props.respawn;
    let id = state.next_entity_id();

    let mut prop = build_prop(id, &template, Some(anchor), position, rotation);
    // Templates may be authored with parts switched off
    prop.set_all_active(true);
    prop.set_grab_enabled(true);
    prop.respawn = Some(respawn);

    log::info!(
        "Spawned prop {} ({}) at {} ({} parts)",
        id,
        template.name,
        state.settings.props.anchors[anchor].name,
        prop.parts.len()
    );
    state.props.push(prop);
    state.spawner.tracked.push(id);
    state.emit(GameEvent::PropSpawned {
        id,
        anchor: Some(anchor),
    });

    activate_prop(state, id);
    Some(id)
}

/// Add a prop the spawner does not manage (no anchor, no respawn)
///
/// Such props are destroyed outright when they hit a target.
pub fn register_loose_prop(
    state: &mut GameState,
    template: &PropTemplate,
    position: Vec3,
) -> PropId {
    let id = state.next_entity_id();
    let prop = build_prop(id, template, None, position, Quat::IDENTITY);
    state.props.push(prop);
    state.emit(GameEvent::PropSpawned { id, anchor: None });
    id
}

/// Destroy a single prop, tracked or not
pub fn destroy_prop(state: &mut GameState, id: PropId) -> bool {
    state.spawner.tracked.retain(|&t| t != id);
    remove_prop_record(state, id)
}

fn remove_prop_record(state: &mut GameState, id: PropId) -> bool {
    let before = state.props.len();
    state.props.retain(|p| p.id != id);
    state.scheduler.cancel_owner(TaskOwner::Prop(id));
    let removed = state.props.len() != before;
    if removed {
        state.emit(GameEvent::PropDestroyed { id });
    }
    removed
}

fn build_prop(
    id: PropId,
    template: &PropTemplate,
    anchor: Option<usize>,
    position: Vec3,
    rotation: Quat,
) -> Prop {
    Prop {
        id,
        template: template.name.clone(),
        anchor,
        position,
        rotation,
        linear_velocity: Vec3::ZERO,
        angular_velocity: Vec3::ZERO,
        kinematic: false,
        parts: template
            .parts
            .iter()
            .map(|p| PropPart {
                name: p.name.clone(),
                active: p.active,
                grabbable: p.grabbable,
                grab_enabled: p.grabbable,
            })
            .collect(),
        state: PropState::Idle,
        respawn: None,
    }
}
