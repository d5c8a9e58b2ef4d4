//! Object transform applier
//!
//! Applies a [`TargetState`] to an enrolled object in a fixed order:
//!
//! 1. scale
//! 2. position-like fields: `coords`, `translate`, `world_translate`,
//!    `world_coordinates` (each one rewrites the tracked coordinates)
//! 3. rotation-like fields: `rotation`, then `quaternion`
//! 4. world-matrix refresh
//! 5. exactly one [`ObjectEvent::Changed`]

use glam::DVec3;

use crate::animation::events::{EventBus, ObjectEvent};
use crate::animation::object::AnimatedObject;
use crate::animation::state::TargetState;
use crate::animation::ObjectHandle;
use crate::geo::projection::{project_to_world, to_radians, unproject_from_world};
use crate::scene::Units;

/// Resolves the position-like fields of `state` against a starting pose.
///
/// Returns the final `(world position, coordinates)`, or `None` if `state`
/// does not move the object.
#[must_use]
pub fn resolve_position(
    state: &TargetState,
    position: DVec3,
    coordinates: DVec3,
) -> Option<(DVec3, DVec3)> {
    if !state.moves() {
        return None;
    }

    let mut position = position;
    let mut coordinates = coordinates;

    if let Some(coords) = state.coords {
        coordinates = coords;
        position = project_to_world(coordinates);
    }
    if let Some(delta) = state.translate {
        coordinates += delta;
        position = project_to_world(coordinates);
    }
    if let Some(delta) = state.world_translate {
        position += delta;
        coordinates = unproject_from_world(position);
    }
    if let Some(world) = state.world_coordinates {
        position = world;
        coordinates = unproject_from_world(position);
    }

    Some((position, coordinates))
}

/// Applies `state` to `object` and emits one change notification.
pub(crate) fn apply_state(
    handle: ObjectHandle,
    object: &mut AnimatedObject,
    state: &TargetState,
    events: &mut EventBus,
) {
    // 1. Scale
    if let Some(scale) = state.scale {
        object.base_scale = scale;
        object.refresh_scale();
    }

    // 2. Position
    if let Some((position, coordinates)) =
        resolve_position(state, object.model.transform.position, object.coordinates)
    {
        object.model.transform.position = position;
        object.coordinates = coordinates;

        // Meter-based scale depends on latitude.
        if object.model.units == Units::Meters {
            object.refresh_scale();
        }
    }

    // 3. Rotation
    if let Some(degrees) = state.rotation {
        object.model.transform.set_rotation_euler(to_radians(degrees));
    }
    if let Some((axis, angle)) = state.quaternion {
        object
            .model
            .transform
            .set_rotation_axis_angle(axis.normalize(), angle);
    }

    // 4. Matrices
    object.model.update_world_matrices();

    // 5. Notify
    let transform = &object.model.transform;
    events.emit(&ObjectEvent::Changed {
        handle,
        coordinates: object.coordinates,
        position: transform.position,
        rotation: transform.rotation,
        scale: transform.scale,
    });
}
