//! Drag-to-rotate system
//!
//! Drains the pointer events forwarded by the webview, runs them through the
//! drag controller against the sphere's rotation, and persists the rotation
//! after every increment.

use bevy::prelude::*;

use crate::bevy::components::{PhotoSphere, SphereRotation};
use crate::bevy::resources::{DragControllerRes, PointerEventReceiver, SphereStore};

/// Apply queued pointer events to the sphere
///
/// - Pointer/single-finger drag: rotate (x delta -> yaw, y delta -> pitch)
/// - Multi-finger touch: ignored
pub fn drive_sphere_rotation(
    events: Option<Res<PointerEventReceiver>>,
    mut controller: ResMut<DragControllerRes>,
    mut store: ResMut<SphereStore>,
    mut spheres: Query<&mut SphereRotation, With<PhotoSphere>>,
) {
    let Some(events) = events else {
        return;
    };

    let Ok(mut rotation) = spheres.single_mut() else {
        // Scene not built yet; the gesture cannot rotate anything
        while events.try_recv().is_ok() {}
        return;
    };

    for event in events.try_iter() {
        if controller.handle(&event, &mut rotation.0) {
            store.persist_rotation(&rotation.0);
        }
    }
}
