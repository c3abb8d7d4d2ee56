//! Bevy component definitions
//!
//! This module contains all component markers and data structures used
//! to tag and identify entities in the Bevy ECS (Entity Component System).

use bevy::{math::EulerRot, prelude::*};

use crate::rotation::RotationState;

/// Marker component for the offscreen rendering camera
///
/// Entities with this component are cameras that render to an offscreen
/// texture instead of a window.
#[derive(Component)]
pub struct OffscreenCamera;

/// Marker component for the textured sphere
#[derive(Component)]
pub struct PhotoSphere;

/// Cumulative rotation owned by the sphere entity
///
/// The drag controller mutates this in place; the transform is derived
/// from it so unbounded angles survive a save/load cycle unchanged.
#[derive(Component, Default, Clone, Copy, Debug)]
pub struct SphereRotation(pub RotationState);

impl SphereRotation {
    /// Mesh orientation for these angles (XYZ Euler order)
    pub fn to_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.0.x, self.0.y, self.0.z)
    }
}
