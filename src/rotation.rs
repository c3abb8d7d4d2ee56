//! Cumulative sphere rotation
//!
//! Angles are radians and are never wrapped; the renderer treats rotation
//! as cyclic, so values may grow without bound across sessions.

use serde::{Deserialize, Serialize};

/// Euler angles (XYZ order) applied to the sphere mesh
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Apply a screen-space drag delta.
    ///
    /// Horizontal motion spins around Y, vertical motion tilts around X.
    pub fn apply_drag(&mut self, delta_x: f32, delta_y: f32, sensitivity: f32) {
        self.y += delta_x * sensitivity;
        self.x += delta_y * sensitivity;
    }
}
