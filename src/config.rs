//! Configuration constants and settings for the photo sphere
//!
//! This module contains all configurable parameters such as render resolution,
//! frame rates, drag sensitivity, camera constraints and storage limits.

/// Width of the offscreen render target in pixels
pub const RENDER_WIDTH: u32 = 800;

/// Height of the offscreen render target in pixels
pub const RENDER_HEIGHT: u32 = 600;

/// Target frames per second for the Bevy render loop
pub const TARGET_FPS: f64 = 60.0;

/// Number of pre-roll frames to skip before starting output
/// This allows the scene to fully load and stabilize
pub const PRE_ROLL_FRAMES: u32 = 30;

/// Drag-to-rotate settings
pub mod interaction {
    /// Radians of rotation per screen pixel of drag
    pub const ROTATION_SENSITIVITY: f32 = 0.01;
}

/// Constraints requested from the webview camera
pub mod camera {
    /// Preferred facing direction (`user` = front camera)
    pub const FACING_MODE: &str = "user";

    /// Ideal capture width; the platform may grant something else
    pub const IDEAL_WIDTH: u32 = 1280;

    /// Ideal capture height; the platform may grant something else
    pub const IDEAL_HEIGHT: u32 = 720;
}

/// Persistent key-value store settings
pub mod storage {
    /// Prefix shared by both persisted keys
    pub const KEY_PREFIX: &str = "photo_sphere";

    /// Store directory inside the app's local data directory; one file per key
    pub const DIR_NAME: &str = "photo_sphere_store";

    /// Maximum bytes (keys + values) the store accepts
    pub const QUOTA_BYTES: usize = 5 * 1024 * 1024;
}

/// Sphere geometry and appearance
pub mod scene {
    /// Sphere radius in world units
    pub const SPHERE_RADIUS: f32 = 1.5;

    /// Longitudinal subdivisions of the UV sphere
    pub const SPHERE_SECTORS: u32 = 64;

    /// Latitudinal subdivisions of the UV sphere
    pub const SPHERE_STACKS: u32 = 32;
}

/// Image compression settings
pub mod compression {
    /// JPEG quality level (0-100, higher = better quality but larger size)
    pub const JPEG_QUALITY: u8 = 85;
}
