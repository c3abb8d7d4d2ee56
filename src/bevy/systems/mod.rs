//! Bevy systems
//!
//! This module contains the systems that operate on the sphere scene and
//! bridge it to the webview and the persistent store.

pub mod capture;
pub mod frame_extraction;
pub mod interaction;
pub mod restore;
pub mod scene;

pub use capture::{capture_camera_frame, reflect_camera_status};
pub use frame_extraction::extract_frame;
pub use interaction::drive_sphere_rotation;
pub use restore::{finish_texture_restore, restore_persisted_state};
pub use scene::{apply_sphere_rotation, setup_scene};
