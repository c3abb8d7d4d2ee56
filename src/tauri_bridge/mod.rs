//! Bridge layer between Tauri and Bevy
//!
//! This module handles all communication between the Tauri frontend and
//! the Bevy rendering backend, including command handlers, custom protocols,
//! and shared state management. Only the shared state is compiled without
//! the `desktop` feature.

pub mod shared_state;

#[cfg(feature = "desktop")]
pub mod commands;
#[cfg(feature = "desktop")]
pub mod protocol;

// Re-export commonly used types
pub use shared_state::{
    scene_input_channels, CaptureRequest, SceneInput, SceneInputReceivers, SharedCameraFeed,
    SharedFrameBuffer,
};
