//! Shared state structures for communication between Tauri and Bevy
//!
//! This module defines thread-safe data structures that allow bidirectional
//! communication between the Tauri frontend and the Bevy render backend.

use crossbeam_channel::{Receiver, Sender};
use std::sync::{Arc, Mutex};

use crate::capture::CameraFeed;
use crate::interaction::PointerEvent;

// =============================================================================
// Frame Buffer
// =============================================================================

/// Thread-safe RGBA frame buffer shared between Bevy and Tauri
/// Stores raw RGBA8 pixel data (4 bytes per pixel)
#[derive(Clone, Default)]
pub struct SharedFrameBuffer(pub Arc<Mutex<Option<Vec<u8>>>>);

// =============================================================================
// Camera Feed
// =============================================================================

/// Latest uploaded camera frame and stream status
#[derive(Clone, Default)]
pub struct SharedCameraFeed(pub Arc<Mutex<CameraFeed>>);

// =============================================================================
// Scene Input
// =============================================================================

/// Request to snapshot the current camera frame onto the sphere
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureRequest;

/// Sending half of the webview -> Bevy input channels
#[derive(Clone)]
pub struct SceneInput {
    pub pointer: Sender<PointerEvent>,
    pub capture: Sender<CaptureRequest>,
}

/// Receiving half, moved into the Bevy app
pub struct SceneInputReceivers {
    pub pointer: Receiver<PointerEvent>,
    pub capture: Receiver<CaptureRequest>,
}

/// Create the input channels. Events are delivered in order and drained
/// once per Bevy frame.
pub fn scene_input_channels() -> (SceneInput, SceneInputReceivers) {
    let (pointer_tx, pointer_rx) = crossbeam_channel::unbounded();
    let (capture_tx, capture_rx) = crossbeam_channel::unbounded();
    (
        SceneInput {
            pointer: pointer_tx,
            capture: capture_tx,
        },
        SceneInputReceivers {
            pointer: pointer_rx,
            capture: capture_rx,
        },
    )
}
