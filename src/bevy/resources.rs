//! Bevy resource definitions
//!
//! This module contains all global resources used by Bevy systems.
//! Resources are singleton data that can be accessed by any system.

use bevy::{prelude::*, tasks::Task};
use image::RgbaImage;
use std::time::Duration;

use crate::config::interaction::ROTATION_SENSITIVITY;
use crate::error::DecodeError;
use crate::interaction::{DragController, PointerEvent};
use crate::persistence::SpherePersistence;
use crate::tauri_bridge::shared_state::{CaptureRequest, SharedCameraFeed, SharedFrameBuffer};

// =============================================================================
// Settings
// =============================================================================

/// Runtime tuning seeded from [`crate::config`]
#[derive(Resource, Clone, Debug)]
pub struct SphereSettings {
    /// Radians per pixel of drag
    pub sensitivity: f32,
}

impl Default for SphereSettings {
    fn default() -> Self {
        Self {
            sensitivity: ROTATION_SENSITIVITY,
        }
    }
}

// =============================================================================
// Interaction
// =============================================================================

/// Pointer events queued by the webview
#[derive(Resource, Deref)]
pub struct PointerEventReceiver(pub crossbeam_channel::Receiver<PointerEvent>);

/// Drag gesture state
#[derive(Resource, Deref, DerefMut)]
pub struct DragControllerRes(pub DragController);

// =============================================================================
// Capture
// =============================================================================

/// Capture requests queued by the webview
#[derive(Resource, Deref)]
pub struct CaptureRequestReceiver(pub crossbeam_channel::Receiver<CaptureRequest>);

/// Camera status and latest frame shared with the protocol handler
#[derive(Resource, Clone)]
pub struct CameraFeedRes(pub SharedCameraFeed);

// =============================================================================
// Sphere Appearance & Persistence
// =============================================================================

/// The sphere's one material; textures are swapped on it in place
#[derive(Resource, Clone)]
pub struct SphereMaterial(pub Handle<StandardMaterial>);

/// Snapshot store for rotation and the last capture
#[derive(Resource, Deref, DerefMut)]
pub struct SphereStore(pub SpherePersistence);

/// Startup decode of the persisted image, if one is running
#[derive(Resource, Default)]
pub struct PendingTextureDecode(pub Option<Task<Result<RgbaImage, DecodeError>>>);

// =============================================================================
// Rendering
// =============================================================================

/// Handle to the offscreen render target texture
#[derive(Resource)]
pub struct RenderTargetHandle(pub Handle<Image>);

/// Shared frame buffer resource for Bevy
#[derive(Resource, Clone)]
pub struct FrameBufferRes(pub SharedFrameBuffer);

// =============================================================================
// Frame Management
// =============================================================================

/// Counter for total frames rendered
#[derive(Resource, Default)]
pub struct FrameCount(pub u32);

/// Number of pre-roll frames to skip before starting output
#[derive(Resource, Default)]
pub struct PreRollFrames(pub u32);

/// Frame rate limiter to control output FPS
#[derive(Resource)]
pub struct FrameRateLimiter {
    pub last_frame_time: std::time::Instant,
    pub min_frame_interval: Duration,
}

impl FrameRateLimiter {
    pub fn new(target_fps: f64) -> Self {
        Self {
            last_frame_time: std::time::Instant::now(),
            min_frame_interval: Duration::from_secs_f64(1.0 / target_fps),
        }
    }
}

impl Default for FrameRateLimiter {
    fn default() -> Self {
        Self::new(crate::config::TARGET_FPS)
    }
}

// =============================================================================
// Channel Communication (Main World <-> Render World)
// =============================================================================

use crossbeam_channel::{Receiver, Sender};

/// Receives data from render world
#[derive(Resource, Deref)]
pub struct MainWorldReceiver(pub Receiver<Vec<u8>>);

/// Sends data to main world
#[derive(Resource, Deref)]
pub struct RenderWorldSender(pub Sender<Vec<u8>>);
