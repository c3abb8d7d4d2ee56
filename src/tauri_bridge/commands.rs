//! Tauri command handlers
//!
//! This module contains all the Tauri command functions that can be invoked
//! from the frontend JavaScript code.

use bevy::log::{info, warn};
use serde::Serialize;
use tauri::State;

use super::shared_state::{CaptureRequest, SceneInput, SharedCameraFeed};
use crate::capture::CameraStatus;
use crate::config::{camera, RENDER_HEIGHT, RENDER_WIDTH};
use crate::interaction::PointerEvent;

/// Camera constraints the frontend passes to `getUserMedia`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraConstraints {
    pub facing_mode: &'static str,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

/// Get the render resolution
#[tauri::command]
pub fn get_render_size() -> (u32, u32) {
    (RENDER_WIDTH, RENDER_HEIGHT)
}

/// Get the constraints to request the camera stream with
#[tauri::command]
pub fn get_camera_constraints() -> CameraConstraints {
    CameraConstraints {
        facing_mode: camera::FACING_MODE,
        ideal_width: camera::IDEAL_WIDTH,
        ideal_height: camera::IDEAL_HEIGHT,
    }
}

/// Record camera readiness (metadata loaded) or failure
#[tauri::command]
pub fn report_camera_status(
    state: State<SharedCameraFeed>,
    status: CameraStatus,
) -> Result<(), String> {
    match &status {
        CameraStatus::Ready { width, height } => {
            info!("[Camera] Stream ready at {}x{}", width, height)
        }
        CameraStatus::Failed { reason } => warn!("[Camera] Stream unavailable: {}", reason),
        CameraStatus::Pending => info!("[Camera] Stream requested"),
    }
    let mut guard = state.0.lock().map_err(|e| e.to_string())?;
    guard.set_status(status);
    Ok(())
}

/// Forward a pointer/touch event to the drag controller
/// Events are queued in order until consumed by Bevy
#[tauri::command]
pub fn send_pointer_event(state: State<SceneInput>, event: PointerEvent) -> Result<(), String> {
    state.pointer.send(event).map_err(|e| e.to_string())
}

/// Ask Bevy to put the current camera frame on the sphere
#[tauri::command]
pub fn capture_photo(state: State<SceneInput>) -> Result<(), String> {
    state
        .capture
        .send(CaptureRequest)
        .map_err(|e| e.to_string())
}
