//! Photo Sphere: camera snapshots on a rotatable 3D sphere
//!
//! The webview captures the camera and forwards pointer input; a headless
//! Bevy app renders a sphere textured with the last captured frame; rotation
//! and the capture survive restarts through a small key-value store.
//!
//! Architecture:
//! - Bevy runs in a background thread with NO window (true headless mode)
//! - Rendered frames go GPU texture -> buffer -> CPU channel -> `frame://`
//! - Camera frames arrive through `camera://`, input through Tauri commands
//!
//! # Module Structure
//!
//! - `config`: Configuration constants and settings
//! - `error`: Error types
//! - `rotation`: Cumulative sphere rotation
//! - `interaction`: Drag-to-rotate state machine
//! - `capture`: Camera frames and image encoding
//! - `persistence`: Key-value stores and the persisted snapshot
//! - `tauri_bridge`: Bridge layer between Tauri and Bevy
//!   - `shared_state`: Thread-safe data structures
//!   - `commands`: Tauri command handlers (`desktop` feature)
//!   - `protocol`: Custom protocol handlers (`desktop` feature)
//! - `bevy`: Bevy engine integration
//!   - `components`: ECS components
//!   - `resources`: Global resources
//!   - `plugins`: Custom plugins
//!   - `systems`: Scene, interaction, capture and restore systems
//!   - `app`: Application setup

pub mod bevy;
pub mod capture;
pub mod config;
pub mod error;
pub mod interaction;
pub mod persistence;
pub mod rotation;
pub mod tauri_bridge;

/// Main entry point for the Tauri application
#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use tauri::Manager;

    use crate::config::storage::DIR_NAME;
    use crate::tauri_bridge::{scene_input_channels, SharedCameraFeed, SharedFrameBuffer};

    // Logging is installed by Bevy's LogPlugin on the render thread; nothing
    // here logs before `start_bevy`.

    // Create shared state
    let buffer = SharedFrameBuffer::default();
    let camera_feed = SharedCameraFeed::default();
    let (scene_input, receivers) = scene_input_channels();

    // Clone for the custom protocol handlers
    let protocol_buffer = buffer.clone();
    let protocol_feed = camera_feed.clone();
    let bevy_buffer = buffer.clone();
    let bevy_feed = camera_feed.clone();

    tauri::Builder::default()
        .manage(buffer)
        .manage(camera_feed)
        .manage(scene_input)
        .setup(move |app| {
            let store_dir = app.path().app_local_data_dir()?.join(DIR_NAME);

            // Start Bevy in background thread; it opens the store once
            // logging is up
            bevy::start_bevy(
                bevy::EngineLink {
                    frame_buffer: bevy_buffer,
                    camera_feed: bevy_feed,
                    input: receivers,
                },
                store_dir,
            );
            Ok(())
        })
        // Rendered frames as binary, bypassing Tauri IPC JSON serialization
        .register_asynchronous_uri_scheme_protocol("frame", move |_ctx, request, responder| {
            let buffer = protocol_buffer.clone();

            // Handle the request in a separate thread to avoid blocking
            std::thread::spawn(move || {
                // For Tauri v2 on Windows the URL format is: http://frame.localhost/path
                let response =
                    tauri_bridge::protocol::handle_frame_protocol(request.uri().path(), &buffer);
                responder.respond(response);
            });
        })
        // Camera frames uploaded by the webview
        .register_asynchronous_uri_scheme_protocol("camera", move |_ctx, request, responder| {
            let feed = protocol_feed.clone();

            std::thread::spawn(move || {
                let response = tauri_bridge::protocol::handle_camera_protocol(&request, &feed);
                responder.respond(response);
            });
        })
        .invoke_handler(tauri::generate_handler![
            tauri_bridge::commands::get_render_size,
            tauri_bridge::commands::get_camera_constraints,
            tauri_bridge::commands::report_camera_status,
            tauri_bridge::commands::send_pointer_event,
            tauri_bridge::commands::capture_photo
        ])
        .run(tauri::generate_context!())
        .expect("Tauri error");
}
