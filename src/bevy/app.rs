//! Bevy application setup and execution
//!
//! This module handles the creation and configuration of the Bevy app,
//! including plugin registration and system scheduling.

use bevy::{
    app::{App, ScheduleRunnerPlugin},
    log::info,
    prelude::*,
    window::ExitCondition,
};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::config::{
    storage::{KEY_PREFIX, QUOTA_BYTES},
    PRE_ROLL_FRAMES, TARGET_FPS,
};
use crate::bevy::plugins::ImageCopyPlugin;
use crate::bevy::resources::*;
use crate::bevy::systems::*;
use crate::interaction::DragController;
use crate::persistence::{open_store, KeyValueStore, SpherePersistence};
use crate::tauri_bridge::shared_state::{SceneInputReceivers, SharedCameraFeed, SharedFrameBuffer};

/// Everything the Bevy side shares with the Tauri side
pub struct EngineLink {
    pub frame_buffer: SharedFrameBuffer,
    pub camera_feed: SharedCameraFeed,
    pub input: SceneInputReceivers,
}

/// Register the sphere's state and systems on `app`
///
/// Rendering-independent: tests drive this on top of `MinimalPlugins`.
pub fn add_sphere_logic(
    app: &mut App,
    store: impl KeyValueStore + 'static,
    camera_feed: SharedCameraFeed,
    input: SceneInputReceivers,
    settings: SphereSettings,
) {
    app.insert_resource(DragControllerRes(DragController::new(settings.sensitivity)));
    app.insert_resource(settings);
    app.insert_resource(SphereStore(SpherePersistence::new(store, KEY_PREFIX)));
    app.insert_resource(CameraFeedRes(camera_feed));
    app.insert_resource(PointerEventReceiver(input.pointer));
    app.insert_resource(CaptureRequestReceiver(input.capture));
    app.init_resource::<PendingTextureDecode>();

    app.add_systems(
        Update,
        (
            drive_sphere_rotation,
            capture_camera_frame,
            finish_texture_restore,
            reflect_camera_status,
            apply_sphere_rotation,
        )
            .chain(),
    );
}

/// Create and configure the Bevy application
///
/// The store under `store_dir` is opened after `LogPlugin` is built so its
/// warnings reach the log.
pub fn create_app(link: EngineLink, store_dir: PathBuf) -> App {
    let mut app = App::new();

    // Use DefaultPlugins but configure for headless operation
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: None,
                exit_condition: ExitCondition::DontExit,
                ..default()
            })
            .set(ImagePlugin::default_linear()),
    );

    let store = open_store(&store_dir, QUOTA_BYTES);

    // Add schedule runner for controlled frame rate
    app.add_plugins(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
        1.0 / TARGET_FPS,
    )));

    // Add custom plugins
    app.add_plugins(ImageCopyPlugin);

    // The store is read only once the sphere and its material exist
    app.add_systems(Startup, (setup_scene, restore_persisted_state).chain());
    add_sphere_logic(
        &mut app,
        store,
        link.camera_feed,
        link.input,
        SphereSettings::default(),
    );
    app.add_systems(Last, extract_frame);

    app.insert_resource(FrameBufferRes(link.frame_buffer));
    app.insert_resource(FrameCount::default());
    app.insert_resource(PreRollFrames(PRE_ROLL_FRAMES));
    app.insert_resource(FrameRateLimiter::default());

    info!("[Bevy] App configured (headless, offscreen sphere)");
    app
}

/// Start Bevy in a background thread
pub fn start_bevy(link: EngineLink, store_dir: PathBuf) {
    thread::spawn(move || {
        let mut app = create_app(link, store_dir);
        info!("[Bevy] Running render loop...");
        app.run();
    });
}
