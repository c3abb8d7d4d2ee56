//! Sphere behavior driven through the Bevy schedule without a GPU.

use std::time::Duration;

use bevy::{math::EulerRot, prelude::*};
use image::{Rgba, RgbaImage};

use photo_sphere_lib::capture::{CameraFrame, CameraStatus, EncodedImage};
use photo_sphere_lib::config::storage::{KEY_PREFIX, QUOTA_BYTES};
use photo_sphere_lib::bevy::add_sphere_logic;
use photo_sphere_lib::bevy::components::{PhotoSphere, SphereRotation};
use photo_sphere_lib::bevy::resources::{
    PendingTextureDecode, SphereMaterial, SphereSettings, SphereStore,
};
use photo_sphere_lib::bevy::systems::capture::CAMERA_ERROR_COLOR;
use photo_sphere_lib::bevy::systems::restore_persisted_state;
use photo_sphere_lib::interaction::{PointerEvent, TouchPoint};
use photo_sphere_lib::persistence::{FileStore, KeyValueStore, MemoryStore, PersistedState};
use photo_sphere_lib::rotation::RotationState;
use photo_sphere_lib::tauri_bridge::{
    scene_input_channels, CaptureRequest, SceneInput, SharedCameraFeed,
};

struct Harness {
    app: App,
    input: SceneInput,
    feed: SharedCameraFeed,
    material: Handle<StandardMaterial>,
}

impl Harness {
    fn new(store: impl KeyValueStore + 'static) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.init_resource::<Assets<Image>>();
        app.init_resource::<Assets<StandardMaterial>>();

        let (input, receivers) = scene_input_channels();
        let feed = SharedCameraFeed::default();
        add_sphere_logic(
            &mut app,
            store,
            feed.clone(),
            receivers,
            SphereSettings { sensitivity: 0.01 },
        );

        // Stand-in for setup_scene, which needs a render device
        let material = app
            .world_mut()
            .resource_mut::<Assets<StandardMaterial>>()
            .add(StandardMaterial::default());
        app.insert_resource(SphereMaterial(material.clone()));
        app.world_mut()
            .spawn((Transform::default(), SphereRotation::default(), PhotoSphere));
        app.add_systems(Startup, restore_persisted_state);

        Self {
            app,
            input,
            feed,
            material,
        }
    }

    fn pointer(&self, event: PointerEvent) {
        self.input.pointer.send(event).unwrap();
    }

    fn camera_ready_with(&self, frame: CameraFrame) {
        let mut feed = self.feed.0.lock().unwrap();
        feed.set_status(CameraStatus::Ready {
            width: frame.width(),
            height: frame.height(),
        });
        feed.push_frame(frame);
    }

    fn capture(&self) {
        self.input.capture.send(CaptureRequest).unwrap();
    }

    fn rotation(&mut self) -> RotationState {
        let mut query = self
            .app
            .world_mut()
            .query_filtered::<&SphereRotation, With<PhotoSphere>>();
        query.single(self.app.world()).unwrap().0
    }

    fn transform(&mut self) -> Transform {
        let mut query = self
            .app
            .world_mut()
            .query_filtered::<&Transform, With<PhotoSphere>>();
        *query.single(self.app.world()).unwrap()
    }

    fn stored(&self, suffix: &str) -> Option<String> {
        self.app
            .world()
            .resource::<SphereStore>()
            .store()
            .get(&format!("{KEY_PREFIX}_{suffix}"))
            .unwrap()
    }

    fn texture_pixels(&self) -> Option<(u32, u32, Vec<u8>)> {
        let materials = self.app.world().resource::<Assets<StandardMaterial>>();
        let texture = materials.get(&self.material)?.base_color_texture.clone()?;
        let image = self.app.world().resource::<Assets<Image>>().get(&texture)?;
        Some((image.width(), image.height(), image.data.clone()?))
    }

    fn base_color(&self) -> Color {
        self.app
            .world()
            .resource::<Assets<StandardMaterial>>()
            .get(&self.material)
            .unwrap()
            .base_color
    }

    fn wait_for_restore(&mut self) {
        for _ in 0..500 {
            self.app.update();
            if self.app.world().resource::<PendingTextureDecode>().0.is_none() {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("texture restore did not finish");
    }
}

fn all_pixels(data: &[u8], color: [u8; 4]) -> bool {
    !data.is_empty() && data.chunks(4).all(|p| p == color)
}

fn solid_png(color: [u8; 4]) -> EncodedImage {
    EncodedImage::encode_png(&RgbaImage::from_pixel(6, 4, Rgba(color))).unwrap()
}

fn seeded_store(image: Option<&str>, state: Option<&str>) -> MemoryStore {
    let mut store = MemoryStore::default();
    if let Some(image) = image {
        store.set(&format!("{KEY_PREFIX}_image"), image).unwrap();
    }
    if let Some(state) = state {
        store.set(&format!("{KEY_PREFIX}_state"), state).unwrap();
    }
    store
}

#[test]
fn drag_rotates_the_sphere_and_persists_rotation_only() {
    let mut h = Harness::new(MemoryStore::default());
    h.app.update();

    h.pointer(PointerEvent::Down { x: 100.0, y: 100.0 });
    h.pointer(PointerEvent::Move { x: 125.0, y: 100.0 });
    h.pointer(PointerEvent::Move { x: 150.0, y: 100.0 });
    h.pointer(PointerEvent::Up);
    h.pointer(PointerEvent::Move { x: 400.0, y: 400.0 });
    h.app.update();

    let rotation = h.rotation();
    assert!((rotation.y - 0.5).abs() < 1e-5);
    assert_eq!(rotation.x, 0.0);

    let expected = Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z);
    assert!(h.transform().rotation.abs_diff_eq(expected, 1e-6));

    let state: PersistedState = serde_json::from_str(&h.stored("state").unwrap()).unwrap();
    assert_eq!(state.rotation, Some(rotation));
    assert_eq!(h.stored("image"), None);
}

#[test]
fn two_finger_touch_does_not_rotate() {
    let mut h = Harness::new(MemoryStore::default());
    h.app.update();

    let fingers = |dx: f32| {
        vec![
            TouchPoint { x: 10.0 + dx, y: 10.0 },
            TouchPoint { x: 60.0 + dx, y: 10.0 },
        ]
    };
    h.pointer(PointerEvent::TouchStart {
        touches: fingers(0.0),
    });
    h.pointer(PointerEvent::TouchMove {
        touches: fingers(40.0),
    });
    h.pointer(PointerEvent::TouchEnd);
    h.app.update();

    assert_eq!(h.rotation(), RotationState::default());
    assert_eq!(h.stored("state"), None);
}

#[test]
fn capture_before_camera_is_ready_changes_nothing() {
    let mut h = Harness::new(MemoryStore::default());
    h.app.update();

    h.capture();
    h.app.update();
    assert_eq!(h.texture_pixels(), None);
    assert_eq!(h.stored("image"), None);

    // Metadata known but no frame uploaded yet
    h.feed.0.lock().unwrap().set_status(CameraStatus::Ready {
        width: 1280,
        height: 720,
    });
    h.capture();
    h.app.update();
    assert_eq!(h.texture_pixels(), None);
    assert_eq!(h.stored("image"), None);
}

#[test]
fn drag_then_capture_end_to_end() {
    let mut h = Harness::new(MemoryStore::default());
    h.app.update();

    h.pointer(PointerEvent::Down { x: 0.0, y: 0.0 });
    h.pointer(PointerEvent::Move { x: 50.0, y: 0.0 });
    h.pointer(PointerEvent::Up);
    h.app.update();
    let rotation = h.rotation();
    assert!((rotation.y - 0.5).abs() < 1e-5);
    assert_eq!(rotation.x, 0.0);

    let green = [20, 200, 60, 255];
    h.camera_ready_with(CameraFrame::solid(8, 6, green));
    h.capture();
    h.app.update();

    let (width, height, pixels) = h.texture_pixels().expect("texture applied");
    assert_eq!((width, height), (8, 6));
    assert!(all_pixels(&pixels, green));
    assert_eq!(h.base_color(), Color::WHITE);

    let stored = h.stored("image").expect("image persisted");
    assert!(stored.starts_with("data:image/png;base64,"));
    let decoded = EncodedImage::from_data_url(stored).decode().unwrap();
    assert!(decoded.pixels().all(|p| p.0 == green));

    // Capture does not touch the rotation key
    let state: PersistedState = serde_json::from_str(&h.stored("state").unwrap()).unwrap();
    assert_eq!(state.rotation, Some(rotation));
}

#[test]
fn second_capture_replaces_the_first() {
    let mut h = Harness::new(MemoryStore::default());
    h.app.update();

    h.camera_ready_with(CameraFrame::solid(4, 4, [255, 0, 0, 255]));
    h.capture();
    h.app.update();
    let first = h.stored("image").unwrap();

    h.camera_ready_with(CameraFrame::solid(4, 4, [0, 0, 255, 255]));
    h.capture();
    h.app.update();

    let (_, _, pixels) = h.texture_pixels().unwrap();
    assert!(all_pixels(&pixels, [0, 0, 255, 255]));
    assert_ne!(h.stored("image").unwrap(), first);
    assert_eq!(h.app.world().resource::<Assets<Image>>().len(), 1);
}

#[test]
fn reload_restores_rotation_and_texture() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store");
    let orange = [250, 140, 10, 255];

    let saved = {
        let mut h = Harness::new(FileStore::open(&path, 1 << 20).unwrap());
        h.app.update();
        h.pointer(PointerEvent::Down { x: 0.0, y: 0.0 });
        h.pointer(PointerEvent::Move { x: 33.0, y: -71.0 });
        h.pointer(PointerEvent::Move { x: 1234.5, y: 17.25 });
        h.camera_ready_with(CameraFrame::solid(5, 3, orange));
        h.capture();
        h.app.update();
        h.rotation()
    };

    let mut h = Harness::new(FileStore::open(&path, 1 << 20).unwrap());
    h.wait_for_restore();

    let restored = h.rotation();
    assert_eq!(restored.x.to_bits(), saved.x.to_bits());
    assert_eq!(restored.y.to_bits(), saved.y.to_bits());
    assert_eq!(restored.z.to_bits(), saved.z.to_bits());

    let (width, height, pixels) = h.texture_pixels().expect("texture restored");
    assert_eq!((width, height), (5, 3));
    assert!(all_pixels(&pixels, orange));
}

#[test]
fn corrupt_state_is_removed_and_rotation_stays_default() {
    let image = solid_png([1, 2, 3, 255]);
    let store = seeded_store(Some(image.as_str()), Some("{\"rotation\": {\"x\": oops"));
    let mut h = Harness::new(store);
    h.wait_for_restore();

    assert_eq!(h.rotation(), RotationState::default());
    assert_eq!(h.stored("state"), None);
    assert_eq!(h.stored("image"), None);
    assert_eq!(h.texture_pixels(), None);

    // A second load finds nothing left to discard
    let snapshot = h.app.world_mut().resource_mut::<SphereStore>().load();
    assert_eq!(snapshot.rotation, None);
    assert_eq!(snapshot.image, None);
}

#[test]
fn corrupt_image_is_discarded_but_rotation_restored() {
    let state = r#"{"rotation":{"x":0.25,"y":-1.5,"z":0.0}}"#;
    let store = seeded_store(Some("data:image/png;base64,aGVsbG8="), Some(state));
    let mut h = Harness::new(store);
    h.wait_for_restore();

    assert_eq!(h.rotation(), RotationState::new(0.25, -1.5, 0.0));
    assert_eq!(h.stored("image"), None);
    assert!(h.stored("state").is_some());
    assert_eq!(h.texture_pixels(), None);
}

#[test]
fn restore_is_idempotent() {
    let state = r#"{"rotation":{"x":3.0,"y":2.0,"z":1.0}}"#;
    let image = solid_png([7, 70, 170, 255]);

    let mut results = Vec::new();
    for _ in 0..2 {
        let mut h = Harness::new(seeded_store(Some(image.as_str()), Some(state)));
        h.wait_for_restore();
        results.push((h.rotation(), h.texture_pixels()));
    }
    assert_eq!(results[0], results[1]);
    assert!(results[0].1.is_some());
}

#[test]
fn capture_wins_over_a_pending_restore() {
    let red = solid_png([255, 0, 0, 255]);
    let mut h = Harness::new(seeded_store(Some(red.as_str()), None));

    let blue = [0, 0, 255, 255];
    h.camera_ready_with(CameraFrame::solid(4, 4, blue));
    h.capture();
    h.wait_for_restore();
    for _ in 0..5 {
        h.app.update();
    }

    let (_, _, pixels) = h.texture_pixels().unwrap();
    assert!(all_pixels(&pixels, blue));
}

#[test]
fn camera_failure_tints_the_sphere() {
    let mut h = Harness::new(MemoryStore::default());
    h.app.update();

    h.feed.0.lock().unwrap().set_status(CameraStatus::Failed {
        reason: "NotAllowedError: Permission denied".into(),
    });
    h.app.update();
    assert_eq!(h.base_color(), CAMERA_ERROR_COLOR);

    h.capture();
    h.app.update();
    assert_eq!(h.texture_pixels(), None);
    assert_eq!(h.stored("image"), None);
}

#[test]
fn camera_failure_tint_survives_a_texture_restore() {
    let image = solid_png([10, 120, 30, 255]);
    let mut h = Harness::new(seeded_store(Some(image.as_str()), None));
    h.feed.0.lock().unwrap().set_status(CameraStatus::Failed {
        reason: "NotFoundError: Requested device not found".into(),
    });

    h.wait_for_restore();
    h.app.update();
    assert!(h.texture_pixels().is_some());
    assert_eq!(h.base_color(), CAMERA_ERROR_COLOR);

    // Recovery shows the restored photo untinted
    h.camera_ready_with(CameraFrame::solid(2, 2, [0, 0, 0, 255]));
    h.app.update();
    assert_eq!(h.base_color(), Color::WHITE);
}

#[test]
fn drag_writes_leave_the_stored_image_file_alone() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("store");
    let image_key = format!("{KEY_PREFIX}_image");
    let image = solid_png([40, 40, 200, 255]);

    let mut store = FileStore::open(&root, QUOTA_BYTES).unwrap();
    store.set(&image_key, image.as_str()).unwrap();
    let mut h = Harness::new(store);
    h.wait_for_restore();

    // Any rewrite of the image file would clobber this marker
    std::fs::write(root.join(&image_key), "marker").unwrap();

    h.pointer(PointerEvent::Down { x: 0.0, y: 0.0 });
    for step in 1..=60 {
        h.pointer(PointerEvent::Move {
            x: step as f32,
            y: 0.0,
        });
    }
    h.pointer(PointerEvent::Up);
    h.app.update();

    assert_eq!(
        std::fs::read_to_string(root.join(&image_key)).unwrap(),
        "marker"
    );
    let state: PersistedState = serde_json::from_str(
        &std::fs::read_to_string(root.join(format!("{KEY_PREFIX}_state"))).unwrap(),
    )
    .unwrap();
    assert_eq!(state.rotation, Some(h.rotation()));
}
