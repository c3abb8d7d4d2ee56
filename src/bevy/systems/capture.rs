//! Capture-to-texture system
//!
//! Turns a capture request into a new sphere texture and a persisted image.
//! Requests made before the camera reports its frame size are logged and
//! dropped.

use bevy::{
    asset::RenderAssetUsages,
    log::{error, info, warn},
    prelude::*,
    render::render_resource::{Extent3d, TextureDimension, TextureFormat},
};
use image::RgbaImage;

use crate::capture::{capture_frame, CameraStatus};
use crate::bevy::resources::{
    CameraFeedRes, CaptureRequestReceiver, PendingTextureDecode, SphereMaterial, SphereStore,
};
use crate::bevy::systems::scene::UNTEXTURED_COLOR;

/// Tint shown on the sphere while the camera is unavailable
pub const CAMERA_ERROR_COLOR: Color = Color::srgb(0.75, 0.15, 0.15);

/// Build a texture from `raster` and make it the material's only texture.
///
/// The previous texture asset, if any, is removed.
pub fn apply_texture(
    raster: RgbaImage,
    material: &Handle<StandardMaterial>,
    images: &mut Assets<Image>,
    materials: &mut Assets<StandardMaterial>,
) -> Option<Handle<Image>> {
    let Some(sphere_material) = materials.get_mut(material) else {
        warn!("[Capture] Sphere material missing; texture not applied");
        return None;
    };

    let size = Extent3d {
        width: raster.width(),
        height: raster.height(),
        depth_or_array_layers: 1,
    };
    let texture = images.add(Image::new(
        size,
        TextureDimension::D2,
        raster.into_raw(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    ));

    let previous = sphere_material.base_color_texture.replace(texture.clone());
    sphere_material.base_color = Color::WHITE;
    if let Some(previous) = previous {
        images.remove(&previous);
    }
    Some(texture)
}

/// Handle queued capture requests
pub fn capture_camera_frame(
    requests: Option<Res<CaptureRequestReceiver>>,
    feed: Option<Res<CameraFeedRes>>,
    material: Option<Res<SphereMaterial>>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut store: ResMut<SphereStore>,
    mut pending: ResMut<PendingTextureDecode>,
) {
    let (Some(requests), Some(feed)) = (requests, feed) else {
        return;
    };

    for _ in requests.try_iter() {
        let captured = {
            let Ok(guard) = feed.0 .0.lock() else {
                error!("[Capture] Camera feed lock poisoned");
                return;
            };
            capture_frame(&guard)
        };

        let captured = match captured {
            Ok(captured) => captured,
            Err(e) => {
                info!("[Capture] Ignored capture request: {}", e);
                continue;
            }
        };

        let Some(material) = material.as_deref() else {
            warn!("[Capture] Scene not ready; capture dropped");
            continue;
        };

        // A newer capture wins over a restore that has not finished yet
        if pending.0.take().is_some() {
            info!("[Capture] Cancelled pending texture restore");
        }

        let (width, height) = captured.raster.dimensions();
        apply_texture(captured.raster, &material.0, &mut images, &mut materials);
        store.persist_capture(&captured.encoded);
        info!("[Capture] Applied {}x{} capture to sphere", width, height);
    }
}

/// Show a visual error state on the sphere when the camera fails
///
/// The tint is held for as long as the camera stays failed, including over
/// a texture restored after the failure was reported.
pub fn reflect_camera_status(
    feed: Option<Res<CameraFeedRes>>,
    material: Option<Res<SphereMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut showing_error: Local<bool>,
) {
    let (Some(feed), Some(material)) = (feed, material) else {
        return;
    };
    let failure = match feed.0 .0.lock() {
        Ok(guard) => match guard.status() {
            CameraStatus::Failed { reason } => Some(reason.clone()),
            _ => None,
        },
        Err(_) => return,
    };

    match failure {
        Some(reason) => {
            if !*showing_error {
                error!("[Capture] Camera unavailable: {}", reason);
                *showing_error = true;
            }
            // Read first so the material is only marked changed when needed
            let tinted = materials
                .get(&material.0)
                .is_some_and(|m| m.base_color == CAMERA_ERROR_COLOR);
            if !tinted {
                if let Some(sphere_material) = materials.get_mut(&material.0) {
                    sphere_material.base_color = CAMERA_ERROR_COLOR;
                }
            }
        }
        None if *showing_error => {
            if let Some(sphere_material) = materials.get_mut(&material.0) {
                sphere_material.base_color = if sphere_material.base_color_texture.is_some() {
                    Color::WHITE
                } else {
                    UNTEXTURED_COLOR
                };
            }
            *showing_error = false;
        }
        None => {}
    }
}
