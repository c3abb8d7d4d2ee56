//! Startup restore of the persisted snapshot
//!
//! Runs once, chained after scene setup so the sphere and its material
//! exist. Rotation is applied immediately; the image is decoded on the
//! async compute pool and applied when the task finishes.

use bevy::{
    log::{info, warn},
    prelude::*,
    tasks::{block_on, futures_lite::future, AsyncComputeTaskPool},
};

use crate::bevy::components::{PhotoSphere, SphereRotation};
use crate::bevy::resources::{PendingTextureDecode, SphereMaterial, SphereStore};
use crate::bevy::systems::capture::apply_texture;

/// Read the store once and start restoring rotation and texture
pub fn restore_persisted_state(
    mut store: ResMut<SphereStore>,
    mut pending: ResMut<PendingTextureDecode>,
    mut spheres: Query<&mut SphereRotation, With<PhotoSphere>>,
) {
    let snapshot = store.load();

    if let Some(rotation) = snapshot.rotation {
        for mut sphere_rotation in spheres.iter_mut() {
            sphere_rotation.0 = rotation;
        }
        info!("[Restore] Rotation restored: {:?}", rotation);
    }

    if let Some(image) = snapshot.image {
        let task = AsyncComputeTaskPool::get().spawn(async move { image.decode() });
        pending.0 = Some(task);
        info!("[Restore] Decoding persisted image...");
    }
}

/// Apply the decoded texture, or delete the stored image if it was corrupt
pub fn finish_texture_restore(
    mut pending: ResMut<PendingTextureDecode>,
    material: Option<Res<SphereMaterial>>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut store: ResMut<SphereStore>,
) {
    let Some(task) = pending.0.as_mut() else {
        return;
    };
    let Some(result) = block_on(future::poll_once(task)) else {
        return;
    };
    pending.0 = None;

    match result {
        Ok(raster) => {
            let Some(material) = material else {
                warn!("[Restore] Sphere material missing; persisted image not applied");
                return;
            };
            let (width, height) = raster.dimensions();
            apply_texture(raster, &material.0, &mut images, &mut materials);
            info!("[Restore] Texture restored ({}x{})", width, height);
        }
        Err(e) => {
            warn!("[Restore] Persisted image is corrupt, removing it: {}", e);
            store.discard_image();
        }
    }
}
