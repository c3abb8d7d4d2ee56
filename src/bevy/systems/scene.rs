//! Scene setup system
//!
//! This module handles the initial setup of the 3D scene: the offscreen
//! camera, the photo sphere with its single material, and lights.

use bevy::{
    asset::Assets,
    camera::RenderTarget,
    core_pipeline::tonemapping::Tonemapping,
    image::Image,
    log::info,
    math::{primitives::Sphere, EulerRot, Quat, Vec3},
    pbr::{MeshMaterial3d, StandardMaterial},
    prelude::*,
    render::{
        render_resource::{Extent3d, TextureFormat, TextureUsages},
        renderer::RenderDevice,
    },
};

use crate::config::{scene::*, RENDER_HEIGHT, RENDER_WIDTH};
use crate::bevy::components::{OffscreenCamera, PhotoSphere, SphereRotation};
use crate::bevy::plugins::image_copy::ImageCopier;
use crate::bevy::resources::{RenderTargetHandle, SphereMaterial};

/// Base color of the sphere before anything was captured
pub const UNTEXTURED_COLOR: Color = Color::srgb(0.55, 0.6, 0.68);

/// Setup the 3D scene with camera, sphere, and lights
pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    render_device: Res<RenderDevice>,
) {
    info!("[Scene] Setting up scene...");

    let size = Extent3d {
        width: RENDER_WIDTH,
        height: RENDER_HEIGHT,
        depth_or_array_layers: 1,
    };

    // Create render target texture
    let mut render_target_image =
        Image::new_target_texture(size.width, size.height, TextureFormat::bevy_default());
    render_target_image.texture_descriptor.usage |= TextureUsages::COPY_SRC;
    let render_target_image_handle = images.add(render_target_image);

    commands.insert_resource(RenderTargetHandle(render_target_image_handle.clone()));

    // Spawn image copier for GPU-to-CPU transfer
    commands.spawn(ImageCopier::new(
        render_target_image_handle.clone(),
        size,
        &render_device,
    ));

    commands.spawn((
        Camera3d::default(),
        Camera {
            target: RenderTarget::Image(render_target_image_handle.into()),
            clear_color: ClearColorConfig::Custom(Color::srgb(0.05, 0.08, 0.12)),
            ..default()
        },
        Tonemapping::None,
        Transform::from_xyz(0.0, 0.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
        OffscreenCamera,
    ));

    let material = materials.add(StandardMaterial {
        base_color: UNTEXTURED_COLOR,
        perceptual_roughness: 0.8,
        ..default()
    });
    commands.insert_resource(SphereMaterial(material.clone()));

    commands.spawn((
        Mesh3d(meshes.add(
            Sphere::new(SPHERE_RADIUS)
                .mesh()
                .uv(SPHERE_SECTORS, SPHERE_STACKS),
        )),
        MeshMaterial3d(material),
        Transform::default(),
        SphereRotation::default(),
        PhotoSphere,
    ));

    // Key light from the viewer's side so the photo reads clearly
    commands.spawn((
        DirectionalLight {
            illuminance: 6000.0,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.3, 0.3, 0.0)),
    ));

    // Fill light
    commands.spawn((
        PointLight {
            intensity: 800_000.0,
            color: Color::srgb(0.85, 0.9, 1.0),
            ..default()
        },
        Transform::from_xyz(-3.0, 2.0, 4.0),
    ));

    info!("[Scene] Scene setup complete!");
}

/// Mirror the sphere's cumulative angles into its transform
pub fn apply_sphere_rotation(
    mut spheres: Query<(&SphereRotation, &mut Transform), Changed<SphereRotation>>,
) {
    for (rotation, mut transform) in spheres.iter_mut() {
        transform.rotation = rotation.to_quat();
    }
}
