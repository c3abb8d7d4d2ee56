//! Frame extraction system
//!
//! This module handles extracting rendered frames from the GPU and
//! preparing them for transfer to the Tauri frontend.

use bevy::{log::debug, prelude::*, render::renderer::RenderDevice};

use crate::config::{RENDER_HEIGHT, RENDER_WIDTH};
use crate::bevy::resources::{
    FrameBufferRes, FrameCount, FrameRateLimiter, MainWorldReceiver, PreRollFrames,
};

/// Publish the newest rendered frame to the shared frame buffer
pub fn extract_frame(
    receiver: Res<MainWorldReceiver>,
    buffer: Option<Res<FrameBufferRes>>,
    mut count: ResMut<FrameCount>,
    mut pre_roll: ResMut<PreRollFrames>,
    mut frame_limiter: ResMut<FrameRateLimiter>,
) {
    let Some(b) = buffer else { return };

    // Wait for scene to be fully rendered
    if pre_roll.0 > 0 {
        while receiver.try_recv().is_ok() {}
        pre_roll.0 -= 1;
        if pre_roll.0 % 10 == 0 && pre_roll.0 > 0 {
            debug!("[Frames] Pre-roll frames remaining: {}", pre_roll.0);
        }
        return;
    }

    // Frame rate limiting - skip if not enough time has passed
    let now = std::time::Instant::now();
    let elapsed = now.duration_since(frame_limiter.last_frame_time);
    if elapsed < frame_limiter.min_frame_interval {
        // Drain the receiver but don't process - too early for next frame
        while receiver.try_recv().is_ok() {}
        return;
    }
    frame_limiter.last_frame_time = now;

    // Keep only the latest frame from the render world
    let mut image_data = Vec::new();
    while let Ok(data) = receiver.try_recv() {
        image_data = data;
    }

    let Some(rgba) = remove_row_padding(&image_data, RENDER_WIDTH, RENDER_HEIGHT) else {
        return;
    };

    if let Ok(mut guard) = b.0 .0.lock() {
        *guard = Some(rgba);
        count.0 += 1;
        if count.0 == 1 {
            debug!("[Frames] First frame published");
        }
    };
}

/// Remove GPU buffer row padding alignment, returning pure RGBA data
pub fn remove_row_padding(data: &[u8], width: u32, height: u32) -> Option<Vec<u8>> {
    if data.is_empty() {
        return None;
    }

    let row_bytes = width as usize * 4;
    let aligned_row_bytes = RenderDevice::align_copy_bytes_per_row(row_bytes);

    let rgba_data: Vec<u8> = if row_bytes == aligned_row_bytes {
        data.to_vec()
    } else {
        data.chunks(aligned_row_bytes)
            .take(height as usize)
            .flat_map(|row| &row[..row_bytes.min(row.len())])
            .copied()
            .collect()
    };

    (rgba_data.len() == row_bytes * height as usize).then_some(rgba_data)
}
