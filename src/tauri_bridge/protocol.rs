//! Custom protocol handlers for efficient data transfer
//!
//! `frame://` serves rendered frames as binary, bypassing Tauri's IPC JSON
//! serialization. `camera://` receives camera frames uploaded by the
//! webview.

use bevy::log::{debug, warn};
use image::{codecs::jpeg::JpegEncoder, ImageBuffer, ImageEncoder, Rgba};
use tauri::http::{Method, Request, Response as HttpResponse};

use super::shared_state::{SharedCameraFeed, SharedFrameBuffer};
use crate::capture::CameraFrame;
use crate::config::{compression::JPEG_QUALITY, RENDER_HEIGHT, RENDER_WIDTH};

type Response = HttpResponse<Vec<u8>>;

/// Handle requests to the custom `frame://` protocol
///
/// Supported endpoints:
/// - `frame` or `frame.jpg`: JPEG-compressed frame (~50-100KB)
/// - `frame.raw`: Raw RGBA frame (~1.8MB)
pub fn handle_frame_protocol(uri_path: &str, buffer: &SharedFrameBuffer) -> Response {
    let resource = uri_path.trim_start_matches('/');

    match resource {
        "frame" | "frame.jpg" => handle_jpeg_frame(buffer),
        "frame.raw" => handle_raw_frame(buffer),
        _ => plain(404, "Not Found"),
    }
}

/// Handle requests to the custom `camera://` protocol
///
/// - `POST frame`: body is one encoded (JPEG/PNG) camera frame
pub fn handle_camera_protocol(request: &Request<Vec<u8>>, feed: &SharedCameraFeed) -> Response {
    let resource = request.uri().path().trim_start_matches('/');
    if resource != "frame" {
        return plain(404, "Not Found");
    }
    if *request.method() == Method::OPTIONS {
        return with_cors(
            HttpResponse::builder()
                .status(204)
                .header("Access-Control-Allow-Methods", "POST")
                .header("Access-Control-Allow-Headers", "Content-Type"),
            Vec::new(),
        );
    }
    if *request.method() != Method::POST {
        return plain(405, "Method Not Allowed");
    }

    let frame = match CameraFrame::from_encoded(request.body()) {
        Ok(frame) => frame,
        Err(e) => {
            warn!("[Protocol] Rejected camera frame: {}", e);
            return plain(400, "Bad Frame");
        }
    };

    let Ok(mut guard) = feed.0.lock() else {
        return plain(500, "Camera feed unavailable");
    };
    debug!(
        "[Protocol] Camera frame {}x{}",
        frame.width(),
        frame.height()
    );
    guard.push_frame(frame);
    with_cors(HttpResponse::builder().status(204), Vec::new())
}

/// Handle JPEG-compressed frame request
fn handle_jpeg_frame(buffer: &SharedFrameBuffer) -> Response {
    let Some(rgba_data) = latest_frame(buffer) else {
        return plain(503, "Frame not ready");
    };

    let Some(img) =
        ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(RENDER_WIDTH, RENDER_HEIGHT, rgba_data)
    else {
        return plain(500, "Frame has unexpected size");
    };

    // Convert RGBA to RGB for JPEG (no alpha channel)
    let rgb_img = image::DynamicImage::ImageRgba8(img).to_rgb8();

    let mut jpeg_data = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut jpeg_data, JPEG_QUALITY);
    if let Err(e) = encoder.write_image(
        rgb_img.as_raw(),
        RENDER_WIDTH,
        RENDER_HEIGHT,
        image::ExtendedColorType::Rgb8,
    ) {
        warn!("[Protocol] JPEG encoding failed: {}", e);
        return plain(500, "Encoding failed");
    }

    with_cors(
        frame_headers(HttpResponse::builder().header("Content-Type", "image/jpeg")),
        jpeg_data,
    )
}

/// Handle raw RGBA frame request
fn handle_raw_frame(buffer: &SharedFrameBuffer) -> Response {
    match latest_frame(buffer) {
        Some(rgba_data) => with_cors(
            frame_headers(
                HttpResponse::builder().header("Content-Type", "application/octet-stream"),
            ),
            rgba_data,
        ),
        None => plain(503, "Frame not ready"),
    }
}

fn latest_frame(buffer: &SharedFrameBuffer) -> Option<Vec<u8>> {
    buffer.0.lock().ok().and_then(|guard| guard.clone())
}

fn frame_headers(builder: tauri::http::response::Builder) -> tauri::http::response::Builder {
    builder
        .status(200)
        .header("X-Frame-Width", RENDER_WIDTH.to_string())
        .header("X-Frame-Height", RENDER_HEIGHT.to_string())
        .header(
            "Access-Control-Expose-Headers",
            "X-Frame-Width, X-Frame-Height",
        )
}

fn with_cors(builder: tauri::http::response::Builder, body: Vec<u8>) -> Response {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .body(body)
        .unwrap_or_else(|e| {
            warn!("[Protocol] Invalid response: {}", e);
            HttpResponse::new(Vec::new())
        })
}

fn plain(status: u16, message: &str) -> Response {
    with_cors(
        HttpResponse::builder()
            .status(status)
            .header("Content-Type", "text/plain"),
        message.as_bytes().to_vec(),
    )
}
