//! Camera frames and the capture-to-texture encoding step
//!
//! The webview owns the live camera stream and uploads frames; this module
//! keeps the latest one, enforces the "metadata known" precondition, and
//! turns a frame into a self-describing PNG data URL plus the raster used
//! for the sphere texture.

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{codecs::png::PngEncoder, ImageEncoder, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{CaptureError, DecodeError};

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

// =============================================================================
// Camera Stream
// =============================================================================

/// Readiness of the webview camera stream
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum CameraStatus {
    /// Stream requested, dimensions not yet known
    #[default]
    Pending,
    /// Metadata loaded; frames can be captured
    Ready { width: u32, height: u32 },
    /// Permission denied or no camera present
    Failed { reason: String },
}

/// One RGBA8 camera frame at its native resolution
#[derive(Clone, Debug, PartialEq)]
pub struct CameraFrame {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl CameraFrame {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, CaptureError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(CaptureError::FrameSizeMismatch {
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self { width, height, rgba })
    }

    /// Decode an uploaded JPEG/PNG frame.
    pub fn from_encoded(bytes: &[u8]) -> Result<Self, DecodeError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        Ok(Self {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        })
    }

    /// A frame filled with one color
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let rgba = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self { width, height, rgba }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn into_raster(self) -> RgbaImage {
        // Length is checked on construction.
        RgbaImage::from_raw(self.width, self.height, self.rgba)
            .unwrap_or_else(|| RgbaImage::new(0, 0))
    }
}

/// Latest state of the camera stream as seen by the Rust side
#[derive(Clone, Debug, Default)]
pub struct CameraFeed {
    status: CameraStatus,
    latest: Option<CameraFrame>,
}

impl CameraFeed {
    pub fn status(&self) -> &CameraStatus {
        &self.status
    }

    pub fn set_status(&mut self, status: CameraStatus) {
        if !matches!(status, CameraStatus::Ready { .. }) {
            self.latest = None;
        }
        self.status = status;
    }

    /// Replace the latest frame; older frames are dropped.
    pub fn push_frame(&mut self, frame: CameraFrame) {
        self.latest = Some(frame);
    }

    /// Copy of the current frame, if the stream is ready to be captured.
    pub fn snapshot(&self) -> Result<CameraFrame, CaptureError> {
        match &self.status {
            CameraStatus::Failed { reason } => Err(CaptureError::CameraUnavailable(reason.clone())),
            CameraStatus::Pending => Err(CaptureError::NotReady),
            CameraStatus::Ready { .. } => self.latest.clone().ok_or(CaptureError::NotReady),
        }
    }
}

// =============================================================================
// Encoded Images
// =============================================================================

/// Self-describing encoded image (`data:image/png;base64,...`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage(String);

impl EncodedImage {
    /// Wrap a stored value without validating it; decoding reports corruption.
    pub fn from_data_url(data_url: impl Into<String>) -> Self {
        Self(data_url.into())
    }

    /// Encode a raster as a PNG data URL.
    pub fn encode_png(raster: &RgbaImage) -> Result<Self, CaptureError> {
        let mut png = Vec::new();
        PngEncoder::new(&mut png).write_image(
            raster.as_raw(),
            raster.width(),
            raster.height(),
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(Self(format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(png))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode back into RGBA pixels.
    pub fn decode(&self) -> Result<RgbaImage, DecodeError> {
        let rest = self.0.strip_prefix("data:").ok_or(DecodeError::NotDataUrl)?;
        let (header, payload) = rest.split_once(',').ok_or(DecodeError::NotDataUrl)?;
        if !header.ends_with(";base64") {
            return Err(DecodeError::UnsupportedEncoding(header.to_string()));
        }
        let bytes = STANDARD.decode(payload.trim())?;
        Ok(image::load_from_memory(&bytes)?.to_rgba8())
    }
}

/// Result of a successful capture
pub struct CapturedImage {
    pub encoded: EncodedImage,
    pub raster: RgbaImage,
}

/// Snapshot the latest frame and encode it.
///
/// Fails without side effects when the stream is not ready.
pub fn capture_frame(feed: &CameraFeed) -> Result<CapturedImage, CaptureError> {
    let raster = feed.snapshot()?.into_raster();
    let encoded = EncodedImage::encode_png(&raster)?;
    Ok(CapturedImage { encoded, raster })
}
