//! Error types for the photo sphere.

use thiserror::Error;

/// Failures of the persistent key-value store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The write would push the store past its capacity.
    #[error("storage quota exceeded: {required} bytes needed, {quota} allowed")]
    QuotaExceeded { required: usize, quota: usize },

    /// The key cannot be used as a file name.
    #[error("invalid store key: {0:?}")]
    InvalidKey(String),

    /// I/O error on the backing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reasons a capture request did not produce a texture.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The camera stream has not reported its frame dimensions yet.
    #[error("camera stream not ready")]
    NotReady,

    /// The camera could not be opened.
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    /// Pixel buffer does not match the declared frame size.
    #[error("frame size mismatch: expected {expected} bytes, got {actual}")]
    FrameSizeMismatch { expected: usize, actual: usize },

    /// Encoding the frame failed.
    #[error("encode error: {0}")]
    Encode(#[from] image::ImageError),
}

/// Failures turning an encoded image back into pixels.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("not a data URL")]
    NotDataUrl,

    #[error("unsupported data URL encoding '{0}'")]
    UnsupportedEncoding(String),

    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
