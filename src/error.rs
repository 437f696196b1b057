//! Error types

use thiserror::Error;

/// Malformed or mismatched pixel buffers.
///
/// Frame dimensions are fixed when the estimator is built, so any of these
/// reaching the capture loop is a configuration error and stops it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame has {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferLength {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("frame is {actual_width}x{actual_height}, estimator expects {width}x{height}")]
    Dimensions {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error("frame dimensions must be non-zero")]
    Empty,
}

/// Frame source failures
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("camera unavailable: {0}")]
    Unavailable(String),
    #[error("camera access denied")]
    Denied,
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("capture thread panicked")]
    Panicked,
    #[error("failed to spawn capture thread")]
    Spawn(#[source] std::io::Error),
}

/// Tuning load/validation failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning JSON")]
    Json(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}
