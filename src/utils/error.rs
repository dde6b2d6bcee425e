//! Error types for StreamView
//!
//! This module defines custom error types used throughout the application.
//! We use thiserror for convenient error type definitions and anyhow for
//! application-level error handling.

use thiserror::Error;

/// Main error type for StreamView
#[derive(Error, Debug)]
pub enum StreamViewError {
    /// Media engine errors (pipeline construction, state changes, queries)
    #[error("Engine error: {0}")]
    Engine(String),

    /// Input address/path classification errors
    #[error("Source error: {0}")]
    Source(String),

    /// Snapshot capture or encoding errors
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File error: {0}")]
    FileIO(#[from] std::io::Error),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error for unexpected situations
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<gstreamer::glib::Error> for StreamViewError {
    fn from(err: gstreamer::glib::Error) -> Self {
        StreamViewError::Engine(format!("GStreamer error: {}", err))
    }
}

impl From<gstreamer::glib::BoolError> for StreamViewError {
    fn from(err: gstreamer::glib::BoolError) -> Self {
        StreamViewError::Engine(format!("GStreamer error: {}", err))
    }
}

impl From<gstreamer::StateChangeError> for StreamViewError {
    fn from(err: gstreamer::StateChangeError) -> Self {
        StreamViewError::Engine(format!("State change failed: {}", err))
    }
}

/// Convenience type alias for Results in StreamView
pub type Result<T> = std::result::Result<T, StreamViewError>;

/// Extension trait for converting other errors to StreamViewError
pub trait IntoPlayerError<T> {
    /// Convert this error into a StreamViewError with the given context
    fn engine_err(self, context: &str) -> Result<T>;
    fn source_err(self, context: &str) -> Result<T>;
    fn snapshot_err(self, context: &str) -> Result<T>;
    fn config_err(self, context: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> IntoPlayerError<T> for std::result::Result<T, E> {
    fn engine_err(self, context: &str) -> Result<T> {
        self.map_err(|e| StreamViewError::Engine(format!("{}: {}", context, e)))
    }

    fn source_err(self, context: &str) -> Result<T> {
        self.map_err(|e| StreamViewError::Source(format!("{}: {}", context, e)))
    }

    fn snapshot_err(self, context: &str) -> Result<T> {
        self.map_err(|e| StreamViewError::Snapshot(format!("{}: {}", context, e)))
    }

    fn config_err(self, context: &str) -> Result<T> {
        self.map_err(|e| StreamViewError::Config(format!("{}: {}", context, e)))
    }
}
