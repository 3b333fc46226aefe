//! Error handling for the TraceVis-RS application
//!
//! This module defines custom error types and a Result alias for use
//! throughout the application.

use thiserror::Error;

/// Main error type for TraceVis-RS operations
#[derive(Error, Debug)]
pub enum TraceVisError {
    /// Errors related to loading a trace file
    #[error("Load error: {0}")]
    Load(String),

    /// Errors related to trace session decoding
    #[error("Session error: {0}")]
    Session(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to channel communication
    #[error("Channel error: {0}")]
    Channel(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<TraceVisError>,
    },
}

impl TraceVisError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        TraceVisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a session error from a serde_json error
    pub fn from_json_error(err: serde_json::Error) -> Self {
        TraceVisError::Session(err.to_string())
    }
}

/// Result type alias for TraceVis-RS operations
pub type Result<T> = std::result::Result<T, TraceVisError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, serde_json::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| TraceVisError::from_json_error(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| TraceVisError::from_json_error(e).with_context(f()))
    }
}
