//! Error types for wolfreel
//!
//! This module defines the main error type used throughout the crate and the
//! `Result` alias the rest of the code propagates with `?`.

use thiserror::Error;

/// Result type alias for wolfreel operations
pub type Result<T> = std::result::Result<T, WolfreelError>;

/// Main error type for wolfreel
#[derive(Error, Debug)]
pub enum WolfreelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load replay: {0}")]
    Load(String),

    #[error("Replay source reported an error: {0}")]
    SourceReported(String),

    #[error("No replay loaded")]
    NoReplay,

    #[error("Invalid speed multiplier: {0}")]
    InvalidSpeed(f64),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WolfreelError {
    /// Create a Load error from any displayable message
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Create a Render error from any displayable message
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Create a Config error from any displayable message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
