//! Error types for the Raceline environment abstraction.

use thiserror::Error;

/// Errors that can occur while talking to the host.
///
/// None of these are fatal to the frame pipeline; host adapters report them
/// and the frame is skipped.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The host has not finished initializing (no car, camera or canvas yet)
    #[error("Host not ready: {0}")]
    NotReady(String),

    /// A host value was present but not finite
    #[error("Invalid host value: {0}")]
    InvalidValue(String),
}

impl EnvError {
    /// Creates a not-ready error.
    pub fn not_ready(what: impl Into<String>) -> Self {
        Self::NotReady(what.into())
    }

    /// Creates an invalid-value error.
    pub fn invalid(what: impl std::fmt::Display) -> Self {
        Self::InvalidValue(what.to_string())
    }
}
