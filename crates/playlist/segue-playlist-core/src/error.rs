//! Error types for the playlist core

use serde::{Deserialize, Serialize};

/// Errors surfaced by the playlist core.
///
/// Only clip lookups against the animation mixer are fatal. Everything else
/// (missing audio, out-of-state calls, odd frame deltas) degrades silently.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PlaylistError {
    /// Animation index is not an input of the animation mixer
    #[error("Invalid clip index: {index} (mixer has {input_count} inputs)")]
    InvalidClipIndex { index: usize, input_count: usize },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl PlaylistError {
    /// Get error category for logging/metrics
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidClipIndex { .. } => "clip",
            Self::SerializationError { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for PlaylistError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            reason: err.to_string(),
        }
    }
}
