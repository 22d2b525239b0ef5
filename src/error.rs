/**
 * ============================================================================
 * TELEMETRY ERROR MODULE
 * ============================================================================
 *
 * PURPOSE: Typed error taxonomy for the telemetry pipeline
 *
 * CATEGORIES:
 * - InvalidArgument: malformed caller input, surfaces synchronously, never retried
 * - InvalidNavigation: illegal transition edge or missing contextual option
 * - UnresolvedDepth: (from, to) pair absent from the navigation depth table
 * - Network: transport failures, confined to the dispatcher boundary
 * - Storage / Serialization: config and queue snapshot persistence
 *
 * ============================================================================
 */

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid navigation from '{from}' to '{to}': {reason}")]
    InvalidNavigation {
        from: String,
        to: String,
        reason: String,
    },

    #[error("no navigation depth recorded for '{from}' -> '{to}'")]
    UnresolvedDepth { from: String, to: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TelemetryError {
    fn from(e: serde_json::Error) -> Self {
        TelemetryError::Serialization(e.to_string())
    }
}

impl TelemetryError {
    /**
     * True for errors that reach feature code through the public surface
     * Network errors never do; the dispatcher swallows them
     */
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            TelemetryError::InvalidArgument(_)
                | TelemetryError::InvalidNavigation { .. }
                | TelemetryError::UnresolvedDepth { .. }
        )
    }
}
