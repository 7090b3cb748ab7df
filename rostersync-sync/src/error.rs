//! Error types for rostersync-sync.

use serde::Serialize;
use thiserror::Error;

use rostersync_core::ConfigError;

/// Errors that abort a run.
///
/// Only configuration problems qualify: they are detected before the first
/// directory search or API request. Everything that can go wrong after that
/// point is recovered and lands in the run report instead.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// A failed call against the contacts API.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemoteError {
    /// Connection, TLS, DNS or timeout failure; no HTTP status was received.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The server answered with a non-success status.
    #[error("HTTP {code}: {reason}")]
    Status { code: u16, reason: String },

    /// The response body did not match the expected JSON shape.
    #[error("decode error: {message}")]
    Decode { message: String },
}
