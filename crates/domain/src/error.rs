//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`AirHubError`] via `#[from]`. Network-layer failures never escape the
//! ingestor/gateway boundary as panics; they become typed outcomes or
//! status fields consumed by callers.

use thiserror::Error;

/// Top-level error for the airhub workspace.
#[derive(Debug, Error)]
pub enum AirHubError {
    /// A referenced device or resource does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The remote control plane rejected or failed a command.
    #[error(transparent)]
    ControlPlane(#[from] ControlPlaneError),

    /// The streaming transport could not be established.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A lookup failed for a known resource category.
#[derive(Debug, Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    /// Resource category (e.g. `"Device"`).
    pub entity: &'static str,
    /// The identifier that failed to resolve.
    pub id: String,
}

/// A control-plane request failed.
///
/// Carries the HTTP status when the server answered, `None` when the
/// request never completed (connect failure, timeout, …).
#[derive(Debug, Error)]
#[error("control plane request failed: {message}")]
pub struct ControlPlaneError {
    pub status: Option<u16>,
    pub message: String,
}

/// The streaming transport failed to open or aborted.
#[derive(Debug, Error)]
#[error("transport error: {message}")]
pub struct TransportError {
    pub message: String,
}
