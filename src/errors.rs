// ABOUTME: Unified error taxonomy for the bridge with HTTP status mapping
// ABOUTME: Separates fatal configuration/creation failures from swallowed provider query errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Error Handling
//!
//! Every fallible operation in the crate returns [`BridgeResult`]. The variants
//! split along the propagation policy of the reconciliation protocol:
//! configuration and subscription-creation failures must halt the caller's
//! startup sequence, while provider list/delete failures are logged and
//! swallowed by the reconciler itself. A webhook handshake mismatch is not an
//! error at all; it is the designed rejection path and lives in
//! [`crate::webhooks::verification::ChallengeOutcome`].

use thiserror::Error;

/// Result alias used throughout the crate
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Unified error type for the Strava bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A deployment precondition is not met (missing callback host or
    /// credentials). Fatal: raised before any network call is attempted.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A provider list/delete call failed or returned a malformed body.
    /// Non-fatal for reconciliation: the reconciler logs and continues.
    #[error("provider query failed: {0}")]
    ProviderQuery(String),

    /// The subscription creation call did not return 201 with an id.
    /// Fatal: the provider has no record of our callback URL.
    #[error("subscription creation failed: {0}")]
    ProviderCreation(String),

    /// Settings or record store failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP transport failure talking to Strava
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
}

impl BridgeError {
    /// Get the HTTP status code to surface when this error escapes a route handler
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            // 500 Internal Server Error
            Self::Configuration(_) | Self::Database(_) => 500,

            // 502 Bad Gateway - the upstream provider misbehaved
            Self::ProviderQuery(_) | Self::ProviderCreation(_) | Self::Http(_) => 502,
        }
    }
}
