// ABOUTME: Webhook subscription protocol module
// ABOUTME: Hosts the verification handshake and the subscription reconciler
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Strava push-subscription management.
//!
//! Two tightly coupled pieces:
//! - [`verification`] derives the shared verify token and answers Strava's
//!   challenge handshake.
//! - [`reconciler`] ensures exactly one subscription exists between this
//!   application and Strava, reconciling the locally persisted subscription
//!   id against Strava's remote state.

/// Subscription reconciliation protocol
pub mod reconciler;
/// Verify-token derivation and challenge responder
pub mod verification;

pub use reconciler::{ReconcileOutcome, SubscriptionReconciler};
pub use verification::{verify_token, ChallengeOutcome};
