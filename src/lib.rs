// ABOUTME: Library entry point for the Strava bridge
// ABOUTME: OAuth account linking, activity sync, and webhook subscription reconciliation
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![deny(unsafe_code)]

//! # Strava Bridge
//!
//! Integrates the Strava API into a host web application: OAuth token
//! exchange and revocation, activity listing, and webhook subscription
//! management.
//!
//! The core of the crate is **subscription reconciliation**
//! ([`webhooks::reconciler`]): ensuring exactly one push subscription exists
//! between the application and Strava, reconciling the locally persisted
//! subscription id against Strava's remote state, and answering Strava's
//! challenge/response verification handshake ([`webhooks::verification`]).
//!
//! ## Startup ordering
//!
//! Reconciliation must run **after** the HTTP listener is serving the
//! handshake endpoint: Strava validates the callback URL synchronously inside
//! the subscription creation call.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use strava_bridge::config::StravaConfig;
//! use strava_bridge::database::MemorySettingsStore;
//! use strava_bridge::providers::StravaApiClient;
//! use strava_bridge::webhooks::SubscriptionReconciler;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Arc::new(StravaConfig::from_env()?);
//! let api = StravaApiClient::new(config.clone())?;
//! let settings = Arc::new(MemorySettingsStore::new());
//!
//! // ... bind and serve the router first ...
//!
//! let reconciler = SubscriptionReconciler::new(config, api, settings);
//! let outcome = reconciler.reconcile().await?;
//! println!("reconciled: {outcome:?}");
//! # Ok(())
//! # }
//! ```

/// Environment-based configuration
pub mod config;

/// Endpoint, environment variable, and default constants
pub mod constants;

/// Database pool, migrations, settings store, and record store
pub mod database;

/// Unified error taxonomy
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Persisted record types
pub mod models;

/// Strava API client
pub mod providers;

/// HTTP routes
pub mod routes;

/// Subscription reconciliation and verification handshake
pub mod webhooks;

pub use errors::{BridgeError, BridgeResult};
