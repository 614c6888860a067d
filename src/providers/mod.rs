// ABOUTME: Provider integrations module
// ABOUTME: Currently hosts the Strava API client
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External fitness provider clients

/// Typed Strava API client
pub mod strava;

pub use strava::StravaApiClient;
