// ABOUTME: Configuration module for the Strava bridge
// ABOUTME: Re-exports the environment-backed configuration types
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration management

/// Environment-based configuration loading and validation
pub mod environment;

pub use environment::StravaConfig;
