// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Groups endpoint defaults, environment variable names, and tuning knobs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Application constants grouped by domain.

use std::env;

/// Default Strava endpoint bases. Both are overridable through the
/// environment so tests and staging setups can point at a local server.
pub mod endpoints {
    /// Base for the REST API (`push_subscriptions`, `athlete/activities`)
    pub const DEFAULT_API_BASE: &str = "https://www.strava.com/api/v3";
    /// Base for the OAuth endpoints (`authorize`, `token`, `deauthorize`)
    pub const DEFAULT_OAUTH_BASE: &str = "https://www.strava.com/oauth";
}

/// Environment variable names read by `StravaConfig::from_env`
pub mod env_vars {
    pub const CLIENT_ID: &str = "STRAVA_CLIENT_ID";
    pub const CLIENT_SECRET: &str = "STRAVA_CLIENT_SECRET";
    pub const SCOPES: &str = "STRAVA_SCOPES";
    pub const CALLBACK_HOST: &str = "STRAVA_CALLBACK_HOST";
    pub const PATH_PREFIX: &str = "STRAVA_PATH_PREFIX";
    pub const PATH_REDIRECT: &str = "STRAVA_PATH_REDIRECT";
    pub const PATH_SUBSCRIPTION: &str = "STRAVA_PATH_SUBSCRIPTION";
    pub const SUBSCRIPTION_SETTING_KEY: &str = "STRAVA_SUBSCRIPTION_SETTING_KEY";
    pub const API_BASE: &str = "STRAVA_API_BASE";
    pub const OAUTH_BASE: &str = "STRAVA_OAUTH_BASE";
}

/// Defaults applied when an environment variable is absent
pub mod defaults {
    pub const PATH_PREFIX: &str = "/admin";
    pub const PATH_REDIRECT: &str = "/dashboard";
    pub const PATH_SUBSCRIPTION: &str = "/subscription";
    pub const SUBSCRIPTION_SETTING_KEY: &str = "strava-subscription";
    pub const SCOPES: &str = "read,activity:read_all";
}

/// HTTP client timeout tuning
pub mod timeouts {
    /// Per-request timeout for calls to Strava
    pub const REQUEST_SECS: u64 = 30;
    /// Connection establishment timeout
    pub const CONNECT_SECS: u64 = 10;
}

/// Environment-based configuration for the server binary
pub mod env_config {
    use super::env;

    /// Get HTTP server port from environment or default
    #[must_use]
    pub fn http_port() -> u16 {
        env::var("HTTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080)
    }

    /// Get database URL from environment or default
    #[must_use]
    pub fn database_url() -> String {
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:strava-bridge.db".to_string())
    }
}
