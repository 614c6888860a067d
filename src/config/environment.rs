// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Loads Strava credentials, route paths, and endpoint bases with validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment-based configuration for the Strava bridge.
//!
//! The configuration is built once at startup and passed by `Arc` into the
//! API client, the reconciler, and the route handlers. There is deliberately
//! no global singleton: fixture configurations in tests construct the struct
//! directly.

use crate::constants::{defaults, endpoints, env_vars};
use crate::errors::{BridgeError, BridgeResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Configuration for the Strava integration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StravaConfig {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// OAuth scopes requested during authorization
    pub scopes: Vec<String>,
    /// Prefix all bridge routes are mounted under (e.g. `/admin`)
    pub path_prefix: String,
    /// Path users are redirected to after OAuth callback and revoke
    pub path_redirect: String,
    /// Path of the webhook handshake endpoint, relative to `{prefix}/strava`
    pub path_subscription: String,
    /// Public host Strava delivers webhooks to; empty means unconfigured
    pub callback_host: String,
    /// Settings-store key holding the provider-assigned subscription id
    pub subscription_setting_key: String,
    /// REST API base URL
    pub api_base: String,
    /// OAuth endpoint base URL
    pub oauth_base: String,
}

impl Default for StravaConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            scopes: defaults::SCOPES.split(',').map(str::to_owned).collect(),
            path_prefix: defaults::PATH_PREFIX.into(),
            path_redirect: defaults::PATH_REDIRECT.into(),
            path_subscription: defaults::PATH_SUBSCRIPTION.into(),
            callback_host: String::new(),
            subscription_setting_key: defaults::SUBSCRIPTION_SETTING_KEY.into(),
            api_base: endpoints::DEFAULT_API_BASE.into(),
            oauth_base: endpoints::DEFAULT_OAUTH_BASE.into(),
        }
    }
}

impl StravaConfig {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `STRAVA_CLIENT_ID` or `STRAVA_CLIENT_SECRET` is
    /// unset or empty. The callback host is allowed to be absent here; it is
    /// checked later by [`Self::callback_url`] because only subscription
    /// creation depends on it.
    pub fn from_env() -> Result<Self> {
        let client_id = env::var(env_vars::CLIENT_ID)
            .with_context(|| format!("{} not set", env_vars::CLIENT_ID))?;
        let client_secret = env::var(env_vars::CLIENT_SECRET)
            .with_context(|| format!("{} not set", env_vars::CLIENT_SECRET))?;

        let base = Self::default();
        let config = Self {
            client_id,
            client_secret,
            scopes: env::var(env_vars::SCOPES)
                .map(|s| s.split(',').map(str::to_owned).collect())
                .unwrap_or(base.scopes),
            path_prefix: env::var(env_vars::PATH_PREFIX).unwrap_or(base.path_prefix),
            path_redirect: env::var(env_vars::PATH_REDIRECT).unwrap_or(base.path_redirect),
            path_subscription: env::var(env_vars::PATH_SUBSCRIPTION)
                .unwrap_or(base.path_subscription),
            callback_host: env::var(env_vars::CALLBACK_HOST).unwrap_or_default(),
            subscription_setting_key: env::var(env_vars::SUBSCRIPTION_SETTING_KEY)
                .unwrap_or(base.subscription_setting_key),
            api_base: env::var(env_vars::API_BASE).unwrap_or(base.api_base),
            oauth_base: env::var(env_vars::OAUTH_BASE).unwrap_or(base.oauth_base),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.client_id.is_empty(), "Strava client id is empty");
        anyhow::ensure!(
            !self.client_secret.is_empty(),
            "Strava client secret is empty"
        );
        Ok(())
    }

    /// Route prefix all Strava endpoints live under (`{prefix}/strava`)
    #[must_use]
    pub fn strava_prefix(&self) -> String {
        format!("{}/strava", self.path_prefix)
    }

    /// Path users are redirected to after the OAuth callback and revoke
    #[must_use]
    pub fn redirect_path(&self) -> String {
        format!("{}{}", self.path_prefix, self.path_redirect)
    }

    /// Absolute URL Strava calls back for webhook delivery and the
    /// verification handshake.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Configuration`] when no callback host is
    /// configured. Subscription creation treats this as a deployment error
    /// and aborts before any network call.
    pub fn callback_url(&self) -> BridgeResult<String> {
        if self.callback_host.is_empty() {
            return Err(BridgeError::Configuration(
                "callback host is not configured; set STRAVA_CALLBACK_HOST".into(),
            ));
        }
        Ok(format!(
            "{}{}{}",
            self.callback_host,
            self.strava_prefix(),
            self.path_subscription
        ))
    }

    /// Authorization URL users visit to connect their Strava account
    ///
    /// # Errors
    ///
    /// Returns an error if the configured OAuth base cannot be parsed as a URL.
    pub fn auth_url(&self) -> Result<String> {
        let mut url = url::Url::parse(&format!("{}/authorize", self.oauth_base))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_path())
            .append_pair("response_type", "code")
            .append_pair("approval_prompt", "auto")
            .append_pair("scope", &self.scopes.join(","));
        Ok(url.into())
    }
}
