// ABOUTME: Strava API integration - OAuth token exchange, activities, and push subscriptions
// ABOUTME: Every response decodes into an explicit struct; shape mismatches surface as errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed Strava API client.
//!
//! Covers the calls the bridge needs: the OAuth authorization-code exchange,
//! token revocation, the athlete activities listing, and the three
//! push-subscription operations (list, delete, create) used by the
//! [`crate::webhooks::reconciler`].

use crate::config::StravaConfig;
use crate::constants::timeouts;
use crate::errors::{BridgeError, BridgeResult};
use chrono::{DateTime, Utc};
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Token exchange response from `POST {oauth_base}/token`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp of access token expiry
    pub expires_at: i64,
    /// Summary of the athlete who authorized the application
    pub athlete: Option<AthleteSummary>,
}

/// Athlete summary embedded in the token exchange response
#[derive(Debug, Clone, Deserialize)]
pub struct AthleteSummary {
    pub id: i64,
    pub username: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub profile: Option<String>,
}

/// One entry of `GET {api_base}/push_subscriptions`
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionSummary {
    pub id: u64,
    pub callback_url: Option<String>,
}

/// Body of a successful `POST {api_base}/push_subscriptions`
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionCreated {
    pub id: u64,
}

/// One activity from `GET {api_base}/athlete/activities`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub id: i64,
    pub name: String,
    pub distance: f64,
    pub moving_time: i64,
    pub elapsed_time: i64,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub start_date: DateTime<Utc>,
    pub start_date_local: DateTime<Utc>,
    pub athlete: Option<ActivityAthleteRef>,
}

/// Athlete reference embedded in an activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityAthleteRef {
    pub id: i64,
}

/// Strava API client with a pooled HTTP client and bounded timeouts
#[derive(Clone)]
pub struct StravaApiClient {
    client: Client,
    config: Arc<StravaConfig>,
}

impl StravaApiClient {
    /// Build a client with the crate's bounded timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Http`] if the underlying client cannot be
    /// constructed; a client without the configured timeouts could hang
    /// startup indefinitely, so there is no untimed fallback.
    pub fn new(config: Arc<StravaConfig>) -> BridgeResult<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(timeouts::REQUEST_SECS))
            .connect_timeout(Duration::from_secs(timeouts::CONNECT_SECS))
            .build()?;
        Ok(Self { client, config })
    }

    fn subscriptions_url(&self) -> String {
        format!("{}/push_subscriptions", self.config.api_base)
    }

    /// client_id/client_secret pair sent on every subscription call
    fn credential_query(&self) -> [(&'static str, &str); 2] {
        [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ]
    }

    /// Exchange an authorization code for tokens and the athlete summary.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Http`] on transport failure and
    /// [`BridgeError::ProviderQuery`] on a non-success status or a body that
    /// does not match [`TokenExchangeResponse`].
    pub async fn exchange_code(&self, code: &str) -> BridgeResult<TokenExchangeResponse> {
        let response = self
            .client
            .post(format!("{}/token", self.config.oauth_base))
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::ProviderQuery(format!(
                "token exchange returned {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| BridgeError::ProviderQuery(format!("malformed token response: {e}")))
    }

    /// Revoke an access token at Strava. Returns whether Strava accepted the
    /// revocation (2xx).
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Http`] on transport failure.
    pub async fn revoke(&self, access_token: &str) -> BridgeResult<bool> {
        let response = self
            .client
            .post(format!("{}/deauthorize", self.config.oauth_base))
            .form(&[("access_token", access_token)])
            .send()
            .await?;
        Ok(response.status().is_success())
    }

    /// Fetch the athlete's recent activities with a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Http`] on transport failure and
    /// [`BridgeError::ProviderQuery`] on a non-success status or an
    /// unexpected body shape.
    pub async fn athlete_activities(
        &self,
        access_token: &str,
    ) -> BridgeResult<Vec<ActivitySummary>> {
        let response = self
            .client
            .get(format!("{}/athlete/activities", self.config.api_base))
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::ProviderQuery(format!(
                "activity listing returned {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| BridgeError::ProviderQuery(format!("malformed activity list: {e}")))
    }

    /// List the application's push subscriptions.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Http`] on transport failure and
    /// [`BridgeError::ProviderQuery`] on a non-200 status or a body that does
    /// not decode as a subscription list.
    pub async fn list_subscriptions(&self) -> BridgeResult<Vec<SubscriptionSummary>> {
        let response = self
            .client
            .get(self.subscriptions_url())
            .query(&self.credential_query())
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(BridgeError::ProviderQuery(format!(
                "subscription listing returned {status}"
            )));
        }

        let subscriptions: Vec<SubscriptionSummary> = response
            .json()
            .await
            .map_err(|e| BridgeError::ProviderQuery(format!("malformed subscription list: {e}")))?;
        debug!("Strava reports {} subscription(s)", subscriptions.len());
        Ok(subscriptions)
    }

    /// Delete a push subscription by id. Fire-and-forget: the response status
    /// is ignored, only transport failures surface.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Http`] on transport failure.
    pub async fn delete_subscription(&self, id: &str) -> BridgeResult<()> {
        let response = self
            .client
            .delete(format!("{}/{id}", self.subscriptions_url()))
            .query(&self.credential_query())
            .send()
            .await?;
        info!(
            "Strava subscription {id} delete request sent ({})",
            response.status()
        );
        Ok(())
    }

    /// Create a push subscription with the given verification token and
    /// callback URL. Strava synchronously validates the callback by calling
    /// the handshake endpoint before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ProviderCreation`] on any status other than 201
    /// or on a body without an `id`, and the same variant for transport
    /// failures: creation has no non-fatal failure mode.
    pub async fn create_subscription(
        &self,
        verify_token: &str,
        callback_url: &str,
    ) -> BridgeResult<SubscriptionCreated> {
        let response = self
            .client
            .post(self.subscriptions_url())
            .query(&self.credential_query())
            .query(&[
                ("verify_token", verify_token),
                ("callback_url", callback_url),
            ])
            .send()
            .await
            .map_err(|e| BridgeError::ProviderCreation(format!("request failed: {e}")))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::ProviderCreation(format!(
                "Strava returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| BridgeError::ProviderCreation(format!("malformed creation response: {e}")))
    }
}
