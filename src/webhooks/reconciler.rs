// ABOUTME: Subscription reconciliation - guarantees exactly one push subscription exists
// ABOUTME: Settings short-circuit, best-effort stray cleanup, creation, id persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subscription reconciliation protocol.
//!
//! Run once during startup, after the HTTP listener serving the handshake
//! endpoint is live: Strava validates the callback URL synchronously inside
//! the creation call, so reconciling earlier makes creation fail. The caller
//! is responsible for not invoking two reconciliations concurrently in the
//! same process; both would race on the settings key and could register
//! duplicate subscriptions.

use crate::config::StravaConfig;
use crate::database::SettingsStore;
use crate::errors::{BridgeError, BridgeResult};
use crate::providers::StravaApiClient;
use crate::webhooks::verification::verify_token;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How a reconciliation run concluded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A subscription id was already persisted; nothing was done
    Satisfied {
        subscription_id: String,
    },
    /// A new subscription was registered and its id persisted
    Created {
        subscription_id: String,
        /// Id of a stray remote subscription deleted beforehand, if any
        removed_stray: Option<String>,
    },
}

/// Reconciles local subscription state against Strava's remote state
pub struct SubscriptionReconciler {
    config: Arc<StravaConfig>,
    api: StravaApiClient,
    settings: Arc<dyn SettingsStore>,
}

impl SubscriptionReconciler {
    #[must_use]
    pub fn new(
        config: Arc<StravaConfig>,
        api: StravaApiClient,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            config,
            api,
            settings,
        }
    }

    /// Ensure exactly one push subscription exists.
    ///
    /// Per invocation: at most one remote deletion, at most one remote
    /// creation, at most one settings write.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::Configuration`] when no callback host is configured;
    ///   raised before any network call.
    /// - [`BridgeError::Database`] when the settings store fails.
    /// - [`BridgeError::ProviderCreation`] when the creation call does not
    ///   return 201 with an id. List/delete failures are logged and swallowed.
    pub async fn reconcile(&self) -> BridgeResult<ReconcileOutcome> {
        // Configuration precondition comes first: an unconfigured callback
        // host is a deployment error, not a runtime failure to recover from.
        let callback_url = self.config.callback_url()?;

        let key = &self.config.subscription_setting_key;
        if let Some(existing) = self.settings.get(key).await? {
            if !existing.is_empty() {
                debug!("subscription {existing} already registered, nothing to reconcile");
                return Ok(ReconcileOutcome::Satisfied {
                    subscription_id: existing,
                });
            }
        }

        // Local state is missing: any subscription Strava still holds (for
        // example after a database reset) must go before we register a new one.
        let removed_stray = self.delete_stray_subscription().await;

        let token = verify_token(&self.config.client_id, &self.config.client_secret);
        let created = match self.api.create_subscription(&token, &callback_url).await {
            Ok(created) => created,
            Err(err @ BridgeError::ProviderCreation(_)) => return Err(err),
            Err(other) => return Err(BridgeError::ProviderCreation(other.to_string())),
        };

        let subscription_id = created.id.to_string();
        self.settings.upsert(key, &subscription_id).await?;
        info!("Strava subscription {subscription_id} registered for {callback_url}");

        Ok(ReconcileOutcome::Created {
            subscription_id,
            removed_stray,
        })
    }

    /// Best-effort cleanup of a surviving remote subscription. Failures are
    /// logged and swallowed; reconciliation proceeds to creation either way.
    async fn delete_stray_subscription(&self) -> Option<String> {
        let subscriptions = match self.api.list_subscriptions().await {
            Ok(subscriptions) => subscriptions,
            Err(err) => {
                warn!("subscription listing failed, continuing to creation: {err}");
                return None;
            }
        };

        let stray = subscriptions.first()?;
        let id = stray.id.to_string();
        info!("stray Strava subscription {id} found, deleting before re-registration");
        if let Err(err) = self.api.delete_subscription(&id).await {
            warn!("failed to delete stray subscription {id}: {err}");
        }
        Some(id)
    }
}
