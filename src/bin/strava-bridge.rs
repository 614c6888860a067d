// ABOUTME: Server binary for the Strava bridge
// ABOUTME: Serves the routes first, then reconciles the webhook subscription
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Strava Bridge Server
//!
//! Startup sequence: logging, configuration, database, HTTP listener, and
//! only then subscription reconciliation - Strava validates the callback URL
//! synchronously inside the creation call, so the handshake endpoint must be
//! live first. A fatal reconciliation error aborts startup with a non-zero
//! exit; the provider will not deliver webhooks to a URL it has no record of.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use strava_bridge::{
    config::StravaConfig,
    constants::env_config,
    database::{self, SqliteSettingsStore},
    logging,
    providers::StravaApiClient,
    routes::{self, AppState},
    webhooks::{ReconcileOutcome, SubscriptionReconciler},
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "strava-bridge")]
#[command(about = "Strava integration bridge - OAuth linking and webhook subscriptions")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let config = Arc::new(StravaConfig::from_env()?);
    let http_port = args.http_port.unwrap_or_else(env_config::http_port);
    let database_url = args.database_url.unwrap_or_else(env_config::database_url);

    let pool = database::connect(&database_url).await?;
    let api = StravaApiClient::new(config.clone())?;
    let settings = Arc::new(SqliteSettingsStore::new(pool.clone()));

    let state = Arc::new(AppState {
        config: config.clone(),
        api: api.clone(),
        pool,
    });
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", http_port)).await?;
    info!(
        "Strava bridge listening on port {http_port}, routes under {}",
        config.strava_prefix()
    );
    let server = tokio::spawn(async move { axum::serve(listener, app).await });

    // The listener is accepting; now the subscription can be reconciled.
    let reconciler = SubscriptionReconciler::new(config, api, settings);
    match reconciler.reconcile().await {
        Ok(ReconcileOutcome::Satisfied { subscription_id }) => {
            info!("subscription {subscription_id} already registered");
        }
        Ok(ReconcileOutcome::Created {
            subscription_id,
            removed_stray,
        }) => {
            if let Some(stray) = removed_stray {
                info!("removed stray subscription {stray}");
            }
            info!("subscription {subscription_id} registered");
        }
        Err(err) => {
            error!("subscription reconciliation failed: {err}");
            return Err(err.into());
        }
    }

    server.await??;
    Ok(())
}
