// ABOUTME: HTTP routes for the Strava bridge - OAuth callback, revoke, activities, handshake
// ABOUTME: Mounted under {path_prefix}/strava, mirroring the host application's admin area
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Axum routes exposed by the bridge.
//!
//! - `GET {prefix}/strava` - OAuth callback: exchanges the code, stores the
//!   athlete and token link, redirects to the dashboard.
//! - `GET {prefix}/strava/revoke/:username` - revokes the token at Strava and
//!   removes the local records.
//! - `GET {prefix}/strava/list/:username` - fetches and stores the athlete's
//!   recent activities.
//! - `GET {prefix}/strava{subscription_path}` - the webhook verification
//!   handshake endpoint.

use crate::config::StravaConfig;
use crate::database::records;
use crate::errors::BridgeError;
use crate::providers::StravaApiClient;
use crate::webhooks::verification::{verify_token, ChallengeOutcome};
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared state for all bridge routes. The settings store stays with the
/// reconciler; no route reads it.
pub struct AppState {
    pub config: Arc<StravaConfig>,
    pub api: StravaApiClient,
    pub pool: SqlitePool,
}

/// Build the bridge router. All routes are nested under
/// `{path_prefix}/strava` from the configuration.
pub fn router(state: Arc<AppState>) -> Router {
    let prefix = state.config.strava_prefix();
    let subscription_path = format!("{prefix}{}", state.config.path_subscription);

    Router::new()
        .route(&prefix, get(oauth_callback))
        .route(&format!("{prefix}/revoke/:username"), get(revoke))
        .route(&format!("{prefix}/list/:username"), get(list_activities))
        .route(&subscription_path, get(validate_subscription))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChallengeParams {
    #[serde(rename = "hub.challenge", default)]
    challenge: String,
    #[serde(rename = "hub.verify_token", default)]
    verify_token: String,
}

fn error_response(err: &BridgeError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

/// OAuth callback: exchange the authorization code and persist the link.
/// A missing code means the user denied access; redirect without side effects.
async fn oauth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let redirect = state.config.redirect_path();
    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return Redirect::to(&redirect).into_response();
    };

    match connect_account(&state, &code).await {
        Ok(username) => {
            info!("Strava account linked for {username}");
            Redirect::to(&redirect).into_response()
        }
        Err(err) => {
            error!("Strava token exchange failed: {err}");
            error_response(&err)
        }
    }
}

async fn connect_account(state: &AppState, code: &str) -> Result<String, BridgeError> {
    let token = state.api.exchange_code(code).await?;
    let athlete = token.athlete.clone().ok_or_else(|| {
        BridgeError::ProviderQuery("token exchange response missing athlete".into())
    })?;
    records::replace_athlete_link(&state.pool, &athlete, &token).await
}

/// Revoke the athlete's token at Strava and delete the local records.
async fn revoke(State(state): State<Arc<AppState>>, Path(username): Path<String>) -> Response {
    let link = match records::find_link_by_username(&state.pool, &username).await {
        Ok(Some(link)) => link,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("no Strava link for {username}") })),
            )
                .into_response();
        }
        Err(err) => return error_response(&err),
    };

    match state.api.revoke(&link.access_token).await {
        Ok(true) => {
            if let Err(err) = records::delete_athlete_link(&state.pool, &username).await {
                error!("failed to remove revoked Strava records for {username}: {err}");
                return error_response(&err);
            }
            info!("Strava link revoked for {username}");
        }
        Ok(false) => warn!("Strava did not accept revocation for {username}"),
        Err(err) => return error_response(&err),
    }

    Redirect::to(&state.config.redirect_path()).into_response()
}

/// Fetch the athlete's recent activities, store them, and return them.
async fn list_activities(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Response {
    let link = match records::find_link_by_username(&state.pool, &username).await {
        Ok(Some(link)) => link,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("no Strava link for {username}") })),
            )
                .into_response();
        }
        Err(err) => return error_response(&err),
    };

    let activities = match state.api.athlete_activities(&link.access_token).await {
        Ok(activities) => activities,
        Err(err) => {
            error!("activity listing failed for {username}: {err}");
            return error_response(&err);
        }
    };

    if let Err(err) = records::store_activities(&state.pool, link.user_id, &activities).await {
        error!("failed to store activities for {username}: {err}");
        return error_response(&err);
    }

    Json(json!({ "data": activities })).into_response()
}

/// Webhook verification handshake. No side effects; safe to call any number
/// of times, including concurrently.
async fn validate_subscription(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ChallengeParams>,
) -> Response {
    let expected = verify_token(&state.config.client_id, &state.config.client_secret);
    let outcome = ChallengeOutcome::evaluate(&expected, &params.verify_token, &params.challenge);
    if matches!(outcome, ChallengeOutcome::Rejected { .. }) {
        warn!("webhook handshake rejected: verify token mismatch");
    }
    (outcome.status(), Json(outcome.body())).into_response()
}
