use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, warn};

use crate::chat::bearer_token;
use crate::errors::ApiError;
use crate::metrics::{WEBHOOK_EVENTS_SKIPPED_TOTAL, WEBHOOK_EVENTS_TOTAL};
use crate::state::AppState;
use fancast_billing::prelude::{verify_signature, BillingEvent, ReconcileOutcome};
use fancast_types::prelude::TenantId;

const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Payment-processor webhook. Signature verification gates everything:
/// an unverifiable request mutates nothing and is rejected so the
/// processor does NOT treat it as delivered. Verified events are always
/// acknowledged unless reconciliation itself fails, which is the one
/// retryable outcome.
pub async fn billing_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        return ApiError::bad_request("Missing signature").into_response();
    };

    if let Err(err) = verify_signature(&body, signature, &state.webhook_secret) {
        warn!("webhook signature verification failed: {}", err.0);
        return ApiError::bad_request("Invalid signature").into_response();
    }

    let event = match BillingEvent::parse(&body) {
        Ok(event) => event,
        Err(err) => {
            warn!("webhook payload rejected: {}", err.0);
            return ApiError::bad_request("Malformed event").into_response();
        }
    };

    state.meter.counter(&WEBHOOK_EVENTS_TOTAL).inc(1);
    match state.reconciler.apply(event).await {
        Ok(outcome) => {
            if outcome == ReconcileOutcome::Skipped {
                state.meter.counter(&WEBHOOK_EVENTS_SKIPPED_TOTAL).inc(1);
            }
            Json(json!({ "received": true })).into_response()
        }
        Err(err) => {
            error!("webhook processing error: {}", err.0);
            ApiError::internal("Webhook processing failed").into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct ConnectPayload {
    #[serde(default, rename = "orgId")]
    org_id: Option<String>,
}

/// Relays a creator's drive-connection request to the retrieval service
/// and hands back the provider's authorization URL. Only the org owner
/// may connect a source into its partition.
pub async fn drive_connect_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let Some(user) = state.verifier.verify(bearer_token(&headers)).await else {
        return Err(ApiError::unauthorized());
    };

    let payload: ConnectPayload = serde_json::from_slice(&body).map_err(|err| {
        debug!("connect payload decode failed: {err}");
        ApiError::bad_request("Invalid request body")
    })?;
    let Some(org_id) = payload.org_id.filter(|value| !value.is_empty()) else {
        return Err(ApiError::bad_request("Missing orgId"));
    };

    if user.subject_id.0 != org_id {
        return Err(ApiError::forbidden());
    }

    let redirect_uri = format!("{}/api/connections/drive/callback", state.app_url);
    match state
        .retrieval
        .init_drive_connection(&TenantId(org_id), &redirect_uri)
        .await
    {
        Ok(url) => Ok(Json(json!({ "url": url })).into_response()),
        Err(err) => {
            error!("drive connection init failed: {}", err.0);
            Err(ApiError::internal("Failed to initialize connection"))
        }
    }
}

#[derive(Deserialize)]
pub struct SubscribePayload {
    #[serde(default, rename = "orgId")]
    org_id: Option<String>,
}

/// Free-tier self-service grant: synchronously adds the org to the
/// caller's subscribed set. Paid activation never comes through here; it
/// arrives asynchronously via the billing webhook.
pub async fn free_subscribe_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let Some(user) = state.verifier.verify(bearer_token(&headers)).await else {
        return Err(ApiError::unauthorized());
    };

    let payload: SubscribePayload = serde_json::from_slice(&body).map_err(|err| {
        debug!("subscribe payload decode failed: {err}");
        ApiError::bad_request("Invalid request body")
    })?;
    let Some(org_id) = payload.org_id.filter(|value| !value.is_empty()) else {
        return Err(ApiError::bad_request("orgId is required"));
    };
    let tenant = TenantId(org_id);

    let known = state
        .store
        .tenant(&tenant)
        .await
        .map_err(|err| ApiError::from(err.into_inner()))?;
    if known.is_none() {
        return Err(ApiError::not_found("Org not found"));
    }

    let account = state
        .store
        .subscribe_free(&user.subject_id, &tenant)
        .await
        .map_err(|err| ApiError::from(err.into_inner()))?;

    Ok(Json(json!({ "subscribedOrgIds": account.subscribed_tenants })).into_response())
}
