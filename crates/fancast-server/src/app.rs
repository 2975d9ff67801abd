use axum::{
    routing::{get, post},
    Router,
};

use crate::chat::chat_handler;
use crate::routes::{billing_webhook_handler, drive_connect_handler, free_subscribe_handler, health};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat_handler))
        .route("/api/webhooks/billing", post(billing_webhook_handler))
        .route("/api/connections/drive", post(drive_connect_handler))
        .route("/api/subscriptions/free", post(free_subscribe_handler))
        .with_state(state)
}
