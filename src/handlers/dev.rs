use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::models::ReplyKind;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct DevMessage {
    pub message: String,
}

#[derive(Serialize)]
pub struct DevResponse {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ReplyKind>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs a message through the dispatcher and returns the reply directly,
/// bypassing the connector.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DevMessage>,
) -> Json<DevResponse> {
    match state.dispatcher.process_message(&payload.message).await {
        Ok(reply) => Json(DevResponse {
            reply: reply.text,
            kind: Some(reply.kind),
            success: true,
            error: None,
        }),
        Err(e) => {
            tracing::error!(error = %e, "dev message dispatch failed");
            Json(DevResponse {
                reply: String::new(),
                kind: None,
                success: false,
                error: Some(format!("{e:#}")),
            })
        }
    }
}
