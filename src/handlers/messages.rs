use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::{Activity, ActivityKind};
use crate::services::conversation::welcome_replies;
use crate::state::AppState;

const FALLBACK_REPLY: &str = "Sorry, I'm having trouble right now. Please try again in a moment.";

pub async fn messages(
    State(state): State<Arc<AppState>>,
    Json(activity): Json<Activity>,
) -> Response {
    match activity.activity_kind() {
        ActivityKind::Message => on_message(&state, &activity).await,
        ActivityKind::ConversationUpdate => on_members_added(&state, &activity).await,
        ActivityKind::Other => {
            tracing::debug!(kind = %activity.kind, "ignoring activity");
        }
    }

    StatusCode::OK.into_response()
}

async fn on_message(state: &Arc<AppState>, activity: &Activity) {
    let text = activity.text.as_deref().unwrap_or("");
    let from = activity.from.as_ref().map(|f| f.id.as_str()).unwrap_or("");

    tracing::info!(from = %from, len = text.len(), "incoming message");
    tracing::debug!(from = %from, text = %text, "incoming message text");

    let reply = match state.dispatcher.process_message(text).await {
        Ok(reply) => reply.text,
        Err(e) => {
            tracing::error!(error = %e, from = %from, "message dispatch failed");
            FALLBACK_REPLY.to_string()
        }
    };

    if let Err(e) = state.messaging.send_reply(activity, &reply).await {
        tracing::error!(error = %e, "failed to send reply");
    }
}

async fn on_members_added(state: &Arc<AppState>, activity: &Activity) {
    for welcome in welcome_replies(&activity.members_added, activity.recipient_id()) {
        if let Err(e) = state.messaging.send_reply(activity, &welcome).await {
            tracing::error!(error = %e, "failed to send welcome");
        }
    }
}
