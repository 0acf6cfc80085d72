use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    channel::{
        self, OutboundMessage,
        webhook::{InboundEvent, InboundKind, VerifyQuery, WebhookPayload, parse_events, verify_subscription},
    },
    engine::{self, ChatReply, ChatSession},
    error::{AppError, AppResult},
    response::ApiResponse,
    state::AppState,
    store::{StoreExt, keys},
};

const FAILURE_REACTION: &str = "⚠️";

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookReceipt {
    pub received: usize,
    pub failed: usize,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(verify_webhook).post(receive_webhook))
}

#[utoipa::path(
    get,
    path = "/webhook",
    params(VerifyQuery),
    responses(
        (status = 200, description = "Echoes hub.challenge", body = String),
        (status = 403, description = "Verification token mismatch"),
    ),
    tag = "Channel"
)]
pub async fn verify_webhook(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> AppResult<String> {
    let expected = state
        .config
        .whatsapp
        .as_ref()
        .map(|whatsapp| whatsapp.verify_token.as_str())
        .ok_or_else(|| AppError::Forbidden("messaging channel is not configured".into()))?;
    verify_subscription(&query, expected)
        .ok_or_else(|| AppError::Forbidden("webhook verification failed".into()))
}

#[utoipa::path(
    post,
    path = "/webhook",
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Events processed; failures are logged, not retried", body = ApiResponse<WebhookReceipt>),
    ),
    tag = "Channel"
)]
pub async fn receive_webhook(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> Json<ApiResponse<WebhookReceipt>> {
    let events = parse_events(payload);
    let received = events.len();
    let mut failed = 0;

    for event in events {
        if let Err(err) = handle_event(&state, &event).await {
            failed += 1;
            tracing::error!(sender = %event.sender, message_id = %event.message_id, error = %err, "inbound message failed");
            let reaction = OutboundMessage::Reaction {
                message_id: event.message_id.clone(),
                emoji: FAILURE_REACTION.to_string(),
            };
            if let Err(err) = state.channel.send(&event.sender, &reaction).await {
                tracing::warn!(sender = %event.sender, error = %err, "failure reaction not sent");
            }
        }
    }

    Json(ApiResponse::ok(WebhookReceipt { received, failed }))
}

/// Run one inbound message through the engine and send the reply back.
/// Unknown senders get a fresh session and its welcome message.
async fn handle_event(state: &AppState, event: &InboundEvent) -> AppResult<()> {
    let _guard = state.locks.acquire(&keys::channel_session(&event.sender)).await;
    let reply = match sender_session(state, &event.sender).await? {
        Some(session_id) => {
            let (message, action_id) = match &event.kind {
                InboundKind::Text(text) => (Some(text.as_str()), None),
                InboundKind::ButtonReply(id) | InboundKind::ListReply(id) => (None, Some(id.as_str())),
            };
            engine::step(state, session_id, None, message, action_id).await?
        }
        None => {
            let init = engine::init(state, None, event.display_name.clone()).await?;
            state
                .store
                .put_json(&keys::channel_session(&event.sender), &init.session_id)
                .await?;
            ChatReply::text(init.welcome_text).with_actions(init.quick_actions)
        }
    };

    channel::deliver(state.channel.as_ref(), &event.sender, &reply).await?;
    Ok(())
}

async fn sender_session(state: &AppState, sender: &str) -> AppResult<Option<Uuid>> {
    let Some(session_id) = state
        .store
        .get_json::<Uuid>(&keys::channel_session(sender))
        .await?
    else {
        return Ok(None);
    };
    // The mapping may outlive its session.
    let exists = state
        .store
        .get_json::<ChatSession>(&keys::session(session_id))
        .await?
        .is_some();
    Ok(exists.then_some(session_id))
}
