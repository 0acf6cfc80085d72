use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::chat::{ChatHistory, ChatInit, InitChatRequest, SendMessageRequest},
    engine::{self, ChatReply},
    error::AppResult,
    middleware::auth::MaybeAuthUser,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/init", post(init_chat))
        .route("/message", post(send_message))
        .route("/history/{session_id}", get(chat_history))
}

#[utoipa::path(
    post,
    path = "/api/chat/init",
    request_body = InitChatRequest,
    responses(
        (status = 200, description = "Session started", body = ApiResponse<ChatInit>),
        (status = 401, description = "Invalid bearer token"),
    ),
    security((), ("bearer_auth" = [])),
    tag = "Chat"
)]
pub async fn init_chat(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    payload: Option<Json<InitChatRequest>>,
) -> AppResult<Json<ApiResponse<ChatInit>>> {
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();
    let customer_name = user
        .as_ref()
        .and_then(|user| user.name.clone())
        .or(payload.customer_name);
    let init = engine::init(&state, user.map(|user| user.customer_id), customer_name).await?;
    Ok(Json(ApiResponse::success("Chat started", init, Some(Meta::empty()))))
}

#[utoipa::path(
    post,
    path = "/api/chat/message",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Bot reply", body = ApiResponse<ChatReply>),
        (status = 403, description = "Session belongs to another customer"),
        (status = 404, description = "Unknown session"),
    ),
    security((), ("bearer_auth" = [])),
    tag = "Chat"
)]
pub async fn send_message(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Json(payload): Json<SendMessageRequest>,
) -> AppResult<Json<ApiResponse<ChatReply>>> {
    let reply = engine::step(
        &state,
        payload.session_id,
        user.map(|user| user.customer_id),
        payload.message.as_deref(),
        payload.action_id.as_deref(),
    )
    .await?;
    Ok(Json(ApiResponse::ok(reply)))
}

#[utoipa::path(
    get,
    path = "/api/chat/history/{session_id}",
    params(
        ("session_id" = Uuid, Path, description = "Chat session ID")
    ),
    responses(
        (status = 200, description = "Most recent messages, oldest first", body = ApiResponse<ChatHistory>),
        (status = 403, description = "Session belongs to another customer"),
        (status = 404, description = "Unknown session"),
    ),
    security((), ("bearer_auth" = [])),
    tag = "Chat"
)]
pub async fn chat_history(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ChatHistory>>> {
    let messages =
        engine::history(&state, session_id, user.map(|user| user.customer_id)).await?;
    let meta = Meta::total(messages.len());
    Ok(Json(ApiResponse::success(
        "OK",
        ChatHistory {
            session_id,
            messages,
        },
        Some(meta),
    )))
}
