use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::chat::{AssistantChatRequest, AssistantChatResponse},
    error::{AppError, AppResult},
    response::ApiResponse,
    state::AppState,
};

/// Longest message forwarded to a generative backend.
const MAX_MESSAGE_CHARS: usize = 2_000;

pub fn router() -> Router<AppState> {
    Router::new().route("/chat", post(assistant_chat))
}

#[utoipa::path(
    post,
    path = "/api/assistant/chat",
    request_body = AssistantChatRequest,
    responses(
        (status = 200, description = "Reply from the first healthy backend, or a canned answer", body = ApiResponse<AssistantChatResponse>),
        (status = 400, description = "Empty or oversized message"),
    ),
    tag = "Assistant"
)]
pub async fn assistant_chat(
    State(state): State<AppState>,
    Json(payload): Json<AssistantChatRequest>,
) -> AppResult<Json<ApiResponse<AssistantChatResponse>>> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(AppError::validation("message is required"));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::validation(format!(
            "message must be at most {MAX_MESSAGE_CHARS} characters"
        )));
    }

    let reply = state.assistant.respond(message).await;
    Ok(Json(ApiResponse::ok(AssistantChatResponse {
        source: reply.source.label().to_string(),
        reply: reply.text,
    })))
}
