use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::engine::{ChatMessage, QuickAction};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct InitChatRequest {
    /// Used in greetings when the bearer token carries no name.
    pub customer_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatInit {
    pub session_id: Uuid,
    pub welcome_text: String,
    pub quick_actions: Vec<QuickAction>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub session_id: Uuid,
    pub message: Option<String>,
    /// Quick action id, e.g. `SELECT_CATEGORY:plumbing`. Takes precedence over `message`.
    pub action_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatHistory {
    pub session_id: Uuid,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssistantChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssistantChatResponse {
    pub reply: String,
    /// Backend name, or `canned` when every backend failed.
    pub source: String,
}
