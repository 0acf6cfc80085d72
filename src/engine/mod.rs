//! Conversation engine.
//!
//! A session is a small state machine: the current flow, a step within it and
//! flow-scoped context. Each turn loads the session under its key lock, runs
//! the matching flow handler and persists the session together with the
//! capped message history.

pub mod action;
pub mod flows;
pub mod intent;
pub mod reply;
pub mod session;

use chrono::Utc;
use uuid::Uuid;

pub use action::Action;
pub use reply::{Card, ChatReply, QuickAction};
pub use session::{ChatFlow, ChatMessage, ChatSession, FlowContext, MessageRole};

use crate::{
    dto::chat::ChatInit,
    error::{AppError, AppResult},
    services::subscription_service,
    state::AppState,
    store::{StoreExt, keys},
};
use flows::Input;

/// Start a session in the main flow and greet the user.
pub async fn init(
    state: &AppState,
    customer_id: Option<Uuid>,
    customer_name: Option<String>,
) -> AppResult<ChatInit> {
    let subscription_active = match customer_id {
        Some(customer_id) => subscription_service::check_subscription(state, customer_id).await?,
        None => false,
    };
    let session = ChatSession::new(customer_id, customer_name, subscription_active);
    let welcome = flows::welcome(&session);

    let history = vec![ChatMessage::new(MessageRole::Bot, welcome.text.clone())];
    state.store.put_json(&keys::session(session.id), &session).await?;
    state.store.put_json(&keys::history(session.id), &history).await?;
    tracing::info!(session_id = %session.id, anonymous = session.is_anonymous(), subscription_active, "chat session started");

    Ok(ChatInit {
        session_id: session.id,
        welcome_text: welcome.text,
        quick_actions: welcome.quick_actions,
    })
}

/// Run one turn. An explicit action id wins over text.
///
/// A session started by a signed-in customer only accepts turns from that
/// customer. Anonymous sessions stay anonymous for their whole life.
pub async fn step(
    state: &AppState,
    session_id: Uuid,
    customer_id: Option<Uuid>,
    message: Option<&str>,
    action_id: Option<&str>,
) -> AppResult<ChatReply> {
    let key = keys::session(session_id);
    let _guard = state.locks.acquire(&key).await;

    let mut session: ChatSession = state
        .store
        .get_json(&key)
        .await?
        .ok_or(AppError::NotFound("chat session"))?;
    ensure_participant(&session, customer_id)?;

    let history_key = keys::history(session_id);
    let mut history: Vec<ChatMessage> = state.store.get_json(&history_key).await?.unwrap_or_default();
    let inbound = message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .or(action_id)
        .unwrap_or_default();
    session::push_capped(&mut history, ChatMessage::new(MessageRole::User, inbound));

    let before = session.clone();
    let input = Input::from_parts(message, action_id);
    let reply = match flows::dispatch(state, &mut session, input).await {
        Ok(reply) => reply,
        Err(err) if is_user_facing(&err) => {
            tracing::debug!(session_id = %session_id, error = %err, "chat turn rejected");
            session = before;
            apology(&err)
        }
        Err(err) => return Err(err),
    };

    session::push_capped(&mut history, ChatMessage::new(MessageRole::Bot, reply.text.clone()));
    session.last_activity = Utc::now();
    state.store.put_json(&key, &session).await?;
    state.store.put_json(&history_key, &history).await?;

    Ok(reply)
}

pub async fn history(
    state: &AppState,
    session_id: Uuid,
    requester: Option<Uuid>,
) -> AppResult<Vec<ChatMessage>> {
    let session = get_session(state, session_id).await?;
    ensure_participant(&session, requester)?;
    Ok(state
        .store
        .get_json(&keys::history(session_id))
        .await?
        .unwrap_or_default())
}

pub async fn get_session(state: &AppState, session_id: Uuid) -> AppResult<ChatSession> {
    state
        .store
        .get_json(&keys::session(session_id))
        .await?
        .ok_or(AppError::NotFound("chat session"))
}

fn ensure_participant(session: &ChatSession, requester: Option<Uuid>) -> AppResult<()> {
    match session.customer_id {
        Some(owner) if requester != Some(owner) => Err(AppError::Forbidden(
            "chat session belongs to another customer".into(),
        )),
        _ => Ok(()),
    }
}

/// Errors the user can act on are answered in chat instead of failing the turn.
fn is_user_facing(err: &AppError) -> bool {
    matches!(
        err,
        AppError::Validation(_)
            | AppError::NotFound(_)
            | AppError::State(_)
            | AppError::Forbidden(_)
            | AppError::Unauthorized(_)
    )
}

fn apology(err: &AppError) -> ChatReply {
    ChatReply::text(format!("Sorry, we couldn't do that: {err}."))
        .with_actions([Action::MainMenu.button("Main menu")])
}
