use uuid::Uuid;

use super::{menu, signed_in};
use crate::{
    engine::{
        action::Action,
        reply::ChatReply,
        session::{ChatSession, DisputeFlowState, FlowContext},
    },
    error::AppResult,
    services::escrow_service,
    state::AppState,
};

pub fn start(session: &mut ChatSession, escrow_id: Uuid) -> AppResult<ChatReply> {
    if let Err(reply) = signed_in(session) {
        return Ok(reply);
    }
    session.enter(FlowContext::Dispute(DisputeFlowState { escrow_id }));
    Ok(prompt(session))
}

pub fn prompt(session: &ChatSession) -> ChatReply {
    if !matches!(session.context, FlowContext::Dispute(_)) {
        return menu::main_menu(session);
    }
    if session.current_step == 0 {
        return ChatReply::text(
            "Sorry something went wrong. Tell us what happened and we'll hold the payment while we look into it.",
        )
        .with_actions([Action::MainMenu.button("Cancel")]);
    }
    ChatReply::text("Your dispute is open. Our team will review it and contact you.")
        .with_actions([Action::MainMenu.button("Main menu")])
}

pub async fn submit_reason(state: &AppState, session: &mut ChatSession, reason: &str) -> AppResult<ChatReply> {
    let FlowContext::Dispute(flow) = &session.context else {
        return Ok(menu::main_menu(session));
    };
    let escrow_id = flow.escrow_id;
    let customer_id = match signed_in(session) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };

    let (_, dispute) = escrow_service::dispute(state, escrow_id, customer_id, reason).await?;
    tracing::info!(session_id = %session.id, dispute_id = %dispute.id, "dispute opened from chat");

    session.advance_to(1);
    Ok(prompt(session))
}
