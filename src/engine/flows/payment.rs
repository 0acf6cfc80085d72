use uuid::Uuid;

use super::{menu, signed_in};
use crate::{
    engine::{
        action::Action,
        reply::{ChatReply, format_amount},
        session::{ChatSession, FlowContext},
    },
    error::AppResult,
    services::escrow_service,
    state::AppState,
};

pub fn prompt(session: &ChatSession) -> ChatReply {
    let FlowContext::Payment(payment) = &session.context else {
        return menu::main_menu(session);
    };
    if session.current_step == 0 {
        return ChatReply::text(format!(
            "Your booking is reserved. Pay {} securely here: {}\nWe hold the money until you confirm the job is done.",
            format_amount(payment.amount),
            payment.checkout_url
        ))
        .with_actions([
            Action::PaymentDone.button("I've paid"),
            Action::MainMenu.button("Main menu"),
        ]);
    }
    completion_options(payment.escrow_id)
}

fn completion_options(escrow_id: Uuid) -> ChatReply {
    ChatReply::text(
        "Thanks! Your booking is confirmed as soon as the payment is verified. \
         When the job is done, confirm completion to release the payment, or raise a dispute if something went wrong.",
    )
    .with_actions([
        Action::ConfirmCompletion(escrow_id).button("Job completed"),
        Action::Dispute(escrow_id).button("Raise a dispute"),
        Action::MainMenu.button("Main menu"),
    ])
}

pub async fn payment_done(state: &AppState, session: &mut ChatSession) -> AppResult<ChatReply> {
    if !matches!(session.context, FlowContext::Payment(_)) {
        return super::prompt(state, session).await;
    }
    session.advance_to(1);
    Ok(prompt(session))
}

/// Release the escrow on the customer's word that the job is done.
pub async fn confirm_completion(
    state: &AppState,
    session: &mut ChatSession,
    escrow_id: Uuid,
) -> AppResult<ChatReply> {
    let customer_id = match signed_in(session) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };
    let escrow = escrow_service::release(state, escrow_id, customer_id).await?;

    session.enter(FlowContext::Main);
    let paid = escrow.metadata.provider_amount.unwrap_or(escrow.amount);
    Ok(ChatReply::text(format!(
        "Payment released. Your Helpa receives {}. Thanks for using Helpa!",
        format_amount(paid)
    ))
    .with_actions([Action::MainMenu.button("Main menu")]))
}
