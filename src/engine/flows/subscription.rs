use uuid::Uuid;

use super::signed_in;
use crate::{
    engine::{
        action::Action,
        reply::{ChatReply, format_amount},
        session::{ChatFlow, ChatSession, FlowContext},
    },
    error::AppResult,
    services::{booking_service, subscription_service::SUBSCRIPTION_DAYS},
    state::AppState,
};

fn plan(state: &AppState, heading: &str) -> ChatReply {
    ChatReply::text(format!(
        "{heading}Helpa Premium costs {} for {SUBSCRIPTION_DAYS} days and unlocks bookings with verified Helpas and expert consultations.",
        format_amount(state.config.subscription_price)
    ))
    .with_actions([
        Action::ConfirmSubscribe.button("Subscribe now"),
        Action::MainMenu.button("Maybe later"),
    ])
}

/// Shown instead of a gated flow to signed-in customers without a subscription.
pub fn gate(state: &AppState, session: &mut ChatSession) -> ChatReply {
    session.enter(FlowContext::Subscription);
    plan(state, "You need an active subscription for that. ")
}

pub fn start(state: &AppState, session: &mut ChatSession) -> ChatReply {
    if session.subscription_active {
        session.enter(FlowContext::Main);
        return ChatReply::text("Your subscription is already active.").with_actions([
            Action::RequestService.button("Request a service"),
            Action::MainMenu.button("Main menu"),
        ]);
    }
    session.enter(FlowContext::Subscription);
    plan(state, "")
}

pub async fn confirm(state: &AppState, session: &mut ChatSession) -> AppResult<ChatReply> {
    if session.current_flow != ChatFlow::Subscription {
        return super::prompt(state, session).await;
    }
    let customer_id = match signed_in(session) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };
    session.advance_to(1);
    Ok(checkout(state, customer_id))
}

fn checkout(state: &AppState, customer_id: Uuid) -> ChatReply {
    ChatReply::text(format!(
        "Complete your payment of {} here: {}\nYour subscription starts as soon as the payment is confirmed. Start a new chat afterwards to use it.",
        format_amount(state.config.subscription_price),
        booking_service::checkout_url(state, customer_id)
    ))
    .with_actions([Action::MainMenu.button("Main menu")])
}

pub fn prompt(state: &AppState, session: &ChatSession) -> ChatReply {
    match (session.current_step, session.customer_id) {
        (1.., Some(customer_id)) => checkout(state, customer_id),
        _ => plan(state, ""),
    }
}
