use uuid::Uuid;

use super::{category_actions, category_label, nav_actions, payment, signed_in};
use crate::{
    dto::providers::ServiceFilters,
    engine::{
        action::Action,
        reply::{Card, ChatReply, format_amount},
        session::{ChatSession, FlowContext, PaymentFlowState, ServiceFlowState},
    },
    error::AppResult,
    models::{SERVICE_CATEGORIES, Service},
    services::{booking_service, provider_service, search_service},
    state::AppState,
};

/// Helpas shown per category.
pub(super) const SHORTLIST_SIZE: usize = 5;

pub fn start(session: &mut ChatSession) -> ChatReply {
    session.enter(FlowContext::Service(ServiceFlowState::default()));
    categories()
}

fn categories() -> ChatReply {
    ChatReply::text("What kind of help do you need? Pick a category.")
        .with_actions(category_actions(SERVICE_CATEGORIES.iter().copied()))
        .with_actions([Action::MainMenu.button("Main menu")])
}

fn flow_state(session: &mut ChatSession) -> Option<&mut ServiceFlowState> {
    match &mut session.context {
        FlowContext::Service(flow) => Some(flow),
        _ => None,
    }
}

/// Top ranked services in `category`, as cards carrying `to_action`.
pub(super) async fn shortlist(
    state: &AppState,
    category: &str,
    to_action: fn(Uuid) -> Action,
    label: &str,
) -> AppResult<Vec<Card>> {
    let services = search_service::search(state, Some(category), &ServiceFilters::default()).await?;
    Ok(services
        .into_iter()
        .take(SHORTLIST_SIZE)
        .map(|service| service_card(&service, to_action(service.id), label))
        .collect())
}

fn service_card(service: &Service, action: Action, label: &str) -> Card {
    let location = if service.location.trim().is_empty() {
        "Remote"
    } else {
        service.location.as_str()
    };
    Card {
        title: service.name.clone(),
        subtitle: format!("{location} - {} jobs done", service.completed_jobs),
        price: Some(service.price),
        rating: Some(service.rating),
        action: Some(action.button(label)),
    }
}

pub async fn select_category(
    state: &AppState,
    session: &mut ChatSession,
    category: &str,
) -> AppResult<ChatReply> {
    if !SERVICE_CATEGORIES.contains(&category) || session.current_step > 1 {
        return prompt(state, session).await;
    }
    let cards = shortlist(state, category, Action::HireHelpa, "Hire").await?;
    if cards.is_empty() {
        return Ok(ChatReply::text(format!(
            "No Helpas are available for {} yet. Try another category.",
            category_label(category).to_lowercase()
        ))
        .with_actions(category_actions(SERVICE_CATEGORIES.iter().copied()))
        .with_actions([Action::MainMenu.button("Main menu")]));
    }

    if let Some(flow) = flow_state(session) {
        flow.category = Some(category.to_string());
    }
    session.advance_to(1);
    Ok(helpas_reply(category, cards))
}

fn helpas_reply(category: &str, cards: Vec<Card>) -> ChatReply {
    ChatReply::text(format!(
        "Here are the top rated Helpas for {}:",
        category_label(category).to_lowercase()
    ))
    .with_cards(cards)
    .with_actions(nav_actions())
}

pub async fn hire(state: &AppState, session: &mut ChatSession, service_id: Uuid) -> AppResult<ChatReply> {
    if !matches!(session.context, FlowContext::Service(_)) || !(1..=2).contains(&session.current_step) {
        return super::prompt(state, session).await;
    }
    let service = provider_service::get_service(state, service_id).await?;
    if let Some(flow) = flow_state(session) {
        flow.service_id = Some(service.id);
    }
    session.advance_to(2);
    Ok(describe_prompt(&service))
}

fn describe_prompt(service: &Service) -> ChatReply {
    ChatReply::text(format!(
        "Great choice! {} charges {}. Briefly describe the job so they know what to expect.",
        service.name,
        format_amount(service.price)
    ))
    .with_actions(nav_actions())
}

pub fn describe(session: &mut ChatSession, text: &str) -> AppResult<ChatReply> {
    if let Some(flow) = flow_state(session) {
        flow.description = Some(text.to_string());
    }
    session.advance_to(3);
    Ok(ChatReply::text(format!(
        "Got it: \"{text}\". Confirm the booking and we'll hold your payment safely until the job is done."
    ))
    .with_actions([
        Action::ConfirmBooking.button("Confirm booking"),
        Action::Back.button("Back"),
        Action::MainMenu.button("Main menu"),
    ]))
}

pub async fn confirm_booking(state: &AppState, session: &mut ChatSession) -> AppResult<ChatReply> {
    let (service_id, description) = match (&session.context, session.current_step) {
        (FlowContext::Service(flow), 3) => match flow.service_id {
            Some(id) => (id, flow.description.clone()),
            None => return prompt(state, session).await,
        },
        _ => return super::prompt(state, session).await,
    };
    let customer_id = match signed_in(session) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };

    let booking = booking_service::book_service(state, customer_id, service_id, description).await?;
    tracing::info!(session_id = %session.id, escrow_id = %booking.escrow.id, "booking created from chat");

    session.enter(FlowContext::Payment(PaymentFlowState {
        escrow_id: booking.escrow.id,
        amount: booking.escrow.amount,
        checkout_url: booking.checkout_url,
    }));
    Ok(payment::prompt(session))
}

pub async fn prompt(state: &AppState, session: &mut ChatSession) -> AppResult<ChatReply> {
    let FlowContext::Service(flow) = session.context.clone() else {
        return Ok(categories());
    };
    match (session.current_step, flow.category, flow.service_id) {
        (1, Some(category), _) => {
            let cards = shortlist(state, &category, Action::HireHelpa, "Hire").await?;
            Ok(helpas_reply(&category, cards))
        }
        (2, _, Some(service_id)) => {
            let service = provider_service::get_service(state, service_id).await?;
            Ok(describe_prompt(&service))
        }
        (3, _, Some(_)) => {
            let description = flow.description.unwrap_or_default();
            describe(session, &description)
        }
        _ => Ok(start(session)),
    }
}
