use uuid::Uuid;

use super::{category_actions, category_label, nav_actions, service::shortlist};
use crate::{
    engine::{
        action::Action,
        reply::{Card, ChatReply},
        session::{ChatSession, ConsultationFlowState, FlowContext},
    },
    error::AppResult,
    models::SERVICE_CATEGORIES,
    services::{notification_service, provider_service},
    state::AppState,
};

pub fn start(session: &mut ChatSession) -> ChatReply {
    session.enter(FlowContext::Consultation(ConsultationFlowState::default()));
    categories()
}

fn categories() -> ChatReply {
    ChatReply::text("Which area do you need expert advice on?")
        .with_actions(category_actions(SERVICE_CATEGORIES.iter().copied()))
        .with_actions([Action::MainMenu.button("Main menu")])
}

fn flow_state(session: &mut ChatSession) -> Option<&mut ConsultationFlowState> {
    match &mut session.context {
        FlowContext::Consultation(flow) => Some(flow),
        _ => None,
    }
}

fn experts_reply(category: &str, cards: Vec<Card>) -> ChatReply {
    ChatReply::text(format!(
        "These experts can advise you on {}:",
        category_label(category).to_lowercase()
    ))
    .with_cards(cards)
    .with_actions(nav_actions())
}

pub async fn select_category(
    state: &AppState,
    session: &mut ChatSession,
    category: &str,
) -> AppResult<ChatReply> {
    if !SERVICE_CATEGORIES.contains(&category) || session.current_step > 1 {
        return prompt(state, session).await;
    }
    let cards = shortlist(state, category, Action::BookConsult, "Consult").await?;
    if cards.is_empty() {
        return Ok(ChatReply::text(format!(
            "No experts are available for {} yet. Try another area.",
            category_label(category).to_lowercase()
        ))
        .with_actions(category_actions(SERVICE_CATEGORIES.iter().copied()))
        .with_actions([Action::MainMenu.button("Main menu")]));
    }

    if let Some(flow) = flow_state(session) {
        flow.category = Some(category.to_string());
    }
    session.advance_to(1);
    Ok(experts_reply(category, cards))
}

pub async fn book(state: &AppState, session: &mut ChatSession, service_id: Uuid) -> AppResult<ChatReply> {
    if !matches!(session.context, FlowContext::Consultation(_)) || !(1..=2).contains(&session.current_step) {
        return super::prompt(state, session).await;
    }
    let service = provider_service::get_service(state, service_id).await?;
    if let Some(flow) = flow_state(session) {
        flow.service_id = Some(service.id);
    }
    session.advance_to(2);
    Ok(question_prompt(&service.name))
}

fn question_prompt(expert: &str) -> ChatReply {
    ChatReply::text(format!("What would you like to ask {expert}?")).with_actions(nav_actions())
}

/// Forward the question to the expert and answer with a preliminary tip.
pub async fn ask(state: &AppState, session: &mut ChatSession, question: &str) -> AppResult<ChatReply> {
    let Some(service_id) = flow_state(session).and_then(|flow| flow.service_id) else {
        return prompt(state, session).await;
    };
    let service = provider_service::get_service(state, service_id).await?;

    let asker = session.customer_name.as_deref().unwrap_or("A customer");
    notification_service::notify(
        state,
        service.provider_id,
        "consultation_request",
        &format!("Consultation request: {}", service.name),
        &format!("{asker} asks: {question}"),
    )
    .await?;

    let tip = state.assistant.respond(question).await;
    tracing::debug!(session_id = %session.id, source = tip.source.label(), "consultation tip");

    if let Some(flow) = flow_state(session) {
        flow.question = Some(question.to_string());
    }
    session.advance_to(3);
    Ok(ChatReply::text(format!(
        "Your question has been sent to {}. They'll get back to you soon.\n\nIn the meantime: {}",
        service.name, tip.text
    ))
    .with_actions([Action::MainMenu.button("Main menu")]))
}

pub async fn prompt(state: &AppState, session: &mut ChatSession) -> AppResult<ChatReply> {
    let FlowContext::Consultation(flow) = session.context.clone() else {
        return Ok(categories());
    };
    match (session.current_step, flow.category, flow.service_id) {
        (1, Some(category), _) => {
            let cards = shortlist(state, &category, Action::BookConsult, "Consult").await?;
            Ok(experts_reply(&category, cards))
        }
        (2, _, Some(service_id)) => {
            let service = provider_service::get_service(state, service_id).await?;
            Ok(question_prompt(&service.name))
        }
        (3, _, _) => Ok(ChatReply::text(
            "Your question is with the expert. Anything else we can help with?",
        )
        .with_actions([Action::MainMenu.button("Main menu")])),
        _ => Ok(start(session)),
    }
}
