//! Flow handlers.
//!
//! Every handler mutates the session in place and returns the reply for the
//! turn. Flow changes go through [`ChatSession::enter`]; forward movement
//! inside a flow goes through [`ChatSession::advance_to`].

mod consultation;
mod dispute;
mod menu;
mod payment;
mod recipes;
mod service;
mod subscription;

use uuid::Uuid;

use super::{
    action::Action,
    intent::{self, Intent},
    reply::{ChatReply, QuickAction},
    session::{ChatFlow, ChatSession, FlowContext},
};
use crate::{error::AppResult, state::AppState};

pub use menu::{main_menu, welcome};

/// What the user sent this turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Action(Action),
    Text(String),
    Empty,
}

impl Input {
    /// An explicit action id wins over text; unknown ids fall back to the main menu.
    pub fn from_parts(message: Option<&str>, action_id: Option<&str>) -> Self {
        if let Some(id) = action_id.map(str::trim).filter(|id| !id.is_empty()) {
            return Input::Action(Action::parse(id).unwrap_or(Action::MainMenu));
        }
        match message.map(str::trim).filter(|m| !m.is_empty()) {
            Some(text) => Input::Text(text.to_string()),
            None => Input::Empty,
        }
    }
}

pub async fn dispatch(state: &AppState, session: &mut ChatSession, input: Input) -> AppResult<ChatReply> {
    match input {
        Input::Action(action) => handle_action(state, session, action).await,
        Input::Text(text) if awaiting_text(session) => handle_text(state, session, &text).await,
        Input::Text(text) => match intent::classify(&text) {
            Intent::GeneralInquiry => {
                session.enter(FlowContext::Main);
                Ok(menu::help(session))
            }
            intent => handle_action(state, session, intent.action()).await,
        },
        Input::Empty => prompt(state, session).await,
    }
}

async fn handle_action(state: &AppState, session: &mut ChatSession, action: Action) -> AppResult<ChatReply> {
    tracing::debug!(session_id = %session.id, action = %action.id(), flow = ?session.current_flow, step = session.current_step, "chat action");
    match action {
        Action::MainMenu => {
            session.enter(FlowContext::Main);
            Ok(main_menu(session))
        }
        Action::Back => {
            if session.current_flow == ChatFlow::Main || !session.step_back() {
                session.enter(FlowContext::Main);
                return Ok(main_menu(session));
            }
            prompt(state, session).await
        }
        Action::RequestService => {
            if requires_subscription(session) {
                return Ok(subscription::gate(state, session));
            }
            Ok(service::start(session))
        }
        Action::ConsultExpert => {
            if requires_subscription(session) {
                return Ok(subscription::gate(state, session));
            }
            Ok(consultation::start(session))
        }
        Action::GetRecipes => recipes::start(state, session).await,
        Action::BecomeHelpa => {
            session.enter(FlowContext::Main);
            Ok(menu::become_helpa(session))
        }
        Action::Support => {
            session.enter(FlowContext::Main);
            Ok(menu::support())
        }
        Action::SignIn | Action::SignUp => {
            session.enter(FlowContext::Main);
            Ok(menu::sign_in(session))
        }
        Action::Subscribe => Ok(subscription::start(state, session)),
        Action::ConfirmSubscribe => subscription::confirm(state, session).await,
        Action::SelectCategory(category) => match session.current_flow {
            ChatFlow::Service => service::select_category(state, session, &category).await,
            ChatFlow::Consultation => consultation::select_category(state, session, &category).await,
            ChatFlow::Recipes => recipes::select_category(state, session, &category).await,
            _ => prompt(state, session).await,
        },
        Action::HireHelpa(service_id) => service::hire(state, session, service_id).await,
        Action::ConfirmBooking => service::confirm_booking(state, session).await,
        Action::PaymentDone => payment::payment_done(state, session).await,
        Action::ConfirmCompletion(escrow_id) => payment::confirm_completion(state, session, escrow_id).await,
        Action::Dispute(escrow_id) => dispute::start(session, escrow_id),
        Action::BookConsult(service_id) => consultation::book(state, session, service_id).await,
        Action::AddToCart(item_id) => recipes::add_to_cart(state, session, item_id).await,
        Action::ViewCart => recipes::view_cart(state, session).await,
        Action::Checkout => recipes::checkout(state, session).await,
    }
}

/// Steps that consume the next free-text message instead of classifying it.
fn awaiting_text(session: &ChatSession) -> bool {
    matches!(
        (session.current_flow, session.current_step),
        (ChatFlow::Service, 2) | (ChatFlow::Consultation, 2) | (ChatFlow::Dispute, 0)
    )
}

async fn handle_text(state: &AppState, session: &mut ChatSession, text: &str) -> AppResult<ChatReply> {
    match session.current_flow {
        ChatFlow::Service => service::describe(session, text),
        ChatFlow::Consultation => consultation::ask(state, session, text).await,
        ChatFlow::Dispute => dispute::submit_reason(state, session, text).await,
        _ => prompt(state, session).await,
    }
}

/// Re-render whatever the session is currently waiting for.
pub async fn prompt(state: &AppState, session: &mut ChatSession) -> AppResult<ChatReply> {
    match session.current_flow {
        ChatFlow::Main => Ok(main_menu(session)),
        ChatFlow::Service => service::prompt(state, session).await,
        ChatFlow::Consultation => consultation::prompt(state, session).await,
        ChatFlow::Recipes => recipes::prompt(state, session).await,
        ChatFlow::Dispute => Ok(dispute::prompt(session)),
        ChatFlow::Subscription => Ok(subscription::prompt(state, session)),
        ChatFlow::Payment => Ok(payment::prompt(session)),
    }
}

/// Anonymous sessions bypass the gate; the flag is the one cached at init.
fn requires_subscription(session: &ChatSession) -> bool {
    session.customer_id.is_some() && !session.subscription_active
}

/// The signed-in customer, or a reply asking the user to sign in first.
fn signed_in(session: &ChatSession) -> Result<Uuid, ChatReply> {
    session.customer_id.ok_or_else(|| {
        ChatReply::text("Please sign in to continue. You can keep browsing in the meantime.")
            .with_actions([
                Action::SignIn.button("Sign in"),
                Action::SignUp.button("Sign up"),
                Action::MainMenu.button("Main menu"),
            ])
    })
}

fn nav_actions() -> [QuickAction; 2] {
    [Action::Back.button("Back"), Action::MainMenu.button("Main menu")]
}

/// "tech_support" -> "Tech support".
fn category_label(category: &str) -> String {
    let spaced = category.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn category_actions<'a>(categories: impl IntoIterator<Item = &'a str>) -> Vec<QuickAction> {
    categories
        .into_iter()
        .map(|category| Action::SelectCategory(category.to_string()).button(category_label(category)))
        .collect()
}
