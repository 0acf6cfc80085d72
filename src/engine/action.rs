use uuid::Uuid;

use super::reply::QuickAction;

/// Discrete actions a client can send instead of free text.
///
/// Parameterized actions travel as `VERB:payload`, e.g. `HIRE_HELPA:<id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    MainMenu,
    Back,
    RequestService,
    ConsultExpert,
    GetRecipes,
    BecomeHelpa,
    Subscribe,
    ConfirmSubscribe,
    Support,
    SignIn,
    SignUp,
    ViewCart,
    Checkout,
    ConfirmBooking,
    PaymentDone,
    SelectCategory(String),
    HireHelpa(Uuid),
    BookConsult(Uuid),
    AddToCart(Uuid),
    ConfirmCompletion(Uuid),
    Dispute(Uuid),
}

impl Action {
    pub fn parse(raw: &str) -> Option<Action> {
        let raw = raw.trim();
        if let Some((verb, payload)) = raw.split_once(':') {
            let payload = payload.trim();
            if payload.is_empty() {
                return None;
            }
            let id = || Uuid::parse_str(payload).ok();
            return match verb {
                "SELECT_CATEGORY" => Some(Action::SelectCategory(payload.to_lowercase())),
                "HIRE_HELPA" => id().map(Action::HireHelpa),
                "BOOK_CONSULT" => id().map(Action::BookConsult),
                "ADD_TO_CART" => id().map(Action::AddToCart),
                "CONFIRM_COMPLETION" => id().map(Action::ConfirmCompletion),
                "DISPUTE" => id().map(Action::Dispute),
                _ => None,
            };
        }

        Some(match raw {
            "MAIN_MENU" => Action::MainMenu,
            "BACK" => Action::Back,
            "REQUEST_SERVICE" | "BROWSE_SERVICES" => Action::RequestService,
            "CONSULT_EXPERT" => Action::ConsultExpert,
            "GET_RECIPES" => Action::GetRecipes,
            "BECOME_HELPA" => Action::BecomeHelpa,
            "SUBSCRIBE" => Action::Subscribe,
            "CONFIRM_SUBSCRIBE" => Action::ConfirmSubscribe,
            "SUPPORT" => Action::Support,
            "SIGN_IN" => Action::SignIn,
            "SIGN_UP" => Action::SignUp,
            "VIEW_CART" => Action::ViewCart,
            "CHECKOUT" => Action::Checkout,
            "CONFIRM_BOOKING" => Action::ConfirmBooking,
            "PAYMENT_DONE" => Action::PaymentDone,
            _ => return None,
        })
    }

    pub fn id(&self) -> String {
        match self {
            Action::MainMenu => "MAIN_MENU".into(),
            Action::Back => "BACK".into(),
            Action::RequestService => "REQUEST_SERVICE".into(),
            Action::ConsultExpert => "CONSULT_EXPERT".into(),
            Action::GetRecipes => "GET_RECIPES".into(),
            Action::BecomeHelpa => "BECOME_HELPA".into(),
            Action::Subscribe => "SUBSCRIBE".into(),
            Action::ConfirmSubscribe => "CONFIRM_SUBSCRIBE".into(),
            Action::Support => "SUPPORT".into(),
            Action::SignIn => "SIGN_IN".into(),
            Action::SignUp => "SIGN_UP".into(),
            Action::ViewCart => "VIEW_CART".into(),
            Action::Checkout => "CHECKOUT".into(),
            Action::ConfirmBooking => "CONFIRM_BOOKING".into(),
            Action::PaymentDone => "PAYMENT_DONE".into(),
            Action::SelectCategory(category) => format!("SELECT_CATEGORY:{category}"),
            Action::HireHelpa(id) => format!("HIRE_HELPA:{id}"),
            Action::BookConsult(id) => format!("BOOK_CONSULT:{id}"),
            Action::AddToCart(id) => format!("ADD_TO_CART:{id}"),
            Action::ConfirmCompletion(id) => format!("CONFIRM_COMPLETION:{id}"),
            Action::Dispute(id) => format!("DISPUTE:{id}"),
        }
    }

    pub fn button(&self, label: impl Into<String>) -> QuickAction {
        QuickAction::new(self.id(), label)
    }
}
