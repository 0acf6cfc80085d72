use crate::engine::{
    action::Action,
    reply::{ChatReply, QuickAction},
    session::ChatSession,
};

fn menu_actions(session: &ChatSession) -> Vec<QuickAction> {
    if session.is_anonymous() {
        return vec![
            Action::SignIn.button("Sign in"),
            Action::SignUp.button("Sign up"),
            QuickAction::new("BROWSE_SERVICES", "Browse services"),
        ];
    }
    let mut actions = vec![
        Action::RequestService.button("Request a service"),
        Action::ConsultExpert.button("Consult an expert"),
        Action::GetRecipes.button("Get recipes"),
        Action::BecomeHelpa.button("Become a Helpa"),
    ];
    if !session.subscription_active {
        actions.push(Action::Subscribe.button("Subscribe"));
    }
    actions
}

pub fn welcome(session: &ChatSession) -> ChatReply {
    let greeting = match session.customer_name.as_deref() {
        Some(name) if !name.trim().is_empty() => format!("Hi {}! Welcome to Helpa.", name.trim()),
        _ => "Hi there! Welcome to Helpa.".to_string(),
    };
    let text = if session.is_anonymous() {
        format!("{greeting} Sign in to book trusted Helpas, or browse what's on offer first.")
    } else {
        format!("{greeting} What can we help you with today?")
    };
    ChatReply::text(text).with_actions(menu_actions(session))
}

pub fn main_menu(session: &ChatSession) -> ChatReply {
    ChatReply::text("What would you like to do?").with_actions(menu_actions(session))
}

pub fn help(session: &ChatSession) -> ChatReply {
    ChatReply::text(
        "I can help you hire a Helpa for a job, get advice from an expert, or order a meal. \
         Pick an option below or tell me what you need.",
    )
    .with_actions(menu_actions(session))
}

pub fn become_helpa(session: &ChatSession) -> ChatReply {
    let text = if session.is_anonymous() {
        "Earn by offering your skills on Helpa. Sign up first, then register your business profile and list your services."
    } else {
        "Earn by offering your skills on Helpa. Register your business profile in the app, add your bank details and list your services. We'll verify you and start sending bookings your way."
    };
    ChatReply::text(text).with_actions([Action::MainMenu.button("Main menu")])
}

pub fn support() -> ChatReply {
    ChatReply::text(
        "Our support team is here for you. Describe the problem in the app's help centre and we'll get back to you shortly. \
         For a problem with a booking payment you can also open a dispute.",
    )
    .with_actions([Action::MainMenu.button("Main menu")])
}

pub fn sign_in(session: &ChatSession) -> ChatReply {
    if !session.is_anonymous() {
        return ChatReply::text("You're already signed in.").with_actions(menu_actions(session));
    }
    ChatReply::text(
        "Sign in or create an account in the Helpa app, then start a new chat to pick up with your account.",
    )
    .with_actions([QuickAction::new("BROWSE_SERVICES", "Browse services")])
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn anonymous_menu_offers_sign_in() {
        let session = ChatSession::new(None, None, false);
        let reply = welcome(&session);
        assert!(reply.has_action("SIGN_IN"));
        assert!(reply.has_action("SIGN_UP"));
        assert!(reply.has_action("BROWSE_SERVICES"));
        assert!(!reply.has_action("REQUEST_SERVICE"));
    }

    #[test]
    fn subscribe_only_offered_to_unsubscribed_customers() {
        let unsubscribed = ChatSession::new(Some(Uuid::new_v4()), Some("Ada".into()), false);
        let reply = welcome(&unsubscribed);
        assert!(reply.text.contains("Ada"));
        assert!(reply.has_action("SUBSCRIBE"));

        let subscribed = ChatSession::new(Some(Uuid::new_v4()), None, true);
        let reply = main_menu(&subscribed);
        assert!(reply.has_action("REQUEST_SERVICE"));
        assert!(!reply.has_action("SUBSCRIBE"));
    }
}
