mod common;

use helpa_marketplace_api::{
    engine::{self, ChatFlow, ChatReply, FlowContext, MessageRole, session::HISTORY_LIMIT},
    error::AppError,
    models::EscrowStatus,
    services::{
        cart_service, catalog_service, escrow_service, notification_service, order_service,
    },
    state::AppState,
};
use uuid::Uuid;

use common::{provider_with_service, subscribed_customer, test_state};

fn action_ids(reply: &ChatReply) -> Vec<&str> {
    reply.quick_actions.iter().map(|a| a.id.as_str()).collect()
}

// Turns are sent as the customer who started the session.
async fn owner(state: &AppState, session_id: Uuid) -> Option<Uuid> {
    engine::get_session(state, session_id)
        .await
        .expect("chat session")
        .customer_id
}

async fn act(state: &AppState, session_id: Uuid, action: &str) -> ChatReply {
    let customer_id = owner(state, session_id).await;
    engine::step(state, session_id, customer_id, None, Some(action))
        .await
        .expect("chat turn")
}

async fn say(state: &AppState, session_id: Uuid, text: &str) -> ChatReply {
    let customer_id = owner(state, session_id).await;
    engine::step(state, session_id, customer_id, Some(text), None)
        .await
        .expect("chat turn")
}

#[tokio::test]
async fn anonymous_users_browse_without_the_subscription_gate() -> anyhow::Result<()> {
    let state = test_state();
    let init = engine::init(&state, None, None).await?;
    let ids: Vec<&str> = init.quick_actions.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["SIGN_IN", "SIGN_UP", "BROWSE_SERVICES"]);

    let reply = act(&state, init.session_id, "BROWSE_SERVICES").await;
    assert!(action_ids(&reply).contains(&"SELECT_CATEGORY:plumbing"));

    let session = engine::get_session(&state, init.session_id).await?;
    assert_eq!(session.current_flow, ChatFlow::Service);
    assert_eq!(session.current_step, 0);
    Ok(())
}

#[tokio::test]
async fn unsubscribed_customers_are_sent_to_the_subscription_plan() -> anyhow::Result<()> {
    let state = test_state();
    let customer_id = Uuid::new_v4();
    let init = engine::init(&state, Some(customer_id), Some("Bola".into())).await?;
    assert!(init.welcome_text.contains("Bola"));
    assert!(init.quick_actions.iter().any(|a| a.id == "SUBSCRIBE"));

    let reply = say(&state, init.session_id, "I need a plumber").await;
    assert!(reply.text.contains("subscription"));
    assert!(action_ids(&reply).contains(&"CONFIRM_SUBSCRIBE"));
    assert_eq!(
        engine::get_session(&state, init.session_id).await?.current_flow,
        ChatFlow::Subscription
    );

    let reply = act(&state, init.session_id, "CONFIRM_SUBSCRIBE").await;
    assert!(reply.text.contains(&format!("reference={customer_id}")));
    let session = engine::get_session(&state, init.session_id).await?;
    assert_eq!(session.current_step, 1);
    Ok(())
}

#[tokio::test]
async fn flow_changes_reset_the_step_and_back_steps_down() -> anyhow::Result<()> {
    let state = test_state();
    let (_, service) = provider_with_service(&state, "cleaning", 12_000).await;
    let customer_id = subscribed_customer(&state).await;
    let init = engine::init(&state, Some(customer_id), None).await?;
    let sid = init.session_id;

    act(&state, sid, "REQUEST_SERVICE").await;
    let reply = act(&state, sid, "SELECT_CATEGORY:cleaning").await;
    assert_eq!(reply.cards.len(), 1);
    assert_eq!(
        reply.cards[0].action.as_ref().map(|a| a.id.clone()),
        Some(format!("HIRE_HELPA:{}", service.id))
    );
    act(&state, sid, &format!("HIRE_HELPA:{}", service.id)).await;
    assert_eq!(engine::get_session(&state, sid).await?.current_step, 2);

    let reply = act(&state, sid, "BACK").await;
    assert_eq!(reply.cards.len(), 1);
    assert_eq!(engine::get_session(&state, sid).await?.current_step, 1);

    act(&state, sid, "GET_RECIPES").await;
    let session = engine::get_session(&state, sid).await?;
    assert_eq!(session.current_flow, ChatFlow::Recipes);
    assert_eq!(session.current_step, 0);

    // Back from the first step lands on the main menu.
    let reply = act(&state, sid, "BACK").await;
    assert!(action_ids(&reply).contains(&"REQUEST_SERVICE"));
    assert_eq!(engine::get_session(&state, sid).await?.current_flow, ChatFlow::Main);
    Ok(())
}

#[tokio::test]
async fn booking_through_chat_holds_and_releases_payment() -> anyhow::Result<()> {
    let state = test_state();
    let (provider_id, service) = provider_with_service(&state, "plumbing", 20_000).await;
    let customer_id = subscribed_customer(&state).await;
    let sid = engine::init(&state, Some(customer_id), Some("Chidi".into())).await?.session_id;

    act(&state, sid, "REQUEST_SERVICE").await;
    act(&state, sid, "SELECT_CATEGORY:plumbing").await;
    act(&state, sid, &format!("HIRE_HELPA:{}", service.id)).await;
    // Free text while a description is expected is not classified.
    let reply = say(&state, sid, "Kitchen sink is leaking, please fix").await;
    assert!(action_ids(&reply).contains(&"CONFIRM_BOOKING"));

    let reply = act(&state, sid, "CONFIRM_BOOKING").await;
    assert!(reply.text.contains("reference="));
    let session = engine::get_session(&state, sid).await?;
    let FlowContext::Payment(payment) = session.context else {
        panic!("expected the payment flow, got {:?}", session.current_flow);
    };
    assert_eq!(payment.amount, 20_000);

    let escrow = escrow_service::get(&state, payment.escrow_id, customer_id).await?;
    assert_eq!(escrow.status, EscrowStatus::Pending);
    assert_eq!(
        escrow.metadata.description.as_deref(),
        Some("Kitchen sink is leaking, please fix")
    );
    let notifications = notification_service::list_notifications(&state, provider_id).await?;
    assert!(notifications.iter().any(|n| n.kind == "new_booking"));

    let reply = act(&state, sid, "PAYMENT_DONE").await;
    let release = format!("CONFIRM_COMPLETION:{}", escrow.id);
    assert!(action_ids(&reply).contains(&release.as_str()));

    escrow_service::lock(&state, escrow.id).await?;
    let reply = act(&state, sid, &release).await;
    assert!(reply.text.contains("19,000") || reply.text.contains("19000"));

    let escrow = escrow_service::get(&state, escrow.id, customer_id).await?;
    assert_eq!(escrow.status, EscrowStatus::Released);
    assert_eq!(escrow.metadata.commission, Some(1_000));
    assert_eq!(engine::get_session(&state, sid).await?.current_flow, ChatFlow::Main);
    Ok(())
}

#[tokio::test]
async fn rejected_turns_apologize_and_keep_the_session() -> anyhow::Result<()> {
    let state = test_state();
    let (_, service) = provider_with_service(&state, "electrical", 8_000).await;
    let customer_id = subscribed_customer(&state).await;
    let sid = engine::init(&state, Some(customer_id), None).await?.session_id;

    act(&state, sid, "REQUEST_SERVICE").await;
    act(&state, sid, "SELECT_CATEGORY:electrical").await;
    act(&state, sid, &format!("HIRE_HELPA:{}", service.id)).await;
    say(&state, sid, "Rewire the living room").await;
    act(&state, sid, "CONFIRM_BOOKING").await;
    act(&state, sid, "PAYMENT_DONE").await;
    let before = engine::get_session(&state, sid).await?;
    let FlowContext::Payment(payment) = &before.context else {
        panic!("expected the payment flow");
    };

    // The payment was never verified, so the escrow is still pending.
    let reply = act(&state, sid, &format!("CONFIRM_COMPLETION:{}", payment.escrow_id)).await;
    assert!(reply.text.starts_with("Sorry"));
    assert_eq!(action_ids(&reply), vec!["MAIN_MENU"]);

    let after = engine::get_session(&state, sid).await?;
    assert_eq!(after.current_flow, before.current_flow);
    assert_eq!(after.current_step, before.current_step);
    assert_eq!(after.context, before.context);
    Ok(())
}

#[tokio::test]
async fn disputes_can_be_raised_from_chat() -> anyhow::Result<()> {
    let state = test_state();
    let (provider_id, service) = provider_with_service(&state, "carpentry", 15_000).await;
    let customer_id = subscribed_customer(&state).await;
    let sid = engine::init(&state, Some(customer_id), None).await?.session_id;

    act(&state, sid, "REQUEST_SERVICE").await;
    act(&state, sid, "SELECT_CATEGORY:carpentry").await;
    act(&state, sid, &format!("HIRE_HELPA:{}", service.id)).await;
    say(&state, sid, "Build a bookshelf").await;
    act(&state, sid, "CONFIRM_BOOKING").await;
    let FlowContext::Payment(payment) = engine::get_session(&state, sid).await?.context else {
        panic!("expected the payment flow");
    };

    let reply = act(&state, sid, &format!("DISPUTE:{}", payment.escrow_id)).await;
    assert!(reply.text.contains("what happened"));
    let session = engine::get_session(&state, sid).await?;
    assert_eq!(session.current_flow, ChatFlow::Dispute);

    let reply = say(&state, sid, "The carpenter never showed up").await;
    assert!(reply.text.contains("dispute is open"));

    let escrow = escrow_service::get(&state, payment.escrow_id, customer_id).await?;
    assert_eq!(escrow.status, EscrowStatus::Disputed);
    assert_eq!(
        escrow.metadata.dispute_reason.as_deref(),
        Some("The carpenter never showed up")
    );
    let notifications = notification_service::list_notifications(&state, provider_id).await?;
    assert!(notifications.iter().any(|n| n.kind == "dispute_opened"));
    Ok(())
}

#[tokio::test]
async fn consultation_questions_reach_the_expert() -> anyhow::Result<()> {
    let state = test_state();
    let (provider_id, service) = provider_with_service(&state, "tutoring", 5_000).await;
    let customer_id = subscribed_customer(&state).await;
    let sid = engine::init(&state, Some(customer_id), Some("Ngozi".into())).await?.session_id;

    say(&state, sid, "I want some expert advice").await;
    act(&state, sid, "SELECT_CATEGORY:tutoring").await;
    act(&state, sid, &format!("BOOK_CONSULT:{}", service.id)).await;
    let reply = say(&state, sid, "How do I prepare for WAEC maths?").await;
    assert!(reply.text.contains("sent to"));

    let session = engine::get_session(&state, sid).await?;
    assert_eq!(session.current_flow, ChatFlow::Consultation);
    assert_eq!(session.current_step, 3);

    let notifications = notification_service::list_notifications(&state, provider_id).await?;
    let request = notifications
        .iter()
        .find(|n| n.kind == "consultation_request")
        .expect("consultation notification");
    assert!(request.message.contains("Ngozi"));
    Ok(())
}

#[tokio::test]
async fn recipes_go_from_menu_to_order() -> anyhow::Result<()> {
    let state = test_state();
    catalog_service::seed_default_menu(&state).await?;
    let customer_id = Uuid::new_v4();
    let sid = engine::init(&state, Some(customer_id), Some("Tolu".into())).await?.session_id;

    // Recipes are not behind the subscription.
    let reply = act(&state, sid, "GET_RECIPES").await;
    assert!(action_ids(&reply).contains(&"SELECT_CATEGORY:rice"));

    let reply = act(&state, sid, "SELECT_CATEGORY:rice").await;
    assert_eq!(reply.cards.len(), 2);
    let add = reply.cards[0].action.clone().expect("add to cart action");

    let reply = act(&state, sid, &add.id).await;
    assert!(action_ids(&reply).contains(&"CHECKOUT"));
    act(&state, sid, &add.id).await;
    let cart = cart_service::get_cart(&state, customer_id).await?;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 2);

    let reply = act(&state, sid, "CHECKOUT").await;
    assert!(reply.text.starts_with("Order placed!"));

    let orders = order_service::list_orders(&state, customer_id).await?;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].customer_name, "Tolu");
    assert!(cart_service::get_cart(&state, customer_id).await?.is_empty());

    let FlowContext::Recipes(flow) = engine::get_session(&state, sid).await?.context else {
        panic!("expected the recipes flow");
    };
    assert_eq!(flow.last_order_id, Some(orders[0].id));

    let reply = act(&state, sid, "CHECKOUT").await;
    assert_eq!(reply.text, "Your cart is empty.");
    Ok(())
}

#[tokio::test]
async fn unknown_input_falls_back_to_the_menu() -> anyhow::Result<()> {
    let state = test_state();
    let sid = engine::init(&state, Some(Uuid::new_v4()), None).await?.session_id;

    let reply = act(&state, sid, "DANCE_PARTY").await;
    assert!(action_ids(&reply).contains(&"REQUEST_SERVICE"));

    let reply = say(&state, sid, "what is this?").await;
    assert!(reply.text.starts_with("I can help you"));
    assert_eq!(engine::get_session(&state, sid).await?.current_flow, ChatFlow::Main);

    let missing = engine::step(&state, Uuid::new_v4(), None, Some("hi"), None).await;
    assert!(matches!(missing, Err(AppError::NotFound("chat session"))));
    Ok(())
}

#[tokio::test]
async fn history_is_capped() -> anyhow::Result<()> {
    let state = test_state();
    let sid = engine::init(&state, None, None).await?.session_id;
    for i in 0..30 {
        say(&state, sid, &format!("hello {i}")).await;
    }

    let history = engine::history(&state, sid, None).await?;
    assert_eq!(history.len(), HISTORY_LIMIT);
    let last = history.last().expect("history");
    assert_eq!(last.role, MessageRole::Bot);
    assert_eq!(history[history.len() - 2].content, "hello 29");
    Ok(())
}

#[tokio::test]
async fn signed_in_sessions_only_answer_their_customer() -> anyhow::Result<()> {
    let state = test_state();
    let (_, service) = provider_with_service(&state, "plumbing", 10_000).await;
    let customer_id = subscribed_customer(&state).await;
    let sid = engine::init(&state, Some(customer_id), None).await?.session_id;

    act(&state, sid, "REQUEST_SERVICE").await;
    act(&state, sid, "SELECT_CATEGORY:plumbing").await;
    act(&state, sid, &format!("HIRE_HELPA:{}", service.id)).await;
    say(&state, sid, "Blocked drain").await;
    act(&state, sid, "CONFIRM_BOOKING").await;
    let FlowContext::Payment(payment) = engine::get_session(&state, sid).await?.context else {
        panic!("expected the payment flow");
    };
    escrow_service::lock(&state, payment.escrow_id).await?;
    let release = format!("CONFIRM_COMPLETION:{}", payment.escrow_id);

    let attacker = Uuid::new_v4();
    let as_stranger = engine::step(&state, sid, Some(attacker), None, Some(&release)).await;
    assert!(matches!(as_stranger, Err(AppError::Forbidden(_))));
    let signed_out = engine::step(&state, sid, None, None, Some(&release)).await;
    assert!(matches!(signed_out, Err(AppError::Forbidden(_))));

    let escrow = escrow_service::get(&state, payment.escrow_id, customer_id).await?;
    assert_eq!(escrow.status, EscrowStatus::Locked);

    assert!(matches!(
        engine::history(&state, sid, None).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        engine::history(&state, sid, Some(attacker)).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(!engine::history(&state, sid, Some(customer_id)).await?.is_empty());

    // A signed-in customer does not take over an anonymous session.
    let anonymous = engine::init(&state, None, None).await?.session_id;
    engine::step(&state, anonymous, Some(attacker), Some("hi"), None).await?;
    assert_eq!(engine::get_session(&state, anonymous).await?.customer_id, None);
    say(&state, anonymous, "hello again").await;
    Ok(())
}
