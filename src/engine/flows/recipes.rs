use uuid::Uuid;

use super::{category_actions, category_label, nav_actions, signed_in};
use crate::{
    dto::cart::AddToCartRequest,
    engine::{
        action::Action,
        reply::{Card, ChatReply, format_amount},
        session::{ChatSession, FlowContext, RecipesFlowState},
    },
    error::AppResult,
    models::{Cart, MenuItem},
    services::{cart_service, catalog_service, order_service},
    state::AppState,
};

const DEFAULT_CUSTOMER_NAME: &str = "Customer";

pub async fn start(state: &AppState, session: &mut ChatSession) -> AppResult<ChatReply> {
    session.enter(FlowContext::Recipes(RecipesFlowState::default()));
    categories(state).await
}

async fn categories(state: &AppState) -> AppResult<ChatReply> {
    let categories = catalog_service::menu_categories(state).await?;
    if categories.is_empty() {
        return Ok(ChatReply::text("The kitchen is closed right now. Check back soon!")
            .with_actions([Action::MainMenu.button("Main menu")]));
    }
    Ok(ChatReply::text("Hungry? Pick something from the menu.")
        .with_actions(category_actions(categories.iter().map(String::as_str)))
        .with_actions([Action::ViewCart.button("View cart")]))
}

fn flow_state(session: &mut ChatSession) -> Option<&mut RecipesFlowState> {
    match &mut session.context {
        FlowContext::Recipes(flow) => Some(flow),
        _ => None,
    }
}

/// Switch into the recipes flow unless already there.
fn ensure_recipes(session: &mut ChatSession) {
    if !matches!(session.context, FlowContext::Recipes(_)) {
        session.enter(FlowContext::Recipes(RecipesFlowState::default()));
    }
}

fn item_card(item: &MenuItem) -> Card {
    Card {
        title: item.title.clone(),
        subtitle: item.description.clone(),
        price: Some(item.price),
        rating: Some(item.rating),
        action: Some(Action::AddToCart(item.id).button("Add to cart")),
    }
}

async fn items_reply(state: &AppState, category: &str) -> AppResult<ChatReply> {
    let cards: Vec<Card> = catalog_service::list_menu(state, Some(category))
        .await?
        .iter()
        .filter(|item| item.available)
        .map(item_card)
        .collect();
    Ok(ChatReply::text(format!("Here's our {} menu:", category_label(category).to_lowercase()))
        .with_cards(cards)
        .with_actions([Action::ViewCart.button("View cart")])
        .with_actions(nav_actions()))
}

pub async fn select_category(
    state: &AppState,
    session: &mut ChatSession,
    category: &str,
) -> AppResult<ChatReply> {
    let known = catalog_service::menu_categories(state).await?;
    if !known.iter().any(|c| c == category) || session.current_step > 1 {
        return prompt(state, session).await;
    }
    if let Some(flow) = flow_state(session) {
        flow.category = Some(category.to_string());
    }
    session.advance_to(1);
    items_reply(state, category).await
}

pub async fn add_to_cart(state: &AppState, session: &mut ChatSession, item_id: Uuid) -> AppResult<ChatReply> {
    let customer_id = match signed_in(session) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };
    let cart = cart_service::add_to_cart(
        state,
        customer_id,
        AddToCartRequest {
            menu_item_id: item_id,
            quantity: 1,
            special_instructions: None,
        },
    )
    .await?;

    ensure_recipes(session);
    session.advance_to(2);
    Ok(cart_reply(&cart, "Added to your cart."))
}

pub async fn view_cart(state: &AppState, session: &mut ChatSession) -> AppResult<ChatReply> {
    let customer_id = match signed_in(session) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };
    let cart = cart_service::get_cart(state, customer_id).await?;

    ensure_recipes(session);
    session.advance_to(2);
    Ok(cart_reply(&cart, "Your cart:"))
}

fn cart_reply(cart: &Cart, heading: &str) -> ChatReply {
    if cart.is_empty() {
        return ChatReply::text("Your cart is empty.").with_actions([
            Action::GetRecipes.button("See the menu"),
            Action::MainMenu.button("Main menu"),
        ]);
    }
    let mut text = heading.to_string();
    for line in &cart.items {
        text.push_str(&format!(
            "\n{} x{} - {}",
            line.title,
            line.quantity,
            format_amount(line.line_total())
        ));
    }
    text.push_str(&format!("\nTotal: {}", format_amount(cart.total())));
    ChatReply::text(text).with_actions([
        Action::Checkout.button("Checkout"),
        Action::GetRecipes.button("Add more"),
        Action::MainMenu.button("Main menu"),
    ])
}

pub async fn checkout(state: &AppState, session: &mut ChatSession) -> AppResult<ChatReply> {
    let customer_id = match signed_in(session) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };
    let name = session
        .customer_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CUSTOMER_NAME.to_string());

    let Some(order) = order_service::checkout(state, customer_id, &name, None).await? else {
        ensure_recipes(session);
        return Ok(cart_reply(&Cart::default(), ""));
    };

    ensure_recipes(session);
    if let Some(flow) = flow_state(session) {
        flow.last_order_id = Some(order.id);
    }
    session.advance_to(3);
    Ok(ChatReply::text(format!(
        "Order placed! {} item(s), total {}. We'll let you know when it's on the way.",
        order.items.iter().map(|line| line.quantity).sum::<u32>(),
        format_amount(order.total_amount)
    ))
    .with_actions([Action::MainMenu.button("Main menu")]))
}

pub async fn prompt(state: &AppState, session: &mut ChatSession) -> AppResult<ChatReply> {
    let FlowContext::Recipes(flow) = session.context.clone() else {
        return categories(state).await;
    };
    match (session.current_step, flow.category) {
        (0, _) | (1, None) => categories(state).await,
        (1, Some(category)) => items_reply(state, &category).await,
        (2, _) => view_cart(state, session).await,
        _ => Ok(ChatReply::text("Your order is on its way to the kitchen. Anything else?")
            .with_actions([
                Action::GetRecipes.button("Order more"),
                Action::MainMenu.button("Main menu"),
            ])),
    }
}
