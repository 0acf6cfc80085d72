use chrono::Utc;
use uuid::Uuid;

use crate::{
    audit,
    dto::cart::AddToCartRequest,
    error::{AppError, AppResult},
    models::{Cart, CartItem},
    services::catalog_service,
    state::AppState,
    store::{StoreExt, keys},
};

pub async fn get_cart(state: &AppState, customer_id: Uuid) -> AppResult<Cart> {
    Ok(state
        .store
        .get_json(&keys::cart(customer_id))
        .await?
        .unwrap_or_default())
}

/// Upper bound for the quantity of a single cart line.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// Add an item, merging with an existing line for the same menu item.
pub async fn add_to_cart(
    state: &AppState,
    customer_id: Uuid,
    payload: AddToCartRequest,
) -> AppResult<Cart> {
    if payload.quantity == 0 {
        return Err(AppError::validation("quantity must be greater than 0"));
    }
    if payload.quantity > MAX_LINE_QUANTITY {
        return Err(AppError::validation(format!(
            "at most {MAX_LINE_QUANTITY} of one item per cart"
        )));
    }
    let item = catalog_service::get_menu_item(state, payload.menu_item_id).await?;
    if !item.available {
        return Err(AppError::validation(format!(
            "{} is currently unavailable",
            item.title
        )));
    }

    let key = keys::cart(customer_id);
    let _guard = state.locks.acquire(&key).await;
    let mut cart = get_cart(state, customer_id).await?;

    match cart
        .items
        .iter_mut()
        .find(|line| line.menu_item_id == payload.menu_item_id)
    {
        Some(line) => {
            line.quantity = line
                .quantity
                .checked_add(payload.quantity)
                .filter(|quantity| *quantity <= MAX_LINE_QUANTITY)
                .ok_or_else(|| {
                    AppError::validation(format!("at most {MAX_LINE_QUANTITY} of one item per cart"))
                })?;
            if payload.special_instructions.is_some() {
                line.special_instructions = payload.special_instructions.clone();
            }
        }
        None => cart.items.push(CartItem {
            menu_item_id: item.id,
            title: item.title.clone(),
            price: item.price,
            quantity: payload.quantity,
            special_instructions: payload.special_instructions.clone(),
        }),
    }
    cart.updated_at = Some(Utc::now());
    state.store.put_json(&key, &cart).await?;

    audit::record(
        state.store.as_ref(),
        Some(customer_id),
        "cart_update",
        "cart",
        serde_json::json!({ "menu_item_id": payload.menu_item_id, "quantity": payload.quantity }),
    )
    .await;

    Ok(cart)
}

pub async fn remove_from_cart(
    state: &AppState,
    customer_id: Uuid,
    menu_item_id: Uuid,
) -> AppResult<Cart> {
    let key = keys::cart(customer_id);
    let _guard = state.locks.acquire(&key).await;
    let mut cart = get_cart(state, customer_id).await?;

    let before = cart.items.len();
    cart.items.retain(|line| line.menu_item_id != menu_item_id);
    if cart.items.len() == before {
        return Err(AppError::NotFound("cart item"));
    }
    cart.updated_at = Some(Utc::now());
    state.store.put_json(&key, &cart).await?;

    audit::record(
        state.store.as_ref(),
        Some(customer_id),
        "cart_remove",
        "cart",
        serde_json::json!({ "menu_item_id": menu_item_id }),
    )
    .await;

    Ok(cart)
}

pub async fn clear_cart(state: &AppState, customer_id: Uuid) -> AppResult<()> {
    let key = keys::cart(customer_id);
    let _guard = state.locks.acquire(&key).await;
    state.store.delete(&key).await?;
    Ok(())
}
