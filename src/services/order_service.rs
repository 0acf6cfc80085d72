use chrono::Utc;
use uuid::Uuid;

use crate::{
    audit,
    error::{AppError, AppResult},
    models::{Cart, DeliveryInfo, Order, OrderStatus},
    state::AppState,
    store::{StoreExt, keys},
};

/// Snapshot the cart into an order and clear it.
///
/// Returns `None` for an empty cart without touching any state. The order's
/// total is computed here once and never recomputed.
pub async fn checkout(
    state: &AppState,
    customer_id: Uuid,
    customer_name: &str,
    delivery: Option<DeliveryInfo>,
) -> AppResult<Option<Order>> {
    let cart_key = keys::cart(customer_id);
    let _guard = state.locks.acquire(&cart_key).await;

    let cart: Cart = state.store.get_json(&cart_key).await?.unwrap_or_default();
    if cart.is_empty() {
        return Ok(None);
    }
    if let Some(delivery) = &delivery {
        validate_delivery(delivery)?;
    }

    let now = Utc::now();
    let order = Order {
        id: Uuid::new_v4(),
        customer_id,
        customer_name: customer_name.to_string(),
        total_amount: cart.total(),
        items: cart.items,
        status: OrderStatus::Pending,
        delivery,
        created_at: now,
        updated_at: now,
    };

    state.store.put_json(&keys::order(order.id), &order).await?;
    state
        .store
        .put_json(&keys::order_by_customer(customer_id, order.id), &order.id)
        .await?;
    state.store.delete(&cart_key).await?;

    tracing::info!(order_id = %order.id, %customer_id, total = order.total_amount, "order created");
    audit::record(
        state.store.as_ref(),
        Some(customer_id),
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "total_amount": order.total_amount }),
    )
    .await;

    Ok(Some(order))
}

pub async fn list_orders(state: &AppState, customer_id: Uuid) -> AppResult<Vec<Order>> {
    let ids: Vec<Uuid> = state
        .store
        .scan_json(&keys::orders_of_customer(customer_id))
        .await?;
    let mut orders = Vec::with_capacity(ids.len());
    for id in ids {
        // Pointer without its record: the order write never completed.
        if let Some(order) = state.store.get_json::<Order>(&keys::order(id)).await? {
            orders.push(order);
        }
    }
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(orders)
}

pub async fn get_order(state: &AppState, customer_id: Uuid, id: Uuid) -> AppResult<Order> {
    match state.store.get_json::<Order>(&keys::order(id)).await? {
        Some(order) if order.customer_id == customer_id => Ok(order),
        _ => Err(AppError::NotFound("order")),
    }
}

/// Set the status of one of the customer's orders. Any status may follow any other.
pub async fn update_order_status(
    state: &AppState,
    actor: Uuid,
    id: Uuid,
    status: OrderStatus,
) -> AppResult<Order> {
    let key = keys::order(id);
    let _guard = state.locks.acquire(&key).await;
    let mut order: Order = state
        .store
        .get_json(&key)
        .await?
        .ok_or(AppError::NotFound("order"))?;
    if order.customer_id != actor {
        return Err(AppError::NotFound("order"));
    }

    let previous = order.status;
    order.status = status;
    order.updated_at = Utc::now();
    state.store.put_json(&key, &order).await?;

    audit::record(
        state.store.as_ref(),
        Some(actor),
        "order_status",
        "orders",
        serde_json::json!({ "order_id": id, "from": previous, "to": status }),
    )
    .await;

    Ok(order)
}

fn validate_delivery(delivery: &DeliveryInfo) -> AppResult<()> {
    if delivery.address.trim().is_empty() {
        return Err(AppError::validation("delivery address is required"));
    }
    if let Some(phone) = &delivery.phone {
        if !is_valid_phone(phone) {
            return Err(AppError::validation("phone number is malformed"));
        }
    }
    Ok(())
}

pub(crate) fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}
