use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    audit,
    error::{AppError, AppResult},
    models::Subscription,
    state::AppState,
    store::{StoreExt, keys},
};

pub const SUBSCRIPTION_DAYS: i64 = 30;

pub async fn get_subscription(state: &AppState, customer_id: Uuid) -> AppResult<Option<Subscription>> {
    Ok(state.store.get_json(&keys::subscription(customer_id)).await?)
}

/// Whether the customer has a live subscription.
///
/// An active record past its expiry is flipped to inactive and persisted
/// before answering.
pub async fn check_subscription(state: &AppState, customer_id: Uuid) -> AppResult<bool> {
    let key = keys::subscription(customer_id);
    let _guard = state.locks.acquire(&key).await;
    let Some(mut subscription) = state.store.get_json::<Subscription>(&key).await? else {
        return Ok(false);
    };
    if !subscription.active {
        return Ok(false);
    }
    if subscription.expires_at <= Utc::now() {
        subscription.active = false;
        state.store.put_json(&key, &subscription).await?;
        tracing::info!(%customer_id, "subscription expired");
        return Ok(false);
    }
    Ok(true)
}

/// Start or extend a subscription after the gateway confirmed payment.
/// A still-running subscription is extended from its current expiry.
pub async fn activate_subscription(
    state: &AppState,
    customer_id: Uuid,
    amount: i64,
) -> AppResult<Subscription> {
    if amount <= 0 {
        return Err(AppError::validation("amount must be positive"));
    }

    let key = keys::subscription(customer_id);
    let _guard = state.locks.acquire(&key).await;
    let now = Utc::now();
    let existing = state.store.get_json::<Subscription>(&key).await?;

    let starts_from = match &existing {
        Some(sub) if sub.active && sub.expires_at > now => sub.expires_at,
        _ => now,
    };
    let subscription = Subscription {
        customer_id,
        active: true,
        amount,
        created_at: existing.as_ref().map(|s| s.created_at).unwrap_or(now),
        expires_at: starts_from + Duration::days(SUBSCRIPTION_DAYS),
    };
    state.store.put_json(&key, &subscription).await?;

    audit::record(
        state.store.as_ref(),
        Some(customer_id),
        "subscription_activate",
        "subscriptions",
        serde_json::json!({ "expires_at": subscription.expires_at, "amount": amount }),
    )
    .await;

    Ok(subscription)
}
