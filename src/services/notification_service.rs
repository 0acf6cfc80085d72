use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::Notification,
    state::AppState,
    store::{StoreExt, keys},
};

/// Append a notification for a provider. Retention is unbounded.
pub async fn notify(
    state: &AppState,
    provider_id: Uuid,
    kind: &str,
    title: &str,
    message: &str,
) -> AppResult<Notification> {
    let notification = Notification {
        id: Uuid::new_v4(),
        provider_id,
        kind: kind.to_string(),
        title: title.to_string(),
        message: message.to_string(),
        read: false,
        created_at: Utc::now(),
    };
    state
        .store
        .put_json(&keys::notification(provider_id, notification.id), &notification)
        .await?;
    tracing::debug!(%provider_id, kind, "notification stored");
    Ok(notification)
}

/// Notifications for a provider, newest first.
pub async fn list_notifications(state: &AppState, provider_id: Uuid) -> AppResult<Vec<Notification>> {
    let mut notifications: Vec<Notification> = state
        .store
        .scan_json(&keys::notifications_of_provider(provider_id))
        .await?;
    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(notifications)
}

pub async fn mark_read(state: &AppState, provider_id: Uuid, id: Uuid) -> AppResult<Notification> {
    let key = keys::notification(provider_id, id);
    let _guard = state.locks.acquire(&key).await;
    let mut notification: Notification = state
        .store
        .get_json(&key)
        .await?
        .ok_or(AppError::NotFound("notification"))?;
    if !notification.read {
        notification.read = true;
        state.store.put_json(&key, &notification).await?;
    }
    Ok(notification)
}
