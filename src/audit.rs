use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::AuditEntry,
    store::{KvStore, StoreExt, keys},
};

pub async fn log_audit(
    store: &dyn KvStore,
    actor: Option<Uuid>,
    action: &str,
    resource: Option<&str>,
    metadata: Option<Value>,
) -> AppResult<()> {
    let entry = AuditEntry {
        id: Uuid::new_v4(),
        actor,
        action: action.to_string(),
        resource: resource.map(str::to_string),
        metadata,
        created_at: Utc::now(),
    };
    store.put_json(&keys::audit(entry.id), &entry).await?;
    Ok(())
}

/// Record an audit entry; a failure is logged and never fails the caller.
pub async fn record(
    store: &dyn KvStore,
    actor: Option<Uuid>,
    action: &str,
    resource: &str,
    metadata: Value,
) {
    if let Err(err) = log_audit(store, actor, action, Some(resource), Some(metadata)).await {
        tracing::warn!(error = %err, action, "audit log failed");
    }
}
