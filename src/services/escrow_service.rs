//! Escrow ledger.
//!
//! Lifecycle: `pending -> locked -> released | disputed`. A dispute may also be
//! raised while still pending. Released, disputed and refunded are terminal.
//! Every transition runs under the escrow's key lock and re-checks the stored
//! status, so a retried call can never apply twice.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    audit,
    error::{AppError, AppResult},
    models::{
        Dispute, DisputeStatus, EscrowMetadata, EscrowStatus, EscrowTransaction, Transaction,
        TransactionStatus,
    },
    services::{notification_service, provider_service, transaction_service},
    state::AppState,
    store::{StoreExt, keys},
};

pub const MIN_ESCROW_AMOUNT: i64 = 100;

/// Platform commission in percent, taken at release.
pub const COMMISSION_PERCENT: i64 = 5;

/// Split `amount` into (commission, provider share). Commission rounds half up.
pub fn split_commission(amount: i64) -> (i64, i64) {
    let commission = (i128::from(amount) * i128::from(COMMISSION_PERCENT) + 50) / 100;
    let commission = commission as i64;
    (commission, amount - commission)
}

pub async fn create(
    state: &AppState,
    customer_id: Uuid,
    provider_id: Uuid,
    amount: i64,
    metadata: EscrowMetadata,
) -> AppResult<EscrowTransaction> {
    if amount < MIN_ESCROW_AMOUNT {
        return Err(AppError::validation(format!(
            "amount must be at least {MIN_ESCROW_AMOUNT}"
        )));
    }
    if customer_id == provider_id {
        return Err(AppError::validation("cannot pay into escrow for yourself"));
    }
    provider_service::get_provider(state, provider_id).await?;

    let escrow = EscrowTransaction {
        id: Uuid::new_v4(),
        customer_id,
        provider_id,
        amount,
        status: EscrowStatus::Pending,
        metadata: EscrowMetadata {
            commission: None,
            provider_amount: None,
            dispute_reason: None,
            ..metadata
        },
        created_at: Utc::now(),
        locked_at: None,
        released_at: None,
        disputed_at: None,
    };

    state.store.put_json(&keys::escrow(escrow.id), &escrow).await?;
    state
        .store
        .put_json(&keys::escrow_by_customer(customer_id, escrow.id), &escrow.id)
        .await?;
    state
        .store
        .put_json(&keys::escrow_by_provider(provider_id, escrow.id), &escrow.id)
        .await?;

    tracing::info!(escrow_id = %escrow.id, %customer_id, %provider_id, amount, "escrow created");
    audit::record(
        state.store.as_ref(),
        Some(customer_id),
        "escrow_create",
        "escrow",
        serde_json::json!({ "escrow_id": escrow.id, "amount": amount }),
    )
    .await;

    Ok(escrow)
}

async fn load(state: &AppState, id: Uuid) -> AppResult<EscrowTransaction> {
    state
        .store
        .get_json(&keys::escrow(id))
        .await?
        .ok_or(AppError::NotFound("escrow"))
}

/// Visible to the paying customer and the provider being paid.
pub async fn get(state: &AppState, id: Uuid, requester: Uuid) -> AppResult<EscrowTransaction> {
    let escrow = load(state, id).await?;
    if escrow.customer_id != requester && escrow.provider_id != requester {
        return Err(AppError::Forbidden("not a party to this escrow".into()));
    }
    Ok(escrow)
}

/// Mark the payment as held after the gateway verified it.
pub async fn lock(state: &AppState, id: Uuid) -> AppResult<EscrowTransaction> {
    let key = keys::escrow(id);
    let _guard = state.locks.acquire(&key).await;
    let mut escrow = load(state, id).await?;

    if escrow.status != EscrowStatus::Pending {
        return Err(AppError::state(format!(
            "escrow is {} and cannot be locked",
            escrow.status
        )));
    }
    escrow.status = EscrowStatus::Locked;
    escrow.locked_at = Some(Utc::now());
    state.store.put_json(&key, &escrow).await?;

    if let Some(transaction) = linked_transaction(state, &escrow).await? {
        transaction_service::update_transaction_status(
            state,
            transaction.id,
            TransactionStatus::Escrow,
        )
        .await?;
    }

    tracing::info!(escrow_id = %id, "escrow locked");
    audit::record(
        state.store.as_ref(),
        None,
        "escrow_lock",
        "escrow",
        serde_json::json!({ "escrow_id": id }),
    )
    .await;

    Ok(escrow)
}

/// Release held funds to the provider. Only the paying customer may release,
/// and only from `locked`.
pub async fn release(
    state: &AppState,
    id: Uuid,
    requesting_customer: Uuid,
) -> AppResult<EscrowTransaction> {
    let key = keys::escrow(id);
    let _guard = state.locks.acquire(&key).await;
    let mut escrow = load(state, id).await?;

    if escrow.customer_id != requesting_customer {
        return Err(AppError::Forbidden("only the paying customer can release".into()));
    }
    if escrow.status != EscrowStatus::Locked {
        return Err(AppError::state(format!(
            "escrow is {} and cannot be released",
            escrow.status
        )));
    }

    let (commission, provider_amount) = split_commission(escrow.amount);
    escrow.metadata.commission = Some(commission);
    escrow.metadata.provider_amount = Some(provider_amount);
    escrow.status = EscrowStatus::Released;
    escrow.released_at = Some(Utc::now());
    state.store.put_json(&key, &escrow).await?;

    if let Some(transaction) = linked_transaction(state, &escrow).await? {
        transaction_service::update_transaction_status(
            state,
            transaction.id,
            TransactionStatus::Completed,
        )
        .await?;
    }
    notification_service::notify(
        state,
        escrow.provider_id,
        "payment_released",
        "Payment released",
        &format!("{provider_amount} has been released to you after commission of {commission}."),
    )
    .await?;

    tracing::info!(escrow_id = %id, commission, provider_amount, "escrow released");
    audit::record(
        state.store.as_ref(),
        Some(requesting_customer),
        "escrow_release",
        "escrow",
        serde_json::json!({ "escrow_id": id, "commission": commission, "provider_amount": provider_amount }),
    )
    .await;

    Ok(escrow)
}

/// Freeze the escrow for manual review and open a dispute record. A linked
/// provider transaction moves to `disputed` and leaves pending earnings.
pub async fn dispute(
    state: &AppState,
    id: Uuid,
    requesting_customer: Uuid,
    reason: &str,
) -> AppResult<(EscrowTransaction, Dispute)> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(AppError::validation("a dispute reason is required"));
    }

    let key = keys::escrow(id);
    let _guard = state.locks.acquire(&key).await;
    let mut escrow = load(state, id).await?;

    if escrow.customer_id != requesting_customer {
        return Err(AppError::Forbidden("only the paying customer can dispute".into()));
    }
    if !matches!(escrow.status, EscrowStatus::Pending | EscrowStatus::Locked) {
        return Err(AppError::state(format!(
            "escrow is {} and cannot be disputed",
            escrow.status
        )));
    }

    let now = Utc::now();
    escrow.status = EscrowStatus::Disputed;
    escrow.metadata.dispute_reason = Some(reason.to_string());
    escrow.disputed_at = Some(now);
    state.store.put_json(&key, &escrow).await?;

    if let Some(transaction) = linked_transaction(state, &escrow).await? {
        transaction_service::update_transaction_status(
            state,
            transaction.id,
            TransactionStatus::Disputed,
        )
        .await?;
    }

    let dispute = Dispute {
        id: Uuid::new_v4(),
        escrow_id: escrow.id,
        customer_id: escrow.customer_id,
        provider_id: escrow.provider_id,
        reason: reason.to_string(),
        status: DisputeStatus::Open,
        created_at: now,
    };
    state.store.put_json(&keys::dispute(dispute.id), &dispute).await?;

    notification_service::notify(
        state,
        escrow.provider_id,
        "dispute_opened",
        "Booking disputed",
        &format!("A customer disputed a booking: {reason}"),
    )
    .await?;

    tracing::warn!(escrow_id = %id, dispute_id = %dispute.id, "escrow disputed");
    audit::record(
        state.store.as_ref(),
        Some(requesting_customer),
        "escrow_dispute",
        "escrow",
        serde_json::json!({ "escrow_id": id, "dispute_id": dispute.id }),
    )
    .await;

    Ok((escrow, dispute))
}

pub async fn disputes_for_escrow(state: &AppState, escrow_id: Uuid) -> AppResult<Vec<Dispute>> {
    let disputes: Vec<Dispute> = state.store.scan_json(keys::DISPUTE_PREFIX).await?;
    Ok(disputes
        .into_iter()
        .filter(|d| d.escrow_id == escrow_id)
        .collect())
}

pub async fn list_for_customer(state: &AppState, customer_id: Uuid) -> AppResult<Vec<EscrowTransaction>> {
    resolve(state, &keys::escrows_of_customer(customer_id)).await
}

pub async fn list_for_provider(state: &AppState, provider_id: Uuid) -> AppResult<Vec<EscrowTransaction>> {
    resolve(state, &keys::escrows_of_provider(provider_id)).await
}

async fn resolve(state: &AppState, index_prefix: &str) -> AppResult<Vec<EscrowTransaction>> {
    let ids: Vec<Uuid> = state.store.scan_json(index_prefix).await?;
    let mut escrows = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(escrow) = state
            .store
            .get_json::<EscrowTransaction>(&keys::escrow(id))
            .await?
        {
            escrows.push(escrow);
        }
    }
    escrows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(escrows)
}

/// The still-open provider transaction booked against this escrow, if any.
async fn linked_transaction(
    state: &AppState,
    escrow: &EscrowTransaction,
) -> AppResult<Option<Transaction>> {
    let transactions = transaction_service::list_transactions(state, escrow.provider_id).await?;
    Ok(transactions
        .into_iter()
        .find(|t| t.escrow_id == Some(escrow.id) && t.status.is_open()))
}

#[cfg(test)]
mod tests {
    use super::split_commission;

    #[test]
    fn commission_is_five_percent() {
        assert_eq!(split_commission(20_000), (1_000, 19_000));
        assert_eq!(split_commission(100), (5, 95));
    }

    #[test]
    fn commission_rounds_half_up() {
        // 5% of 110 = 5.5
        assert_eq!(split_commission(110), (6, 104));
        // 5% of 109 = 5.45
        assert_eq!(split_commission(109), (5, 104));
    }

    #[test]
    fn shares_always_sum_to_amount() {
        for amount in [100, 333, 1_999, 12_345_678] {
            let (commission, provider) = split_commission(amount);
            assert_eq!(commission + provider, amount);
        }
    }
}
