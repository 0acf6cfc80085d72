use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use uuid::Uuid;

use crate::{
    audit,
    dto::providers::{ProviderAnalytics, ServiceEarnings},
    error::{AppError, AppResult},
    models::{Provider, Service, Transaction, TransactionStatus},
    services::provider_service,
    state::AppState,
    store::{StoreExt, keys},
};

pub async fn record_transaction(
    state: &AppState,
    provider_id: Uuid,
    service_id: Uuid,
    customer_id: Uuid,
    amount: i64,
    escrow_id: Option<Uuid>,
) -> AppResult<Transaction> {
    if amount <= 0 {
        return Err(AppError::validation("amount must be positive"));
    }

    let now = Utc::now();
    let transaction = Transaction {
        id: Uuid::new_v4(),
        provider_id,
        service_id,
        customer_id,
        amount,
        status: TransactionStatus::Pending,
        escrow_id,
        created_at: now,
        updated_at: now,
    };

    let provider_key = keys::provider(provider_id);
    let _guard = state.locks.acquire(&provider_key).await;
    let mut provider = provider_service::get_provider(state, provider_id).await?;

    state
        .store
        .put_json(&keys::transaction_owner(transaction.id), &provider_id)
        .await?;
    state
        .store
        .put_json(&keys::transaction(provider_id, transaction.id), &transaction)
        .await?;
    provider.pending_earnings += amount;
    provider.updated_at = now;
    state.store.put_json(&provider_key, &provider).await?;

    tracing::info!(transaction_id = %transaction.id, %provider_id, amount, "transaction recorded");
    Ok(transaction)
}

pub async fn get_transaction(state: &AppState, id: Uuid) -> AppResult<Transaction> {
    let provider_id: Uuid = state
        .store
        .get_json(&keys::transaction_owner(id))
        .await?
        .ok_or(AppError::NotFound("transaction"))?;
    state
        .store
        .get_json(&keys::transaction(provider_id, id))
        .await?
        .ok_or(AppError::NotFound("transaction"))
}

/// Move a transaction to `status` and settle provider earnings accordingly.
///
/// Completion moves the amount from pending to total earnings. Completed,
/// refunded and cancelled are terminal; repeating the current status is a no-op.
pub async fn update_transaction_status(
    state: &AppState,
    id: Uuid,
    status: TransactionStatus,
) -> AppResult<Transaction> {
    let current = get_transaction(state, id).await?;
    let txn_key = keys::transaction(current.provider_id, id);
    let _txn_guard = state.locks.acquire(&txn_key).await;
    let mut transaction: Transaction = state
        .store
        .get_json(&txn_key)
        .await?
        .ok_or(AppError::NotFound("transaction"))?;

    if transaction.status == status {
        return Ok(transaction);
    }
    if !transaction.status.is_open() {
        return Err(AppError::state(format!(
            "transaction is {} and cannot become {}",
            transaction.status.as_str(),
            status.as_str()
        )));
    }

    let now = Utc::now();
    let provider_key = keys::provider(transaction.provider_id);
    {
        let _provider_guard = state.locks.acquire(&provider_key).await;
        let mut provider: Provider =
            provider_service::get_provider(state, transaction.provider_id).await?;
        match status {
            TransactionStatus::Completed => {
                provider.total_earnings += transaction.amount;
                provider.pending_earnings -= transaction.amount;
                provider.completed_jobs += 1;
            }
            TransactionStatus::Refunded
            | TransactionStatus::Cancelled
            | TransactionStatus::Disputed => {
                provider.pending_earnings -= transaction.amount;
            }
            TransactionStatus::Pending | TransactionStatus::Escrow => {}
        }
        provider.updated_at = now;
        transaction.status = status;
        transaction.updated_at = now;
        // Ledger row first: a retry after a crash then sees the new status and stops.
        state.store.put_json(&txn_key, &transaction).await?;
        state.store.put_json(&provider_key, &provider).await?;
    }

    if status == TransactionStatus::Completed {
        bump_service_jobs(state, transaction.service_id).await?;
    }

    audit::record(
        state.store.as_ref(),
        Some(transaction.provider_id),
        "transaction_status",
        "transactions",
        serde_json::json!({ "transaction_id": id, "status": status }),
    )
    .await;

    Ok(transaction)
}

/// Status change requested by the provider itself. Transactions booked
/// against an escrow are settled only by the escrow ledger.
pub async fn update_own_transaction(
    state: &AppState,
    provider_id: Uuid,
    id: Uuid,
    status: TransactionStatus,
) -> AppResult<Transaction> {
    let current = get_transaction(state, id).await?;
    if current.provider_id != provider_id {
        return Err(AppError::NotFound("transaction"));
    }
    if current.escrow_id.is_some() {
        return Err(AppError::state(
            "transaction is settled through its escrow and cannot be changed directly",
        ));
    }
    if matches!(status, TransactionStatus::Escrow | TransactionStatus::Disputed) {
        return Err(AppError::validation(format!(
            "{} is set by the escrow ledger",
            status.as_str()
        )));
    }
    update_transaction_status(state, id, status).await
}

async fn bump_service_jobs(state: &AppState, service_id: Uuid) -> AppResult<()> {
    let key = keys::service(service_id);
    let _guard = state.locks.acquire(&key).await;
    if let Some(mut service) = state.store.get_json::<Service>(&key).await? {
        service.completed_jobs += 1;
        state.store.put_json(&key, &service).await?;
    }
    Ok(())
}

/// Transactions of a provider, newest first.
pub async fn list_transactions(state: &AppState, provider_id: Uuid) -> AppResult<Vec<Transaction>> {
    let mut transactions: Vec<Transaction> = state
        .store
        .scan_json(&keys::transactions_of_provider(provider_id))
        .await?;
    transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(transactions)
}

/// Per-service earnings derived from the transaction history on every call.
pub async fn analytics(state: &AppState, provider_id: Uuid) -> AppResult<ProviderAnalytics> {
    let provider = provider_service::get_provider(state, provider_id).await?;
    let transactions = list_transactions(state, provider_id).await?;
    let services = provider_service::list_provider_services(state, provider_id).await?;
    let names: HashMap<Uuid, String> = services.into_iter().map(|s| (s.id, s.name)).collect();

    Ok(ProviderAnalytics {
        provider_id,
        total_earnings: provider.total_earnings,
        pending_earnings: provider.pending_earnings,
        completed_jobs: provider.completed_jobs,
        rating: provider.rating,
        total_reviews: provider.total_reviews,
        transaction_count: transactions.len(),
        status_counts: status_counts(&transactions),
        services: earnings_by_service(&transactions, &names),
    })
}

fn status_counts(transactions: &[Transaction]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for transaction in transactions {
        *counts.entry(transaction.status.as_str().to_string()).or_insert(0) += 1;
    }
    counts
}

fn earnings_by_service(
    transactions: &[Transaction],
    names: &HashMap<Uuid, String>,
) -> Vec<ServiceEarnings> {
    let mut by_service: HashMap<Uuid, ServiceEarnings> = HashMap::new();
    for transaction in transactions {
        let entry = by_service
            .entry(transaction.service_id)
            .or_insert_with(|| ServiceEarnings {
                service_id: transaction.service_id,
                service_name: names
                    .get(&transaction.service_id)
                    .cloned()
                    .unwrap_or_else(|| "Removed service".to_string()),
                earnings: 0,
                completed_jobs: 0,
                pending_amount: 0,
            });
        match transaction.status {
            TransactionStatus::Completed => {
                entry.earnings += transaction.amount;
                entry.completed_jobs += 1;
            }
            status if status.is_open() => entry.pending_amount += transaction.amount,
            _ => {}
        }
    }

    let mut rows: Vec<ServiceEarnings> = by_service.into_values().collect();
    rows.sort_by(|a, b| b.earnings.cmp(&a.earnings).then_with(|| a.service_name.cmp(&b.service_name)));
    rows
}
