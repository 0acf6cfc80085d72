use chrono::Utc;
use uuid::Uuid;

use crate::{
    audit,
    dto::providers::{
        CreateServiceRequest, RegisterProviderRequest, UpdateProviderRequest, UpdateServiceRequest,
    },
    error::{AppError, AppResult},
    models::{BankDetails, Provider, Service, VerificationStatus, is_service_category},
    state::AppState,
    store::{StoreExt, keys},
};

pub async fn register(
    state: &AppState,
    customer_id: Uuid,
    payload: RegisterProviderRequest,
) -> AppResult<Provider> {
    let business_name = payload.business_name.trim();
    if business_name.is_empty() {
        return Err(AppError::validation("business_name is required"));
    }
    if let Some(bank) = &payload.bank_details {
        validate_bank_details(bank)?;
    }

    let key = keys::provider(customer_id);
    let _guard = state.locks.acquire(&key).await;
    if state.store.get(&key).await?.is_some() {
        return Err(AppError::validation("provider profile already exists"));
    }

    let now = Utc::now();
    let provider = Provider {
        user_id: customer_id,
        business_name: business_name.to_string(),
        account_type: payload.account_type,
        verification_status: VerificationStatus::Pending,
        bio: payload.bio,
        services: Vec::new(),
        total_earnings: 0,
        pending_earnings: 0,
        completed_jobs: 0,
        rating: 0.0,
        total_reviews: 0,
        bank_details: payload.bank_details,
        verification_document: None,
        created_at: now,
        updated_at: now,
    };
    state.store.put_json(&key, &provider).await?;

    tracing::info!(provider_id = %customer_id, "provider registered");
    audit::record(
        state.store.as_ref(),
        Some(customer_id),
        "provider_register",
        "providers",
        serde_json::json!({ "provider_id": customer_id }),
    )
    .await;

    Ok(provider)
}

pub async fn get_provider(state: &AppState, provider_id: Uuid) -> AppResult<Provider> {
    state
        .store
        .get_json(&keys::provider(provider_id))
        .await?
        .ok_or(AppError::NotFound("provider"))
}

pub async fn update_profile(
    state: &AppState,
    provider_id: Uuid,
    payload: UpdateProviderRequest,
) -> AppResult<Provider> {
    if let Some(bank) = &payload.bank_details {
        validate_bank_details(bank)?;
    }

    let key = keys::provider(provider_id);
    let _guard = state.locks.acquire(&key).await;
    let mut provider = get_provider(state, provider_id).await?;

    if let Some(name) = payload.business_name {
        if name.trim().is_empty() {
            return Err(AppError::validation("business_name must not be empty"));
        }
        provider.business_name = name.trim().to_string();
    }
    if let Some(bio) = payload.bio {
        provider.bio = bio;
    }
    if let Some(bank) = payload.bank_details {
        provider.bank_details = Some(bank);
    }
    if let Some(document) = payload.verification_document {
        provider.verification_document = Some(document);
        provider.verification_status = VerificationStatus::Pending;
    }
    provider.updated_at = Utc::now();
    state.store.put_json(&key, &provider).await?;

    Ok(provider)
}

pub async fn create_service(
    state: &AppState,
    provider_id: Uuid,
    payload: CreateServiceRequest,
) -> AppResult<Service> {
    let category = payload.category.trim().to_lowercase();
    if !is_service_category(&category) {
        return Err(AppError::validation(format!("unknown category {category}")));
    }
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("name is required"));
    }
    if payload.price < 0 {
        return Err(AppError::validation("price must not be negative"));
    }

    let provider_key = keys::provider(provider_id);
    let _guard = state.locks.acquire(&provider_key).await;
    let mut provider = get_provider(state, provider_id).await?;

    let now = Utc::now();
    let service = Service {
        id: Uuid::new_v4(),
        provider_id,
        category: category.clone(),
        name: payload.name.trim().to_string(),
        description: payload.description,
        price: payload.price,
        price_type: payload.price_type,
        availability: payload.availability,
        location: payload.location,
        tags: payload.tags,
        rating: provider.rating,
        completed_jobs: 0,
        created_at: now,
        updated_at: now,
    };

    // Primary record first so index pointers never precede it.
    state.store.put_json(&keys::service(service.id), &service).await?;
    provider.services.push(service.id);
    provider.updated_at = now;
    state.store.put_json(&provider_key, &provider).await?;
    state
        .store
        .put_json(&keys::service_category(&category, service.id), &service.id)
        .await?;

    tracing::info!(service_id = %service.id, %provider_id, category = %category, "service created");
    audit::record(
        state.store.as_ref(),
        Some(provider_id),
        "service_create",
        "services",
        serde_json::json!({ "service_id": service.id }),
    )
    .await;

    Ok(service)
}

pub async fn get_service(state: &AppState, id: Uuid) -> AppResult<Service> {
    state
        .store
        .get_json(&keys::service(id))
        .await?
        .ok_or(AppError::NotFound("service"))
}

pub async fn list_provider_services(state: &AppState, provider_id: Uuid) -> AppResult<Vec<Service>> {
    let provider = get_provider(state, provider_id).await?;
    let mut services = Vec::with_capacity(provider.services.len());
    for id in provider.services {
        if let Some(service) = state.store.get_json::<Service>(&keys::service(id)).await? {
            services.push(service);
        }
    }
    Ok(services)
}

pub async fn update_service(
    state: &AppState,
    provider_id: Uuid,
    id: Uuid,
    payload: UpdateServiceRequest,
) -> AppResult<Service> {
    // Provider lock first, as in delete_service, then the record itself.
    let _provider_guard = state.locks.acquire(&keys::provider(provider_id)).await;
    let key = keys::service(id);
    let _guard = state.locks.acquire(&key).await;
    let mut service = get_service(state, id).await?;
    if service.provider_id != provider_id {
        return Err(AppError::Forbidden("service belongs to another provider".into()));
    }

    if let Some(name) = payload.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("name is required"));
        }
        service.name = name.to_string();
    }
    if let Some(description) = payload.description {
        service.description = description;
    }
    if let Some(price) = payload.price {
        if price < 0 {
            return Err(AppError::validation("price must not be negative"));
        }
        service.price = price;
    }
    if let Some(price_type) = payload.price_type {
        service.price_type = price_type;
    }
    if let Some(availability) = payload.availability {
        service.availability = availability;
    }
    if let Some(location) = payload.location {
        service.location = location;
    }
    if let Some(tags) = payload.tags {
        service.tags = tags;
    }
    service.updated_at = Utc::now();
    state.store.put_json(&key, &service).await?;

    Ok(service)
}

pub async fn delete_service(state: &AppState, provider_id: Uuid, id: Uuid) -> AppResult<()> {
    let provider_key = keys::provider(provider_id);
    let _guard = state.locks.acquire(&provider_key).await;
    let _service_guard = state.locks.acquire(&keys::service(id)).await;
    let service = get_service(state, id).await?;
    if service.provider_id != provider_id {
        return Err(AppError::Forbidden("service belongs to another provider".into()));
    }

    // Index pointers go first so a partial delete never leaves a visible dangling entry.
    state
        .store
        .delete(&keys::service_category(&service.category, id))
        .await?;
    let mut provider = get_provider(state, provider_id).await?;
    provider.services.retain(|sid| *sid != id);
    provider.updated_at = Utc::now();
    state.store.put_json(&provider_key, &provider).await?;
    state.store.delete(&keys::service(id)).await?;

    audit::record(
        state.store.as_ref(),
        Some(provider_id),
        "service_delete",
        "services",
        serde_json::json!({ "service_id": id }),
    )
    .await;

    Ok(())
}

fn validate_bank_details(bank: &BankDetails) -> AppResult<()> {
    if bank.bank_name.trim().is_empty() || bank.account_name.trim().is_empty() {
        return Err(AppError::validation("bank_name and account_name are required"));
    }
    if bank.account_number.len() != 10 || !bank.account_number.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::validation("account_number must be 10 digits"));
    }
    Ok(())
}
