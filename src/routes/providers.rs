use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::providers::{
        CreateServiceRequest, NotificationList, ProviderAnalytics, RegisterProviderRequest,
        ServiceList, TransactionList, UpdateProviderRequest, UpdateServiceRequest,
        UpdateTransactionRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Notification, Provider, Service, Transaction},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{notification_service, provider_service, transaction_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register_provider))
        .route("/me", get(my_profile).patch(update_profile))
        .route("/me/services", get(my_services).post(create_service))
        .route(
            "/me/services/{id}",
            patch(update_service).delete(delete_service),
        )
        .route("/me/analytics", get(analytics))
        .route("/me/transactions", get(list_transactions))
        .route("/me/transactions/{id}", patch(update_transaction))
        .route("/me/notifications", get(list_notifications))
        .route("/me/notifications/{id}/read", post(mark_notification_read))
        .route("/{id}", get(get_provider))
}

#[utoipa::path(
    post,
    path = "/api/providers",
    request_body = RegisterProviderRequest,
    responses(
        (status = 200, description = "Provider profile created, pending verification", body = ApiResponse<Provider>),
        (status = 400, description = "Invalid details or profile already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Providers"
)]
pub async fn register_provider(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RegisterProviderRequest>,
) -> AppResult<Json<ApiResponse<Provider>>> {
    let provider = provider_service::register(&state, user.customer_id, payload).await?;
    Ok(Json(ApiResponse::success("Provider registered", provider, None)))
}

#[utoipa::path(
    get,
    path = "/api/providers/me",
    responses(
        (status = 200, description = "Own provider profile", body = ApiResponse<Provider>),
        (status = 404, description = "Not registered as a provider"),
    ),
    security(("bearer_auth" = [])),
    tag = "Providers"
)]
pub async fn my_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Provider>>> {
    let provider = provider_service::get_provider(&state, user.customer_id).await?;
    Ok(Json(ApiResponse::ok(provider)))
}

#[utoipa::path(
    patch,
    path = "/api/providers/me",
    request_body = UpdateProviderRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<Provider>),
        (status = 400, description = "Bad request"),
    ),
    security(("bearer_auth" = [])),
    tag = "Providers"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProviderRequest>,
) -> AppResult<Json<ApiResponse<Provider>>> {
    let provider = provider_service::update_profile(&state, user.customer_id, payload).await?;
    Ok(Json(ApiResponse::success("Profile updated", provider, None)))
}

#[utoipa::path(
    get,
    path = "/api/providers/{id}",
    params(
        ("id" = Uuid, Path, description = "Provider (user) ID")
    ),
    responses(
        (status = 200, description = "Provider profile", body = ApiResponse<Provider>),
        (status = 404, description = "Provider not found"),
    ),
    tag = "Providers"
)]
pub async fn get_provider(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Provider>>> {
    let mut provider = provider_service::get_provider(&state, id).await?;
    provider.bank_details = None;
    provider.verification_document = None;
    Ok(Json(ApiResponse::ok(provider)))
}

#[utoipa::path(
    get,
    path = "/api/providers/me/services",
    responses(
        (status = 200, description = "Own services", body = ApiResponse<ServiceList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Providers"
)]
pub async fn my_services(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ServiceList>>> {
    let items = provider_service::list_provider_services(&state, user.customer_id).await?;
    let meta = Meta::total(items.len());
    Ok(Json(ApiResponse::success("OK", ServiceList { items }, Some(meta))))
}

#[utoipa::path(
    post,
    path = "/api/providers/me/services",
    request_body = CreateServiceRequest,
    responses(
        (status = 200, description = "Service listed", body = ApiResponse<Service>),
        (status = 400, description = "Unknown category or invalid price"),
        (status = 404, description = "Not registered as a provider"),
    ),
    security(("bearer_auth" = [])),
    tag = "Providers"
)]
pub async fn create_service(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateServiceRequest>,
) -> AppResult<Json<ApiResponse<Service>>> {
    let service = provider_service::create_service(&state, user.customer_id, payload).await?;
    Ok(Json(ApiResponse::success("Service created", service, None)))
}

#[utoipa::path(
    patch,
    path = "/api/providers/me/services/{id}",
    params(
        ("id" = Uuid, Path, description = "Service ID")
    ),
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Service updated", body = ApiResponse<Service>),
        (status = 403, description = "Service belongs to another provider"),
        (status = 404, description = "Service not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Providers"
)]
pub async fn update_service(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateServiceRequest>,
) -> AppResult<Json<ApiResponse<Service>>> {
    let service = provider_service::update_service(&state, user.customer_id, id, payload).await?;
    Ok(Json(ApiResponse::success("Service updated", service, None)))
}

#[utoipa::path(
    delete,
    path = "/api/providers/me/services/{id}",
    params(
        ("id" = Uuid, Path, description = "Service ID")
    ),
    responses(
        (status = 200, description = "OK", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Service belongs to another provider"),
        (status = 404, description = "Service not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Providers"
)]
pub async fn delete_service(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    provider_service::delete_service(&state, user.customer_id, id).await?;
    Ok(Json(ApiResponse::success(
        "Service deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/providers/me/analytics",
    responses(
        (status = 200, description = "Earnings and job counts per service", body = ApiResponse<ProviderAnalytics>)
    ),
    security(("bearer_auth" = [])),
    tag = "Providers"
)]
pub async fn analytics(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProviderAnalytics>>> {
    let analytics = transaction_service::analytics(&state, user.customer_id).await?;
    Ok(Json(ApiResponse::ok(analytics)))
}

#[utoipa::path(
    get,
    path = "/api/providers/me/transactions",
    params(Pagination),
    responses(
        (status = 200, description = "Transactions, newest first", body = ApiResponse<TransactionList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Providers"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<TransactionList>>> {
    let transactions = transaction_service::list_transactions(&state, user.customer_id).await?;
    let (items, meta) = pagination.apply(transactions);
    Ok(Json(ApiResponse::success("OK", TransactionList { items }, Some(meta))))
}

#[utoipa::path(
    patch,
    path = "/api/providers/me/transactions/{id}",
    params(
        ("id" = Uuid, Path, description = "Transaction ID")
    ),
    request_body = UpdateTransactionRequest,
    responses(
        (status = 200, description = "Transaction updated", body = ApiResponse<Transaction>),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Transaction already settled or linked to an escrow"),
    ),
    security(("bearer_auth" = [])),
    tag = "Providers"
)]
pub async fn update_transaction(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTransactionRequest>,
) -> AppResult<Json<ApiResponse<Transaction>>> {
    let transaction =
        transaction_service::update_own_transaction(&state, user.customer_id, id, payload.status)
            .await?;
    Ok(Json(ApiResponse::success("Transaction updated", transaction, None)))
}

#[utoipa::path(
    get,
    path = "/api/providers/me/notifications",
    params(Pagination),
    responses(
        (status = 200, description = "Notifications, newest first", body = ApiResponse<NotificationList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Providers"
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<NotificationList>>> {
    let notifications = notification_service::list_notifications(&state, user.customer_id).await?;
    let (items, meta) = pagination.apply(notifications);
    Ok(Json(ApiResponse::success("OK", NotificationList { items }, Some(meta))))
}

#[utoipa::path(
    post,
    path = "/api/providers/me/notifications/{id}/read",
    params(
        ("id" = Uuid, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Marked as read", body = ApiResponse<Notification>),
        (status = 404, description = "Notification not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Providers"
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let notification = notification_service::mark_read(&state, user.customer_id, id).await?;
    Ok(Json(ApiResponse::ok(notification)))
}
