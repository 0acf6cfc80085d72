use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    dto::escrow::{
        BookServiceRequest, Booking, CreateEscrowRequest, DisputeOutcome, DisputeRequest, EscrowList,
    },
    error::AppResult,
    middleware::auth::{AuthUser, PaymentCallback},
    models::{EscrowMetadata, EscrowTransaction},
    response::{ApiResponse, Meta},
    services::{booking_service, escrow_service},
    state::AppState,
};

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EscrowRole {
    #[default]
    Customer,
    Provider,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct EscrowListQuery {
    /// List escrows paid by the caller (default) or held for the caller as provider.
    pub role: Option<EscrowRole>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_escrows).post(create_escrow))
        .route("/{id}", get(get_escrow))
        .route("/{id}/lock", post(lock_escrow))
        .route("/{id}/release", post(release_escrow))
        .route("/{id}/dispute", post(dispute_escrow))
}

pub fn bookings_router() -> Router<AppState> {
    Router::new().route("/", post(book_service))
}

#[utoipa::path(
    post,
    path = "/api/escrow",
    request_body = CreateEscrowRequest,
    responses(
        (status = 200, description = "Pending escrow created", body = ApiResponse<EscrowTransaction>),
        (status = 400, description = "Amount below minimum"),
        (status = 404, description = "Provider not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Escrow"
)]
pub async fn create_escrow(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateEscrowRequest>,
) -> AppResult<Json<ApiResponse<EscrowTransaction>>> {
    let escrow = escrow_service::create(
        &state,
        user.customer_id,
        payload.provider_id,
        payload.amount,
        EscrowMetadata {
            service_id: payload.service_id,
            description: payload.description,
            ..Default::default()
        },
    )
    .await?;
    Ok(Json(ApiResponse::success("Escrow created", escrow, None)))
}

#[utoipa::path(
    get,
    path = "/api/escrow",
    params(EscrowListQuery),
    responses(
        (status = 200, description = "Escrows of the caller", body = ApiResponse<EscrowList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Escrow"
)]
pub async fn list_escrows(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<EscrowListQuery>,
) -> AppResult<Json<ApiResponse<EscrowList>>> {
    let items = match query.role.unwrap_or_default() {
        EscrowRole::Customer => escrow_service::list_for_customer(&state, user.customer_id).await?,
        EscrowRole::Provider => escrow_service::list_for_provider(&state, user.customer_id).await?,
    };
    let meta = Meta::total(items.len());
    Ok(Json(ApiResponse::success("OK", EscrowList { items }, Some(meta))))
}

#[utoipa::path(
    get,
    path = "/api/escrow/{id}",
    params(
        ("id" = Uuid, Path, description = "Escrow ID")
    ),
    responses(
        (status = 200, description = "Escrow", body = ApiResponse<EscrowTransaction>),
        (status = 403, description = "Caller is neither the customer nor the provider"),
        (status = 404, description = "Escrow not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Escrow"
)]
pub async fn get_escrow(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<EscrowTransaction>>> {
    let escrow = escrow_service::get(&state, id, user.customer_id).await?;
    Ok(Json(ApiResponse::ok(escrow)))
}

#[utoipa::path(
    post,
    path = "/api/escrow/{id}/lock",
    params(
        ("id" = Uuid, Path, description = "Escrow ID"),
        ("X-Payment-Secret" = String, Header, description = "Shared secret of the payment gateway callback")
    ),
    responses(
        (status = 200, description = "Payment captured, funds held", body = ApiResponse<EscrowTransaction>),
        (status = 401, description = "Missing or wrong callback secret"),
        (status = 409, description = "Escrow is not pending"),
    ),
    tag = "Escrow"
)]
pub async fn lock_escrow(
    State(state): State<AppState>,
    _callback: PaymentCallback,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<EscrowTransaction>>> {
    let escrow = escrow_service::lock(&state, id).await?;
    Ok(Json(ApiResponse::success("Escrow locked", escrow, None)))
}

#[utoipa::path(
    post,
    path = "/api/escrow/{id}/release",
    params(
        ("id" = Uuid, Path, description = "Escrow ID")
    ),
    responses(
        (status = 200, description = "Funds released to the provider less commission", body = ApiResponse<EscrowTransaction>),
        (status = 403, description = "Caller did not pay into this escrow"),
        (status = 409, description = "Escrow is not locked"),
    ),
    security(("bearer_auth" = [])),
    tag = "Escrow"
)]
pub async fn release_escrow(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<EscrowTransaction>>> {
    let escrow = escrow_service::release(&state, id, user.customer_id).await?;
    Ok(Json(ApiResponse::success("Escrow released", escrow, None)))
}

#[utoipa::path(
    post,
    path = "/api/escrow/{id}/dispute",
    params(
        ("id" = Uuid, Path, description = "Escrow ID")
    ),
    request_body = DisputeRequest,
    responses(
        (status = 200, description = "Escrow frozen and dispute opened", body = ApiResponse<DisputeOutcome>),
        (status = 400, description = "Missing reason"),
        (status = 403, description = "Caller did not pay into this escrow"),
        (status = 409, description = "Escrow already settled"),
    ),
    security(("bearer_auth" = [])),
    tag = "Escrow"
)]
pub async fn dispute_escrow(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DisputeRequest>,
) -> AppResult<Json<ApiResponse<DisputeOutcome>>> {
    let (escrow, dispute) = escrow_service::dispute(&state, id, user.customer_id, &payload.reason).await?;
    Ok(Json(ApiResponse::success(
        "Dispute opened",
        DisputeOutcome { escrow, dispute },
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = BookServiceRequest,
    responses(
        (status = 200, description = "Booking held in a pending escrow", body = ApiResponse<Booking>),
        (status = 400, description = "Service is not taking bookings"),
        (status = 404, description = "Service not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Escrow"
)]
pub async fn book_service(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<BookServiceRequest>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let booking =
        booking_service::book_service(&state, user.customer_id, payload.service_id, payload.description)
            .await?;
    Ok(Json(ApiResponse::success("Booking created", booking, None)))
}
