use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::escrow::{ActivateSubscriptionRequest, SubscriptionStatus},
    error::AppResult,
    middleware::auth::{AuthUser, PaymentCallback},
    models::Subscription,
    response::ApiResponse,
    services::subscription_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(my_subscription))
        .route("/activate", post(activate_subscription))
}

#[utoipa::path(
    get,
    path = "/api/subscriptions/me",
    responses(
        (status = 200, description = "Subscription state; expired subscriptions report inactive", body = ApiResponse<SubscriptionStatus>)
    ),
    security(("bearer_auth" = [])),
    tag = "Subscriptions"
)]
pub async fn my_subscription(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<SubscriptionStatus>>> {
    let active = subscription_service::check_subscription(&state, user.customer_id).await?;
    let subscription = subscription_service::get_subscription(&state, user.customer_id).await?;
    Ok(Json(ApiResponse::ok(SubscriptionStatus {
        active,
        subscription,
    })))
}

#[utoipa::path(
    post,
    path = "/api/subscriptions/activate",
    params(
        ("X-Payment-Secret" = String, Header, description = "Shared secret of the payment gateway callback")
    ),
    request_body = ActivateSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription started or extended", body = ApiResponse<Subscription>),
        (status = 401, description = "Missing or wrong callback secret"),
    ),
    tag = "Subscriptions"
)]
pub async fn activate_subscription(
    State(state): State<AppState>,
    _callback: PaymentCallback,
    Json(payload): Json<ActivateSubscriptionRequest>,
) -> AppResult<Json<ApiResponse<Subscription>>> {
    let amount = payload.amount.unwrap_or(state.config.subscription_price);
    let subscription =
        subscription_service::activate_subscription(&state, payload.customer_id, amount).await?;
    Ok(Json(ApiResponse::success("Subscription active", subscription, None)))
}
