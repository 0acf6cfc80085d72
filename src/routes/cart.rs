use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartView},
    error::AppResult,
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/{menu_item_id}", delete(remove_from_cart))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart of the current customer with its total", body = ApiResponse<CartView>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = cart_service::get_cart(&state, user.customer_id).await?;
    let meta = Meta::total(cart.items.len());
    Ok(Json(ApiResponse::success("OK", CartView::from(cart), Some(meta))))
}

#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Item added or merged into an existing line", body = ApiResponse<CartView>),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Menu item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = cart_service::add_to_cart(&state, user.customer_id, payload).await?;
    Ok(Json(ApiResponse::success("Added to cart", CartView::from(cart), None)))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{menu_item_id}",
    params(
        ("menu_item_id" = Uuid, Path, description = "Menu item ID")
    ),
    responses(
        (status = 200, description = "OK", body = ApiResponse<CartView>),
        (status = 404, description = "Cart item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(menu_item_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = cart_service::remove_from_cart(&state, user.customer_id, menu_item_id).await?;
    Ok(Json(ApiResponse::success(
        "Removed from cart",
        CartView::from(cart),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart emptied", body = ApiResponse<CartView>),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartView>>> {
    cart_service::clear_cart(&state, user.customer_id).await?;
    let cart = cart_service::get_cart(&state, user.customer_id).await?;
    Ok(Json(ApiResponse::success(
        "Cart cleared",
        CartView::from(cart),
        Some(Meta::empty()),
    )))
}
