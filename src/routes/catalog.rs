use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::catalog::{MenuList, MenuQuery},
    error::AppResult,
    models::MenuItem,
    response::{ApiResponse, Meta},
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_menu))
        .route("/{id}", get(get_menu_item))
}

#[utoipa::path(
    get,
    path = "/api/menu",
    params(MenuQuery),
    responses(
        (status = 200, description = "Menu items, optionally for one category", body = ApiResponse<MenuList>)
    ),
    tag = "Catalog"
)]
pub async fn list_menu(
    State(state): State<AppState>,
    Query(query): Query<MenuQuery>,
) -> AppResult<Json<ApiResponse<MenuList>>> {
    let items = catalog_service::list_menu(&state, query.category.as_deref()).await?;
    let meta = Meta::total(items.len());
    Ok(Json(ApiResponse::success("OK", MenuList { items }, Some(meta))))
}

#[utoipa::path(
    get,
    path = "/api/menu/{id}",
    params(
        ("id" = Uuid, Path, description = "Menu item ID")
    ),
    responses(
        (status = 200, description = "Menu item", body = ApiResponse<MenuItem>),
        (status = 404, description = "Menu item not found"),
    ),
    tag = "Catalog"
)]
pub async fn get_menu_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let item = catalog_service::get_menu_item(&state, id).await?;
    Ok(Json(ApiResponse::ok(item)))
}
