use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::providers::{SearchQuery, ServiceList},
    error::AppResult,
    models::{SERVICE_CATEGORIES, Service},
    response::{ApiResponse, Meta},
    services::{provider_service, search_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", get(search_services))
        .route("/categories", get(list_categories))
        .route("/{id}", get(get_service))
}

#[utoipa::path(
    get,
    path = "/api/services/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching services ranked by rating and completed jobs", body = ApiResponse<ServiceList>),
        (status = 400, description = "Unknown category"),
    ),
    tag = "Services"
)]
pub async fn search_services(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<ServiceList>>> {
    let (category, filters) = query.into_parts();
    let items = search_service::search(&state, category.as_deref(), &filters).await?;
    let meta = Meta::total(items.len());
    Ok(Json(ApiResponse::success("OK", ServiceList { items }, Some(meta))))
}

#[utoipa::path(
    get,
    path = "/api/services/categories",
    responses(
        (status = 200, description = "Fixed service categories", body = ApiResponse<Vec<String>>)
    ),
    tag = "Services"
)]
pub async fn list_categories() -> Json<ApiResponse<Vec<String>>> {
    let categories: Vec<String> = SERVICE_CATEGORIES.iter().map(|c| c.to_string()).collect();
    let meta = Meta::total(categories.len());
    Json(ApiResponse::success("OK", categories, Some(meta)))
}

#[utoipa::path(
    get,
    path = "/api/services/{id}",
    params(
        ("id" = Uuid, Path, description = "Service ID")
    ),
    responses(
        (status = 200, description = "Service", body = ApiResponse<Service>),
        (status = 404, description = "Service not found"),
    ),
    tag = "Services"
)]
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Service>>> {
    let service = provider_service::get_service(&state, id).await?;
    Ok(Json(ApiResponse::ok(service)))
}
