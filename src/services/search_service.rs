//! Service search over the category index.
//!
//! Every call scans the candidate ids, loads each service and sorts the full
//! result in memory. There is no pagination, which only holds up while the
//! catalog stays small.

use std::cmp::Ordering;

use uuid::Uuid;

use crate::{
    dto::providers::ServiceFilters,
    error::{AppError, AppResult},
    models::{SERVICE_CATEGORIES, Service, is_service_category},
    state::AppState,
    store::{StoreExt, keys},
};

pub async fn search(
    state: &AppState,
    category: Option<&str>,
    filters: &ServiceFilters,
) -> AppResult<Vec<Service>> {
    let categories: Vec<&str> = match category {
        Some(category) => {
            if !is_service_category(category) {
                return Err(AppError::validation(format!("unknown category {category}")));
            }
            vec![category]
        }
        None => SERVICE_CATEGORIES.to_vec(),
    };

    let mut candidates = Vec::new();
    for category in categories {
        let ids: Vec<Uuid> = state
            .store
            .scan_json(&keys::services_in_category(category))
            .await?;
        for id in ids {
            if let Some(service) = state.store.get_json::<Service>(&keys::service(id)).await? {
                candidates.push(service);
            }
        }
    }

    Ok(filter_and_rank(candidates, filters))
}

pub fn filter_and_rank(services: Vec<Service>, filters: &ServiceFilters) -> Vec<Service> {
    let mut matched: Vec<Service> = services
        .into_iter()
        .filter(|service| matches(service, filters))
        .collect();
    matched.sort_by(|a, b| {
        b.rank_score()
            .partial_cmp(&a.rank_score())
            .unwrap_or(Ordering::Equal)
    });
    matched
}

fn matches(service: &Service, filters: &ServiceFilters) -> bool {
    if let Some(availability) = filters.availability {
        if service.availability != availability {
            return false;
        }
    }
    if let Some(min) = filters.min_price {
        if service.price < min {
            return false;
        }
    }
    if let Some(max) = filters.max_price {
        if service.price > max {
            return false;
        }
    }
    if let Some(location) = &filters.location {
        if !service
            .location
            .to_lowercase()
            .contains(&location.to_lowercase())
        {
            return false;
        }
    }
    if !filters.tags.is_empty() {
        let shared = service.tags.iter().any(|tag| {
            filters
                .tags
                .iter()
                .any(|wanted| wanted.eq_ignore_ascii_case(tag))
        });
        if !shared {
            return false;
        }
    }
    true
}
