use std::collections::BTreeSet;

use uuid::Uuid;

use crate::{
    dto::catalog::UpsertMenuItemRequest,
    error::{AppError, AppResult},
    models::MenuItem,
    state::AppState,
    store::{StoreExt, keys},
};

pub async fn list_menu(state: &AppState, category: Option<&str>) -> AppResult<Vec<MenuItem>> {
    let mut items: Vec<MenuItem> = state.store.scan_json(keys::MENU_PREFIX).await?;
    if let Some(category) = category.filter(|c| !c.is_empty()) {
        items.retain(|item| item.category.eq_ignore_ascii_case(category));
    }
    items.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.title.cmp(&b.title)));
    Ok(items)
}

pub async fn menu_categories(state: &AppState) -> AppResult<Vec<String>> {
    let categories: BTreeSet<String> = list_menu(state, None)
        .await?
        .into_iter()
        .map(|item| item.category)
        .collect();
    Ok(categories.into_iter().collect())
}

pub async fn get_menu_item(state: &AppState, id: Uuid) -> AppResult<MenuItem> {
    state
        .store
        .get_json(&keys::menu_item(id))
        .await?
        .ok_or(AppError::NotFound("menu item"))
}

/// Create the item when `id` is `None`, otherwise replace the stored entry.
/// Orders keep their own price snapshot, so repricing never touches them.
pub async fn upsert_menu_item(
    state: &AppState,
    id: Option<Uuid>,
    payload: UpsertMenuItemRequest,
) -> AppResult<MenuItem> {
    if payload.title.trim().is_empty() {
        return Err(AppError::validation("title is required"));
    }
    if payload.price < 0 {
        return Err(AppError::validation("price must not be negative"));
    }

    let existing = match id {
        Some(id) => Some(get_menu_item(state, id).await?),
        None => None,
    };
    let item = MenuItem {
        id: id.unwrap_or_else(Uuid::new_v4),
        category: payload.category.trim().to_lowercase(),
        title: payload.title,
        description: payload.description,
        price: payload.price,
        tags: payload.tags,
        rating: existing.as_ref().map(|item| item.rating).unwrap_or(0.0),
        completed_jobs: existing.as_ref().map(|item| item.completed_jobs).unwrap_or(0),
        available: payload.available,
    };
    state.store.put_json(&keys::menu_item(item.id), &item).await?;
    Ok(item)
}

/// Write the starter menu when the catalog is empty.
pub async fn seed_default_menu(state: &AppState) -> AppResult<usize> {
    if !list_menu(state, None).await?.is_empty() {
        return Ok(0);
    }
    let items = default_menu();
    for item in &items {
        state.store.put_json(&keys::menu_item(item.id), item).await?;
    }
    tracing::info!(count = items.len(), "seeded default menu");
    Ok(items.len())
}

pub fn default_menu() -> Vec<MenuItem> {
    let entries: &[(&str, &str, &str, i64, &[&str], f64, u32)] = &[
        ("rice", "Jollof Rice", "Smoky party jollof with fried plantain", 2500, &["spicy", "party"], 4.8, 320),
        ("rice", "Fried Rice", "Vegetable fried rice with chicken", 2800, &["chicken"], 4.5, 210),
        ("soups", "Egusi Soup", "Melon seed soup with assorted meat", 3500, &["traditional"], 4.7, 180),
        ("soups", "Pepper Soup", "Goat meat pepper soup", 3000, &["spicy"], 4.4, 95),
        ("snacks", "Puff Puff", "Dozen sweet fried dough balls", 800, &["sweet", "vegetarian"], 4.6, 400),
        ("snacks", "Meat Pie", "Flaky pastry with minced beef", 700, &["beef"], 4.2, 150),
        ("drinks", "Zobo", "Chilled hibiscus drink", 500, &["vegan"], 4.3, 260),
        ("drinks", "Chapman", "Fruity mocktail", 1200, &["sweet"], 4.1, 88),
    ];

    entries
        .iter()
        .map(|(category, title, description, price, tags, rating, completed_jobs)| MenuItem {
            id: Uuid::new_v4(),
            category: category.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            price: *price,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            rating: *rating,
            completed_jobs: *completed_jobs,
            available: true,
        })
        .collect()
}
