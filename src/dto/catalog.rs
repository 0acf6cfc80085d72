use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::MenuItem;

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct MenuQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct MenuList {
    #[schema(value_type = Vec<MenuItem>)]
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertMenuItemRequest {
    pub category: String,
    pub title: String,
    pub description: String,
    pub price: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}
