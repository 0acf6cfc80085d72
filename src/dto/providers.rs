use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::{
    AccountType, Availability, BankDetails, Notification, PriceType, Service, Transaction,
    TransactionStatus,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterProviderRequest {
    pub business_name: String,
    pub account_type: AccountType,
    #[serde(default)]
    pub bio: String,
    pub bank_details: Option<BankDetails>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProviderRequest {
    pub business_name: Option<String>,
    pub bio: Option<String>,
    pub bank_details: Option<BankDetails>,
    pub verification_document: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateServiceRequest {
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    pub price_type: PriceType,
    #[serde(default = "default_availability")]
    pub availability: Availability,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_availability() -> Availability {
    Availability::Available
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub price_type: Option<PriceType>,
    pub availability: Option<Availability>,
    pub location: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Query string of `GET /api/services/search`. `tags` is comma separated.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct SearchQuery {
    pub category: Option<String>,
    pub availability: Option<Availability>,
    pub location: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub tags: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ServiceFilters {
    pub availability: Option<Availability>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub location: Option<String>,
    pub tags: Vec<String>,
}

impl SearchQuery {
    pub fn into_parts(self) -> (Option<String>, ServiceFilters) {
        let tags = self
            .tags
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let category = self.category.filter(|c| !c.is_empty());
        (
            category,
            ServiceFilters {
                availability: self.availability,
                min_price: self.min_price,
                max_price: self.max_price,
                location: self.location.filter(|l| !l.is_empty()),
                tags,
            },
        )
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ServiceList {
    #[schema(value_type = Vec<Service>)]
    pub items: Vec<Service>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct TransactionList {
    #[schema(value_type = Vec<Transaction>)]
    pub items: Vec<Transaction>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct NotificationList {
    #[schema(value_type = Vec<Notification>)]
    pub items: Vec<Notification>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTransactionRequest {
    pub status: TransactionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ServiceEarnings {
    pub service_id: Uuid,
    pub service_name: String,
    pub earnings: i64,
    pub completed_jobs: u32,
    pub pending_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProviderAnalytics {
    pub provider_id: Uuid,
    pub total_earnings: i64,
    pub pending_earnings: i64,
    pub completed_jobs: u32,
    pub rating: f64,
    pub total_reviews: u32,
    pub transaction_count: usize,
    /// Transaction count per status, e.g. `{"pending": 2, "completed": 5}`.
    pub status_counts: BTreeMap<String, usize>,
    pub services: Vec<ServiceEarnings>,
}
