use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Fixed service categories. The category index is keyed by these slugs.
pub const SERVICE_CATEGORIES: &[&str] = &[
    "cleaning",
    "plumbing",
    "electrical",
    "carpentry",
    "beauty",
    "tutoring",
    "catering",
    "moving",
    "tech_support",
];

pub fn is_service_category(category: &str) -> bool {
    SERVICE_CATEGORIES.contains(&category)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MenuItem {
    pub id: Uuid,
    pub category: String,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub tags: Vec<String>,
    pub rating: f64,
    pub completed_jobs: u32,
    pub available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PriceType {
    Fixed,
    Hourly,
    Negotiable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    Busy,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Service {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub category: String,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub price_type: PriceType,
    pub availability: Availability,
    pub location: String,
    pub tags: Vec<String>,
    pub rating: f64,
    pub completed_jobs: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Service {
    /// Ranking used by search: rating weighs 0.7, completed jobs 0.3.
    pub fn rank_score(&self) -> f64 {
        self.rating * 0.7 + f64::from(self.completed_jobs) * 0.3
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub menu_item_id: Uuid,
    pub title: String,
    /// Unit price captured when the item was added.
    pub price: i64,
    pub quantity: u32,
    pub special_instructions: Option<String>,
}

impl CartItem {
    pub fn line_total(&self) -> i64 {
        self.price.saturating_mul(i64::from(self.quantity))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Cart {
    pub fn total(&self) -> i64 {
        self.items
            .iter()
            .map(CartItem::line_total)
            .fold(0i64, i64::saturating_add)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeliveryInfo {
    pub address: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub items: Vec<CartItem>,
    pub total_amount: i64,
    pub status: OrderStatus,
    pub delivery: Option<DeliveryInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Individual,
    Business,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BankDetails {
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Provider {
    pub user_id: Uuid,
    pub business_name: String,
    pub account_type: AccountType,
    pub verification_status: VerificationStatus,
    pub bio: String,
    pub services: Vec<Uuid>,
    pub total_earnings: i64,
    pub pending_earnings: i64,
    pub completed_jobs: u32,
    pub rating: f64,
    pub total_reviews: u32,
    pub bank_details: Option<BankDetails>,
    pub verification_document: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Escrow,
    Completed,
    Refunded,
    Cancelled,
    /// The linked escrow is under dispute; the amount no longer counts as pending.
    Disputed,
}

impl TransactionStatus {
    /// Statuses whose amount still counts towards pending earnings.
    pub fn is_open(self) -> bool {
        matches!(self, TransactionStatus::Pending | TransactionStatus::Escrow)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Escrow => "escrow",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Refunded => "refunded",
            TransactionStatus::Cancelled => "cancelled",
            TransactionStatus::Disputed => "disputed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub customer_id: Uuid,
    pub amount: i64,
    pub status: TransactionStatus,
    pub escrow_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EscrowStatus {
    Pending,
    Locked,
    Released,
    Disputed,
    Refunded,
}

impl std::fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EscrowStatus::Pending => write!(f, "pending"),
            EscrowStatus::Locked => write!(f, "locked"),
            EscrowStatus::Released => write!(f, "released"),
            EscrowStatus::Disputed => write!(f, "disputed"),
            EscrowStatus::Refunded => write!(f, "refunded"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EscrowMetadata {
    pub service_id: Option<Uuid>,
    pub description: Option<String>,
    pub commission: Option<i64>,
    pub provider_amount: Option<i64>,
    pub dispute_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EscrowTransaction {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub amount: i64,
    pub status: EscrowStatus,
    pub metadata: EscrowMetadata,
    pub created_at: DateTime<Utc>,
    pub locked_at: Option<DateTime<Utc>>,
    pub released_at: Option<DateTime<Utc>>,
    pub disputed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    Open,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Dispute {
    pub id: Uuid,
    pub escrow_id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub reason: String,
    pub status: DisputeStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Subscription {
    pub customer_id: Uuid,
    pub active: bool,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuditEntry {
    pub id: Uuid,
    pub actor: Option<Uuid>,
    pub action: String,
    pub resource: Option<String>,
    #[schema(value_type = Object)]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}
