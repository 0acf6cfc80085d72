use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Dispute, EscrowTransaction, Subscription, Transaction};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEscrowRequest {
    pub provider_id: Uuid,
    pub amount: i64,
    pub service_id: Option<Uuid>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DisputeRequest {
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DisputeOutcome {
    pub escrow: EscrowTransaction,
    pub dispute: Dispute,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct EscrowList {
    #[schema(value_type = Vec<EscrowTransaction>)]
    pub items: Vec<EscrowTransaction>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BookServiceRequest {
    pub service_id: Uuid,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Booking {
    pub escrow: EscrowTransaction,
    pub transaction: Transaction,
    /// Gateway page where the customer pays into escrow.
    pub checkout_url: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ActivateSubscriptionRequest {
    pub customer_id: Uuid,
    pub amount: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionStatus {
    pub active: bool,
    pub subscription: Option<Subscription>,
}
