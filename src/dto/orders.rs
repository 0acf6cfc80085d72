use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{DeliveryInfo, Order, OrderStatus};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    /// Falls back to the name carried by the bearer token.
    pub customer_name: Option<String>,
    pub delivery: Option<DeliveryInfo>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<Order>)]
    pub items: Vec<Order>,
}
