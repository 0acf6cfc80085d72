//! Key layout. Primary records live under a single key; secondary indexes are
//! immutable id pointers resolved by prefix scan.

use uuid::Uuid;

pub fn session(id: Uuid) -> String {
    format!("chat:session:{id}")
}

pub fn history(session_id: Uuid) -> String {
    format!("chat:history:{session_id}")
}

pub fn channel_session(sender: &str) -> String {
    format!("chat:channel:{sender}")
}

pub fn menu_item(id: Uuid) -> String {
    format!("menu:{id}")
}

pub const MENU_PREFIX: &str = "menu:";

pub fn cart(customer_id: Uuid) -> String {
    format!("cart:{customer_id}")
}

pub fn order(id: Uuid) -> String {
    format!("order:{id}")
}

pub fn order_by_customer(customer_id: Uuid, order_id: Uuid) -> String {
    format!("order_by_customer:{customer_id}:{order_id}")
}

pub fn orders_of_customer(customer_id: Uuid) -> String {
    format!("order_by_customer:{customer_id}:")
}

pub fn provider(user_id: Uuid) -> String {
    format!("provider:{user_id}")
}

pub fn service(id: Uuid) -> String {
    format!("service:{id}")
}

pub fn service_category(category: &str, service_id: Uuid) -> String {
    format!("service_category:{category}:{service_id}")
}

pub fn services_in_category(category: &str) -> String {
    format!("service_category:{category}:")
}

pub fn transaction(provider_id: Uuid, id: Uuid) -> String {
    format!("transaction:{provider_id}:{id}")
}

pub fn transactions_of_provider(provider_id: Uuid) -> String {
    format!("transaction:{provider_id}:")
}

pub fn transaction_owner(id: Uuid) -> String {
    format!("transaction_owner:{id}")
}

pub fn notification(provider_id: Uuid, id: Uuid) -> String {
    format!("notification:{provider_id}:{id}")
}

pub fn notifications_of_provider(provider_id: Uuid) -> String {
    format!("notification:{provider_id}:")
}

pub fn escrow(id: Uuid) -> String {
    format!("escrow:{id}")
}

pub fn escrow_by_customer(customer_id: Uuid, escrow_id: Uuid) -> String {
    format!("escrow_by_customer:{customer_id}:{escrow_id}")
}

pub fn escrows_of_customer(customer_id: Uuid) -> String {
    format!("escrow_by_customer:{customer_id}:")
}

pub fn escrow_by_provider(provider_id: Uuid, escrow_id: Uuid) -> String {
    format!("escrow_by_provider:{provider_id}:{escrow_id}")
}

pub fn escrows_of_provider(provider_id: Uuid) -> String {
    format!("escrow_by_provider:{provider_id}:")
}

pub fn dispute(id: Uuid) -> String {
    format!("dispute:{id}")
}

pub const DISPUTE_PREFIX: &str = "dispute:";

pub fn subscription(customer_id: Uuid) -> String {
    format!("subscription:{customer_id}")
}

pub fn audit(id: Uuid) -> String {
    format!("audit:{id}")
}

pub const AUDIT_PREFIX: &str = "audit:";
