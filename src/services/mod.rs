pub mod booking_service;
pub mod cart_service;
pub mod catalog_service;
pub mod escrow_service;
pub mod notification_service;
pub mod order_service;
pub mod provider_service;
pub mod search_service;
pub mod subscription_service;
pub mod transaction_service;
