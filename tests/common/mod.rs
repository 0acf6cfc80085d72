#![allow(dead_code)]

use std::sync::Arc;

use helpa_marketplace_api::{
    assistant::FallbackChain,
    channel::LoggingChannel,
    config::AppConfig,
    dto::{
        auth::Claims,
        providers::{CreateServiceRequest, RegisterProviderRequest},
    },
    models::{AccountType, Availability, PriceType, Service},
    services::{provider_service, subscription_service},
    state::AppState,
    store::MemoryStore,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret";

pub fn test_state() -> AppState {
    AppState::new(
        Arc::new(MemoryStore::new()),
        AppConfig::local(JWT_SECRET),
        Arc::new(LoggingChannel),
        FallbackChain::default(),
    )
}

pub fn bearer(customer_id: Uuid, name: Option<&str>) -> String {
    let claims = Claims {
        sub: customer_id.to_string(),
        name: name.map(str::to_string),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("encode token");
    format!("Bearer {token}")
}

pub async fn register_provider(state: &AppState, provider_id: Uuid, name: &str) {
    provider_service::register(
        state,
        provider_id,
        RegisterProviderRequest {
            business_name: name.into(),
            account_type: AccountType::Individual,
            bio: String::new(),
            bank_details: None,
        },
    )
    .await
    .expect("register provider");
}

pub fn service_request(category: &str, name: &str, price: i64) -> CreateServiceRequest {
    CreateServiceRequest {
        category: category.into(),
        name: name.into(),
        description: format!("{name} description"),
        price,
        price_type: PriceType::Fixed,
        availability: Availability::Available,
        location: "Lagos".into(),
        tags: vec!["home".into()],
    }
}

/// A registered provider with one service in `category`.
pub async fn provider_with_service(state: &AppState, category: &str, price: i64) -> (Uuid, Service) {
    let provider_id = Uuid::new_v4();
    register_provider(state, provider_id, "Test Helpa").await;
    let service = provider_service::create_service(
        state,
        provider_id,
        service_request(category, "Test service", price),
    )
    .await
    .expect("create service");
    (provider_id, service)
}

pub async fn subscribed_customer(state: &AppState) -> Uuid {
    let customer_id = Uuid::new_v4();
    subscription_service::activate_subscription(state, customer_id, 5000)
        .await
        .expect("activate subscription");
    customer_id
}
