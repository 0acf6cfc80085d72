use std::{env, sync::Arc};

use helpa_marketplace_api::{
    assistant::FallbackChain,
    channel::LoggingChannel,
    config::AppConfig,
    db::connect_store,
    dto::providers::{CreateServiceRequest, RegisterProviderRequest},
    error::AppError,
    models::{AccountType, Availability, BankDetails, PriceType},
    services::{catalog_service, provider_service, subscription_service},
    state::AppState,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let store = connect_store(config.database_url.as_deref()).await?;
    let state = AppState::new(
        store,
        config,
        Arc::new(LoggingChannel),
        FallbackChain::default(),
    );

    let menu_items = catalog_service::seed_default_menu(&state).await?;
    println!("Seeded {menu_items} menu items");

    let provider_id = seed_id("SEED_PROVIDER_ID")?;
    let services = seed_provider(&state, provider_id).await?;
    println!("Ensured demo Helpa {provider_id} with {services} services");

    let customer_id = seed_id("SEED_CUSTOMER_ID")?;
    let price = state.config.subscription_price;
    let subscription = subscription_service::activate_subscription(&state, customer_id, price).await?;
    println!(
        "Demo customer {customer_id} subscribed until {}",
        subscription.expires_at
    );
    Ok(())
}

fn seed_id(var: &str) -> anyhow::Result<Uuid> {
    match env::var(var) {
        Ok(raw) => Ok(Uuid::parse_str(&raw)?),
        Err(_) => Ok(Uuid::new_v4()),
    }
}

async fn seed_provider(state: &AppState, provider_id: Uuid) -> anyhow::Result<usize> {
    let registered = provider_service::register(
        state,
        provider_id,
        RegisterProviderRequest {
            business_name: "Sparkle & Fix".into(),
            account_type: AccountType::Business,
            bio: "Cleaning, plumbing and electrical work across Lagos".into(),
            bank_details: Some(BankDetails {
                bank_name: "Demo Bank".into(),
                account_number: "0123456789".into(),
                account_name: "Sparkle and Fix Ltd".into(),
            }),
        },
    )
    .await;
    match registered {
        Ok(_) => {}
        // Already seeded on a previous run.
        Err(AppError::Validation(_)) => return Ok(0),
        Err(err) => return Err(err.into()),
    }

    let services = [
        ("cleaning", "Deep home cleaning", 15_000, PriceType::Fixed, &["home", "deep"][..]),
        ("plumbing", "Leak and pipe repair", 8_000, PriceType::Hourly, &["emergency"][..]),
        ("electrical", "Wiring and fittings", 10_000, PriceType::Negotiable, &["wiring"][..]),
    ];
    for (category, name, price, price_type, tags) in services {
        provider_service::create_service(
            state,
            provider_id,
            CreateServiceRequest {
                category: category.into(),
                name: name.into(),
                description: format!("{name} by a verified Helpa"),
                price,
                price_type,
                availability: Availability::Available,
                location: "Lagos".into(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
            },
        )
        .await?;
    }
    Ok(services.len())
}
