use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use helpa_marketplace_api::{
    assistant::FallbackChain,
    channel::{LoggingChannel, MessagingChannel, WhatsAppClient},
    config::AppConfig,
    db::connect_store,
    routes::create_app,
    services::catalog_service,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,helpa_marketplace_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    let store = connect_store(config.database_url.as_deref()).await?;

    let channel: Arc<dyn MessagingChannel> = match &config.whatsapp {
        Some(whatsapp) => {
            tracing::info!(phone_number_id = %whatsapp.phone_number_id, "whatsapp channel enabled");
            Arc::new(WhatsAppClient::new(whatsapp))
        }
        None => {
            tracing::warn!("whatsapp not configured; outbound messages are only logged");
            Arc::new(LoggingChannel)
        }
    };
    let assistant = FallbackChain::from_config(&config.assistant)?;
    tracing::info!(backends = assistant.len(), "assistant chain ready");

    let state = AppState::new(store, config, channel, assistant);
    catalog_service::seed_default_menu(&state).await?;

    let app = create_app(state);
    tracing::info!("listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
