use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres URL for the key-value table. When unset the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub payment_callback_secret: String,
    pub payment_checkout_url: String,
    pub subscription_price: i64,
    pub whatsapp: Option<WhatsAppConfig>,
    pub assistant: AssistantConfig,
}

#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    pub api_base: String,
    pub token: String,
    pub phone_number_id: String,
    pub verify_token: String,
}

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Ordered list of OpenAI-compatible base URLs tried in sequence.
    pub backends: Vec<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET")?;
        let payment_callback_secret = env::var("PAYMENT_CALLBACK_SECRET")?;
        let payment_checkout_url = env::var("PAYMENT_CHECKOUT_URL")
            .unwrap_or_else(|_| "https://pay.helpa.local/checkout".to_string());
        let subscription_price = env::var("SUBSCRIPTION_PRICE")
            .ok()
            .and_then(|p| p.parse::<i64>().ok())
            .unwrap_or(5000);

        let whatsapp = match (
            env::var("WHATSAPP_TOKEN"),
            env::var("WHATSAPP_PHONE_NUMBER_ID"),
            env::var("WHATSAPP_VERIFY_TOKEN"),
        ) {
            (Ok(token), Ok(phone_number_id), Ok(verify_token)) => Some(WhatsAppConfig {
                api_base: env::var("WHATSAPP_API_BASE")
                    .unwrap_or_else(|_| "https://graph.facebook.com/v19.0".to_string()),
                token,
                phone_number_id,
                verify_token,
            }),
            _ => None,
        };

        let assistant = AssistantConfig {
            backends: env::var("ASSISTANT_BACKENDS")
                .map(|raw| parse_list(&raw))
                .unwrap_or_default(),
            api_key: env::var("ASSISTANT_API_KEY").ok(),
            model: env::var("ASSISTANT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            timeout_secs: env::var("ASSISTANT_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse::<u64>().ok())
                .unwrap_or(15),
        };

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            payment_callback_secret,
            payment_checkout_url,
            subscription_price,
            whatsapp,
            assistant,
        })
    }

    /// Configuration suitable for tests and local runs without a database.
    pub fn local(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: None,
            host: "127.0.0.1".to_string(),
            port: 3000,
            jwt_secret: jwt_secret.into(),
            payment_callback_secret: "local-callback-secret".to_string(),
            payment_checkout_url: "https://pay.helpa.local/checkout".to_string(),
            subscription_price: 5000,
            whatsapp: None,
            assistant: AssistantConfig {
                backends: Vec::new(),
                api_key: None,
                model: "gpt-4o-mini".to_string(),
                timeout_secs: 15,
            },
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
