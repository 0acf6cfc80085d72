use std::sync::Arc;

use crate::{
    assistant::FallbackChain,
    channel::MessagingChannel,
    config::AppConfig,
    store::{KeyLocks, KvStore},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub locks: KeyLocks,
    pub config: Arc<AppConfig>,
    pub channel: Arc<dyn MessagingChannel>,
    pub assistant: Arc<FallbackChain>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn KvStore>,
        config: AppConfig,
        channel: Arc<dyn MessagingChannel>,
        assistant: FallbackChain,
    ) -> Self {
        Self {
            store,
            locks: KeyLocks::new(),
            config: Arc::new(config),
            channel,
            assistant: Arc::new(assistant),
        }
    }
}
