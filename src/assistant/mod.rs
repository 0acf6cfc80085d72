//! Generative help replies.
//!
//! Backends are tried in order; each failure is recorded with a typed reason
//! and the next backend is tried. When every backend fails the reply comes
//! from a static keyword table, so callers always get text back.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

mod canned;
mod openai;

pub use canned::canned_response;
pub use openai::OpenAiCompatBackend;

use crate::config::AssistantConfig;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BackendFailure {
    #[error("backend unreachable: {0}")]
    Unreachable(String),
    #[error("backend timed out")]
    Timeout,
    #[error("backend returned status {0}")]
    Status(u16),
    #[error("backend returned an empty reply")]
    EmptyReply,
    #[error("backend reply could not be decoded: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    fn name(&self) -> &str;
    async fn complete(&self, system: &str, message: &str) -> Result<String, BackendFailure>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplySource {
    Backend(String),
    Canned,
}

impl ReplySource {
    pub fn label(&self) -> &str {
        match self {
            ReplySource::Backend(name) => name,
            ReplySource::Canned => "canned",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssistantReply {
    pub text: String,
    pub source: ReplySource,
}

const SYSTEM_PROMPT: &str = "You are the Helpa assistant. Helpa connects customers with verified \
service providers called Helpas and settles bookings through escrow. Answer briefly and \
suggest the relevant menu option when it helps.";

#[derive(Default)]
pub struct FallbackChain {
    backends: Vec<Arc<dyn ChatBackend>>,
}

impl FallbackChain {
    pub fn new(backends: Vec<Arc<dyn ChatBackend>>) -> Self {
        Self { backends }
    }

    pub fn from_config(config: &AssistantConfig) -> anyhow::Result<Self> {
        let mut backends: Vec<Arc<dyn ChatBackend>> = Vec::new();
        for base_url in &config.backends {
            backends.push(Arc::new(OpenAiCompatBackend::new(
                base_url,
                config.api_key.clone(),
                &config.model,
                config.timeout_secs,
            )?));
        }
        Ok(Self::new(backends))
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub async fn respond(&self, message: &str) -> AssistantReply {
        for backend in &self.backends {
            match backend.complete(SYSTEM_PROMPT, message).await {
                Ok(text) => {
                    return AssistantReply {
                        text,
                        source: ReplySource::Backend(backend.name().to_string()),
                    };
                }
                Err(failure) => {
                    tracing::warn!(backend = backend.name(), error = %failure, "assistant backend failed");
                }
            }
        }
        AssistantReply {
            text: canned_response(message).to_string(),
            source: ReplySource::Canned,
        }
    }
}
