use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{BackendFailure, ChatBackend};

/// Any backend speaking the OpenAI chat-completions wire format.
pub struct OpenAiCompatBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiCompatBackend {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: &str,
        timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl ChatBackend for OpenAiCompatBackend {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn complete(&self, system: &str, message: &str) -> Result<String, BackendFailure> {
        let body = CompletionRequest {
            model: &self.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: system,
                },
                WireMessage {
                    role: "user",
                    content: message,
                },
            ],
            max_tokens: 300,
        };

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                BackendFailure::Timeout
            } else {
                BackendFailure::Unreachable(err.to_string())
            }
        })?;
        if !response.status().is_success() {
            return Err(BackendFailure::Status(response.status().as_u16()));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|err| BackendFailure::Malformed(err.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(BackendFailure::EmptyReply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn parses_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "  Book a plumber. " } }]
            })))
            .mount(&server)
            .await;

        let backend =
            OpenAiCompatBackend::new(&format!("{}/v1", server.uri()), Some("key".into()), "m", 5)
                .unwrap();
        let text = backend.complete("sys", "leaking tap").await.unwrap();
        assert_eq!(text, "Book a plumber.");
    }

    #[tokio::test]
    async fn non_success_status_is_typed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let backend = OpenAiCompatBackend::new(&server.uri(), None, "m", 5).unwrap();
        let err = backend.complete("sys", "hi").await.unwrap_err();
        assert_eq!(err, BackendFailure::Status(503));
    }

    #[tokio::test]
    async fn empty_content_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "   " } }]
            })))
            .mount(&server)
            .await;

        let backend = OpenAiCompatBackend::new(&server.uri(), None, "m", 5).unwrap();
        assert_eq!(
            backend.complete("sys", "hi").await.unwrap_err(),
            BackendFailure::EmptyReply
        );
    }
}
