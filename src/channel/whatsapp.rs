use async_trait::async_trait;
use serde_json::{Value, json};

use super::{ChannelError, MessagingChannel, OutboundMessage};
use crate::config::WhatsAppConfig;

/// WhatsApp Cloud API sender.
pub struct WhatsAppClient {
    client: reqwest::Client,
    messages_url: String,
    token: String,
}

impl WhatsAppClient {
    pub fn new(config: &WhatsAppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            messages_url: format!(
                "{}/{}/messages",
                config.api_base.trim_end_matches('/'),
                config.phone_number_id
            ),
            token: config.token.clone(),
        }
    }
}

fn payload(to: &str, message: &OutboundMessage) -> Value {
    let mut body = json!({
        "messaging_product": "whatsapp",
        "recipient_type": "individual",
        "to": to,
    });
    let fields = match message {
        OutboundMessage::Text { body } => json!({
            "type": "text",
            "text": { "preview_url": false, "body": body },
        }),
        OutboundMessage::Buttons { body, buttons } => json!({
            "type": "interactive",
            "interactive": {
                "type": "button",
                "body": { "text": body },
                "action": {
                    "buttons": buttons.iter().map(|b| json!({
                        "type": "reply",
                        "reply": { "id": b.id, "title": b.title },
                    })).collect::<Vec<_>>(),
                },
            },
        }),
        OutboundMessage::List {
            body,
            button,
            sections,
        } => json!({
            "type": "interactive",
            "interactive": {
                "type": "list",
                "body": { "text": body },
                "action": { "button": button, "sections": sections },
            },
        }),
        OutboundMessage::Reaction { message_id, emoji } => json!({
            "type": "reaction",
            "reaction": { "message_id": message_id, "emoji": emoji },
        }),
    };
    if let (Some(target), Value::Object(extra)) = (body.as_object_mut(), fields) {
        target.extend(extra);
    }
    body
}

#[async_trait]
impl MessagingChannel for WhatsAppClient {
    async fn send(&self, to: &str, message: &OutboundMessage) -> Result<(), ChannelError> {
        let response = self
            .client
            .post(&self.messages_url)
            .bearer_auth(&self.token)
            .json(&payload(to, message))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChannelError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        tracing::debug!(to, "whatsapp message sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ReplyButton;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base: String) -> WhatsAppConfig {
        WhatsAppConfig {
            api_base: base,
            token: "token".into(),
            phone_number_id: "12345".into(),
            verify_token: "verify".into(),
        }
    }

    #[tokio::test]
    async fn sends_reply_buttons() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/12345/messages"))
            .and(header("authorization", "Bearer token"))
            .and(body_partial_json(json!({
                "to": "2348000000000",
                "type": "interactive",
                "interactive": { "type": "button" },
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "messages": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let client = WhatsAppClient::new(&config(server.uri()));
        let message = OutboundMessage::Buttons {
            body: "Welcome".into(),
            buttons: vec![ReplyButton {
                id: "MAIN_MENU".into(),
                title: "Menu".into(),
            }],
        };
        client.send("2348000000000", &message).await.unwrap();
    }

    #[tokio::test]
    async fn rejection_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
            .mount(&server)
            .await;

        let client = WhatsAppClient::new(&config(server.uri()));
        let err = client
            .send("1", &OutboundMessage::Text { body: "hi".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::Rejected { status: 401, .. }));
    }

    #[test]
    fn text_payload_shape() {
        let value = payload("42", &OutboundMessage::Text { body: "hello".into() });
        assert_eq!(value["type"], "text");
        assert_eq!(value["text"]["body"], "hello");
        assert_eq!(value["messaging_product"], "whatsapp");
    }
}
