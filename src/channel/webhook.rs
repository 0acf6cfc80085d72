//! Inbound webhook payloads and the subscription handshake.

use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Clone, PartialEq)]
pub enum InboundKind {
    Text(String),
    ButtonReply(String),
    ListReply(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub sender: String,
    pub display_name: Option<String>,
    pub message_id: String,
    pub kind: InboundKind,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Returns the challenge to echo when the handshake is valid.
pub fn verify_subscription(query: &VerifyQuery, expected_token: &str) -> Option<String> {
    match (&query.mode, &query.verify_token, &query.challenge) {
        (Some(mode), Some(token), Some(challenge))
            if mode == "subscribe" && token == expected_token =>
        {
            Some(challenge.clone())
        }
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
pub struct Change {
    pub value: ChangeValue,
}

#[derive(Debug, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub messages: Vec<WireMessage>,
}

#[derive(Debug, Deserialize)]
pub struct Contact {
    pub wa_id: String,
    pub profile: Option<Profile>,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireMessage {
    pub from: String,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<TextBody>,
    pub interactive: Option<Interactive>,
    pub button: Option<TemplateButton>,
}

#[derive(Debug, Deserialize)]
pub struct TextBody {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct Interactive {
    pub button_reply: Option<Reply>,
    pub list_reply: Option<Reply>,
}

#[derive(Debug, Deserialize)]
pub struct Reply {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct TemplateButton {
    pub payload: String,
}

/// Flatten a webhook delivery into events. Status updates and unsupported
/// message types (images, locations, ...) are skipped.
pub fn parse_events(payload: WebhookPayload) -> Vec<InboundEvent> {
    let mut events = Vec::new();
    for change in payload.entry.into_iter().flat_map(|e| e.changes) {
        let value = change.value;
        for message in value.messages {
            let display_name = value
                .contacts
                .iter()
                .find(|c| c.wa_id == message.from)
                .and_then(|c| c.profile.as_ref())
                .and_then(|p| p.name.clone());

            let kind = match message.kind.as_str() {
                "text" => message.text.map(|t| InboundKind::Text(t.body)),
                "interactive" => message.interactive.and_then(|i| {
                    i.button_reply
                        .map(|r| InboundKind::ButtonReply(r.id))
                        .or_else(|| i.list_reply.map(|r| InboundKind::ListReply(r.id)))
                }),
                "button" => message.button.map(|b| InboundKind::ButtonReply(b.payload)),
                other => {
                    tracing::debug!(kind = other, "ignoring unsupported inbound message");
                    None
                }
            };

            if let Some(kind) = kind {
                events.push(InboundEvent {
                    sender: message.from,
                    display_name,
                    message_id: message.id,
                    kind,
                });
            }
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(mode: &str, token: &str, challenge: &str) -> VerifyQuery {
        VerifyQuery {
            mode: Some(mode.into()),
            verify_token: Some(token.into()),
            challenge: Some(challenge.into()),
        }
    }

    #[test]
    fn handshake_echoes_challenge_only_for_matching_token() {
        assert_eq!(
            verify_subscription(&query("subscribe", "secret", "123"), "secret"),
            Some("123".to_string())
        );
        assert_eq!(verify_subscription(&query("subscribe", "nope", "123"), "secret"), None);
        assert_eq!(verify_subscription(&query("unsubscribe", "secret", "123"), "secret"), None);
    }

    #[test]
    fn parses_text_button_and_list_replies() {
        let payload: WebhookPayload = serde_json::from_value(json!({
            "entry": [{
                "changes": [{
                    "value": {
                        "contacts": [{ "wa_id": "234800", "profile": { "name": "Tola" } }],
                        "messages": [
                            { "from": "234800", "id": "m1", "type": "text", "text": { "body": "I need a plumber" } },
                            { "from": "234800", "id": "m2", "type": "interactive",
                              "interactive": { "type": "button_reply", "button_reply": { "id": "MAIN_MENU", "title": "Menu" } } },
                            { "from": "234800", "id": "m3", "type": "interactive",
                              "interactive": { "type": "list_reply", "list_reply": { "id": "SELECT_CATEGORY:plumbing", "title": "Plumbing" } } },
                            { "from": "234800", "id": "m4", "type": "image" }
                        ]
                    }
                }]
            }]
        }))
        .unwrap();

        let events = parse_events(payload);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].display_name.as_deref(), Some("Tola"));
        assert_eq!(events[0].kind, InboundKind::Text("I need a plumber".into()));
        assert_eq!(events[1].kind, InboundKind::ButtonReply("MAIN_MENU".into()));
        assert_eq!(events[2].kind, InboundKind::ListReply("SELECT_CATEGORY:plumbing".into()));
    }

    #[test]
    fn status_only_delivery_yields_nothing() {
        let payload: WebhookPayload = serde_json::from_value(json!({
            "entry": [{ "changes": [{ "value": { "statuses": [{ "id": "x" }] } }] }]
        }))
        .unwrap();
        assert!(parse_events(payload).is_empty());
    }
}
