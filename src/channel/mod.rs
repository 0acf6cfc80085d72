//! Messaging channel boundary.
//!
//! Engine replies are rendered into the channel's message shapes here, with
//! the channel's limits applied: at most three reply buttons with 20-char
//! labels, and list rows with 24-char titles and 72-char descriptions.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

mod whatsapp;
pub mod webhook;

pub use whatsapp::WhatsAppClient;

use crate::engine::ChatReply;

pub const MAX_BUTTONS: usize = 3;
pub const BUTTON_LABEL_LIMIT: usize = 20;
pub const ROW_TITLE_LIMIT: usize = 24;
pub const ROW_DESCRIPTION_LIMIT: usize = 72;
pub const MAX_LIST_ROWS: usize = 10;
const LIST_BUTTON_LABEL: &str = "Options";

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("channel rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl From<ChannelError> for crate::error::AppError {
    fn from(err: ChannelError) -> Self {
        crate::error::AppError::ExternalService(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyButton {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListSection {
    pub title: String,
    pub rows: Vec<ListRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    Text {
        body: String,
    },
    Buttons {
        body: String,
        buttons: Vec<ReplyButton>,
    },
    List {
        body: String,
        button: String,
        sections: Vec<ListSection>,
    },
    Reaction {
        message_id: String,
        emoji: String,
    },
}

#[async_trait]
pub trait MessagingChannel: Send + Sync {
    async fn send(&self, to: &str, message: &OutboundMessage) -> Result<(), ChannelError>;
}

/// Channel used when no provider is configured: messages only go to the log.
#[derive(Debug, Default, Clone)]
pub struct LoggingChannel;

#[async_trait]
impl MessagingChannel for LoggingChannel {
    async fn send(&self, to: &str, message: &OutboundMessage) -> Result<(), ChannelError> {
        tracing::info!(to, ?message, "outbound message (no channel configured)");
        Ok(())
    }
}

pub fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut out: String = text.chars().take(limit.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Render one engine reply as the messages to send.
///
/// Cards with an action and more than three quick actions need a list;
/// otherwise quick actions become reply buttons and cards are listed in text.
pub fn render_reply(reply: &ChatReply) -> Vec<OutboundMessage> {
    let actionable_cards: Vec<_> = reply
        .cards
        .iter()
        .filter_map(|card| card.action.as_ref().map(|action| (card, action)))
        .collect();

    if actionable_cards.is_empty() && reply.quick_actions.len() <= MAX_BUTTONS {
        let mut body = reply.text.clone();
        for card in &reply.cards {
            body.push_str(&format!("\n\n*{}*\n{}", card.title, card.subtitle));
        }
        if reply.quick_actions.is_empty() {
            return vec![OutboundMessage::Text { body }];
        }
        let buttons = reply
            .quick_actions
            .iter()
            .map(|action| ReplyButton {
                id: action.id.clone(),
                title: truncate_chars(&action.label, BUTTON_LABEL_LIMIT),
            })
            .collect();
        return vec![OutboundMessage::Buttons { body, buttons }];
    }

    let mut sections = Vec::new();
    let mut budget = MAX_LIST_ROWS;
    if !actionable_cards.is_empty() {
        let rows: Vec<ListRow> = actionable_cards
            .iter()
            .take(budget)
            .map(|(card, action)| ListRow {
                id: action.id.clone(),
                title: truncate_chars(&card.title, ROW_TITLE_LIMIT),
                description: Some(truncate_chars(&card.subtitle, ROW_DESCRIPTION_LIMIT)),
            })
            .collect();
        budget -= rows.len();
        sections.push(ListSection {
            title: "Choose".to_string(),
            rows,
        });
    }
    if budget > 0 && !reply.quick_actions.is_empty() {
        let rows = reply
            .quick_actions
            .iter()
            .take(budget)
            .map(|action| ListRow {
                id: action.id.clone(),
                title: truncate_chars(&action.label, ROW_TITLE_LIMIT),
                description: None,
            })
            .collect();
        sections.push(ListSection {
            title: "Menu".to_string(),
            rows,
        });
    }

    vec![OutboundMessage::List {
        body: reply.text.clone(),
        button: LIST_BUTTON_LABEL.to_string(),
        sections,
    }]
}

/// Send every rendered message for `reply` to `to`, stopping at the first failure.
pub async fn deliver(
    channel: &dyn MessagingChannel,
    to: &str,
    reply: &ChatReply,
) -> Result<(), ChannelError> {
    for message in render_reply(reply) {
        channel.send(to, &message).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Card, QuickAction};

    fn reply(actions: usize, cards: usize) -> ChatReply {
        ChatReply {
            text: "Pick one".into(),
            quick_actions: (0..actions)
                .map(|i| QuickAction::new(format!("ACTION_{i}"), format!("A rather long label number {i}")))
                .collect(),
            cards: (0..cards)
                .map(|i| Card {
                    title: format!("Sparkle Cleaning Services Limited {i}"),
                    subtitle: "x".repeat(100),
                    price: Some(1000),
                    rating: Some(4.5),
                    action: Some(QuickAction::new(format!("HIRE_HELPA:{i}"), "Hire")),
                })
                .collect(),
        }
    }

    #[test]
    fn plain_text_without_actions() {
        let messages = render_reply(&reply(0, 0));
        assert_eq!(
            messages,
            vec![OutboundMessage::Text {
                body: "Pick one".into()
            }]
        );
    }

    #[test]
    fn up_to_three_actions_become_buttons_with_short_labels() {
        let messages = render_reply(&reply(3, 0));
        let OutboundMessage::Buttons { buttons, .. } = &messages[0] else {
            panic!("expected buttons, got {messages:?}");
        };
        assert_eq!(buttons.len(), 3);
        assert!(buttons.iter().all(|b| b.title.chars().count() <= BUTTON_LABEL_LIMIT));
    }

    #[test]
    fn many_actions_or_cards_become_a_list_within_limits() {
        let messages = render_reply(&reply(4, 8));
        let OutboundMessage::List { sections, .. } = &messages[0] else {
            panic!("expected list, got {messages:?}");
        };
        let rows: Vec<&ListRow> = sections.iter().flat_map(|s| s.rows.iter()).collect();
        assert_eq!(rows.len(), MAX_LIST_ROWS);
        assert_eq!(rows[0].id, "HIRE_HELPA:0");
        for row in rows {
            assert!(row.title.chars().count() <= ROW_TITLE_LIMIT);
            if let Some(description) = &row.description {
                assert!(description.chars().count() <= ROW_DESCRIPTION_LIMIT);
            }
        }
    }

    #[test]
    fn truncation_is_char_aware() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héll…");
        assert_eq!(truncate_chars("short", 20), "short");
    }
}
