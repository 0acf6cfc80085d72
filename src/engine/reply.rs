use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QuickAction {
    pub id: String,
    pub label: String,
}

impl QuickAction {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Structured item shown alongside a reply (a Helpa, a meal, an order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Card {
    pub title: String,
    pub subtitle: String,
    pub price: Option<i64>,
    pub rating: Option<f64>,
    pub action: Option<QuickAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatReply {
    #[serde(rename = "response_text")]
    pub text: String,
    pub quick_actions: Vec<QuickAction>,
    pub cards: Vec<Card>,
}

impl ChatReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quick_actions: Vec::new(),
            cards: Vec::new(),
        }
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = QuickAction>) -> Self {
        self.quick_actions.extend(actions);
        self
    }

    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        self.cards = cards;
        self
    }

    pub fn has_action(&self, id: &str) -> bool {
        self.quick_actions.iter().any(|a| a.id == id)
    }
}

/// Group digits for display: 20000 -> "20,000".
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
