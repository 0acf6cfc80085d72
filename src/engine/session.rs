use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Messages retained per session; older entries are dropped on append.
pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChatFlow {
    Main,
    Service,
    Consultation,
    Recipes,
    Dispute,
    Subscription,
    Payment,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceFlowState {
    pub category: Option<String>,
    pub service_id: Option<Uuid>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsultationFlowState {
    pub category: Option<String>,
    pub service_id: Option<Uuid>,
    pub question: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipesFlowState {
    pub category: Option<String>,
    pub last_order_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputeFlowState {
    pub escrow_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentFlowState {
    pub escrow_id: Uuid,
    pub amount: i64,
    pub checkout_url: String,
}

/// Flow-scoped state. Each variant only carries what its flow's steps read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "flow", content = "state", rename_all = "snake_case")]
pub enum FlowContext {
    #[default]
    Main,
    Service(ServiceFlowState),
    Consultation(ConsultationFlowState),
    Recipes(RecipesFlowState),
    Dispute(DisputeFlowState),
    Subscription,
    Payment(PaymentFlowState),
}

impl FlowContext {
    pub fn flow(&self) -> ChatFlow {
        match self {
            FlowContext::Main => ChatFlow::Main,
            FlowContext::Service(_) => ChatFlow::Service,
            FlowContext::Consultation(_) => ChatFlow::Consultation,
            FlowContext::Recipes(_) => ChatFlow::Recipes,
            FlowContext::Dispute(_) => ChatFlow::Dispute,
            FlowContext::Subscription => ChatFlow::Subscription,
            FlowContext::Payment(_) => ChatFlow::Payment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub customer_name: Option<String>,
    pub current_flow: ChatFlow,
    pub current_step: u32,
    pub context: FlowContext,
    /// Captured at init and not re-checked for the rest of the session.
    pub subscription_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(customer_id: Option<Uuid>, customer_name: Option<String>, subscription_active: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id,
            customer_name,
            current_flow: ChatFlow::Main,
            current_step: 0,
            context: FlowContext::Main,
            subscription_active,
            created_at: now,
            last_activity: now,
        }
    }

    /// Switch to the flow carried by `context`, starting at step 0.
    pub fn enter(&mut self, context: FlowContext) {
        self.current_flow = context.flow();
        self.current_step = 0;
        self.context = context;
    }

    /// Move forward within the current flow. Never moves backwards.
    pub fn advance_to(&mut self, step: u32) {
        self.current_step = self.current_step.max(step);
    }

    /// Step back one step; returns false when already at the first step.
    pub fn step_back(&mut self) -> bool {
        if self.current_step == 0 {
            return false;
        }
        self.current_step -= 1;
        true
    }

    pub fn is_anonymous(&self) -> bool {
        self.customer_id.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Append and keep only the most recent [`HISTORY_LIMIT`] messages.
pub fn push_capped(history: &mut Vec<ChatMessage>, message: ChatMessage) {
    history.push(message);
    if history.len() > HISTORY_LIMIT {
        let excess = history.len() - HISTORY_LIMIT;
        history.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entering_a_flow_resets_step() {
        let mut session = ChatSession::new(None, None, false);
        session.enter(FlowContext::Service(ServiceFlowState::default()));
        session.advance_to(2);
        assert_eq!(session.current_step, 2);

        session.enter(FlowContext::Subscription);
        assert_eq!(session.current_flow, ChatFlow::Subscription);
        assert_eq!(session.current_step, 0);
    }

    #[test]
    fn advance_never_moves_backwards() {
        let mut session = ChatSession::new(None, None, false);
        session.advance_to(3);
        session.advance_to(1);
        assert_eq!(session.current_step, 3);
        assert!(session.step_back());
        assert_eq!(session.current_step, 2);
    }

    #[test]
    fn step_back_stops_at_zero() {
        let mut session = ChatSession::new(None, None, false);
        assert!(!session.step_back());
        assert_eq!(session.current_step, 0);
    }

    #[test]
    fn history_keeps_most_recent_fifty() {
        let mut history = Vec::new();
        for i in 0..60 {
            push_capped(&mut history, ChatMessage::new(MessageRole::User, i.to_string()));
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.first().unwrap().content, "10");
        assert_eq!(history.last().unwrap().content, "59");
    }

    #[test]
    fn context_round_trips_through_json() {
        let context = FlowContext::Payment(PaymentFlowState {
            escrow_id: Uuid::new_v4(),
            amount: 20_000,
            checkout_url: "https://pay".into(),
        });
        let value = serde_json::to_value(&context).unwrap();
        assert_eq!(value["flow"], "payment");
        let decoded: FlowContext = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, context);
    }
}
