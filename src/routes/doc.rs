use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{AddToCartRequest, CartView},
        catalog::MenuList,
        chat::{
            AssistantChatRequest, AssistantChatResponse, ChatHistory, ChatInit, InitChatRequest,
            SendMessageRequest,
        },
        escrow::{
            ActivateSubscriptionRequest, BookServiceRequest, Booking, CreateEscrowRequest,
            DisputeOutcome, DisputeRequest, EscrowList, SubscriptionStatus,
        },
        orders::{CheckoutRequest, OrderList, UpdateOrderStatusRequest},
        providers::{
            CreateServiceRequest, NotificationList, ProviderAnalytics, RegisterProviderRequest,
            ServiceEarnings, ServiceList, TransactionList, UpdateProviderRequest,
            UpdateServiceRequest, UpdateTransactionRequest,
        },
    },
    engine::{Card, ChatFlow, ChatMessage, ChatReply, MessageRole, QuickAction},
    models::{
        AccountType, Availability, BankDetails, CartItem, DeliveryInfo, Dispute, DisputeStatus,
        EscrowMetadata, EscrowStatus, EscrowTransaction, MenuItem, Notification, Order,
        OrderStatus, PriceType, Provider, Service, Subscription, Transaction, TransactionStatus,
        VerificationStatus,
    },
    response::{ApiResponse, Meta},
    routes::{
        assistant, cart, catalog, chat, escrow, health, orders, params, providers, services,
        subscriptions, webhook,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        chat::init_chat,
        chat::send_message,
        chat::chat_history,
        catalog::list_menu,
        catalog::get_menu_item,
        cart::get_cart,
        cart::add_to_cart,
        cart::remove_from_cart,
        cart::clear_cart,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        orders::update_order_status,
        providers::register_provider,
        providers::my_profile,
        providers::update_profile,
        providers::get_provider,
        providers::my_services,
        providers::create_service,
        providers::update_service,
        providers::delete_service,
        providers::analytics,
        providers::list_transactions,
        providers::update_transaction,
        providers::list_notifications,
        providers::mark_notification_read,
        services::search_services,
        services::list_categories,
        services::get_service,
        escrow::create_escrow,
        escrow::list_escrows,
        escrow::get_escrow,
        escrow::lock_escrow,
        escrow::release_escrow,
        escrow::dispute_escrow,
        escrow::book_service,
        subscriptions::my_subscription,
        subscriptions::activate_subscription,
        webhook::verify_webhook,
        webhook::receive_webhook,
        assistant::assistant_chat
    ),
    components(
        schemas(
            MenuItem,
            Service,
            PriceType,
            Availability,
            CartItem,
            Order,
            OrderStatus,
            DeliveryInfo,
            Provider,
            AccountType,
            VerificationStatus,
            BankDetails,
            Transaction,
            TransactionStatus,
            EscrowTransaction,
            EscrowStatus,
            EscrowMetadata,
            Dispute,
            DisputeStatus,
            Notification,
            Subscription,
            ChatFlow,
            ChatMessage,
            MessageRole,
            ChatReply,
            QuickAction,
            Card,
            InitChatRequest,
            ChatInit,
            SendMessageRequest,
            ChatHistory,
            AssistantChatRequest,
            AssistantChatResponse,
            MenuList,
            AddToCartRequest,
            CartView,
            CheckoutRequest,
            UpdateOrderStatusRequest,
            OrderList,
            RegisterProviderRequest,
            UpdateProviderRequest,
            CreateServiceRequest,
            UpdateServiceRequest,
            UpdateTransactionRequest,
            ServiceList,
            TransactionList,
            NotificationList,
            ServiceEarnings,
            ProviderAnalytics,
            CreateEscrowRequest,
            DisputeRequest,
            DisputeOutcome,
            EscrowList,
            BookServiceRequest,
            Booking,
            ActivateSubscriptionRequest,
            SubscriptionStatus,
            escrow::EscrowRole,
            webhook::WebhookReceipt,
            params::Pagination,
            Meta,
            ApiResponse<EscrowTransaction>,
            ApiResponse<ChatReply>,
            ApiResponse<Order>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Chat", description = "Conversational assistant sessions"),
        (name = "Catalog", description = "Menu endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Providers", description = "Helpa profiles, services, earnings and notifications"),
        (name = "Services", description = "Service search"),
        (name = "Escrow", description = "Bookings and held payments"),
        (name = "Subscriptions", description = "Premium subscription"),
        (name = "Channel", description = "Messaging channel webhook"),
        (name = "Assistant", description = "Generative help"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route_group() {
        let openapi = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/chat/init",
            "/api/escrow/{id}/release",
            "/api/services/search",
            "/webhook",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
