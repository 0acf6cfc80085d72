use uuid::Uuid;

use crate::{
    dto::escrow::Booking,
    error::{AppError, AppResult},
    models::{Availability, EscrowMetadata},
    services::{escrow_service, notification_service, provider_service, transaction_service},
    state::AppState,
};

/// Book a service: hold the price in a pending escrow, record the provider's
/// pending transaction against it and tell the provider.
pub async fn book_service(
    state: &AppState,
    customer_id: Uuid,
    service_id: Uuid,
    description: Option<String>,
) -> AppResult<Booking> {
    let service = provider_service::get_service(state, service_id).await?;
    if service.availability == Availability::Unavailable {
        return Err(AppError::validation(format!(
            "{} is not taking bookings",
            service.name
        )));
    }

    let escrow = escrow_service::create(
        state,
        customer_id,
        service.provider_id,
        service.price,
        EscrowMetadata {
            service_id: Some(service.id),
            description: description.clone(),
            ..Default::default()
        },
    )
    .await?;

    let transaction = transaction_service::record_transaction(
        state,
        service.provider_id,
        service.id,
        customer_id,
        service.price,
        Some(escrow.id),
    )
    .await?;

    let summary = description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or("No description provided");
    notification_service::notify(
        state,
        service.provider_id,
        "new_booking",
        &format!("New booking: {}", service.name),
        &format!("A customer booked {} ({}). {summary}", service.name, service.price),
    )
    .await?;

    Ok(Booking {
        checkout_url: checkout_url(state, escrow.id),
        escrow,
        transaction,
    })
}

pub fn checkout_url(state: &AppState, reference: Uuid) -> String {
    format!("{}?reference={reference}", state.config.payment_checkout_url)
}
