mod common;

use helpa_marketplace_api::{
    dto::providers::{
        RegisterProviderRequest, ServiceFilters, UpdateProviderRequest, UpdateServiceRequest,
    },
    error::AppError,
    models::{AccountType, Availability, BankDetails, TransactionStatus, VerificationStatus},
    services::{notification_service, provider_service, search_service, transaction_service},
};
use uuid::Uuid;

use common::{register_provider, service_request, test_state};

#[tokio::test]
async fn register_validates_and_rejects_duplicates() -> anyhow::Result<()> {
    let state = test_state();
    let provider_id = Uuid::new_v4();

    let bad_bank = provider_service::register(
        &state,
        provider_id,
        RegisterProviderRequest {
            business_name: "Ada Cleans".into(),
            account_type: AccountType::Business,
            bio: String::new(),
            bank_details: Some(BankDetails {
                bank_name: "Demo Bank".into(),
                account_number: "12345".into(),
                account_name: "Ada".into(),
            }),
        },
    )
    .await;
    assert!(matches!(bad_bank, Err(AppError::Validation(_))));

    register_provider(&state, provider_id, "Ada Cleans").await;
    let provider = provider_service::get_provider(&state, provider_id).await?;
    assert_eq!(provider.verification_status, VerificationStatus::Pending);
    assert_eq!(provider.pending_earnings, 0);

    let duplicate = provider_service::register(
        &state,
        provider_id,
        RegisterProviderRequest {
            business_name: "Ada Cleans Again".into(),
            account_type: AccountType::Individual,
            bio: String::new(),
            bank_details: None,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Validation(_))));

    let updated = provider_service::update_profile(
        &state,
        provider_id,
        UpdateProviderRequest {
            bio: Some("Spotless homes since 2015".into()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(updated.bio, "Spotless homes since 2015");
    assert_eq!(updated.business_name, "Ada Cleans");
    Ok(())
}

#[tokio::test]
async fn services_are_listed_updated_and_deleted_by_owner() -> anyhow::Result<()> {
    let state = test_state();
    let provider_id = Uuid::new_v4();
    register_provider(&state, provider_id, "Fixit").await;

    let unknown = provider_service::create_service(
        &state,
        provider_id,
        service_request("gardening", "Lawn care", 4_000),
    )
    .await;
    assert!(matches!(unknown, Err(AppError::Validation(_))));

    let service = provider_service::create_service(
        &state,
        provider_id,
        service_request("carpentry", "Shelves", 9_000),
    )
    .await?;
    let provider = provider_service::get_provider(&state, provider_id).await?;
    assert_eq!(provider.services, vec![service.id]);

    let intruder = provider_service::update_service(
        &state,
        Uuid::new_v4(),
        service.id,
        UpdateServiceRequest {
            price: Some(1),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(intruder, Err(AppError::Forbidden(_))));

    let busy = provider_service::update_service(
        &state,
        provider_id,
        service.id,
        UpdateServiceRequest {
            availability: Some(Availability::Busy),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(busy.availability, Availability::Busy);

    provider_service::delete_service(&state, provider_id, service.id).await?;
    assert!(provider_service::list_provider_services(&state, provider_id).await?.is_empty());
    let found = search_service::search(&state, Some("carpentry"), &ServiceFilters::default()).await?;
    assert!(found.is_empty());
    Ok(())
}

#[tokio::test]
async fn search_filters_by_price_and_ranks() -> anyhow::Result<()> {
    let state = test_state();
    let provider_id = Uuid::new_v4();
    register_provider(&state, provider_id, "Clean Team").await;

    let mut ids = Vec::new();
    for (name, price) in [("Basic clean", 5_000), ("Deep clean", 15_000), ("Move-out clean", 30_000)] {
        let service = provider_service::create_service(
            &state,
            provider_id,
            service_request("cleaning", name, price),
        )
        .await?;
        ids.push(service.id);
    }
    provider_service::create_service(
        &state,
        provider_id,
        service_request("plumbing", "Leak fix", 10_000),
    )
    .await?;

    // Completing a job on the deep clean lifts it above the others.
    let transaction =
        transaction_service::record_transaction(&state, provider_id, ids[1], Uuid::new_v4(), 15_000, None)
            .await?;
    transaction_service::update_transaction_status(&state, transaction.id, TransactionStatus::Completed)
        .await?;

    let bounded = search_service::search(
        &state,
        Some("cleaning"),
        &ServiceFilters {
            min_price: Some(5_000),
            max_price: Some(15_000),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(bounded.len(), 2);
    assert!(bounded.iter().all(|s| (5_000..=15_000).contains(&s.price)));
    assert_eq!(bounded[0].id, ids[1]);

    let everywhere = search_service::search(
        &state,
        None,
        &ServiceFilters {
            location: Some("lagos".into()),
            tags: vec!["HOME".into()],
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(everywhere.len(), 4);

    let bad = search_service::search(&state, Some("astrology"), &ServiceFilters::default()).await;
    assert!(matches!(bad, Err(AppError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn transaction_lifecycle_moves_earnings() -> anyhow::Result<()> {
    let state = test_state();
    let provider_id = Uuid::new_v4();
    register_provider(&state, provider_id, "Tutor Tom").await;
    let service = provider_service::create_service(
        &state,
        provider_id,
        service_request("tutoring", "Maths lessons", 6_000),
    )
    .await?;

    let first =
        transaction_service::record_transaction(&state, provider_id, service.id, Uuid::new_v4(), 6_000, None)
            .await?;
    let second =
        transaction_service::record_transaction(&state, provider_id, service.id, Uuid::new_v4(), 6_000, None)
            .await?;
    let provider = provider_service::get_provider(&state, provider_id).await?;
    assert_eq!(provider.pending_earnings, 12_000);

    transaction_service::update_transaction_status(&state, first.id, TransactionStatus::Completed).await?;
    transaction_service::update_transaction_status(&state, second.id, TransactionStatus::Cancelled).await?;

    let provider = provider_service::get_provider(&state, provider_id).await?;
    assert_eq!(provider.total_earnings, 6_000);
    assert_eq!(provider.pending_earnings, 0);
    assert_eq!(provider.completed_jobs, 1);

    // Completed is terminal.
    let reopen =
        transaction_service::update_transaction_status(&state, first.id, TransactionStatus::Refunded).await;
    assert!(matches!(reopen, Err(AppError::State(_))));

    let analytics = transaction_service::analytics(&state, provider_id).await?;
    assert_eq!(analytics.transaction_count, 2);
    assert_eq!(analytics.status_counts.get("completed"), Some(&1));
    assert_eq!(analytics.status_counts.get("cancelled"), Some(&1));
    assert_eq!(analytics.services.len(), 1);
    assert_eq!(analytics.services[0].earnings, 6_000);
    assert_eq!(analytics.services[0].completed_jobs, 1);

    assert_eq!(transaction_service::list_transactions(&state, provider_id).await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn notifications_are_listed_newest_first_and_marked_read() -> anyhow::Result<()> {
    let state = test_state();
    let provider_id = Uuid::new_v4();

    let older = notification_service::notify(&state, provider_id, "info", "First", "hello").await?;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let newer = notification_service::notify(&state, provider_id, "info", "Second", "again").await?;

    let listed = notification_service::list_notifications(&state, provider_id).await?;
    assert_eq!(listed.iter().map(|n| n.id).collect::<Vec<_>>(), vec![newer.id, older.id]);
    assert!(listed.iter().all(|n| !n.read));

    let read = notification_service::mark_read(&state, provider_id, older.id).await?;
    assert!(read.read);

    let missing = notification_service::mark_read(&state, Uuid::new_v4(), older.id).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn service_updates_need_a_name_and_a_live_service() -> anyhow::Result<()> {
    let state = test_state();
    let provider_id = Uuid::new_v4();
    register_provider(&state, provider_id, "Spark").await;
    let service = provider_service::create_service(
        &state,
        provider_id,
        service_request("electrical", "Rewiring", 30_000),
    )
    .await?;

    let blank = provider_service::update_service(
        &state,
        provider_id,
        service.id,
        UpdateServiceRequest {
            name: Some("   ".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(blank, Err(AppError::Validation(_))));
    assert_eq!(provider_service::get_service(&state, service.id).await?.name, "Rewiring");

    let renamed = provider_service::update_service(
        &state,
        provider_id,
        service.id,
        UpdateServiceRequest {
            name: Some("  Full rewiring ".into()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(renamed.name, "Full rewiring");

    // Racing an update against a delete never brings the service back.
    let (update, delete) = tokio::join!(
        provider_service::update_service(
            &state,
            provider_id,
            service.id,
            UpdateServiceRequest {
                price: Some(25_000),
                ..Default::default()
            },
        ),
        provider_service::delete_service(&state, provider_id, service.id),
    );
    delete?;
    assert!(update.is_ok() || matches!(update, Err(AppError::NotFound("service"))));
    let gone = provider_service::get_service(&state, service.id).await;
    assert!(matches!(gone, Err(AppError::NotFound("service"))));
    Ok(())
}
