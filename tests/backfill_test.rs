mod common;

use std::sync::Arc;
use std::time::Duration;

use swiftlink::adapters::sqlite::SqliteObservationRepository;
use swiftlink::adapters::swift::SwiftClient;
use swiftlink::domain::errors::FacilityError;
use swiftlink::domain::ports::ObservationRepository;
use swiftlink::services::{ObservationBackfill, WorkerPool};
use swiftlink::Config;

use common::{config_for, setup_test_db, test_request};
use swiftlink::domain::models::{RequestPayload, TooForm};

#[tokio::test]
async fn test_reversed_window_rejected_before_any_network_call() {
    // Unroutable default endpoints: a network call here would hang or fail.
    let client = SwiftClient::new(&Config::default());
    let pool = setup_test_db().await;
    let repo: Arc<dyn ObservationRepository> =
        Arc::new(SqliteObservationRepository::new(pool));
    let backfill = ObservationBackfill::new(client, repo, WorkerPool::new(1));

    let allocation = test_request(RequestPayload::Too(TooForm::default())).allocation;
    let result = backfill.retrieve(&allocation, "2024-06-01 00:00:00", "2024-01-01 00:00:00");
    match result {
        Err(FacilityError::Validation(msg)) => {
            assert_eq!(msg, "start_date must be before end_date.");
        }
        other => panic!("Expected Validation, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_unparseable_window_rejected() {
    let client = SwiftClient::new(&Config::default());
    let pool = setup_test_db().await;
    let repo: Arc<dyn ObservationRepository> =
        Arc::new(SqliteObservationRepository::new(pool));
    let backfill = ObservationBackfill::new(client, repo, WorkerPool::new(1));

    let allocation = test_request(RequestPayload::Too(TooForm::default())).allocation;
    let result = backfill.retrieve(&allocation, "last tuesday", "2024-01-01 00:00:00");
    assert!(matches!(result, Err(FacilityError::Validation(_))));
}

#[tokio::test]
async fn test_missing_credentials_rejected() {
    let client = SwiftClient::new(&Config::default());
    let pool = setup_test_db().await;
    let repo: Arc<dyn ObservationRepository> =
        Arc::new(SqliteObservationRepository::new(pool));
    let backfill = ObservationBackfill::new(client, repo, WorkerPool::new(1));

    let mut allocation = test_request(RequestPayload::Too(TooForm::default())).allocation;
    allocation.altdata = None;
    let result = backfill.retrieve(&allocation, "2024-01-01 00:00:00", "2024-06-01 00:00:00");
    assert!(matches!(result, Err(FacilityError::MissingCredentials)));
}

#[tokio::test]
async fn test_backfill_inserts_normalized_rows() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/obsquery")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"obsid": "00012345001", "begin": "2024-03-01 12:30:00",
                 "ra_object": 150.1, "dec_object": -20.5, "exposure": 1600.0,
                 "uvot": "0x015a", "targname": "ZTF24abcdef"},
                {"obsid": "00012345002", "begin": "2024-03-02 12:30:00",
                 "ra_object": null, "dec_object": -20.5, "exposure": 900.0,
                 "uvot": "0x015a", "targname": "ZTF24abcdef"},
                {"obsid": "00012345003", "begin": "2024-03-03 12:30:00",
                 "ra_object": 150.1, "dec_object": -20.5, "exposure": 400.0,
                 "uvot": "0x9999", "targname": "ZTF24abcdef"}
            ]"#,
        )
        .create_async()
        .await;
    // The known mode decodes to a filter list; the other is unknown.
    server
        .mock("GET", "/uvot_mode")
        .match_query(mockito::Matcher::UrlEncoded(
            "mode".to_string(),
            "0x015a".to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"entries": [{"filter_name": "u"}, {"filter_name": "b"}]}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/uvot_mode")
        .match_query(mockito::Matcher::UrlEncoded(
            "mode".to_string(),
            "0x9999".to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"entries": null}"#)
        .create_async()
        .await;

    let client = SwiftClient::new(&config_for(&server));
    let pool = setup_test_db().await;
    let repo: Arc<dyn ObservationRepository> =
        Arc::new(SqliteObservationRepository::new(pool));
    let backfill = ObservationBackfill::new(client, Arc::clone(&repo), WorkerPool::new(1));

    let allocation = test_request(RequestPayload::Too(TooForm::default())).allocation;
    backfill
        .retrieve(&allocation, "2024-01-01 00:00:00", "2024-06-01 00:00:00")
        .expect("retrieve should schedule the backfill");

    // Only the first row survives: the second has no pointing and the
    // third row's mode decodes to nothing.
    let mut count = 0;
    for _ in 0..50 {
        count = repo.count(allocation.instrument_id).await.unwrap();
        if count > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_backfill_is_idempotent_across_runs() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/obsquery")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[{"obsid": "00012345001", "begin": "2024-03-01 12:30:00",
                 "ra_object": 150.1, "dec_object": -20.5, "exposure": 1600.0,
                 "uvot": "0x015a", "targname": "ZTF24abcdef"}]"#,
        )
        .expect(2)
        .create_async()
        .await;
    server
        .mock("GET", "/uvot_mode")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"entries": [{"filter_name": "u"}]}"#)
        .create_async()
        .await;

    let client = SwiftClient::new(&config_for(&server));
    let pool = setup_test_db().await;
    let repo: Arc<dyn ObservationRepository> =
        Arc::new(SqliteObservationRepository::new(pool));
    let backfill = ObservationBackfill::new(client, Arc::clone(&repo), WorkerPool::new(1));

    let allocation = test_request(RequestPayload::Too(TooForm::default())).allocation;
    for _ in 0..2 {
        backfill
            .retrieve(&allocation, "2024-01-01 00:00:00", "2024-06-01 00:00:00")
            .unwrap();
        // Let the background run finish before the next one starts.
        for _ in 0..50 {
            if repo.count(allocation.instrument_id).await.unwrap() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(repo.count(allocation.instrument_id).await.unwrap(), 1);
}
