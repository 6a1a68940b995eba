mod common;

use std::sync::Arc;

use swiftlink::adapters::sqlite::SqliteFollowupRepository;
use swiftlink::adapters::swift::SwiftClient;
use swiftlink::domain::models::{DataQueryForm, RequestPayload, TooForm, XrtJobForm};
use swiftlink::domain::ports::{FollowupRepository, NullPlatformBus, PlatformBus};
use swiftlink::services::{NotificationDispatcher, SubmitOptions, Submitter};

use common::{config_for, setup_test_db, test_request, RecordingPlatformBus};

fn submitter(
    server: &mockito::ServerGuard,
    repo: Arc<dyn FollowupRepository>,
    bus: Arc<dyn PlatformBus>,
) -> Submitter {
    let client = SwiftClient::new(&config_for(server));
    Submitter::new(client, repo, bus, NotificationDispatcher::new(None))
}

#[tokio::test]
async fn test_too_submission_records_transaction_and_status() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/toop/submit_api.php")
        .with_status(200)
        .with_body("OK")
        .create_async()
        .await;

    let pool = setup_test_db().await;
    let repo: Arc<dyn FollowupRepository> = Arc::new(SqliteFollowupRepository::new(pool));

    let mut form = TooForm::default();
    form.urgency = "2".to_string();
    form.obs_type = "Position".to_string();
    let request = test_request(RequestPayload::Too(form));
    repo.insert(&request).await.expect("insert should succeed");

    let submitter = submitter(&server, Arc::clone(&repo), Arc::new(NullPlatformBus));
    submitter
        .submit(&request, SubmitOptions::default())
        .await
        .expect("submission should succeed");

    mock.assert_async().await;

    let stored = repo.get(request.id).await.unwrap().expect("request exists");
    assert_eq!(stored.status, "submitted");

    let txn = repo
        .last_transaction(request.id)
        .await
        .unwrap()
        .expect("transaction recorded");
    assert_eq!(txn.response.status, 200);
    assert_eq!(txn.response.content, "OK");
    assert!(txn.request.body.starts_with("jwt="));
    assert!(txn.request.url.ends_with("/toop/submit_api.php"));
}

#[tokio::test]
async fn test_too_rejection_recorded_with_body_and_notified() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/toop/submit_api.php")
        .with_status(500)
        .with_body("bad urgency")
        .create_async()
        .await;

    let pool = setup_test_db().await;
    let repo: Arc<dyn FollowupRepository> = Arc::new(SqliteFollowupRepository::new(pool));
    let request = test_request(RequestPayload::Too(TooForm::default()));
    repo.insert(&request).await.unwrap();

    let bus = RecordingPlatformBus::new();
    let submitter = submitter(&server, Arc::clone(&repo), bus.clone());

    // A facility rejection is an outcome, not an error.
    submitter
        .submit(&request, SubmitOptions::default())
        .await
        .expect("rejection should not error");

    let stored = repo.get(request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, "rejected: bad urgency");

    // The transaction is still recorded for the audit trail.
    let txn = repo.last_transaction(request.id).await.unwrap().unwrap();
    assert_eq!(txn.response.status, 500);

    // The toast carries the raw facility body, not the stored status.
    let events = bus.events.lock().await;
    assert!(
        events
            .iter()
            .any(|e| e.contains(":error:Failed to submit Swift request: bad urgency")),
        "expected an error toast with the response body, got: {events:?}"
    );
}

#[tokio::test]
async fn test_xrt_job_accepted() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/run_userobject.php")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"OK": 1, "JobID": 42, "URL": "https://example.org/jobs/42"}"#)
        .create_async()
        .await;

    let pool = setup_test_db().await;
    let repo: Arc<dyn FollowupRepository> = Arc::new(SqliteFollowupRepository::new(pool));
    let request = test_request(RequestPayload::XrtJob(XrtJobForm::default()));
    repo.insert(&request).await.unwrap();

    let submitter = submitter(&server, Arc::clone(&repo), Arc::new(NullPlatformBus));
    submitter
        .submit(&request, SubmitOptions::default())
        .await
        .unwrap();

    mock.assert_async().await;

    let stored = repo.get(request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, "submitted");

    // The raw response is stored so the fetch path can re-read the JobID.
    let txn = repo.last_transaction(request.id).await.unwrap().unwrap();
    assert!(txn.response.content.contains("\"JobID\": 42"));
    assert!(txn.request.body.contains("\"UserID\":\"xrt-42\""));
}

#[tokio::test]
async fn test_xrt_job_rejected_by_facility() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/run_userobject.php")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"OK": 0, "ERROR": "Invalid position", "listErr": ["RA out of range"]}"#)
        .create_async()
        .await;

    let pool = setup_test_db().await;
    let repo: Arc<dyn FollowupRepository> = Arc::new(SqliteFollowupRepository::new(pool));
    let request = test_request(RequestPayload::XrtJob(XrtJobForm::default()));
    repo.insert(&request).await.unwrap();

    let submitter = submitter(&server, Arc::clone(&repo), Arc::new(NullPlatformBus));
    submitter
        .submit(&request, SubmitOptions::default())
        .await
        .unwrap();

    let stored = repo.get(request.id).await.unwrap().unwrap();
    assert!(stored.status.starts_with("rejected: Invalid position"));
    assert!(stored.status.contains("RA out of range"));
}

#[tokio::test]
async fn test_xrt_job_http_error_uses_reason_phrase() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/run_userobject.php")
        .with_status(503)
        .create_async()
        .await;

    let pool = setup_test_db().await;
    let repo: Arc<dyn FollowupRepository> = Arc::new(SqliteFollowupRepository::new(pool));
    let request = test_request(RequestPayload::XrtJob(XrtJobForm::default()));
    repo.insert(&request).await.unwrap();

    let submitter = submitter(&server, Arc::clone(&repo), Arc::new(NullPlatformBus));
    submitter
        .submit(&request, SubmitOptions::default())
        .await
        .unwrap();

    let stored = repo.get(request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, "rejected: Service Unavailable");
}

#[tokio::test]
async fn test_data_query_sets_count_status_without_transaction() {
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
                 "ra_object": 150.1, "dec_object": -20.5, "exposure": 900.0,
                 "uvot": "0x015a", "targname": "ZTF24abcdef"}
            ]"#,
        )
        .create_async()
        .await;

    let pool = setup_test_db().await;
    let repo: Arc<dyn FollowupRepository> = Arc::new(SqliteFollowupRepository::new(pool));

    let mut form = DataQueryForm::default();
    form.start_date = "2024-01-01 00:00:00".to_string();
    form.end_date = "2024-06-01 00:00:00".to_string();
    form.uvot = true;
    let request = test_request(RequestPayload::DataQuery(form));
    repo.insert(&request).await.unwrap();

    let submitter = submitter(&server, Arc::clone(&repo), Arc::new(NullPlatformBus));
    submitter
        .submit(&request, SubmitOptions::default())
        .await
        .unwrap();

    let stored = repo.get(request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, "Number of observations: 2");

    // Data queries never create an audit transaction.
    assert!(repo.last_transaction(request.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_missing_credentials_submits_nothing() {
    let server = mockito::Server::new_async().await;
    // No mocks: any HTTP call would 501 and fail the transaction check below.

    let pool = setup_test_db().await;
    let repo: Arc<dyn FollowupRepository> = Arc::new(SqliteFollowupRepository::new(pool));
    let mut request = test_request(RequestPayload::Too(TooForm::default()));
    request.allocation.altdata = None;
    repo.insert(&request).await.unwrap();

    let submitter = submitter(&server, Arc::clone(&repo), Arc::new(NullPlatformBus));
    let result = submitter.submit(&request, SubmitOptions::default()).await;
    assert!(result.is_err());

    let stored = repo.get(request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, "pending submission");
    assert!(repo.last_transaction(request.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_refresh_signals_pushed_when_requested() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/toop/submit_api.php")
        .with_status(200)
        .with_body("OK")
        .create_async()
        .await;

    let pool = setup_test_db().await;
    let repo: Arc<dyn FollowupRepository> = Arc::new(SqliteFollowupRepository::new(pool));
    let request = test_request(RequestPayload::Too(TooForm::default()));
    repo.insert(&request).await.unwrap();

    let bus = RecordingPlatformBus::new();
    let submitter = submitter(&server, Arc::clone(&repo), bus.clone());
    submitter
        .submit(
            &request,
            SubmitOptions { refresh_source: true, refresh_requests: true },
        )
        .await
        .unwrap();

    let events = bus.events.lock().await;
    assert!(events.iter().any(|e| e == "refresh_source:obj-key"));
    assert!(events
        .iter()
        .any(|e| e.starts_with("refresh_requests:")));
}
