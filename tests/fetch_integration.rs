//! Integration tests for the fetch path with Wiremock
//!
//! Real reqwest client, real lock files in a temporary directory, and
//! endpoints that refuse connections.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use stns_fetch::domain::services::EndpointSelector;
use stns_fetch::{
    ApiPath, ClientConfig, Config, Endpoint, FetchError, FetchService, FileLockStore, LockStore,
    LockStoreConfig,
};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOCK_TIME_SECS: u64 = 30;

/// An address nothing listens on.
fn refused_endpoint() -> Endpoint {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    Endpoint::new(format!("http://127.0.0.1:{}/v1", port))
}

fn lock_store(dir: &TempDir) -> Arc<FileLockStore> {
    Arc::new(FileLockStore::new(LockStoreConfig {
        dir: dir.path().to_path_buf(),
        lock_time: Duration::from_secs(LOCK_TIME_SECS),
        ..Default::default()
    }))
}

fn client_config() -> ClientConfig {
    ClientConfig {
        timeout: Duration::from_secs(1),
        ..Default::default()
    }
}

/// First seed whose visiting order puts `last` at the end.
fn seed_with_last(endpoints: &[Endpoint], last: &Endpoint) -> u64 {
    (0..)
        .find(|&seed| {
            EndpointSelector::order_with(endpoints, &mut StdRng::seed_from_u64(seed)).last()
                == Some(last)
        })
        .unwrap()
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// A and B refuse connections, C answers 200: the result is C's body and only
/// A and B are put into back-off. The visiting order is pinned so that C
/// comes last.
#[tokio::test]
async fn test_failover_to_healthy_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/user/name/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"name":["alice"]}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = lock_store(&dir);
    let a = refused_endpoint();
    let b = refused_endpoint();
    let c = Endpoint::new(format!("{}/v1", mock_server.uri()));
    let endpoints = vec![a.clone(), b.clone(), c.clone()];
    let seed = seed_with_last(&endpoints, &c);

    let service = FetchService::with_client_config(endpoints, &client_config(), store.clone())
        .unwrap()
        .with_order_seed(seed);

    let attrs = service
        .get(&ApiPath::from_segments(["user", "name", "alice"]))
        .await
        .unwrap();

    assert_eq!(attrs.strings("name"), vec!["alice"]);

    for endpoint in [&a, &b] {
        let record = store.read_record(endpoint).unwrap().unwrap();
        assert!((unix_now() - record.failed_at()).abs() <= 1);
        assert!(!store.is_eligible(endpoint));
    }
    assert!(store.read_record(&c).unwrap().is_none());
    assert!(store.is_eligible(&c));
}

/// With C the only eligible endpoint, repeated lookups never touch A or B
/// and leave fresh records for both.
#[tokio::test]
async fn test_backed_off_endpoints_are_skipped_across_lookups() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/user/name/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"name":["alice"]}"#))
        .expect(3)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = lock_store(&dir);
    let a = refused_endpoint();
    let b = refused_endpoint();
    let c = Endpoint::new(format!("{}/v1", mock_server.uri()));

    // First make both dead endpoints fail once
    let dead_only = FetchService::with_client_config(
        vec![a.clone(), b.clone()],
        &client_config(),
        store.clone(),
    )
    .unwrap();
    let err = dead_only.get_raw(&ApiPath::new("user/name/alice")).await.unwrap_err();
    assert!(err.is_transport());
    assert!(store.read_record(&a).unwrap().is_some());
    assert!(store.read_record(&b).unwrap().is_some());

    let service = FetchService::with_client_config(
        vec![a.clone(), b.clone(), c.clone()],
        &client_config(),
        store.clone(),
    )
    .unwrap();

    for _ in 0..3 {
        let attrs = service.get(&ApiPath::new("/user/name/alice")).await.unwrap();
        assert_eq!(attrs.strings("name"), vec!["alice"]);
    }

    assert!(!store.is_eligible(&a));
    assert!(!store.is_eligible(&b));
    assert!(store.is_eligible(&c));
}

/// Every endpoint refusing: the error names the last endpoint attempted and
/// a second lookup attempts nothing.
#[tokio::test]
async fn test_all_endpoints_down() {
    let dir = TempDir::new().unwrap();
    let store = lock_store(&dir);
    let endpoints = vec![refused_endpoint(), refused_endpoint(), refused_endpoint()];

    let service =
        FetchService::with_client_config(endpoints.clone(), &client_config(), store.clone())
            .unwrap();

    let err = service.get(&ApiPath::new("user/list")).await.unwrap_err();
    match &err {
        FetchError::Transport { endpoint, .. } => {
            assert!(endpoints.iter().any(|e| e.as_str() == endpoint));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let err = service.get(&ApiPath::new("user/list")).await.unwrap_err();
    assert!(matches!(err, FetchError::AllEndpointsBackedOff { skipped: 3 }));
}

/// 404 from every endpoint is "not found": empty attributes, no lock records.
#[tokio::test]
async fn test_not_found_is_empty_and_not_locked() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = lock_store(&dir);
    let a = Endpoint::new(format!("{}/a", mock_server.uri()));
    let b = Endpoint::new(format!("{}/b", mock_server.uri()));

    let service =
        FetchService::with_client_config(vec![a.clone(), b.clone()], &client_config(), store.clone())
            .unwrap();

    let attrs = service.get(&ApiPath::new("user/name/nobody")).await.unwrap();

    assert!(attrs.is_empty());
    assert!(store.read_record(&a).unwrap().is_none());
    assert!(store.read_record(&b).unwrap().is_none());
}

/// A record older than the back-off window is removed and the endpoint used.
#[tokio::test]
async fn test_expired_record_restores_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/id/1000"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":[1000]}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = lock_store(&dir);
    let a = Endpoint::new(mock_server.uri());

    store.record_failure_at(&a, unix_now() - LOCK_TIME_SECS as i64 - 1);
    assert!(store.record_path(&a).exists());

    let service =
        FetchService::with_client_config(vec![a.clone()], &client_config(), store.clone()).unwrap();
    let attrs = service.get(&ApiPath::new("user/id/1000")).await.unwrap();

    assert_eq!(attrs.get("id"), Some(&serde_json::json!([1000])));
    assert!(!store.record_path(&a).exists());
}

/// A corrupt record never blocks the endpoint.
#[tokio::test]
async fn test_corrupt_record_is_ignored() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = lock_store(&dir);
    let a = Endpoint::new(mock_server.uri());
    std::fs::write(store.record_path(&a), [0xffu8, 0xff, 0xff]).unwrap();

    let service =
        FetchService::with_client_config(vec![a.clone()], &client_config(), store.clone()).unwrap();
    service.get_raw(&ApiPath::new("group/list")).await.unwrap();

    assert!(!store.record_path(&a).exists());
}

/// Malformed JSON from a healthy endpoint is a decode failure, not a
/// transport one, and does not lock the endpoint.
#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"bad json""#))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = lock_store(&dir);
    let a = Endpoint::new(mock_server.uri());

    let service =
        FetchService::with_client_config(vec![a.clone()], &client_config(), store.clone()).unwrap();
    let err = service.get(&ApiPath::new("user/list")).await.unwrap_err();

    assert!(matches!(err, FetchError::Decode(_)));
    assert!(store.is_eligible(&a));
}

/// The service built from `Config` sends credentials and uses the configured
/// lock directory.
#[tokio::test]
async fn test_from_config() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/user/name/alice"))
        .and(header("Authorization", "Basic YWxpY2U6c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"name":["alice"]}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let dead = refused_endpoint();
    let cfg = Config {
        api_endpoints: vec![
            format!("{}/v1/", mock_server.uri()),
            dead.as_str().to_string(),
        ],
        user: Some("alice".to_string()),
        password: Some("secret".to_string()),
        http_timeout_secs: 1,
        lock_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    cfg.validate().unwrap();

    let service = FetchService::from_config(&cfg).unwrap();
    assert_eq!(service.endpoints().len(), 2);

    let attrs = service.get(&ApiPath::new("user/name/alice")).await.unwrap();
    assert_eq!(attrs.strings("name"), vec!["alice"]);

    // The dead endpoint's record, if it was visited, lives in the configured dir
    let store = FileLockStore::new(cfg.lock_store_config());
    assert!(store.record_path(&dead).starts_with(dir.path()));
}
