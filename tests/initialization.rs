mod common;

use std::{sync::Arc, time::Duration};

use feature_bootstrap::{ClientConfig, Error, InitState};
use serde_json::json;

use common::TestServer;

const FEATURES: &str = r#"{"features": {"banner_text": {"defaultValue": "Hello"}}}"#;

fn client_for(server: &TestServer) -> feature_bootstrap::FeaturesClient {
    ClientConfig::from_client_key("sdk-test")
        .api_host(&server.url)
        .to_client()
}

#[tokio::test]
async fn loads_features_from_server() {
    let server = TestServer::start(200, FEATURES).await;
    let client = client_for(&server);

    let engine = client.ensure().await.unwrap();

    assert_eq!(engine.feature_value("banner_text"), Some(&json!("Hello")));
    assert_eq!(client.get_string("banner_text", "Bye").await, "Hello");
    assert_eq!(server.requests(), 1);
}

#[tokio::test]
async fn server_error_is_cached_without_refetching() {
    let server = TestServer::start(500, "{}").await;
    let client = client_for(&server);

    let first = client.ensure().await;
    assert!(matches!(first, Err(ref err) if err.is_fetch_failure()));

    let second = client.ensure().await;
    assert!(matches!(second, Err(Error::Network(_))));
    assert_eq!(client.get_string("banner_text", "Bye").await, "Bye");
    assert_eq!(client.state(), InitState::Failed);
    assert_eq!(server.requests(), 1);
}

#[tokio::test]
async fn callers_in_the_same_tick_share_one_fetch() {
    let server = TestServer::start_delayed(200, FEATURES, Duration::from_millis(100)).await;
    let client = client_for(&server);

    let (a, b, c) = tokio::join!(client.ensure(), client.ensure(), client.ensure());

    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&a, &c));
    assert_eq!(server.requests(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn callers_on_many_threads_share_one_fetch() {
    let server = TestServer::start_delayed(200, FEATURES, Duration::from_millis(50)).await;
    let client = client_for(&server);

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.ensure().await })
        })
        .collect();

    let mut engines = Vec::new();
    for handle in handles {
        engines.push(handle.await.unwrap().unwrap());
    }

    assert!(engines.iter().all(|engine| Arc::ptr_eq(engine, &engines[0])));
    assert_eq!(server.requests(), 1);

    let later = client.ensure().await.unwrap();
    assert!(Arc::ptr_eq(&later, &engines[0]));
    assert_eq!(server.requests(), 1);
}

#[tokio::test]
async fn unauthorized_client_key() {
    let server = TestServer::start(401, "{}").await;
    let client = client_for(&server);

    assert!(matches!(client.ensure().await, Err(Error::Unauthorized)));
    assert!(matches!(client.ensure().await, Err(Error::Unauthorized)));
    assert_eq!(server.requests(), 1);
}

#[tokio::test]
async fn malformed_body_is_a_parse_failure() {
    let server = TestServer::start(200, "<html>oops</html>").await;
    let client = client_for(&server);

    let err = client.ensure().await.unwrap_err();

    assert!(err.is_parse_failure());
    assert!(!err.is_fetch_failure());
}

#[tokio::test]
async fn invalid_api_host_fails_without_request() {
    let client = ClientConfig::from_client_key("sdk-test")
        .api_host("not a url")
        .to_client();

    assert!(matches!(client.ensure().await, Err(Error::InvalidBaseUrl(_))));
    assert!(!client.get_bool("anything", false).await);
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = TestServer::start_delayed(200, FEATURES, Duration::from_secs(5)).await;
    let client = ClientConfig::from_client_key("sdk-test")
        .api_host(&server.url)
        .request_timeout(Duration::from_millis(50))
        .to_client();

    let err = client.ensure().await.unwrap_err();

    assert!(err.is_fetch_failure());
    assert_eq!(client.state(), InitState::Failed);
}
