//! HTTP fetcher behaviour against a local mock server.

use std::time::Duration;

use vedrfolnir::{
    CancellationSignal, Fetcher, HttpFetcher, RequestDescriptor, RetryConfig, RetryStrategy,
    VedrfolnirError,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn weather_descriptor(base: &str, city: &str) -> RequestDescriptor {
    let mut d = RequestDescriptor::new(base).with_api_key("test-key");
    d.append_path("/weather");
    d.set_param("q", city);
    d
}

fn fetcher(retry: RetryStrategy) -> (HttpFetcher, CancellationSignal) {
    let cancel = CancellationSignal::new();
    let fetcher = HttpFetcher::new(Duration::from_secs(5), retry, cancel.clone()).unwrap();
    (fetcher, cancel)
}

#[tokio::test]
async fn success_returns_body_verbatim() {
    let server = MockServer::start().await;
    let body = r#"{"name":"London","main":{"temp":280.3}}"#;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "London"))
        .and(query_param("appid", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let (fetcher, _) = fetcher(RetryStrategy::NoRetry);
    let payload = fetcher
        .fetch(&weather_descriptor(&server.uri(), "London"))
        .await
        .expect("fetch should succeed");

    assert_eq!(payload, body);
}

#[tokio::test]
async fn query_values_are_url_encoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "São Paulo,BR"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let (fetcher, _) = fetcher(RetryStrategy::NoRetry);
    let payload = fetcher
        .fetch(&weather_descriptor(&server.uri(), "São Paulo,BR"))
        .await
        .unwrap();
    assert_eq!(payload, "{}");
}

#[tokio::test]
async fn non_success_status_is_api_error_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string(r#"{"cod":"404","message":"city not found"}"#),
        )
        .mount(&server)
        .await;

    let (fetcher, _) = fetcher(RetryStrategy::NoRetry);
    let err = fetcher
        .fetch(&weather_descriptor(&server.uri(), "Atlantis"))
        .await
        .unwrap_err();

    assert!(matches!(err, VedrfolnirError::RetryDisabled { .. }));
    assert_eq!(err.status(), Some(404));
    match err.root_cause() {
        VedrfolnirError::Api { body, .. } => assert!(body.contains("city not found")),
        other => panic!("expected Api, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_response_is_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let cancel = CancellationSignal::new();
    let fetcher =
        HttpFetcher::new(Duration::from_millis(200), RetryStrategy::NoRetry, cancel).unwrap();
    let err = fetcher
        .fetch(&weather_descriptor(&server.uri(), "London"))
        .await
        .unwrap_err();

    assert!(matches!(err.root_cause(), VedrfolnirError::Timeout));
    assert!(err.is_transient());
}

#[tokio::test]
async fn refused_connection_is_network_unavailable() {
    let (fetcher, _) = fetcher(RetryStrategy::NoRetry);
    let err = fetcher
        .fetch(&weather_descriptor("http://127.0.0.1:1", "London"))
        .await
        .unwrap_err();

    assert!(
        matches!(err.root_cause(), VedrfolnirError::NetworkUnavailable(_)),
        "got {err:?}"
    );
}

#[tokio::test]
async fn backoff_retries_until_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .expect(3)
        .mount(&server)
        .await;

    let (fetcher, _) = fetcher(RetryStrategy::ExponentialBackoff(
        RetryConfig::new()
            .max_attempts(3)
            .initial_delay(Duration::from_millis(10)),
    ));
    let err = fetcher
        .fetch(&weather_descriptor(&server.uri(), "London"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        VedrfolnirError::RetryExhausted { attempts: 3, .. }
    ));
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn cancelled_before_attempt_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (fetcher, cancel) = fetcher(RetryStrategy::exponential());
    cancel.cancel();

    let err = fetcher
        .fetch(&weather_descriptor(&server.uri(), "London"))
        .await
        .unwrap_err();
    assert!(matches!(err, VedrfolnirError::Cancelled));
}

#[tokio::test]
async fn cancellation_interrupts_in_flight_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let (fetcher, cancel) = fetcher(RetryStrategy::exponential());
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });

    let started = std::time::Instant::now();
    let err = fetcher
        .fetch(&weather_descriptor(&server.uri(), "London"))
        .await
        .unwrap_err();

    assert!(matches!(err, VedrfolnirError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn malformed_base_path_is_invalid_value() {
    let (fetcher, _) = fetcher(RetryStrategy::NoRetry);
    let err = fetcher
        .fetch(&weather_descriptor("not a url", "London"))
        .await
        .unwrap_err();
    assert!(matches!(
        err.root_cause(),
        VedrfolnirError::InvalidValue(_)
    ));
}
