//! Token lifecycle against a mock token endpoint.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use nexthink_core::Region;
use nexthink_transport::{AuthError, Credential, TokenManager};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Test Setup
// ============================================================================

fn token_body(value: &str, expires_in: i64) -> serde_json::Value {
    json!({
        "access_token": value,
        "token_type": "Bearer",
        "expires_in": expires_in,
        "scope": "service:integration"
    })
}

fn manager(server: &MockServer) -> TokenManager {
    let credential = Credential::new("id", "secret", "acme", Region::Us);
    TokenManager::new(credential, reqwest::Client::new())
        .with_token_url(format!("{}/token", server.uri()))
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_token_request_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("authorization", "Basic aWQ6c2VjcmV0"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("scope=service%3Aintegration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("t1", 900)))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager(&server);
    assert_eq!(manager.get_token().await.unwrap(), "t1");
    // Cached: no second request.
    assert_eq!(manager.get_token().await.unwrap(), "t1");
    assert!(manager.expires_at().await.is_some());
}

#[tokio::test]
async fn test_concurrent_callers_share_one_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("shared", 900))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let manager = Arc::new(manager(&server));
    let tasks = (0..20).map(|_| {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.get_token().await })
    });

    for result in join_all(tasks).await {
        assert_eq!(result.unwrap().unwrap(), "shared");
    }
}

#[tokio::test]
async fn test_queued_callers_receive_the_same_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string("down")
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager(&server);
    let results = join_all((0..5).map(|_| manager.get_token())).await;

    for result in results {
        assert_eq!(
            result.unwrap_err(),
            AuthError::Rejected {
                status: 500,
                body: "down".to_string()
            }
        );
    }
}

#[tokio::test]
async fn test_token_inside_margin_is_refetched() {
    let server = MockServer::start().await;
    // 60s lifetime is inside the default 120s margin.
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("short", 60)))
        .expect(2)
        .mount(&server)
        .await;

    let manager = manager(&server);
    manager.get_token().await.unwrap();
    manager.get_token().await.unwrap();
}

#[tokio::test]
async fn test_custom_margin_allows_reuse() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("short", 60)))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager(&server).with_refresh_margin(Duration::from_secs(10));
    manager.get_token().await.unwrap();
    manager.get_token().await.unwrap();
}

#[tokio::test]
async fn test_zero_lifetime_token_is_used_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("flash", 0)))
        .expect(2)
        .mount(&server)
        .await;

    let manager = manager(&server);
    assert_eq!(manager.get_token().await.unwrap(), "flash");
    assert_eq!(manager.get_token().await.unwrap(), "flash");
}

#[tokio::test]
async fn test_failed_refresh_keeps_cached_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("t1", 900)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let manager = manager(&server);
    assert_eq!(manager.get_token().await.unwrap(), "t1");

    let err = manager.refresh_token().await.unwrap_err();
    assert!(matches!(err, AuthError::Rejected { status: 503, .. }));

    // The earlier token is still served without another request.
    assert_eq!(manager.get_token().await.unwrap(), "t1");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_refresh_is_unconditional() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("t", 900)))
        .expect(2)
        .mount(&server)
        .await;

    let manager = manager(&server);
    manager.get_token().await.unwrap();
    manager.refresh_token().await.unwrap();
}

#[tokio::test]
async fn test_double_invalidate_causes_single_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("t", 900)))
        .expect(2)
        .mount(&server)
        .await;

    let manager = manager(&server);
    manager.get_token().await.unwrap();
    manager.invalidate_token().await;
    manager.invalidate_token().await;
    assert!(manager.expires_at().await.is_none());
    manager.get_token().await.unwrap();
    manager.get_token().await.unwrap();
}

#[tokio::test]
async fn test_undecodable_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not a token"))
        .mount(&server)
        .await;

    let err = manager(&server).get_token().await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidPayload(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint() {
    let credential = Credential::new("id", "secret", "acme", Region::Us);
    let manager = TokenManager::new(credential, reqwest::Client::new())
        .with_token_url("http://127.0.0.1:9/token");

    let err = manager.get_token().await.unwrap_err();
    assert!(matches!(err, AuthError::RequestFailed(_)));
}
