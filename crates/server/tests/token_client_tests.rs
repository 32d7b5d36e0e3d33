//! Token endpoint client tests against a mocked token endpoint.

use axum::http::StatusCode;
use serde_json::json;
use stitch_proxy::error::AuthError;
use stitch_proxy::oauth2::TokenClient;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> TokenClient {
    TokenClient::new(
        reqwest::Client::new(),
        format!("{}/connect/token", server.uri()),
        "https://secure.stitch.money/connect/token",
    )
}

#[tokio::test]
async fn test_client_credentials_grant_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=client-1"))
        .and(body_string_contains("scope=client_paymentrequest%20client_refund"))
        .and(body_string_contains(
            "audience=https%3A%2F%2Fsecure.stitch.money%2Fconnect%2Ftoken",
        ))
        .and(body_string_contains("client_secret=s3cr3t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "abc",
            "expires_in": 3600,
            "token_type": "Bearer",
            "scope": "client_paymentrequest client_refund"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let token = client
        .retrieve_token_using_client_secret(
            "client-1",
            "s3cr3t",
            &["client_paymentrequest".to_string(), "client_refund".to_string()],
        )
        .await
        .expect("token");

    assert_eq!(token.access_token, "abc");
    assert_eq!(token.extra.get("expires_in"), Some(&json!(3600)));
    assert_eq!(token.refresh_token, None);
}

#[tokio::test]
async fn test_graphql_style_error_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{"message": "bad grant", "extensions": {"status": 400}}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .retrieve_token_using_client_secret("client-1", "s3cr3t", &[])
        .await
        .unwrap_err();

    match &err {
        AuthError::Upstream { status, message } => {
            assert_eq!(*status, Some(400));
            assert_eq!(message, "bad grant");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oauth_error_uses_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "Client authentication failed"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .retrieve_token_using_refresh_token("client-1", "refresh-1", "wrong")
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(err.to_string(), "Client authentication failed");
}

#[tokio::test]
async fn test_authorization_code_grant_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code-1"))
        .and(body_string_contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Freturn",
        ))
        .and(body_string_contains("code_verifier=verifier-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "user-access",
            "refresh_token": "user-refresh",
            "id_token": "id.jwt.here"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let token = client
        .retrieve_token_using_authorization_code(
            "client-1",
            "http://localhost:3000/return",
            "verifier-1",
            "auth-code-1",
            "s3cr3t",
        )
        .await
        .expect("token");

    assert_eq!(token.access_token, "user-access");
    assert_eq!(token.refresh_token.as_deref(), Some("user-refresh"));
    assert_eq!(token.extra.get("id_token"), Some(&json!("id.jwt.here")));
}

#[tokio::test]
async fn test_refresh_grant_keeps_unknown_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access",
            "refresh_token": "new-refresh",
            "session_state": "xyz"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let token = client
        .retrieve_token_using_refresh_token("client-1", "refresh-1", "s3cr3t")
        .await
        .expect("token");

    assert_eq!(token.refresh_token.as_deref(), Some("new-refresh"));
    assert_eq!(token.extra.get("session_state"), Some(&json!("xyz")));
}

#[tokio::test]
async fn test_non_json_response_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .retrieve_token_using_client_secret("client-1", "s3cr3t", &[])
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::MalformedResponse(_)));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_missing_access_token_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "Bearer"})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .retrieve_token_using_client_secret("client-1", "s3cr3t", &[])
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_loosely_typed_token_fields_pass_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "abc",
            "expires_in": "3600",
            "scope": ["client_paymentrequest", "client_refund"],
            "id_token": null
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let token = client
        .retrieve_token_using_client_secret("client-1", "s3cr3t", &[])
        .await
        .expect("token");

    assert_eq!(token.access_token, "abc");
    assert_eq!(token.extra.get("expires_in"), Some(&json!("3600")));
    assert_eq!(
        token.extra.get("scope"),
        Some(&json!(["client_paymentrequest", "client_refund"]))
    );
}
