use std::collections::HashMap;

use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, EnvironmentResponse, ErrorBody, Platform, Server, REGISTRATION_PATH};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn lookup_body(username: &str) -> String {
    serde_json::json!({
        "method": "getPartnerEnvironment",
        "environment": "PRODUCTION",
        "username": username,
    })
    .to_string()
}

// --- POST ---

#[tokio::test]
async fn post_known_user_returns_environment() {
    let resp = app()
        .oneshot(json_request("POST", REGISTRATION_PATH, &lookup_body("alice")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let env: EnvironmentResponse = body_json(resp).await;
    assert_eq!(env.server.partner, "acme");
    assert_eq!(env.platform.base_url, "https://acme.example.com");
}

#[tokio::test]
async fn post_unknown_user_returns_error_payload() {
    let resp = app()
        .oneshot(json_request("POST", REGISTRATION_PATH, &lookup_body("mallory")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let err: ErrorBody = body_json(resp).await;
    assert_eq!(err.error, "user not found: mallory");
}

#[tokio::test]
async fn post_wrong_environment_is_rejected() {
    let body = r#"{"method":"getPartnerEnvironment","environment":"STAGING","username":"alice"}"#;
    let resp = app()
        .oneshot(json_request("POST", REGISTRATION_PATH, body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: ErrorBody = body_json(resp).await;
    assert!(err.error.contains("STAGING"));
}

#[tokio::test]
async fn post_malformed_json_returns_error_payload() {
    let resp = app()
        .oneshot(json_request("POST", REGISTRATION_PATH, r#"{"username":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: ErrorBody = body_json(resp).await;
    assert!(!err.error.is_empty());
}

// --- GET ---

#[tokio::test]
async fn get_with_query_parameters() {
    let uri = format!(
        "{REGISTRATION_PATH}?method=getPartnerEnvironment&environment=PRODUCTION&username=carol%20smith"
    );
    let resp = app()
        .oneshot(Request::builder().uri(uri).body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let env: EnvironmentResponse = body_json(resp).await;
    assert_eq!(env.server.partner, "initech");
}

#[tokio::test]
async fn get_without_query_is_rejected() {
    let resp = app()
        .oneshot(Request::builder().uri(REGISTRATION_PATH).body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(!body_bytes(resp).await.is_empty());
}

// --- routing ---

#[tokio::test]
async fn unsupported_verb_is_405() {
    let resp = app()
        .oneshot(json_request("PUT", REGISTRATION_PATH, &lookup_body("alice")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn custom_directory_is_served() {
    let users = HashMap::from([(
        "dave".to_string(),
        EnvironmentResponse {
            server: Server {
                partner: "hooli".to_string(),
                environment: "PRODUCTION".to_string(),
            },
            platform: Platform {
                base_url: "https://hooli.example.com".to_string(),
            },
        },
    )]);
    let resp = app_with(users)
        .oneshot(json_request("POST", REGISTRATION_PATH, &lookup_body("dave")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let env: EnvironmentResponse = body_json(resp).await;
    assert_eq!(env.platform.base_url, "https://hooli.example.com");
}
