use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{info, warn};

pub const REGISTRATION_PATH: &str = "/registration.php";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Server {
    pub partner: String,
    pub environment: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Platform {
    #[serde(rename = "baseURL")]
    pub base_url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnvironmentResponse {
    pub server: Server,
    pub platform: Platform,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Deserialize)]
pub struct RegistrationRequest {
    pub method: String,
    pub environment: String,
    pub username: String,
}

/// Username -> environment answered for that user.
pub type Directory = Arc<HashMap<String, EnvironmentResponse>>;

type ApiError = (StatusCode, Json<ErrorBody>);

fn environment(partner: &str, base_url: &str) -> EnvironmentResponse {
    EnvironmentResponse {
        server: Server {
            partner: partner.to_string(),
            environment: "PRODUCTION".to_string(),
        },
        platform: Platform {
            base_url: base_url.to_string(),
        },
    }
}

/// The users every fresh server knows about.
pub fn default_directory() -> HashMap<String, EnvironmentResponse> {
    HashMap::from([
        ("alice".to_string(), environment("acme", "https://acme.example.com")),
        ("bob".to_string(), environment("globex", "https://globex.example.com")),
        (
            "carol smith".to_string(),
            environment("initech", "https://initech.example.com"),
        ),
    ])
}

pub fn app() -> Router {
    app_with(default_directory())
}

pub fn app_with(users: HashMap<String, EnvironmentResponse>) -> Router {
    let directory: Directory = Arc::new(users);
    Router::new()
        .route(REGISTRATION_PATH, get(lookup_query).post(lookup_json))
        .with_state(directory)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, message: String) -> ApiError {
    warn!(%status, %message, "registration lookup rejected");
    (status, Json(ErrorBody { error: message }))
}

async fn lookup_json(
    State(directory): State<Directory>,
    input: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<Json<EnvironmentResponse>, ApiError> {
    let Json(input) = input.map_err(|e| error(StatusCode::BAD_REQUEST, e.body_text()))?;
    lookup(&directory, input)
}

async fn lookup_query(
    State(directory): State<Directory>,
    input: Result<Query<RegistrationRequest>, QueryRejection>,
) -> Result<Json<EnvironmentResponse>, ApiError> {
    let Query(input) = input.map_err(|e| error(StatusCode::BAD_REQUEST, e.body_text()))?;
    lookup(&directory, input)
}

fn lookup(
    directory: &Directory,
    input: RegistrationRequest,
) -> Result<Json<EnvironmentResponse>, ApiError> {
    if input.method != "getPartnerEnvironment" {
        return Err(error(
            StatusCode::BAD_REQUEST,
            format!("unsupported method: {}", input.method),
        ));
    }
    if input.environment != "PRODUCTION" {
        return Err(error(
            StatusCode::BAD_REQUEST,
            format!("unsupported environment: {}", input.environment),
        ));
    }
    let env = directory.get(&input.username).cloned().ok_or_else(|| {
        error(
            StatusCode::NOT_FOUND,
            format!("user not found: {}", input.username),
        )
    })?;
    info!(username = %input.username, partner = %env.server.partner, "partner environment resolved");
    Ok(Json(env))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_serializes_with_base_url_key() {
        let env = environment("acme", "https://acme.example.com");
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["server"]["partner"], "acme");
        assert_eq!(json["server"]["environment"], "PRODUCTION");
        assert_eq!(json["platform"]["baseURL"], "https://acme.example.com");
    }

    #[test]
    fn registration_request_requires_all_fields() {
        let result: Result<RegistrationRequest, _> =
            serde_json::from_str(r#"{"method":"getPartnerEnvironment","username":"alice"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn lookup_rejects_unknown_method() {
        let directory: Directory = Arc::new(default_directory());
        let input = RegistrationRequest {
            method: "deleteEverything".to_string(),
            environment: "PRODUCTION".to_string(),
            username: "alice".to_string(),
        };
        let (status, Json(body)) = lookup(&directory, input).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.contains("deleteEverything"));
    }

    #[test]
    fn lookup_finds_known_user() {
        let directory: Directory = Arc::new(default_directory());
        let input = RegistrationRequest {
            method: "getPartnerEnvironment".to_string(),
            environment: "PRODUCTION".to_string(),
            username: "bob".to_string(),
        };
        let Json(env) = lookup(&directory, input).unwrap();
        assert_eq!(env.server.partner, "globex");
    }
}
