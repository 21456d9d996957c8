//! Partner environment lookup performed at login.
//!
//! The registration endpoint maps a username to the partner environment
//! that hosts it. The login screen only needs `platform.baseURL` from the
//! answer; the rest of the response is kept for callers that want it.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::ApiService;
use crate::error::{ApiResult, ErrorPayload};
use crate::http::HttpMethod;
use crate::params::{Parameters, RequestParameters};
use crate::request::RequestDescriptor;
use crate::transport::Transport;

pub const DEFAULT_REGISTRATION_URL: &str = "http://registration.securenettech.com/registration.php";

pub const PARTNER_ENVIRONMENT_METHOD: &str = "getPartnerEnvironment";
pub const PRODUCTION_ENVIRONMENT: &str = "PRODUCTION";

/// Parameters for the `getPartnerEnvironment` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsernameParameters {
    pub username: String,
}

impl UsernameParameters {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

impl RequestParameters for UsernameParameters {
    fn to_parameters(&self) -> Parameters {
        Parameters::new()
            .with("method", PARTNER_ENVIRONMENT_METHOD)
            .with("environment", PRODUCTION_ENVIRONMENT)
            .with("username", self.username.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub partner: String,
    pub environment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    #[serde(rename = "baseURL")]
    pub base_url: String,
}

/// Successful answer from the registration endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentResponse {
    pub server: Server,
    pub platform: Platform,
}

pub struct RegistrationClient<T> {
    service: ApiService<T>,
    endpoint: String,
}

impl<T> Clone for RegistrationClient<T> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            endpoint: self.endpoint.clone(),
        }
    }
}

impl<T: Transport + 'static> RegistrationClient<T> {
    /// Client pointed at `DEFAULT_REGISTRATION_URL`.
    pub fn new(service: ApiService<T>) -> Self {
        Self {
            service,
            endpoint: DEFAULT_REGISTRATION_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The POST descriptor for looking up `username`.
    pub fn environment_request(&self, username: &str) -> RequestDescriptor {
        RequestDescriptor::with_parameters(
            self.endpoint.as_str(),
            HttpMethod::Post,
            &UsernameParameters::new(username),
        )
    }

    pub async fn get_partner_environment(&self, username: &str) -> ApiResult<EnvironmentResponse> {
        let username = validate_username(username)?;
        debug!(endpoint = %self.endpoint, "looking up partner environment");
        self.service.send(&self.environment_request(username)).await
    }

    /// Look up the platform base URL for `username` and hand it to
    /// `on_complete` on a runtime worker thread. Re-dispatching to a UI
    /// thread is up to the caller.
    pub fn get_base_url<F>(&self, username: &str, on_complete: F)
    where
        F: FnOnce(ApiResult<String>) + Send + 'static,
    {
        let client = self.clone();
        let username = username.to_string();
        self.service.runtime().spawn(async move {
            let result = client
                .get_partner_environment(&username)
                .await
                .map(|env| env.platform.base_url);
            on_complete(result);
        });
    }
}

/// Blank usernames are rejected before any request is made. Anything else
/// is returned unchanged and sent as typed.
pub fn validate_username(username: &str) -> ApiResult<&str> {
    if username.trim().is_empty() {
        warn!("empty username rejected");
        return Err(ErrorPayload::new("username must not be empty"));
    }
    Ok(username)
}
