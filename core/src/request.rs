//! Immutable description of one pending HTTP call.
//!
//! # Design
//! A `RequestDescriptor` is built once per call and never mutated. GET
//! parameters travel in the query string; every other method carries them
//! as a JSON body and leaves the URL untouched. `build` is where the URL is
//! validated, so a malformed descriptor becomes an `ApiError` the caller
//! can report instead of a request that silently never happens.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, REQUEST_TIMEOUT};
use crate::params::{query_value, Parameters, RequestParameters};

/// Characters left as-is when encoding the query: alphanumerics plus the
/// sub-delimiters, `:`, brackets, `-`, `.`, `_` and `~`. `&` and `=` stay
/// literal so the `key=value&...` structure survives encoding.
const HOST_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b'-')
    .remove(b'.')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'[')
    .remove(b']')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    url: String,
    method: HttpMethod,
    parameters: Parameters,
}

impl RequestDescriptor {
    /// A descriptor with no parameters.
    pub fn new(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            parameters: Parameters::new(),
        }
    }

    pub fn with_parameters(
        url: impl Into<String>,
        method: HttpMethod,
        parameters: &impl RequestParameters,
    ) -> Self {
        Self {
            url: url.into(),
            method,
            parameters: parameters.to_parameters(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// `?k1=v1&k2=v2`, percent-encoded, or an empty string when there are
    /// no parameters.
    pub fn query_string(&self) -> String {
        let joined = self
            .parameters
            .iter()
            .map(|(key, value)| format!("{key}={}", query_value(value)))
            .collect::<Vec<_>>()
            .join("&");
        if joined.is_empty() {
            return joined;
        }
        format!("?{}", utf8_percent_encode(&joined, HOST_SAFE))
    }

    /// The base URL with `query_string` appended.
    pub fn url_with_parameters(&self) -> String {
        format!("{}{}", self.url, self.query_string())
    }

    /// Compact JSON encoding of the parameters (`{}` when empty).
    pub fn json_body(&self) -> Result<String, ApiError> {
        serde_json::to_string(self.parameters.as_map())
            .map_err(|e| ApiError::Serialization(e.to_string()))
    }

    /// Produce the transport request, validating the final URL.
    pub fn build(&self) -> Result<HttpRequest, ApiError> {
        let (url, headers, body) = match self.method {
            HttpMethod::Get => (self.url_with_parameters(), Vec::new(), None),
            _ => (
                self.url.clone(),
                vec![("content-type".to_string(), "application/json".to_string())],
                Some(self.json_body()?),
            ),
        };
        validate_url(&url)?;
        Ok(HttpRequest {
            method: self.method,
            url,
            headers,
            body,
            timeout: REQUEST_TIMEOUT,
        })
    }
}

fn validate_url(raw: &str) -> Result<(), ApiError> {
    let parsed = Url::parse(raw).map_err(|e| ApiError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ApiError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {scheme:?}"),
        }),
    }
}
