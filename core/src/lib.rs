//! Registration API client core for the Smartlink login flow.
//!
//! # Overview
//! A thin REST layer: a `RequestDescriptor` describes one call, an
//! `ApiService` executes it through a `Transport` and decodes the body into
//! the caller's type or an `ErrorPayload`. `RegistrationClient` is the one
//! concrete use, looking up a user's partner environment at login.
//!
//! # Design
//! - Request building (`RequestDescriptor::build`) and response decoding
//!   (`decode_response`) are pure, so a host can do the I/O itself
//!   (host-does-IO) and still share the exact rules.
//! - Results are `Result<T, ErrorPayload>`; every failure path, including a
//!   malformed URL or a dead network, reaches the caller.
//! - Types use owned `String` / `Vec` fields to simplify FFI mapping.

pub mod client;
pub mod error;
pub mod http;
pub mod params;
pub mod registration;
pub mod request;
pub mod transport;

pub use client::{decode_response, ApiService};
pub use error::{ApiError, ApiResult, ErrorPayload};
pub use http::{HttpMethod, HttpRequest, HttpResponse, REQUEST_TIMEOUT};
pub use params::{Parameters, RequestParameters};
pub use registration::{
    EnvironmentResponse, Platform, RegistrationClient, Server, UsernameParameters,
    DEFAULT_REGISTRATION_URL,
};
pub use request::RequestDescriptor;
pub use transport::Transport;
#[cfg(feature = "reqwest-transport")]
pub use transport::ReqwestTransport;
