//! Generic REST call wrapper.
//!
//! # Design
//! `ApiService` holds a `Transport` and a tokio runtime handle, and carries
//! no per-call state. Each call owns its own descriptor, request and
//! response, so concurrent calls share nothing but the transport.
//!
//! Every outcome lands in an `ApiResult`: a descriptor that fails to build,
//! a transport that produces no response, and a body that decodes as
//! neither the expected type nor an error payload all become
//! `Err(ErrorPayload)`. Nothing is dropped.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult, ErrorPayload};
use crate::http::HttpResponse;
use crate::request::RequestDescriptor;
use crate::transport::Transport;

pub struct ApiService<T> {
    transport: Arc<T>,
    runtime: Handle,
}

impl<T> Clone for ApiService<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            runtime: self.runtime.clone(),
        }
    }
}

impl<T: Transport + 'static> ApiService<T> {
    /// Completion callbacks from `call` run as tasks on `runtime`.
    pub fn new(transport: T, runtime: Handle) -> Self {
        Self {
            transport: Arc::new(transport),
            runtime,
        }
    }

    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue one request and decode its response.
    pub async fn send<R: DeserializeOwned>(&self, descriptor: &RequestDescriptor) -> ApiResult<R> {
        let request = descriptor.build().map_err(|e| {
            warn!(url = descriptor.url(), error = %e, "request not sent");
            ErrorPayload::from(e)
        })?;

        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(request).await.map_err(|e| {
            warn!(url = descriptor.url(), error = %e, "request failed");
            ErrorPayload::from(e)
        })?;

        debug!(status = response.status, bytes = response.body.len(), "response received");
        decode_response(&response)
    }

    /// Issue one request in the background and hand the result to
    /// `on_complete` exactly once, on a runtime worker thread.
    pub fn call<R, F>(&self, descriptor: RequestDescriptor, on_complete: F)
    where
        R: DeserializeOwned + Send + 'static,
        F: FnOnce(ApiResult<R>) + Send + 'static,
    {
        let service = self.clone();
        self.runtime.spawn(async move {
            let result = service.send(&descriptor).await;
            on_complete(result);
        });
    }
}

#[cfg(feature = "reqwest-transport")]
impl ApiService<crate::transport::ReqwestTransport> {
    /// Service backed by a default `ReqwestTransport`.
    pub fn with_reqwest(runtime: Handle) -> Self {
        Self::new(crate::transport::ReqwestTransport::new(), runtime)
    }
}

/// Decode a response body as `R`, falling back to an `ErrorPayload`.
///
/// The HTTP status is not consulted; the body alone decides. When the body
/// is neither an `R` nor an `{ "error": ... }` object, the failure carries
/// the description of the original decode error.
pub fn decode_response<R: DeserializeOwned>(response: &HttpResponse) -> ApiResult<R> {
    match serde_json::from_str::<R>(&response.body) {
        Ok(value) => Ok(value),
        Err(decode_err) => match serde_json::from_str::<ErrorPayload>(&response.body) {
            Ok(payload) => {
                warn!(status = response.status, error = %payload.message, "server reported an error");
                Err(payload)
            }
            Err(_) => {
                let err = ApiError::Decode(decode_err.to_string());
                warn!(status = response.status, error = %err, "undecodable response");
                Err(err.into())
            }
        },
    }
}
