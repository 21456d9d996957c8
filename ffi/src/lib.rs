//! C-ABI wrapper around `smartlink-core` for the host app.
//!
//! # Overview
//! Exposes the partner-environment lookup performed at login in two forms:
//! - host-does-IO: `sl_build_environment_request` hands back the request to
//!   execute, `sl_parse_environment_response` decodes what came back;
//! - async: `sl_get_partner_environment` runs the request on the client's
//!   own runtime and reports through a C callback.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `FfiEnvironmentResult` conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `sl_free_*` function to release them.

pub mod types;

use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use smartlink_core::{
    decode_response, registration::validate_username, ApiService, HttpResponse, RegistrationClient,
};
use tracing::warn;

use types::*;

/// Read a non-null C string argument. `None` when it is not valid UTF-8.
fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a registration client bound to `endpoint`, or to the production
/// registration endpoint when `endpoint` is null.
///
/// Returns null if `endpoint` is not valid UTF-8, the client's runtime
/// cannot be started, or an internal panic occurs. Free the result with
/// `sl_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn sl_client_new(endpoint: *const c_char) -> *mut FfiRegistrationClient {
    catch_unwind(|| {
        let endpoint = if endpoint.is_null() {
            None
        } else {
            match read_str(endpoint) {
                Some(url) => Some(url),
                None => {
                    warn!("endpoint is not valid UTF-8");
                    return std::ptr::null_mut();
                }
            }
        };
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("smartlink-ffi")
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                warn!(error = %e, "failed to start runtime");
                return std::ptr::null_mut();
            }
        };
        let mut inner = RegistrationClient::new(ApiService::with_reqwest(runtime.handle().clone()));
        if let Some(url) = endpoint {
            inner = inner.with_endpoint(url);
        }
        Box::into_raw(Box::new(FfiRegistrationClient { inner, runtime }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `sl_client_new`. Safe to call with null.
///
/// Lookups still in flight are abandoned; their callbacks never run.
#[unsafe(no_mangle)]
pub extern "C" fn sl_client_free(client: *mut FfiRegistrationClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            let client = unsafe { Box::from_raw(client) };
            let FfiRegistrationClient { inner, runtime } = *client;
            drop(inner);
            runtime.shutdown_background();
        }));
    }
}

/// The endpoint this client talks to. Free with `sl_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn sl_client_endpoint(client: *const FfiRegistrationClient) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        to_c_string(client.inner.endpoint())
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Host-does-IO
// ---------------------------------------------------------------------------

/// Build the lookup request for `username`.
///
/// Returns null if an argument is null, the username is not valid UTF-8 or
/// is blank, or the endpoint is not a valid http(s) URL. Free with `sl_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn sl_build_environment_request(
    client: *const FfiRegistrationClient,
    username: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || username.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(username) = read_str(username) else {
            warn!("username is not valid UTF-8");
            return std::ptr::null_mut();
        };
        let Ok(username) = validate_username(username) else {
            return std::ptr::null_mut();
        };
        match client.inner.environment_request(username).build() {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(e) => {
                warn!(error = %e, "environment request not built");
                std::ptr::null_mut()
            }
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Decode the response to a lookup request.
///
/// Never returns null. Free with `sl_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn sl_parse_environment_response(
    response: *const FfiHttpResponse,
) -> *mut FfiEnvironmentResult {
    catch_unwind(|| {
        if response.is_null() {
            return FfiEnvironmentResult::null_arg("response");
        }
        let resp = unsafe { &*response };
        let body = if resp.body.is_null() {
            String::new()
        } else {
            match read_str(resp.body) {
                Some(body) => body.to_string(),
                None => return FfiEnvironmentResult::invalid_arg("response body"),
            }
        };
        let core_resp = HttpResponse {
            status: resp.status,
            headers: Vec::new(),
            body,
        };
        FfiEnvironmentResult::from_core(decode_response(&core_resp))
    })
    .unwrap_or_else(|_| FfiEnvironmentResult::panic("panic in sl_parse_environment_response"))
}

// ---------------------------------------------------------------------------
// Async lookup
// ---------------------------------------------------------------------------

/// Look up the partner environment for `username` on the client's runtime.
///
/// `callback` runs exactly once, on a runtime worker thread, or
/// synchronously on the calling thread when `client` or `username` is null
/// or `username` is not valid UTF-8.
/// It is handed ownership of the result. A null `callback` makes this a
/// no-op.
#[unsafe(no_mangle)]
pub extern "C" fn sl_get_partner_environment(
    client: *const FfiRegistrationClient,
    username: *const c_char,
    callback: Option<FfiEnvironmentCallback>,
    user_data: *mut c_void,
) {
    let Some(callback) = callback else {
        return;
    };
    if client.is_null() {
        callback(FfiEnvironmentResult::null_arg("client"), user_data);
        return;
    }
    if username.is_null() {
        callback(FfiEnvironmentResult::null_arg("username"), user_data);
        return;
    }
    let Some(username) = read_str(username) else {
        callback(FfiEnvironmentResult::invalid_arg("username"), user_data);
        return;
    };

    let user_data = UserData::new(user_data);
    let dispatched = catch_unwind(AssertUnwindSafe(|| {
        let client = unsafe { &*client };
        let inner = client.inner.clone();
        let username = username.to_string();
        client.runtime.spawn(async move {
            let result = inner.get_partner_environment(&username).await;
            callback(FfiEnvironmentResult::from_core(result), user_data.into_inner());
        });
    }));
    if dispatched.is_err() {
        warn!("panic while dispatching partner environment lookup");
    }
}

// ---------------------------------------------------------------------------
// Memory management
// ---------------------------------------------------------------------------

/// Free a request returned by `sl_build_environment_request`. Safe to call
/// with null.
#[unsafe(no_mangle)]
pub extern "C" fn sl_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free a result from `sl_parse_environment_response` or a lookup
/// callback. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn sl_free_result(result: *mut FfiEnvironmentResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if !result.environment.is_null() {
            let env = unsafe { Box::from_raw(result.environment) };
            free_c_string(env.partner);
            free_c_string(env.environment);
            free_c_string(env.base_url);
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn sl_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
