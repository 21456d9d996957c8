//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use smartlink_core::{EnvironmentResponse, ErrorPayload, HttpMethod, RegistrationClient, ReqwestTransport};

/// Opaque handle owning a registration client and the runtime its calls
/// run on. `inner` is declared first so it drops before the runtime.
pub struct FfiRegistrationClient {
    pub(crate) inner: RegistrationClient<ReqwestTransport>,
    pub(crate) runtime: tokio::runtime::Runtime,
}

/// Heap-allocate `s` as a C string. Interior NULs are dropped rather than
/// failing the whole conversion.
pub(crate) fn to_c_string(s: &str) -> *mut c_char {
    CString::new(s.replace('\0', ""))
        .unwrap_or_default()
        .into_raw()
}

/// Free a C string produced by `to_c_string`. Null is ignored.
pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Patch = 3,
    Delete = 4,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Patch => FfiHttpMethod::Patch,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// `body` is null for GET. The host executes the request with its own HTTP
/// stack, honoring `timeout_secs`, and hands the response to
/// `sl_parse_environment_response`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
    pub timeout_secs: u32,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: smartlink_core::HttpRequest) -> *mut Self {
        let url = to_c_string(&req.url);
        let body = match req.body {
            Some(b) => to_c_string(&b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
            timeout_secs: req.timeout.as_secs() as u32,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The host builds this on the stack after executing an `FfiHttpRequest`.
/// The FFI layer reads but does not free these fields. A null `body` is
/// treated as an empty body.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[repr(C)]
pub enum FfiErrorCode {
    Ok = 0,
    /// Server error payload, transport failure, bad URL or undecodable body.
    Failed = 1,
    NullArg = 2,
    Panic = 3,
    /// An argument was present but unusable, e.g. not valid UTF-8.
    InvalidArg = 4,
}

/// The partner environment resolved for a user.
#[repr(C)]
pub struct FfiEnvironment {
    pub partner: *mut c_char,
    pub environment: *mut c_char,
    pub base_url: *mut c_char,
}

/// Result envelope for environment lookups.
///
/// On success `error_code` is `Ok`, `error_message` is null and
/// `environment` is set. On failure `environment` is null and
/// `error_message` carries the failure text.
#[repr(C)]
pub struct FfiEnvironmentResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub environment: *mut FfiEnvironment,
}

impl FfiEnvironmentResult {
    pub(crate) fn from_core(result: Result<EnvironmentResponse, ErrorPayload>) -> *mut Self {
        match result {
            Ok(env) => Self::ok(env),
            Err(payload) => Self::error(FfiErrorCode::Failed, &payload.message),
        }
    }

    pub(crate) fn ok(env: EnvironmentResponse) -> *mut Self {
        let environment = Box::new(FfiEnvironment {
            partner: to_c_string(&env.server.partner),
            environment: to_c_string(&env.server.environment),
            base_url: to_c_string(&env.platform.base_url),
        });
        Box::into_raw(Box::new(FfiEnvironmentResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            environment: Box::into_raw(environment),
        }))
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, &format!("null argument: {name}"))
    }

    pub(crate) fn invalid_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::InvalidArg, &format!("invalid argument: {name} is not valid UTF-8"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, msg)
    }

    fn error(error_code: FfiErrorCode, msg: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiEnvironmentResult {
            error_code,
            error_message: to_c_string(msg),
            environment: std::ptr::null_mut(),
        }))
    }
}

/// C completion callback. Receives ownership of `result` (free it with
/// `sl_free_result`) and the `user_data` passed at call time.
pub type FfiEnvironmentCallback = extern "C" fn(result: *mut FfiEnvironmentResult, user_data: *mut c_void);

/// Host context pointer carried to the completion callback on a worker
/// thread. The host guarantees it stays valid until the callback runs.
pub(crate) struct UserData(*mut c_void);

unsafe impl Send for UserData {}

impl UserData {
    pub(crate) fn new(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    pub(crate) fn into_inner(self) -> *mut c_void {
        self.0
    }
}
