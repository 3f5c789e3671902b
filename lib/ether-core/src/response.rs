//! HTTP responses and response classification.
//!
//! Transports return an [`HttpResponse`] (status, headers, buffered body).
//! [`classify`] turns it into a [`Response<T>`] holding either a decoded
//! value or the raw bytes, or fails with [`Error::BadResponseCode`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::{Error, Request, Result};

/// Buffered HTTP response as produced by a transport.
///
/// Header names are lower-case; a repeated header holds its values joined
/// with `", "`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: u16,
    headers: HashMap<String, String>,
    body: Bytes,
}

impl HttpResponse {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consume into (status, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (u16, HashMap<String, String>, Bytes) {
        (self.status, self.headers, self.body)
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status is a real HTTP status code (`100..600`).
    #[must_use]
    pub const fn is_http(&self) -> bool {
        self.status >= 100 && self.status < 600
    }
}

fn find_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Payload of a [`Response`]: exactly one of decoded value or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Data<T> {
    /// The body decoded into the requested type.
    Decoded(T),
    /// The body as received, when no decoding was requested.
    Raw(Bytes),
}

impl<T> Data<T> {
    /// Decoded value, if any.
    #[must_use]
    pub const fn decoded(&self) -> Option<&T> {
        match self {
            Self::Decoded(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    /// Consume into the decoded value, if any.
    #[must_use]
    pub fn into_decoded(self) -> Option<T> {
        match self {
            Self::Decoded(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    /// Raw bytes, if any.
    #[must_use]
    pub const fn raw(&self) -> Option<&Bytes> {
        match self {
            Self::Raw(bytes) => Some(bytes),
            Self::Decoded(_) => None,
        }
    }
}

/// Result of a dispatched request.
#[derive(Debug, Clone)]
pub struct Response<T> {
    data: Data<T>,
    status: u16,
    headers: HashMap<String, String>,
}

/// Response of a call that asked for no decoding.
pub type RawResponse = Response<()>;

impl<T> Response<T> {
    /// Creates a new response.
    #[must_use]
    pub fn new(data: Data<T>, status: u16, headers: HashMap<String, String>) -> Self {
        Self {
            data,
            status,
            headers,
        }
    }

    /// Response payload.
    #[must_use]
    pub const fn data(&self) -> &Data<T> {
        &self.data
    }

    /// Consume into the payload.
    #[must_use]
    pub fn into_data(self) -> Data<T> {
        self.data
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Human-readable reason phrase of the status code (`"Not Found"`).
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        StatusCode::from_u16(self.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Unknown Status")
    }

    /// Every response header.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

type DecodeFn<T> = dyn Fn(&[u8]) -> Result<T> + Send + Sync;

/// Turns a response body into `T`.
///
/// Passing `Some(decoder)` to a dispatch call asks for a decoded response and
/// adds `Accept: application/json`; passing `None` keeps the raw bytes.
pub struct Decoder<T> {
    decode: Arc<DecodeFn<T>>,
}

impl<T> Decoder<T> {
    /// A decoder backed by a custom function.
    pub fn new<F>(decode: F) -> Self
    where
        F: Fn(&[u8]) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            decode: Arc::new(decode),
        }
    }

    /// Decode a body.
    pub fn decode(&self, body: &[u8]) -> Result<T> {
        (self.decode)(body)
    }
}

impl<T: DeserializeOwned + 'static> Decoder<T> {
    /// JSON decoder with path-aware errors.
    #[must_use]
    pub fn json() -> Self {
        Self::new(crate::from_json::<T>)
    }
}

impl<T: DeserializeOwned + 'static> Default for Decoder<T> {
    fn default() -> Self {
        Self::json()
    }
}

impl<T> Clone for Decoder<T> {
    fn clone(&self) -> Self {
        Self {
            decode: Arc::clone(&self.decode),
        }
    }
}

impl<T> fmt::Debug for Decoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("target", &std::any::type_name::<T>())
            .finish()
    }
}

/// Classify a transport response.
///
/// - status outside `100..600`: [`Error::ResponseNotHttp`],
/// - status in `200..300`: decoded with `decoder` when given, raw otherwise,
/// - any other status: [`Error::BadResponseCode`], logged at error level
///   together with the request that triggered it. No decode is attempted.
///
/// The logged request has its credential headers and the headers named in
/// `redact` masked, see [`Request::describe_redacted`].
pub fn classify<T>(
    response: HttpResponse,
    decoder: Option<&Decoder<T>>,
    request: &Request<Bytes>,
    redact: &[&str],
) -> Result<Response<T>> {
    if !response.is_http() {
        return Err(Error::ResponseNotHttp);
    }

    let (status, headers, body) = response.into_parts();

    if !(200..300).contains(&status) {
        let error = Error::bad_response_code(status, body);
        let reason = error.failure_reason().unwrap_or_default();
        let suggestion = error.recovery_suggestion().unwrap_or_default();
        let dump = request.describe_redacted(redact);
        tracing::error!(
            status,
            method = %request.method(),
            url = %request.url(),
            description = %error,
            reason = %reason,
            suggestion = %suggestion,
            request = ?dump,
            "ether request failed"
        );
        return Err(error);
    }

    let data = match decoder {
        Some(decoder) => Data::Decoded(decoder.decode(&body)?),
        None => Data::Raw(body),
    };

    Ok(Response::new(data, status, headers))
}
