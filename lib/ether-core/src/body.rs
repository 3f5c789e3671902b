//! Request bodies and JSON (de)serialization utilities.

use std::fmt;

use bytes::Bytes;
use serde::Serialize;

use crate::Result;

/// Content types set by the parameter encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// `application/json; charset=utf-8`.
    Json,
    /// `application/x-www-form-urlencoded; charset=utf-8`.
    FormUrlEncoded,
}

impl ContentType {
    /// Get the header value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json; charset=utf-8",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded; charset=utf-8",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// JSON encoder used for [`RequestBody::Encodable`] bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonEncoder {
    pretty: bool,
}

impl JsonEncoder {
    /// Compact output (the default).
    #[must_use]
    pub const fn compact() -> Self {
        Self { pretty: false }
    }

    /// Pretty-printed output.
    #[must_use]
    pub const fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Encode a value.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Bytes> {
        if self.pretty {
            to_json_pretty(value)
        } else {
            to_json(value)
        }
    }
}

/// Deferred serializer of a [`RequestBody::Encodable`] body.
pub type EncodeFn = Box<dyn FnOnce() -> Result<Bytes> + Send>;

/// The body of a request. Exactly one kind per request.
pub enum RequestBody {
    /// A structured value, serialized at dispatch time.
    Encodable(EncodeFn),
    /// Pre-encoded bytes, sent as-is.
    Raw(Bytes),
    /// UTF-8 text.
    PlainText(String),
}

impl RequestBody {
    /// A value serialized with the default (compact) JSON encoder.
    pub fn encodable<T>(value: T) -> Self
    where
        T: Serialize + Send + 'static,
    {
        Self::encodable_with(value, JsonEncoder::default())
    }

    /// A value serialized with a specific encoder.
    pub fn encodable_with<T>(value: T, encoder: JsonEncoder) -> Self
    where
        T: Serialize + Send + 'static,
    {
        Self::Encodable(Box::new(move || encoder.encode(&value)))
    }

    /// Raw bytes.
    pub fn raw(data: impl Into<Bytes>) -> Self {
        Self::Raw(data.into())
    }

    /// Plain text.
    pub fn plain_text(text: impl Into<String>) -> Self {
        Self::PlainText(text.into())
    }

    /// Produce the wire bytes.
    pub fn into_bytes(self) -> Result<Bytes> {
        match self {
            Self::Encodable(encode) => encode(),
            Self::Raw(data) => Ok(data),
            Self::PlainText(text) => Ok(Bytes::from(text)),
        }
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encodable(_) => f.write_str("Encodable(..)"),
            Self::Raw(data) => f.debug_tuple("Raw").field(&data.len()).finish(),
            Self::PlainText(text) => f.debug_tuple("PlainText").field(text).finish(),
        }
    }
}

/// Serialize a value to compact JSON bytes.
///
/// # Example
///
/// ```
/// use ether_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User { name: String }
///
/// let user = User { name: "Alice".to_string() };
/// let bytes = to_json(&user).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"name":"Alice"}"#);
/// ```
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Serialize a value to pretty-printed JSON bytes.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    serde_json::to_vec_pretty(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Uses `serde_path_to_error` so the error names the field that failed
/// (e.g. `user.address.city`).
///
/// # Example
///
/// ```
/// use ether_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct User { name: String }
///
/// let user: User = from_json(br#"{"name":"Alice"}"#).expect("deserialize");
/// assert_eq!(user, User { name: "Alice".to_string() });
/// ```
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| crate::Error::json_decoding(e.path().to_string(), e.inner().to_string()))
}
