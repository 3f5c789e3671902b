//! Error types for ether.
//!
//! [`Error`] is a closed set. Every variant renders a human-readable
//! description through `Display`, and most also carry a
//! [failure reason](Error::failure_reason) and a
//! [recovery suggestion](Error::recovery_suggestion) suitable for logs or UI.

use bytes::Bytes;
use derive_more::{Display, Error, From};

/// Boxed error produced by an underlying transport.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for ether operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The request failed.
    #[display("the request failed")]
    #[from(skip)]
    RequestFailed,

    /// The transport answered with something that is not an HTTP response.
    #[display("the response was not valid HTTP")]
    #[from(skip)]
    ResponseNotHttp,

    /// A route could not be turned into a URL.
    #[display("the route could not be converted into a URL: {_0}")]
    #[from(skip)]
    BadUrl(#[error(not(source))] String),

    /// A query item could not be constructed.
    #[display("one of the provided query items is invalid: {_0}")]
    #[from(skip)]
    BadQueryItem(#[error(not(source))] String),

    /// The server answered with a status code outside `200..300`.
    #[display("the server responded with a bad response code: {status}")]
    #[from(skip)]
    BadResponseCode {
        /// HTTP status code.
        status: u16,
        /// Response body as received.
        #[error(not(source))]
        body: Bytes,
    },

    /// Parameters or a body could not be encoded to JSON.
    #[display("encoding to JSON failed: {_0}")]
    #[from]
    JsonEncodingFailed(serde_json::Error),

    /// The response body could not be decoded into the requested type.
    #[display("decoding from JSON failed at '{path}': {message}")]
    #[from(skip)]
    JsonDecodingFailed {
        /// Path to the offending field (e.g. `user.address.city`), empty for syntax errors.
        path: String,
        /// Decoder diagnostic.
        message: String,
    },

    /// Any condition not otherwise classified.
    #[display("an unknown miscellaneous error occurred")]
    #[from(skip)]
    MiscResponseIssue,

    /// Compressing the request body failed.
    #[display("gzip compression failed: {_0}")]
    #[from(skip)]
    Compression(std::io::Error),

    /// The assembled request cannot be carried by the transport.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// Native transport failure (DNS, connect, TLS, timeout), passed through untouched.
    #[display("{_0}")]
    #[from(skip)]
    Transport(#[error(not(source))] BoxError),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a bad URL error carrying the original text.
    #[must_use]
    pub fn bad_url(source: impl Into<String>) -> Self {
        Self::BadUrl(source.into())
    }

    /// Create a bad response code error.
    #[must_use]
    pub fn bad_response_code(status: u16, body: Bytes) -> Self {
        Self::BadResponseCode { status, body }
    }

    /// Create a JSON decoding error with path context.
    #[must_use]
    pub fn json_decoding(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDecodingFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Wrap a native transport error without altering it.
    #[must_use]
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }

    /// Returns `true` if this error came straight from the transport.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// The native transport error, if this is one.
    #[must_use]
    pub fn transport_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Transport(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this is a bad response code error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::BadResponseCode { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    /// Returns the response body if this is a bad response code error.
    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        match self {
            Self::BadResponseCode { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Try to decode the error body as JSON.
    ///
    /// Returns `None` when this is not a bad response code error.
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.body().map(|body| crate::from_json(body))
    }

    /// Why the error happened, when that can be stated.
    #[must_use]
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::ResponseNotHttp => {
                Some("Only proper RFC 9110 HTTP responses can be handled.".to_string())
            }
            Self::BadUrl(source) => Some(format!(
                "The value used as a route does not represent a valid RFC 3986 URL: {source}"
            )),
            Self::BadResponseCode { status, .. } => Some(format!(
                "The status code of an HTTP response must be between 200 and 299 to be \
                 considered satisfactory. This time, the response was {status}."
            )),
            Self::JsonEncodingFailed(err) => Some(err.to_string()),
            Self::JsonDecodingFailed { path, message } if path.is_empty() => {
                Some(message.clone())
            }
            Self::JsonDecodingFailed { path, message } => Some(format!("{message} (at {path})")),
            Self::Compression(err) => Some(err.to_string()),
            Self::Transport(err) => Some(err.to_string()),
            Self::RequestFailed
            | Self::BadQueryItem(_)
            | Self::MiscResponseIssue
            | Self::InvalidRequest(_) => None,
        }
    }

    /// What the caller can try next, when there is something to try.
    #[must_use]
    pub fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::ResponseNotHttp => Some(
                "Examine the response with a tool such as curl. If it looks wrong, contact \
                 the server's administrator."
                    .to_string(),
            ),
            Self::BadUrl(source) => Some(format!("Double-check this URL: {source}")),
            Self::BadResponseCode { status, .. } => {
                let range = match status {
                    400..=499 => format!(
                        "Status code {status} is in the 4xx range: the server claims something \
                         is wrong with the request and refuses to service it. "
                    ),
                    500..=599 => format!(
                        "Status code {status} is in the 5xx range: the server hit an error \
                         while servicing the request. "
                    ),
                    _ => String::new(),
                };
                Some(format!(
                    "{range}See https://en.wikipedia.org/wiki/List_of_HTTP_status_codes#{status} \
                     to learn more about status code {status}."
                ))
            }
            Self::JsonDecodingFailed { .. } => Some(
                "Check that the requested type matches the shape of the response body."
                    .to_string(),
            ),
            Self::MiscResponseIssue => Some("Please report this issue.".to_string()),
            Self::RequestFailed
            | Self::BadQueryItem(_)
            | Self::JsonEncodingFailed(_)
            | Self::Compression(_)
            | Self::InvalidRequest(_)
            | Self::Transport(_) => None,
        }
    }
}
