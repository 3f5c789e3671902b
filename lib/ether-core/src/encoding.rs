//! Parameter encodings.
//!
//! A [`ParameterEncoding`] decides how [`Parameters`] reach the wire: as
//! query items, as a JSON body, as a gzip-compressed JSON body, or not at
//! all (`Custom`, where the caller supplies the body and only the
//! `Content-Type` is set).

use std::io::Write;

use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

use crate::headers::{CONTENT_ENCODING, CONTENT_TYPE};
use crate::{ContentType, Error, Headers, Parameters, Result};

/// RFC 3986 unreserved characters stay as-is, everything else is escaped.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// How parameters are encoded into a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ParameterEncoding {
    /// Percent-encoded query items appended to the URL.
    #[default]
    UrlQuery,
    /// JSON object in the body.
    Json,
    /// JSON object in the body, gzip-compressed.
    GZip,
    /// Caller-provided body; only `Content-Type` is set to this value.
    Custom(String),
}

/// Result of applying a [`ParameterEncoding`].
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRequest {
    /// Final URL.
    pub url: Url,
    /// Body produced from the parameters, if any.
    pub body: Option<Bytes>,
    /// Headers implied by the encoding.
    pub headers: Headers,
}

impl ParameterEncoding {
    /// A custom encoding with the given content type.
    #[must_use]
    pub fn custom(content_type: impl Into<String>) -> Self {
        Self::Custom(content_type.into())
    }

    /// `true` for [`ParameterEncoding::GZip`].
    #[must_use]
    pub const fn is_gzip(&self) -> bool {
        matches!(self, Self::GZip)
    }

    /// Apply this encoding to a URL and its parameters.
    pub fn encode(&self, url: Url, parameters: &Parameters) -> Result<EncodedRequest> {
        match self {
            Self::UrlQuery => Ok(EncodedRequest {
                url: encode_query(url, parameters),
                body: None,
                headers: Headers::from([(CONTENT_TYPE, ContentType::FormUrlEncoded.as_str())]),
            }),
            Self::Json => Ok(EncodedRequest {
                url,
                body: Some(encode_json(parameters)?),
                headers: Headers::from([(CONTENT_TYPE, ContentType::Json.as_str())]),
            }),
            Self::GZip => Ok(EncodedRequest {
                url,
                body: Some(gzip(&encode_json(parameters)?)?),
                headers: Headers::from([
                    (CONTENT_TYPE, ContentType::Json.as_str()),
                    (CONTENT_ENCODING, "gzip"),
                ]),
            }),
            Self::Custom(content_type) => Ok(EncodedRequest {
                url,
                body: None,
                headers: Headers::from([(CONTENT_TYPE, content_type.as_str())]),
            }),
        }
    }
}

/// Append parameters as query items, keeping the items already in the URL.
#[must_use]
pub fn encode_query(mut url: Url, parameters: &Parameters) -> Url {
    if parameters.is_empty() {
        return url;
    }

    let encoded = parameters
        .string_pairs()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, QUERY_COMPONENT),
                utf8_percent_encode(&value, QUERY_COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    let query = match url.query() {
        Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
        _ => encoded,
    };
    url.set_query(Some(&query));
    url
}

/// Serialize parameters as a pretty-printed JSON object.
pub fn encode_json(parameters: &Parameters) -> Result<Bytes> {
    crate::to_json_pretty(parameters)
}

/// Compress bytes with gzip framing.
pub fn gzip(data: &[u8]) -> Result<Bytes> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(Error::Compression)?;
    encoder.finish().map(Bytes::from).map_err(Error::Compression)
}
