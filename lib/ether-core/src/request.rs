//! HTTP request building.
//!
//! Use [`Request::builder`] to construct requests with headers, query parameters, and bodies.
//!
//! # Example
//!
//! ```
//! use ether_core::{Method, Request};
//! use bytes::Bytes;
//!
//! let url = url::Url::parse("https://api.example.com/users").expect("valid URL");
//! let request = Request::<Bytes>::builder(Method::Get, url)
//!     .header("Accept", "application/json")
//!     .query("page", "1")
//!     .build();
//!
//! assert_eq!(request.url().query(), Some("page=1"));
//! ```

use std::fmt::Write as _;

use bytes::Bytes;
use url::Url;

use crate::{Headers, Method, headers::AUTHORIZATION};

/// An HTTP request with method, URL, headers, and optional body.
#[derive(Debug, Clone)]
pub struct Request<B = Bytes> {
    method: Method,
    url: Url,
    headers: Headers,
    body: Option<B>,
}

impl<B> Request<B> {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder(method: Method, url: Url) -> RequestBuilder<B> {
        RequestBuilder::new(method, url)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable access to headers.
    #[must_use]
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Single header value by name, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    /// Consume into (method, url, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, Url, Headers, Option<B>) {
        (self.method, self.url, self.headers, self.body)
    }
}

impl<B: AsRef<[u8]>> Request<B> {
    /// Multi-line diagnostic dump: request line, query items, headers, body.
    ///
    /// Headers are printed as-is and may carry secrets.
    #[must_use]
    pub fn describe(&self) -> String {
        self.describe_with(|_| false)
    }

    /// [`Request::describe`] with credential header values masked.
    ///
    /// `Authorization`, `Proxy-Authorization`, `Cookie` and every header named
    /// in `redact` (compared case-insensitively) print as `<redacted>`.
    #[must_use]
    pub fn describe_redacted(&self, redact: &[&str]) -> String {
        self.describe_with(|name| {
            CREDENTIAL_HEADERS
                .iter()
                .chain(redact)
                .any(|hidden| hidden.eq_ignore_ascii_case(name))
        })
    }

    fn describe_with(&self, hide: impl Fn(&str) -> bool) -> String {
        let mut out = format!("{} {}\nQuery Items:\n", self.method, self.url);
        for (name, value) in self.url.query_pairs() {
            let _ = writeln!(out, "{name}={value}");
        }
        out.push_str("Headers:\n");
        for (name, value) in self.headers.iter() {
            let value = if hide(name) { REDACTED } else { value };
            let _ = writeln!(out, "{name}: {value}");
        }
        out.push_str("Body:\n");
        if let Some(body) = &self.body {
            out.push_str(&String::from_utf8_lossy(body.as_ref()));
        }
        out
    }
}

const CREDENTIAL_HEADERS: [&str; 3] = [AUTHORIZATION, "Proxy-Authorization", "Cookie"];
const REDACTED: &str = "<redacted>";

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone)]
pub struct RequestBuilder<B = Bytes> {
    method: Method,
    url: Url,
    headers: Headers,
    body: Option<B>,
}

impl<B> RequestBuilder<B> {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Headers::new(),
            body: None,
        }
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets multiple headers, overwriting matching names.
    #[must_use]
    pub fn headers(mut self, headers: &Headers) -> Self {
        self.headers.extend_from(headers);
        self
    }

    /// Appends a query parameter to the URL.
    #[must_use]
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(name, value);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: B) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets or clears the request body.
    #[must_use]
    pub fn maybe_body(mut self, body: Option<B>) -> Self {
        self.body = body;
        self
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request<B> {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl RequestBuilder<Bytes> {
    /// Set a compact JSON body and its content type.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json<T: serde::Serialize>(self, value: &T) -> crate::Result<Self> {
        let body = crate::to_json(value)?;
        Ok(self
            .header(crate::headers::CONTENT_TYPE, crate::ContentType::Json.as_str())
            .body(body))
    }
}
