//! Header maps, domain-trusted headers, and header resolution.
//!
//! Final request headers are computed from four layers, lowest to highest
//! precedence:
//!
//! 1. `Accept: application/json` when a decoded response was requested,
//! 2. the domain-trusted headers registered for the request host,
//! 3. the caller's explicit headers,
//! 4. the headers implied by the parameter encoding.
//!
//! Explicit headers that collide with headers ether manages itself are still
//! honoured, but trigger a `tracing` warning.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use url::Url;

/// `Accept` header name.
pub const ACCEPT: &str = "Accept";
/// `Authorization` header name.
pub const AUTHORIZATION: &str = "Authorization";
/// `Content-Type` header name.
pub const CONTENT_TYPE: &str = "Content-Type";
/// `Content-Encoding` header name.
pub const CONTENT_ENCODING: &str = "Content-Encoding";

/// Header map with case-insensitive names.
///
/// The case of the first insertion of a name is kept for the wire; later
/// insertions of the same name (in any case) replace the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    /// Empty header map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a header, returning the previous value for that name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(index) => self
                .0
                .get_mut(index)
                .map(|(_, existing)| std::mem::replace(existing, value)),
            None => {
                self.0.push((name, value));
                None
            }
        }
    }

    /// Copy every header of `other` into `self`, overwriting matching names.
    pub fn extend_from(&mut self, other: &Self) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    /// Value for a header name, compared case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .and_then(|index| self.0.get(index))
            .map(|(_, value)| value.as_str())
    }

    /// `true` if a header with this name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Remove a header, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|index| self.0.remove(index).1)
    }

    /// Number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.0
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl IntoIterator for Headers {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Shared table of headers attached automatically to requests for a host.
///
/// Typically holds session tokens that must never leak to other domains.
/// Cloning shares the same table; it can be updated at any time and is read
/// once per request.
#[derive(Debug, Clone, Default)]
pub struct DomainHeaders {
    inner: Arc<RwLock<HashMap<String, Headers>>>,
}

impl DomainHeaders {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register headers for a host, builder style.
    #[must_use]
    pub fn with(self, host: impl AsRef<str>, headers: Headers) -> Self {
        self.insert(host, headers);
        self
    }

    /// Register (or replace) the headers for a host.
    pub fn insert(&self, host: impl AsRef<str>, headers: Headers) -> Option<Headers> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(host.as_ref().to_ascii_lowercase(), headers)
    }

    /// Forget the headers of a host.
    pub fn remove(&self, host: &str) -> Option<Headers> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&host.to_ascii_lowercase())
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Snapshot of the headers registered for a host.
    #[must_use]
    pub fn get(&self, host: &str) -> Option<Headers> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&host.to_ascii_lowercase())
            .cloned()
    }
}

/// Compute the final header set for a request.
///
/// `encoding_headers` are applied last and always win for the names they set.
#[must_use]
pub fn resolve_headers(
    url: &Url,
    decode_requested: bool,
    domain_headers: &DomainHeaders,
    explicit: &Headers,
    encoding_headers: &Headers,
) -> Headers {
    let mut headers = Headers::new();

    if decode_requested {
        headers.insert(ACCEPT, "application/json");
    }

    let known_domain = url
        .host_str()
        .and_then(|host| domain_headers.get(host).map(|trusted| (host, trusted)));
    if let Some((_, trusted)) = &known_domain {
        headers.extend_from(trusted);
    }

    let known_host = known_domain.as_ref().map(|(host, _)| *host);
    for (name, value) in explicit.iter() {
        warn_on_managed_header(name, value, known_host);
        headers.insert(name, value);
    }

    headers.extend_from(encoding_headers);
    headers
}

fn warn_on_managed_header(name: &str, value: &str, known_domain: Option<&str>) {
    if name.eq_ignore_ascii_case(ACCEPT) {
        tracing::warn!(
            header = name,
            "manually setting {name} may stop the server from returning a decodable response; \
             only do this with a really good reason"
        );
    } else if name.eq_ignore_ascii_case(AUTHORIZATION) {
        if let Some(domain) = known_domain {
            tracing::warn!(
                header = name,
                domain,
                "manually setting {name} disrupts the session headers registered for {domain}; \
                 only do this with a really good reason"
            );
        }
    } else if name.eq_ignore_ascii_case(CONTENT_TYPE) {
        let suggestion = if value.starts_with("application/json") {
            "use ParameterEncoding::Json".to_string()
        } else {
            format!("use ParameterEncoding::Custom(\"{value}\")")
        };
        tracing::warn!(
            header = name,
            "{name} set through explicit headers is overwritten by the parameter encoding; \
             {suggestion} and remove the explicit header"
        );
    } else if name.eq_ignore_ascii_case(CONTENT_ENCODING) {
        tracing::warn!(
            header = name,
            "{name} set through explicit headers is overwritten in some cases, such as gzip \
             encoding; only do this with a really good reason"
        );
    }
}
