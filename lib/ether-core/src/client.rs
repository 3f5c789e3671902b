//! Transport abstraction.
//!
//! [`HttpClient`] is the only seam between the request pipeline and the
//! network. The `ether` crate ships a hyper-based implementation; tests and
//! embedders can provide their own.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;

use crate::{HttpResponse, Request, Result};

/// Core HTTP client trait.
///
/// Implementations perform a single round trip with no retries and buffer
/// the whole response body.
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// # Errors
    ///
    /// Native transport failures (DNS, connect, TLS, timeout) must be
    /// returned as [`crate::Error::Transport`] without rewrapping.
    fn execute(&self, request: Request<Bytes>) -> impl Future<Output = Result<HttpResponse>> + Send;
}

impl<C: HttpClient> HttpClient for Arc<C> {
    fn execute(&self, request: Request<Bytes>) -> impl Future<Output = Result<HttpResponse>> + Send {
        (**self).execute(request)
    }
}
