//! Core types and pipeline stages for the ether HTTP client.
//!
//! This crate holds everything that does not touch the network:
//! - [`Route`], [`TypedRoute`] and the fetchable traits - what to call
//! - [`Parameters`], [`Headers`], [`DomainHeaders`] - what to send
//! - [`ParameterEncoding`], [`RequestBody`], [`Form`] - how to send it
//! - [`Request`], [`HttpResponse`], [`Response`], [`classify`] - the exchange
//! - [`Error`] and [`Result`] - error handling
//! - [`HttpClient`] - the transport seam

mod body;
mod client;
mod encoding;
mod error;
pub mod headers;
mod method;
mod multipart;
mod parameters;
pub mod prelude;
mod request;
mod response;
mod route;

pub use body::{ContentType, EncodeFn, JsonEncoder, RequestBody, from_json, to_json, to_json_pretty};
pub use client::HttpClient;
pub use encoding::{EncodedRequest, ParameterEncoding, encode_json, encode_query, gzip};
pub use error::{BoxError, Error, Result};
pub use headers::{DomainHeaders, Headers, resolve_headers};
pub use method::Method;
pub use multipart::{Form, FormFile, FormValue};
pub use parameters::Parameters;
pub use request::{Request, RequestBuilder};
pub use response::{Data, Decoder, HttpResponse, RawResponse, Response, classify};
pub use route::{
    Fetchable, FetchableFilters, PluralFetchable, Route, SingularFetchable, TypedRoute,
};

// Re-export http crate status codes
pub use http::StatusCode;
