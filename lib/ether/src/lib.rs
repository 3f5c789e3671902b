//! Ergonomic async HTTP client.
//!
//! Typed routes, automatic JSON encoding and decoding, gzip request bodies,
//! multipart forms, per-domain trusted headers and fetchable resources, on
//! top of hyper and rustls.
//!
//! # Example
//!
//! ```no_run
//! use ether::prelude::*;
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Note {
//!     text: String,
//! }
//!
//! # async fn run() -> ether::Result<()> {
//! let config = EtherConfig::builder()
//!     .trust("api.example.com", Headers::from([("Authorization", "Bearer token")]))
//!     .build();
//! let ether = Ether::with_config(config);
//!
//! let created = ether
//!     .post(
//!         "https://api.example.com/notes",
//!         RequestBody::encodable(Note { text: "hi".to_string() }),
//!         ParameterEncoding::Json,
//!         Some(Decoder::<Note>::json()),
//!     )
//!     .await?;
//! println!("{} {}", created.status(), created.status_reason());
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod connector;
mod dispatch;
pub mod prelude;

pub use client::{BoxedService, HyperClient, HyperClientBuilder, ServiceFuture};
pub use config::{ClientConfig, ClientConfigBuilder, EtherConfig, EtherConfigBuilder};
pub use dispatch::{Call, Ether};

// Re-export tower for layer composition
pub use tower;

// Re-export core types
pub use ether_core::{
    BoxError, ContentType, Data, Decoder, DomainHeaders, EncodedRequest, Error, Fetchable,
    FetchableFilters, Form, FormFile, FormValue, Headers, HttpClient, HttpResponse, JsonEncoder,
    Method, ParameterEncoding, Parameters, PluralFetchable, RawResponse, Request, RequestBody,
    RequestBuilder, Response, Result, Route, SingularFetchable, StatusCode, TypedRoute, classify,
    from_json, gzip, headers, resolve_headers, to_json,
};

// Re-export url for route implementations
pub use url;
