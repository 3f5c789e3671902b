//! Prelude module for convenient imports.
//!
//! ```
//! use ether_core::prelude::*;
//! ```

pub use crate::{
    Data, Decoder, DomainHeaders, Error, Fetchable, FetchableFilters, Form, FormFile, FormValue,
    Headers, HttpClient, Method, ParameterEncoding, Parameters, PluralFetchable, RawResponse,
    RequestBody, Response, Result, Route, SingularFetchable, TypedRoute,
};
