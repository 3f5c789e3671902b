//! Prelude module for convenient imports.
//!
//! ```
//! use ether::prelude::*;
//! ```

pub use crate::{
    Call, Data, Decoder, DomainHeaders, Error, Ether, EtherConfig, Fetchable, FetchableFilters,
    Form, FormFile, FormValue, Headers, HttpClient, HyperClient, Method, ParameterEncoding,
    Parameters, PluralFetchable, RawResponse, RequestBody, Response, Result, Route,
    SingularFetchable, TypedRoute,
};
pub use serde::{Deserialize, Serialize};
