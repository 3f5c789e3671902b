//! Routes: anything that resolves to a URL.
//!
//! [`Route`] is implemented for [`Url`] (always succeeds) and for strings
//! (parsed on every resolution, failing with [`Error::BadUrl`]). Define your
//! own types to keep endpoint construction in one place:
//!
//! ```
//! use ether_core::{Result, Route};
//! use url::Url;
//!
//! struct UserRoute {
//!     id: u64,
//! }
//!
//! impl Route for UserRoute {
//!     fn to_url(&self) -> Result<Url> {
//!         format!("https://api.example.com/users/{}", self.id).to_url()
//!     }
//! }
//!
//! let url = UserRoute { id: 7 }.to_url().expect("valid");
//! assert_eq!(url.path(), "/users/7");
//! ```

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{Error, Result};

/// A value that can be resolved to a URL.
///
/// Resolution must be free of side effects: resolving the same route twice
/// yields the same URL.
pub trait Route: Send + Sync {
    /// Resolve this route to a URL.
    fn to_url(&self) -> Result<Url>;
}

impl Route for Url {
    fn to_url(&self) -> Result<Url> {
        Ok(self.clone())
    }
}

impl Route for str {
    fn to_url(&self) -> Result<Url> {
        Url::parse(self).map_err(|_| Error::bad_url(self))
    }
}

impl Route for String {
    fn to_url(&self) -> Result<Url> {
        self.as_str().to_url()
    }
}

impl<R: Route + ?Sized> Route for &R {
    fn to_url(&self) -> Result<Url> {
        (**self).to_url()
    }
}

impl<R: Route + ?Sized> Route for Box<R> {
    fn to_url(&self) -> Result<Url> {
        (**self).to_url()
    }
}

/// A route tied to the type its response decodes into.
///
/// Removes the need for a type annotation at the call site.
pub trait TypedRoute: Route {
    /// The decoded response type.
    type Decoded: DeserializeOwned + 'static;
}

/// Filters passed to [`PluralFetchable::plural_route`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchableFilters {
    /// Free-text search query.
    pub search_query: Option<String>,
    /// Closed date range.
    pub date_range: Option<RangeInclusive<DateTime<Utc>>>,
}

impl FetchableFilters {
    /// Filters with only a search query.
    #[must_use]
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            search_query: Some(query.into()),
            date_range: None,
        }
    }

    /// Set the date range.
    #[must_use]
    pub fn with_date_range(mut self, range: RangeInclusive<DateTime<Utc>>) -> Self {
        self.date_range = Some(range);
        self
    }
}

/// A resource that can be fetched one at a time.
pub trait SingularFetchable: DeserializeOwned + 'static {
    /// Route to a single resource, or to the default one when `id` is `None`.
    fn singular_route(id: Option<&str>) -> impl Route;
}

/// A resource that can be fetched as a collection.
pub trait PluralFetchable: DeserializeOwned + 'static {
    /// Route to the collection, narrowed by `filters`.
    fn plural_route(filters: Option<&FetchableFilters>) -> impl Route;
}

/// A resource that is both singular- and plural-fetchable.
pub trait Fetchable: SingularFetchable + PluralFetchable {}

impl<T: SingularFetchable + PluralFetchable> Fetchable for T {}
