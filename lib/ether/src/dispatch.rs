//! Request dispatcher.
//!
//! [`Ether`] turns a route plus a [`Call`] into one HTTP exchange:
//! resolve the route, encode parameters, resolve headers, attach the body,
//! send through the transport, classify the response.

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::{
    Decoder, Error, EtherConfig, FetchableFilters, Form, Headers, HttpClient, HyperClient, Method,
    ParameterEncoding, Parameters, PluralFetchable, RawResponse, Request, RequestBody, Response,
    Result, Route, SingularFetchable, TypedRoute, classify, gzip, resolve_headers,
};

/// Everything about a request except its route and decode target.
#[derive(Debug)]
pub struct Call {
    method: Method,
    headers: Headers,
    parameters: Parameters,
    body: Option<RequestBody>,
    encoding: ParameterEncoding,
}

impl Call {
    /// A call with the given method, no headers, no parameters, no body and
    /// [`ParameterEncoding::UrlQuery`].
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: Headers::new(),
            parameters: Parameters::new(),
            body: None,
            encoding: ParameterEncoding::default(),
        }
    }

    /// A `GET` call.
    #[must_use]
    pub fn get() -> Self {
        Self::new(Method::Get)
    }

    /// A `POST` call.
    #[must_use]
    pub fn post() -> Self {
        Self::new(Method::Post)
    }

    /// Add an explicit header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add explicit headers.
    #[must_use]
    pub fn headers(mut self, headers: &Headers) -> Self {
        self.headers.extend_from(headers);
        self
    }

    /// Add a parameter.
    #[must_use]
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.parameters.insert(key, value);
        self
    }

    /// Replace the parameters.
    #[must_use]
    pub fn parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set the body.
    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the parameter encoding.
    #[must_use]
    pub fn encoding(mut self, encoding: ParameterEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }
}

/// Async HTTP client with typed routes, JSON and multipart helpers.
///
/// # Example
///
/// ```no_run
/// use ether::prelude::*;
///
/// #[derive(Debug, Deserialize)]
/// struct Echo {
///     marco: String,
/// }
///
/// # async fn run() -> ether::Result<()> {
/// let ether = Ether::new();
/// let echo: Echo = ether
///     .get_json("https://example.com/echo", Parameters::from([("marco", "polo")]))
///     .await?;
/// assert_eq!(echo.marco, "polo");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Ether<C = HyperClient> {
    client: C,
    config: EtherConfig,
}

impl Ether<HyperClient> {
    /// Dispatcher over a default [`HyperClient`] and default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EtherConfig::default())
    }

    /// Dispatcher over a default [`HyperClient`].
    #[must_use]
    pub fn with_config(config: EtherConfig) -> Self {
        Self::with_client(HyperClient::new(), config)
    }
}

impl Default for Ether<HyperClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Ether<C> {
    /// Dispatcher over any transport.
    #[must_use]
    pub fn with_client(client: C, config: EtherConfig) -> Self {
        Self { client, config }
    }

    /// The transport.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &EtherConfig {
        &self.config
    }

    /// Assemble the outgoing request without sending it.
    ///
    /// Fails before any I/O when the route does not resolve, or when the
    /// parameters or body cannot be encoded.
    pub fn prepare(&self, route: &impl Route, call: Call, decode_requested: bool) -> Result<Request<Bytes>> {
        let Call {
            method,
            headers,
            parameters,
            body,
            encoding,
        } = call;

        let url = route.to_url()?;
        let encoded = encoding.encode(url, &parameters)?;

        let headers = resolve_headers(
            &encoded.url,
            decode_requested,
            &self.config.domain_headers,
            &headers,
            &encoded.headers,
        );

        let body = match body {
            Some(body) if encoding.is_gzip() => Some(gzip(&body.into_bytes()?)?),
            Some(body) => Some(body.into_bytes()?),
            None => encoded.body,
        };

        Ok(Request::builder(method, encoded.url)
            .headers(&headers)
            .maybe_body(body)
            .build())
    }
}

impl<C: HttpClient> Ether<C> {
    /// Send a request.
    ///
    /// With `Some(decoder)` a 2xx body is decoded and `Accept:
    /// application/json` is sent; with `None` the raw body is returned.
    /// Transport failures come back as [`Error::Transport`] untouched.
    /// A non-2xx status is logged with the host's trusted header values
    /// masked.
    pub async fn request<T>(
        &self,
        route: impl Route,
        call: Call,
        decoder: Option<Decoder<T>>,
    ) -> Result<Response<T>> {
        let request = self.prepare(&route, call, decoder.is_some())?;

        if self.config.should_log_requests() {
            tracing::debug!("Requesting: {}", request.describe());
        }

        let response = self.client.execute(request.clone()).await?;

        let trusted = request
            .url()
            .host_str()
            .and_then(|host| self.config.domain_headers.get(host))
            .unwrap_or_default();
        let redact: Vec<&str> = trusted.iter().map(|(name, _)| name).collect();
        classify(response, decoder.as_ref(), &request, &redact)
    }

    /// Send a request and keep the raw body.
    pub async fn request_raw(&self, route: impl Route, call: Call) -> Result<RawResponse> {
        self.request(route, call, None).await
    }

    /// `GET` with URL-query parameters, returning the decoded body.
    pub async fn get<T>(&self, route: impl Route, parameters: Parameters, decoder: Decoder<T>) -> Result<T> {
        let call = Call::get().parameters(parameters);
        self.request(route, call, Some(decoder))
            .await?
            .into_data()
            .into_decoded()
            .ok_or_else(|| Error::json_decoding("", "the response carried no decoded value"))
    }

    /// `GET` decoding the body as JSON.
    pub async fn get_json<T: DeserializeOwned + 'static>(&self, route: impl Route, parameters: Parameters) -> Result<T> {
        self.get(route, parameters, Decoder::json()).await
    }

    /// `POST` a body.
    ///
    /// With [`ParameterEncoding::GZip`] the body is compressed and labelled
    /// `Content-Encoding: gzip`.
    pub async fn post<T>(
        &self,
        route: impl Route,
        body: RequestBody,
        encoding: ParameterEncoding,
        decoder: Option<Decoder<T>>,
    ) -> Result<Response<T>> {
        let call = Call::post().body(body).encoding(encoding);
        self.request(route, call, decoder).await
    }

    /// `POST` a body, keeping the raw response.
    pub async fn post_raw(&self, route: impl Route, body: RequestBody, encoding: ParameterEncoding) -> Result<RawResponse> {
        self.post(route, body, encoding, None).await
    }

    /// `POST` a gzip-compressed JSON body.
    pub async fn post_gzip<T>(
        &self,
        route: impl Route,
        body: RequestBody,
        decoder: Option<Decoder<T>>,
    ) -> Result<Response<T>> {
        self.post(route, body, ParameterEncoding::GZip, decoder).await
    }

    /// `POST` a `multipart/form-data` form.
    pub async fn post_multipart_form<T>(
        &self,
        route: impl Route,
        form: &Form,
        decoder: Option<Decoder<T>>,
    ) -> Result<Response<T>> {
        let call = Call::post()
            .body(RequestBody::raw(form.to_bytes()))
            .encoding(ParameterEncoding::Custom(form.content_type()));
        self.request(route, call, decoder).await
    }

    /// `POST` a `multipart/form-data` form, keeping the raw response.
    pub async fn post_multipart_form_raw(&self, route: impl Route, form: &Form) -> Result<RawResponse> {
        self.post_multipart_form(route, form, None).await
    }

    /// [`Ether::get_json`] with the type carried by the route.
    pub async fn get_typed<R: TypedRoute>(&self, route: R, parameters: Parameters) -> Result<R::Decoded> {
        self.get_json(route, parameters).await
    }

    /// [`Ether::post`] with the type carried by the route.
    pub async fn post_typed<R: TypedRoute>(
        &self,
        route: R,
        body: RequestBody,
        encoding: ParameterEncoding,
    ) -> Result<Response<R::Decoded>> {
        self.post(route, body, encoding, Some(Decoder::json())).await
    }

    /// [`Ether::post_multipart_form`] with the type carried by the route.
    pub async fn post_multipart_form_typed<R: TypedRoute>(&self, route: R, form: &Form) -> Result<Response<R::Decoded>> {
        self.post_multipart_form(route, form, Some(Decoder::json())).await
    }

    /// [`Ether::request`] with the type carried by the route.
    pub async fn request_typed<R: TypedRoute>(&self, route: R, call: Call) -> Result<Response<R::Decoded>> {
        self.request(route, call, Some(Decoder::json())).await
    }

    /// Fetch one resource.
    pub async fn fetch<T: SingularFetchable>(&self, id: Option<&str>, parameters: Parameters) -> Result<T> {
        self.get_json(T::singular_route(id), parameters).await
    }

    /// Fetch one resource wrapped in a container type, returning the container.
    pub async fn fetch_with_container<T, W>(&self, id: Option<&str>, parameters: Parameters) -> Result<W>
    where
        T: SingularFetchable,
        W: DeserializeOwned + 'static,
    {
        self.get_json(T::singular_route(id), parameters).await
    }

    /// Fetch one resource wrapped in a container type, returning what `extract` pulls out.
    pub async fn fetch_in<T, W>(
        &self,
        id: Option<&str>,
        parameters: Parameters,
        extract: impl FnOnce(W) -> T,
    ) -> Result<T>
    where
        T: SingularFetchable,
        W: DeserializeOwned + 'static,
    {
        self.fetch_with_container::<T, W>(id, parameters)
            .await
            .map(extract)
    }

    /// Fetch a collection.
    pub async fn fetch_all<T: PluralFetchable>(
        &self,
        filters: Option<&FetchableFilters>,
        parameters: Parameters,
    ) -> Result<Vec<T>> {
        self.get_json(T::plural_route(filters), parameters).await
    }

    /// Fetch a collection wrapped in a container type, returning the container.
    pub async fn fetch_all_with_container<T, W>(
        &self,
        filters: Option<&FetchableFilters>,
        parameters: Parameters,
    ) -> Result<W>
    where
        T: PluralFetchable,
        W: DeserializeOwned + 'static,
    {
        self.get_json(T::plural_route(filters), parameters).await
    }

    /// Fetch a collection wrapped in a container type, returning what `extract` pulls out.
    pub async fn fetch_all_in<T, W>(
        &self,
        filters: Option<&FetchableFilters>,
        parameters: Parameters,
        extract: impl FnOnce(W) -> Vec<T>,
    ) -> Result<Vec<T>>
    where
        T: PluralFetchable,
        W: DeserializeOwned + 'static,
    {
        self.fetch_all_with_container::<T, W>(filters, parameters)
            .await
            .map(extract)
    }
}
