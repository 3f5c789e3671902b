//! End-to-end tests for `Ether` against a wiremock server.

use std::io::Read;
use std::sync::OnceLock;
use std::time::Duration;

use assert2::{check, let_assert};
use bytes::Bytes;
use ether::prelude::*;
use ether::{HyperClient, StatusCode, headers};
use flate2::read::GzDecoder;
use wiremock::{
    Mock, MockServer, Respond, ResponseTemplate,
    matchers::{any, header, method, path},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NestedStruct {
    nested_string: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SomewhatComplicated {
    string: String,
    int: i64,
    double: f64,
    nested_struct: NestedStruct,
}

/// Answers with the request body.
struct EchoBody;

impl Respond for EchoBody {
    fn respond(&self, request: &wiremock::Request) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .insert_header("Content-Type", "application/json")
            .set_body_bytes(request.body.clone())
    }
}

/// Answers with the query items as a JSON object.
struct EchoQuery;

impl Respond for EchoQuery {
    fn respond(&self, request: &wiremock::Request) -> ResponseTemplate {
        let object: serde_json::Map<String, serde_json::Value> = request
            .url
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), serde_json::Value::String(value.into_owned())))
            .collect();
        ResponseTemplate::new(200).set_body_json(object)
    }
}

/// Answers with one request header as `{"value": ...}`.
struct EchoHeader(&'static str);

impl Respond for EchoHeader {
    fn respond(&self, request: &wiremock::Request) -> ResponseTemplate {
        let value = request
            .headers
            .get(self.0)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "value": value }))
    }
}

#[derive(Debug, Deserialize)]
struct HeaderValue {
    value: Option<String>,
}

#[tokio::test]
async fn json_body_round_trips() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(header("Content-Type", "application/json; charset=utf-8"))
        .respond_with(EchoBody)
        .mount(&server)
        .await;

    let sent = SomewhatComplicated {
        string: "Hi".to_string(),
        int: 1,
        double: 1.5,
        nested_struct: NestedStruct {
            nested_string: "Hello".to_string(),
        },
    };

    let ether = Ether::new();
    let_assert!(
        Ok(response) = ether
            .post(
                format!("{}/echo", server.uri()),
                RequestBody::encodable(sent.clone()),
                ParameterEncoding::Json,
                Some(Decoder::<SomewhatComplicated>::json()),
            )
            .await
    );

    check!(response.status() == 200);
    let_assert!(Some(received) = response.into_data().into_decoded());
    check!(received == sent);
}

struct EchoRoute(String);

impl Route for EchoRoute {
    fn to_url(&self) -> ether::Result<ether::url::Url> {
        self.0.to_url()
    }
}

impl TypedRoute for EchoRoute {
    type Decoded = SomewhatComplicated;
}

#[tokio::test]
async fn typed_post_decodes_the_route_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(EchoBody)
        .mount(&server)
        .await;

    let sent = SomewhatComplicated {
        string: "typed".to_string(),
        int: -3,
        double: 0.25,
        nested_struct: NestedStruct {
            nested_string: "inner".to_string(),
        },
    };

    let ether = Ether::new();
    let_assert!(
        Ok(response) = ether
            .post_typed(
                EchoRoute(server.uri()),
                RequestBody::encodable_with(sent.clone(), ether::JsonEncoder::pretty()),
                ParameterEncoding::Json,
            )
            .await
    );
    check!(response.data().decoded() == Some(&sent));
}

#[tokio::test]
async fn query_parameters_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/echo"))
        .and(header("Accept", "application/json"))
        .respond_with(EchoQuery)
        .mount(&server)
        .await;

    #[derive(Debug, Deserialize)]
    struct Echo {
        marco: String,
    }

    let ether = Ether::new();
    let_assert!(
        Ok(echo) = ether
            .get_json::<Echo>(
                format!("{}/echo", server.uri()),
                Parameters::from([("marco", "polo")]),
            )
            .await
    );
    check!(echo.marco == "polo");
}

#[tokio::test]
async fn only_2xx_is_a_success() {
    let server = MockServer::start().await;
    for status in [200_u16, 201, 204, 299, 301, 304, 400, 404, 418, 500, 503] {
        Mock::given(path(format!("/status/{status}")))
            .respond_with(ResponseTemplate::new(status).set_body_string("body"))
            .mount(&server)
            .await;
    }

    let ether = Ether::new();
    for status in [200, 201, 204, 299] {
        let route = format!("{}/status/{status}", server.uri());
        let_assert!(Ok(response) = ether.request_raw(route, Call::get()).await);
        check!(response.status() == status);
    }
    for status in [301, 304, 400, 404, 418, 500, 503] {
        let route = format!("{}/status/{status}", server.uri());
        let_assert!(Err(err) = ether.request_raw(route, Call::get()).await);
        check!(err.status() == Some(status));
        check!(err.is_client_error() == StatusCode::from_u16(status).is_ok_and(|s| s.is_client_error()));
        check!(err.is_server_error() == (status >= 500));
    }
}

#[tokio::test]
async fn bad_response_code_keeps_the_error_body() {
    let server = MockServer::start().await;
    Mock::given(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "gone"})))
        .mount(&server)
        .await;

    #[derive(Debug, Deserialize)]
    struct ApiError {
        error: String,
    }

    let ether = Ether::new();
    let_assert!(
        Err(err) = ether
            .get_json::<serde_json::Value>(format!("{}/missing", server.uri()), Parameters::new())
            .await
    );
    let_assert!(Some(Ok(api_error)) = err.decode_body::<ApiError>());
    check!(api_error.error == "gone");
}

#[tokio::test]
async fn trusted_domain_headers_and_explicit_override() {
    let server = MockServer::start().await;
    Mock::given(path("/me"))
        .respond_with(EchoHeader("authorization"))
        .mount(&server)
        .await;

    let config = EtherConfig::builder()
        .trust("127.0.0.1", Headers::from([(headers::AUTHORIZATION, "X")]))
        .build();
    let ether = Ether::with_config(config);
    let route = format!("{}/me", server.uri());

    let_assert!(Ok(response) = ether.request(&route, Call::get(), Some(Decoder::<HeaderValue>::json())).await);
    let_assert!(Some(trusted) = response.into_data().into_decoded());
    check!(trusted.value.as_deref() == Some("X"));

    let call = Call::get().header(headers::AUTHORIZATION, "Y");
    let_assert!(Ok(response) = ether.request(&route, call, Some(Decoder::<HeaderValue>::json())).await);
    let_assert!(Some(explicit) = response.into_data().into_decoded());
    check!(explicit.value.as_deref() == Some("Y"));
}

#[tokio::test]
async fn untrusted_domain_gets_no_session_headers() {
    let server = MockServer::start().await;
    Mock::given(path("/me"))
        .respond_with(EchoHeader("authorization"))
        .mount(&server)
        .await;

    let config = EtherConfig::builder()
        .trust("api.example.com", Headers::from([(headers::AUTHORIZATION, "X")]))
        .build();
    let ether = Ether::with_config(config);

    let_assert!(
        Ok(echo) = ether
            .get_json::<HeaderValue>(format!("{}/me", server.uri()), Parameters::new())
            .await
    );
    check!(echo.value.is_none());
}

#[tokio::test]
async fn gzip_parameters_are_compressed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header("Content-Encoding", "gzip"))
        .respond_with(EchoBody)
        .expect(1)
        .mount(&server)
        .await;

    let ether = Ether::new();
    let call = Call::post()
        .parameters(Parameters::from([("name", "Alice")]))
        .encoding(ParameterEncoding::GZip);
    let_assert!(Ok(response) = ether.request_raw(format!("{}/upload", server.uri()), call).await);
    let_assert!(Some(compressed) = response.data().raw());

    let mut text = String::new();
    GzDecoder::new(&compressed[..])
        .read_to_string(&mut text)
        .expect("gunzip");
    let value: serde_json::Value = serde_json::from_str(&text).expect("json");
    check!(value == serde_json::json!({"name": "Alice"}));
}

#[tokio::test]
async fn post_gzip_compresses_the_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("Content-Encoding", "gzip"))
        .and(header("Content-Type", "application/json; charset=utf-8"))
        .respond_with(EchoBody)
        .mount(&server)
        .await;

    let ether = Ether::new();
    let_assert!(
        Ok(response) = ether
            .post_gzip::<()>(
                server.uri(),
                RequestBody::encodable(serde_json::json!({"a": 1})),
                None,
            )
            .await
    );
    let_assert!(Some(compressed) = response.data().raw());
    let mut text = String::new();
    GzDecoder::new(&compressed[..])
        .read_to_string(&mut text)
        .expect("gunzip");
    check!(text == r#"{"a":1}"#);
}

#[tokio::test]
async fn bad_url_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ether = Ether::new();
    let_assert!(Err(Error::BadUrl(source)) = ether.request_raw("not a url %%%", Call::get()).await);
    check!(source == "not a url %%%");
}

#[tokio::test]
async fn raw_response_exposes_headers() {
    let server = MockServer::start().await;
    Mock::given(path("/trace"))
        .respond_with(
            ResponseTemplate::new(202)
                .insert_header("X-Trace", "abc")
                .set_body_string("queued"),
        )
        .mount(&server)
        .await;

    let ether = Ether::new();
    let_assert!(Ok(response) = ether.request_raw(format!("{}/trace", server.uri()), Call::get()).await);
    check!(response.status() == 202);
    check!(response.status_reason() == "Accepted");
    check!(response.header("x-trace") == Some("abc"));
    check!(response.data().raw() == Some(&Bytes::from_static(b"queued")));
}

#[tokio::test]
async fn transport_failure_is_passed_through() {
    let ether = Ether::new();
    let_assert!(Err(err) = ether.request_raw("http://127.0.0.1:1/", Call::get()).await);
    check!(err.is_transport());
    check!(err.status().is_none());
}

#[tokio::test]
async fn timeout_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let client = HyperClient::builder()
        .timeout(Duration::from_millis(100))
        .build();
    let ether = Ether::with_client(client, EtherConfig::default());

    let_assert!(Err(err) = ether.request_raw(server.uri(), Call::get()).await);
    check!(err.is_transport());
}

static BASE: OnceLock<String> = OnceLock::new();

fn base() -> &'static str {
    BASE.get().map_or("http://127.0.0.1:1", String::as_str)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Note {
    id: String,
    text: String,
}

impl SingularFetchable for Note {
    fn singular_route(id: Option<&str>) -> impl Route {
        format!("{}/notes/{}", base(), id.unwrap_or("latest"))
    }
}

impl PluralFetchable for Note {
    fn plural_route(filters: Option<&FetchableFilters>) -> impl Route {
        let mut url = format!("{}/notes", base());
        if let Some(query) = filters.and_then(|filters| filters.search_query.as_deref()) {
            url.push_str("?search=");
            url.push_str(query);
        }
        url
    }
}

struct LatestNote;

impl Route for LatestNote {
    fn to_url(&self) -> ether::Result<ether::url::Url> {
        Note::singular_route(None).to_url()
    }
}

impl TypedRoute for LatestNote {
    type Decoded = Note;
}

#[derive(Debug, Deserialize)]
struct Wrapped<T> {
    data: T,
}

#[tokio::test]
async fn fetchable_resources_and_typed_routes() {
    let server = MockServer::start().await;
    let _ = BASE.set(server.uri());

    let latest = serde_json::json!({"id": "latest", "text": "newest"});
    let one = serde_json::json!({"id": "1", "text": "first"});
    Mock::given(path("/notes/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&latest))
        .mount(&server)
        .await;
    Mock::given(path("/notes/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": one})))
        .mount(&server)
        .await;
    Mock::given(path("/notes"))
        .and(wiremock::matchers::query_param("search", "first"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": [one]})))
        .mount(&server)
        .await;
    Mock::given(path("/notes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([latest, one])))
        .mount(&server)
        .await;

    let ether = Ether::new();

    let_assert!(Ok(note) = ether.fetch::<Note>(None, Parameters::new()).await);
    check!(note.text == "newest");

    let_assert!(
        Ok(note) = ether
            .fetch_in(Some("1"), Parameters::new(), |wrapped: Wrapped<Note>| wrapped.data)
            .await
    );
    check!(note.id == "1");

    let_assert!(Ok(wrapped) = ether.fetch_with_container::<Note, Wrapped<Note>>(Some("1"), Parameters::new()).await);
    check!(wrapped.data.text == "first");

    let_assert!(Ok(notes) = ether.fetch_all::<Note>(None, Parameters::new()).await);
    check!(notes.len() == 2);

    let filters = FetchableFilters::search("first");
    let_assert!(
        Ok(notes) = ether
            .fetch_all_in(Some(&filters), Parameters::new(), |wrapped: Wrapped<Vec<Note>>| wrapped.data)
            .await
    );
    check!(notes.iter().map(|note| note.id.as_str()).collect::<Vec<_>>() == ["1"]);

    let_assert!(
        Ok(wrapped) = ether
            .fetch_all_with_container::<Note, Wrapped<Vec<Note>>>(Some(&filters), Parameters::new())
            .await
    );
    check!(wrapped.data.len() == 1);

    let_assert!(Ok(note) = ether.get_typed(LatestNote, Parameters::new()).await);
    check!(note.id == "latest");

    let_assert!(Ok(response) = ether.request_typed(LatestNote, Call::get()).await);
    check!(response.data().decoded().map(|note| note.text.as_str()) == Some("newest"));
}
