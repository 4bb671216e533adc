//! Integration tests for the stub networking engine.
//!
//! These drive the public API end to end: stubs are built and registered,
//! requests go through an interceptor, outcomes are inspected.

use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use stub_networking::condition::{self, Body, Header, Host, Path, QueryParams};
use stub_networking::{
    default_registry, stub, stub_url, Condition, Delay, Interceptor, Matcher, Method, Request,
    Response, Stub, StubConfig, StubError, StubInterceptor, StubRegistry,
};

// ============================================================================
// Test Utilities
// ============================================================================

fn interceptor_with(stubs: Vec<Stub>) -> StubInterceptor {
    let registry = Arc::new(StubRegistry::new());
    for stub in stubs {
        registry.register(stub);
    }
    StubInterceptor::new(registry)
}

fn write_stub_file(yaml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

// ============================================================================
// Resolution Scenarios
// ============================================================================

#[tokio::test]
async fn test_url_stub_ignores_unconstrained_query() {
    let users = stub_url("https://api.example.com/users")
        .method(Method::Get)
        .respond_json(&json!([{"id": 1}]));
    let interceptor = interceptor_with(vec![users]);

    let response = interceptor
        .start(Request::get("https://api.example.com/users?page=2"))
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.json().unwrap(), json!([{"id": 1}]));

    let err = interceptor
        .start(Request::post("https://api.example.com/users"))
        .await
        .unwrap_err();
    assert!(err.is_unhandled());
}

#[tokio::test]
async fn test_first_registered_stub_wins() {
    let interceptor = interceptor_with(vec![stub_url("/x").respond_status(200), stub()]);

    let response = interceptor.start(Request::get("/x")).await.unwrap();
    assert_eq!(response.status, 200);

    let err = interceptor.start(Request::get("/y")).await.unwrap_err();
    assert_eq!(err, StubError::Unimplemented);
}

#[tokio::test]
async fn test_empty_registry_is_unhandled() {
    let interceptor = interceptor_with(vec![]);
    let err = interceptor
        .start(Request::delete("https://api.example.com/users/1"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        StubError::UnhandledRequest {
            method: "DELETE".to_string(),
            url: "https://api.example.com/users/1".to_string(),
        }
    );
    assert_eq!(interceptor.registry().stats().requests_unmatched, 1);
}

#[test]
fn test_json_array_order_matters() {
    let stub = stub().json_body(json!([{"id": 1}, {"id": 2}]));
    assert!(stub.matches(&Request::post("/").with_body(r#"[{"id":1},{"id":2}]"#)));
    assert!(!stub.matches(&Request::post("/").with_body(r#"[{"id":2},{"id":1}]"#)));
}

#[test]
fn test_json_object_key_order_ignored() {
    let stub = stub().json_body(json!({"a": 1, "b": [true, null]}));
    assert!(stub.matches(&Request::post("/").with_body(r#"{"b":[true,null],"a":1}"#)));
    assert!(!stub.matches(&Request::post("/").with_body("not json")));
    assert!(!stub.matches(&Request::get("/")));
}

// ============================================================================
// Attribute Conditions
// ============================================================================

#[test]
fn test_header_name_case_insensitive_value_exact() {
    let condition = Header::contains_value("Content-Type", "application/json");
    let request = |value: &str| Request::get("/").with_header("content-type", value);

    assert!(condition.matches(&request("application/json")));
    assert!(!condition.matches(&request("Application/JSON")));
    assert!(!condition.matches(&Request::get("/")));

    assert!(Header::contains("CONTENT-TYPE").matches(&request("anything")));
}

#[test]
fn test_query_params_value_or_presence() {
    let any_a = QueryParams::contains([("a", None::<&str>)]);
    let a_is_1 = QueryParams::contains([("a", Some("1"))]);

    assert!(any_a.matches(&Request::get("/p?a=7")));
    assert!(any_a.matches(&Request::get("/p?a")));
    assert!(!any_a.matches(&Request::get("/p?b=1")));
    assert!(!any_a.matches(&Request::get("/p")));

    assert!(a_is_1.matches(&Request::get("/p?b=2&a=1")));
    assert!(!a_is_1.matches(&Request::get("/p?a=2")));
    assert!(!a_is_1.matches(&Request::get("/p?a")));
}

#[test]
fn test_form_body_subset() {
    let stub = stub()
        .method(Method::Post)
        .form_body([("user", Some("alice smith")), ("token", None)]);
    assert!(stub.matches(&Request::post("/login").with_body("token=x&user=alice+smith&extra=1")));
    assert!(!stub.matches(&Request::post("/login").with_body("user=alice+smith")));
}

#[test]
fn test_path_extension() {
    let stub = stub().path_extension("png");
    assert!(stub.matches(&Request::get("https://cdn.example.com/img/logo.png")));
    assert!(!stub.matches(&Request::get("https://cdn.example.com/img/logo.png/")));
    assert!(!stub.matches(&Request::get("https://cdn.example.com/img/logo")));
}

// ============================================================================
// Composition
// ============================================================================

#[test]
fn test_named_combinators_and_operators_agree() {
    let named = condition::or(
        condition::and(Host::is("a.example"), Path::is("/one")),
        Path::is("/two").negate(),
    );
    let operators = (Host::is("a.example") & Path::is("/one")) | !Path::is("/two");
    assert_eq!(named, operators);

    for url in ["https://a.example/one", "https://b.example/two", "https://b.example/one"] {
        let request = Request::get(url);
        assert_eq!(named.matches(&request), operators.matches(&request), "{}", url);
    }
}

#[test]
fn test_custom_matcher_in_stub() {
    let has_trace_id = Matcher::new(|request: &Request| {
        request.header("X-Trace-Id").is_some_and(|id| id.len() == 8)
    });
    let stub = stub().host("api.example.com").when(Condition::from(has_trace_id));

    let traced = Request::get("https://api.example.com/").with_header("x-trace-id", "abcd1234");
    assert!(stub.matches(&traced));
    let untraced = Request::get("https://api.example.com/").with_header("x-trace-id", "short");
    assert!(!stub.matches(&untraced));
}

#[test]
fn test_trace_reports_failing_leaf() {
    let condition = Host::is("api.example.com") & Body::is_json(json!({"id": 1}));
    let request = Request::post("https://api.example.com/").with_json(&json!({"id": 2}));

    let trace = condition.trace(&request);
    assert!(!trace.matched());
    let rendered = trace.to_string();
    assert!(rendered.starts_with("- and"));
    assert!(rendered.contains("+ host == \"api.example.com\""));
}

// ============================================================================
// Interceptor
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_random_delay_within_range() {
    let delay = Delay::Range {
        min: Duration::from_millis(100),
        max: Duration::from_millis(300),
    };
    let interceptor = interceptor_with(vec![stub().respond_with(Response::ok().with_delay(delay))]);

    let started = tokio::time::Instant::now();
    interceptor.start(Request::get("/")).await.unwrap();
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(100));
    assert!(elapsed <= Duration::from_millis(301));
}

#[test]
fn test_transport_failure_without_runtime() {
    let offline = stub()
        .host("offline.example.com")
        .respond_error(StubError::transport("offline"));
    let interceptor = interceptor_with(vec![offline]);
    let request = Request::get("https://offline.example.com/");
    let result = tokio_test::block_on(interceptor.start(request));
    assert_eq!(result, Err(StubError::transport("offline")));
}

#[tokio::test]
async fn test_default_registry_registration() {
    let handle = stub_url("https://default-registry.test/ping")
        .respond_text("pong")
        .register();

    let interceptor = StubInterceptor::default();
    let response = interceptor
        .start(Request::get("https://default-registry.test/ping"))
        .await
        .unwrap();
    assert_eq!(response.body, b"pong");

    assert!(default_registry().remove(handle));
}

// ============================================================================
// Stub Files
// ============================================================================

#[tokio::test]
async fn test_stub_file_round_trip() {
    let file = write_stub_file(
        r#"
stubs:
  - id: create
    request:
      url: https://api.example.com/users
      method: POST
      body:
        type: json
        content: {"name": "Carol"}
    response:
      status: 201
      headers:
        Location: /users/3
  - id: offline
    request:
      host: offline.example.com
    error:
      type: transport_failure
      detail: not connected
"#,
    );

    let config = StubConfig::from_file(file.path()).unwrap();
    let registry = Arc::new(StubRegistry::new());
    let handles = config.install(&registry).unwrap();
    assert_eq!(handles.len(), 2);

    let interceptor = StubInterceptor::new(registry);
    let created = interceptor
        .start(
            Request::post("https://api.example.com/users").with_json(&json!({"name": "Carol"})),
        )
        .await
        .unwrap();
    assert_eq!(created.status, 201);
    assert_eq!(created.header("location"), Some("/users/3"));

    let offline = interceptor
        .start(Request::get("https://offline.example.com/status"))
        .await;
    assert_eq!(offline, Err(StubError::transport("not connected")));
}

#[test]
fn test_stub_file_response_body_from_file() {
    let mut body = tempfile::NamedTempFile::new().unwrap();
    body.write_all(b"file contents").unwrap();

    let yaml = format!(
        r#"
stubs:
  - id: download
    request:
      path: /download
    response:
      body:
        type: file
        path: {}
"#,
        body.path().display()
    );
    let config = StubConfig::from_yaml(&yaml).unwrap();
    let registry = StubRegistry::new();
    config.install(&registry).unwrap();

    let response = registry.resolve(&Request::get("/download")).unwrap();
    assert_eq!(response.body, b"file contents");
    assert_eq!(response.header("Content-Type"), Some("application/octet-stream"));
}

#[test]
fn test_stub_file_missing_body_file_rejected() {
    let yaml = r#"
stubs:
  - id: download
    response:
      body:
        type: file
        path: /nonexistent/stub-networking/body.bin
"#;
    assert!(StubConfig::from_yaml(yaml).is_err());
}

#[test]
fn test_demo_stub_file_is_valid() {
    let config = StubConfig::from_yaml(include_str!("../demos/stubs.yaml")).unwrap();
    assert!(config.stubs.iter().any(|stub| !stub.enabled));

    let registry = StubRegistry::new();
    let handles = config.install(&registry).unwrap();
    assert_eq!(handles.len(), config.stubs.len() - 1);

    let response = registry
        .resolve(
            &Request::get("https://api.example.com/users")
                .with_header("Accept", "application/json"),
        )
        .unwrap();
    assert_eq!(response.json().unwrap()[1]["name"], "Bob");
}
