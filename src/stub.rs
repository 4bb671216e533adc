//! Stubs: a condition paired with a response factory.
//!
//! Stubs are built fluently. Every constraint call ANDs one more attribute
//! condition onto the stub; response calls replace the response factory.
//! A stub without constraints matches every request and answers with
//! [`StubError::Unimplemented`] until given a response.
//!
//! ```
//! use stub_networking::{stub_url, Method, Request, Response, StubRegistry};
//!
//! let registry = StubRegistry::new();
//! registry.register(
//!     stub_url("https://api.example.com/users")
//!         .method(Method::Get)
//!         .header_value("Accept", "application/json")
//!         .respond_with(Response::ok().with_text("[]")),
//! );
//!
//! let request = Request::get("https://api.example.com/users?page=2")
//!     .with_header("accept", "application/json");
//! assert_eq!(registry.resolve(&request).unwrap().status, 200);
//! ```

use crate::condition::{Body, Condition, Extension, Header, Host, Path, QueryParams, Scheme};
use crate::error::StubError;
use crate::registry::{default_registry, StubHandle};
use crate::request::{Method, QueryItem, Request, UrlParts};
use crate::response::{error_response, respond_with, Response, ResponseFactory, StubResult};
use std::fmt;
use std::sync::Arc;

/// A request condition and the factory that answers matching requests.
#[derive(Clone)]
pub struct Stub {
    condition: Condition,
    response: ResponseFactory,
}

/// Unconstrained stub.
pub fn stub() -> Stub {
    Stub::new()
}

/// Stub constrained by the components present in `url`.
#[track_caller]
pub fn stub_url(url: &str) -> Stub {
    Stub::for_url(url, None)
}

impl Stub {
    /// Stub that matches everything and answers `Unimplemented`.
    pub fn new() -> Self {
        Self::with_condition(Condition::Always)
    }

    /// Stub with an explicit, possibly composite, condition.
    pub fn with_condition(condition: Condition) -> Self {
        Self {
            condition,
            response: error_response(StubError::Unimplemented),
        }
    }

    /// Stub constrained by the scheme, host, path and query present in
    /// `url`, and by `method` when given.
    #[track_caller]
    pub fn for_url(url: &str, method: Option<Method>) -> Self {
        let parts = UrlParts::parse(url);
        let mut stub = Stub::new();
        if let Some(scheme) = parts.scheme {
            stub = stub.scheme(scheme);
        }
        if let Some(host) = parts.host {
            stub = stub.host(host);
        }
        if !parts.path.is_empty() {
            stub = stub.path(parts.path);
        }
        if let Some(items) = parts.query {
            stub = stub.query_items(items);
        }
        if let Some(method) = method {
            stub = stub.method(method);
        }
        stub
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Whether this stub's condition holds for `request`.
    pub fn matches(&self, request: &Request) -> bool {
        self.condition.matches(request)
    }

    /// Invoke the response factory.
    pub fn respond(&self, request: &Request) -> StubResult {
        (self.response)(request)
    }

    /// Register on the process-wide default registry.
    pub fn register(self) -> StubHandle {
        default_registry().register(self)
    }

    // -- request constraints --

    /// AND an arbitrary condition.
    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = std::mem::take(&mut self.condition).and(condition);
        self
    }

    #[track_caller]
    pub fn scheme(self, scheme: impl Into<String>) -> Self {
        self.when(Scheme::is(scheme))
    }

    #[track_caller]
    pub fn host(self, host: impl Into<String>) -> Self {
        self.when(Host::is(host))
    }

    #[track_caller]
    pub fn path(self, path: impl Into<String>) -> Self {
        self.when(Path::is(path))
    }

    #[track_caller]
    pub fn path_extension(self, ext: impl Into<String>) -> Self {
        self.when(Extension::is(ext))
    }

    #[track_caller]
    pub fn method(self, method: Method) -> Self {
        self.when(method.condition())
    }

    /// Query contains each `name -> value`; `None` accepts any value.
    #[track_caller]
    pub fn query_params<I, K, V>(self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.when(QueryParams::contains(params))
    }

    #[track_caller]
    pub fn query_items<I>(self, items: I) -> Self
    where
        I: IntoIterator<Item = QueryItem>,
    {
        self.when(QueryParams::contains_items(items))
    }

    /// Query contains each name, with any value.
    #[track_caller]
    pub fn query_names<I, K>(self, names: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.when(QueryParams::contains_names(names))
    }

    /// Header field is present.
    #[track_caller]
    pub fn header(self, name: impl Into<String>) -> Self {
        self.when(Header::contains(name))
    }

    /// Header field is present with exactly `value`.
    #[track_caller]
    pub fn header_value(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.when(Header::contains_value(name, value))
    }

    #[track_caller]
    pub fn body(self, body: impl Into<Vec<u8>>) -> Self {
        self.when(Body::is(body))
    }

    #[track_caller]
    pub fn json_body(self, json: serde_json::Value) -> Self {
        self.when(Body::is_json(json))
    }

    #[track_caller]
    pub fn form_body<I, K, V>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.when(Body::is_form(fields))
    }

    #[track_caller]
    pub fn form_items<I>(self, items: I) -> Self
    where
        I: IntoIterator<Item = QueryItem>,
    {
        self.when(Body::is_form_items(items))
    }

    // -- responses --

    /// Answer with a factory computed from the request.
    pub fn respond_using<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Request) -> StubResult + Send + Sync + 'static,
    {
        self.response = Arc::new(factory);
        self
    }

    /// Answer with a shared factory.
    pub fn respond_factory(mut self, factory: ResponseFactory) -> Self {
        self.response = factory;
        self
    }

    /// Answer with a fixed response.
    pub fn respond_with(mut self, response: Response) -> Self {
        self.response = respond_with(Ok(response));
        self
    }

    /// Answer with an empty response of `status`.
    pub fn respond_status(self, status: u16) -> Self {
        self.respond_with(Response::new(status))
    }

    /// Answer `200` with a JSON body.
    pub fn respond_json(self, json: &serde_json::Value) -> Self {
        self.respond_with(Response::ok().with_json(json))
    }

    /// Answer `200` with a text body.
    pub fn respond_text(self, text: impl Into<String>) -> Self {
        self.respond_with(Response::ok().with_text(text))
    }

    /// Answer `200` with raw bytes.
    pub fn respond_data(self, data: impl Into<Vec<u8>>) -> Self {
        self.respond_with(Response::ok().with_body(data))
    }

    /// Fail with `error`.
    pub fn respond_error(mut self, error: StubError) -> Self {
        self.response = error_response(error);
        self
    }
}

impl Default for Stub {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Stub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stub")
            .field("condition", &self.condition)
            .finish_non_exhaustive()
    }
}
