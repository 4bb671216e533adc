//! The read-only request value that conditions are evaluated against.
//!
//! A [`Request`] is built from a method and a URL string; the URL is split
//! into scheme, host, port, path and query the way URL components are
//! usually reported (path and query percent-decoded, fragment dropped).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use url::{Host, Url};

/// HTTP request method.
///
/// Method tokens are case-sensitive: only the canonical upper-case names
/// map to known variants, anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Connect,
    Trace,
    Other(String),
}

impl Method {
    /// Canonical string form.
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Connect => "CONNECT",
            Method::Trace => "TRACE",
            Method::Other(raw) => raw,
        }
    }
}

impl From<&str> for Method {
    fn from(raw: &str) -> Self {
        match raw {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "PATCH" => Method::Patch,
            "DELETE" => Method::Delete,
            "HEAD" => Method::Head,
            "OPTIONS" => Method::Options,
            "CONNECT" => Method::Connect,
            "TRACE" => Method::Trace,
            _ => Method::Other(raw.to_string()),
        }
    }
}

impl From<String> for Method {
    fn from(raw: String) -> Self {
        Method::from(raw.as_str())
    }
}

impl From<Method> for String {
    fn from(method: Method) -> Self {
        method.as_str().to_string()
    }
}

impl FromStr for Method {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Method::from(s))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `name[=value]` entry of a query string or form body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryItem {
    pub name: String,
    pub value: Option<String>,
}

impl QueryItem {
    /// Item with a value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Item that only names a key.
    pub fn name_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

/// Components of a URL string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParts {
    pub scheme: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Percent-decoded path; empty when the URL has none.
    pub path: String,
    /// `None` when the URL has no `?`.
    pub query: Option<Vec<QueryItem>>,
}

impl UrlParts {
    /// Split a URL into its components.
    ///
    /// Relative references (`/users?page=2`) produce only a path and query.
    /// Unparseable input produces empty parts.
    pub fn parse(input: &str) -> Self {
        match Url::parse(input) {
            Ok(url) => {
                let mut parts = Self::from_url(&url);
                if !has_explicit_path(input) {
                    parts.path.clear();
                }
                parts
            }
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                match Url::parse(RELATIVE_BASE).and_then(|base| base.join(input)) {
                    Ok(url) => UrlParts {
                        path: decode(url.path(), false),
                        query: url.query().map(parse_query_string),
                        ..UrlParts::default()
                    },
                    Err(e) => {
                        debug!(url = input, error = %e, "Unparseable relative URL");
                        UrlParts::default()
                    }
                }
            }
            Err(e) => {
                debug!(url = input, error = %e, "Unparseable URL");
                UrlParts::default()
            }
        }
    }

    fn from_url(url: &Url) -> Self {
        let host = match url.host() {
            Some(Host::Ipv6(addr)) => Some(addr.to_string()),
            Some(host) => Some(host.to_string()).filter(|h| !h.is_empty()),
            None => None,
        };
        UrlParts {
            scheme: Some(url.scheme().to_string()),
            host,
            port: url.port(),
            path: decode(url.path(), false),
            query: url.query().map(parse_query_string),
        }
    }
}

/// Base that relative references are resolved against; only path and
/// query survive.
const RELATIVE_BASE: &str = "http://relative.invalid/";

/// `Url` reports `/` for `http://host`; the URL as written has no path.
fn has_explicit_path(input: &str) -> bool {
    let before_query = input.split(['?', '#']).next().unwrap_or(input);
    match before_query.split_once("://") {
        Some((_, authority_and_path)) => authority_and_path.contains('/'),
        None => true,
    }
}

/// Percent-decode a URL component, optionally treating `+` as a space.
pub(crate) fn decode(s: &str, plus_as_space: bool) -> String {
    let replaced;
    let input = if plus_as_space && s.contains('+') {
        replaced = s.replace('+', " ");
        replaced.as_str()
    } else {
        s
    };
    match urlencoding::decode(input) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => input.to_string(),
    }
}

/// Parse a query string into ordered items.
pub(crate) fn parse_query_string(query: &str) -> Vec<QueryItem> {
    parse_pairs(query, false)
}

/// Parse an `application/x-www-form-urlencoded` body.
pub(crate) fn parse_form(body: &str) -> Vec<QueryItem> {
    parse_pairs(body, true)
}

fn parse_pairs(input: &str, plus_as_space: bool) -> Vec<QueryItem> {
    input
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((name, value)) => QueryItem {
                name: decode(name, plus_as_space),
                value: Some(decode(value, plus_as_space)),
            },
            None => QueryItem {
                name: decode(part, plus_as_space),
                value: None,
            },
        })
        .collect()
}

/// An outgoing request as seen by the stubbing engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: Method,
    url: String,
    parts: UrlParts,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl Request {
    /// Create a request for `method` and `url`.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        let url = url.into();
        let parts = UrlParts::parse(&url);
        Self {
            method,
            url,
            parts,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    /// Set a header field, replacing any field with the same
    /// case-insensitive name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Set the raw body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a JSON body and the matching content type.
    pub fn with_json(self, json: &serde_json::Value) -> Self {
        self.with_header("Content-Type", "application/json")
            .with_body(json.to_string())
    }

    /// Set a form-encoded body and the matching content type.
    pub fn with_form<I, K, V>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let encoded = fields
            .into_iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    urlencoding::encode(k.as_ref()),
                    urlencoding::encode(v.as_ref())
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        self.with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body(encoded)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The URL exactly as given.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn scheme(&self) -> Option<&str> {
        self.parts.scheme.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.parts.host.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.parts.port
    }

    /// Percent-decoded path (empty when the URL has none).
    pub fn path(&self) -> &str {
        &self.parts.path
    }

    /// Extension of the last path segment, without the dot.
    pub fn path_extension(&self) -> Option<&str> {
        let segment = self.parts.path.rsplit('/').next()?;
        let idx = segment.rfind('.')?;
        if idx == 0 || idx + 1 == segment.len() {
            return None;
        }
        Some(&segment[idx + 1..])
    }

    /// Query items in URL order; `None` when the URL has no query.
    pub fn query_items(&self) -> Option<&[QueryItem]> {
        self.parts.query.as_deref()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Value of a header field, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Body decoded as JSON.
    pub fn json_body(&self) -> Option<Result<serde_json::Value, serde_json::Error>> {
        self.body.as_deref().map(serde_json::from_slice)
    }

    /// Body decoded as a form; `None` when absent or not UTF-8.
    pub fn form_body(&self) -> Option<Vec<QueryItem>> {
        let body = std::str::from_utf8(self.body.as_deref()?).ok()?;
        Some(parse_form(body))
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}
