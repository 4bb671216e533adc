//! Attribute conditions: one comparison on one request dimension.

use super::{body, header, query, Condition};
use crate::options;
use crate::request::{Method, QueryItem, Request};
use std::fmt;
use std::panic::Location;

/// Closed set of attribute comparisons.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Scheme(String),
    Host(String),
    Path(String),
    Extension(String),
    Method(Method),
    /// Query contains at least these items (`None` value = any value).
    QueryContains(Vec<QueryItem>),
    HeaderPresent(String),
    HeaderValue { name: String, value: String },
    Body(Vec<u8>),
    JsonBody(serde_json::Value),
    /// Form body contains at least these items (`None` value = any value).
    FormContains(Vec<QueryItem>),
}

impl Attribute {
    /// Evaluate against a request, dumping the comparison if enabled.
    pub fn evaluate(
        &self,
        request: &Request,
        location: Option<&'static Location<'static>>,
    ) -> bool {
        match self {
            Attribute::Scheme(expected) => compare_str(location, expected, request.scheme()),
            Attribute::Host(expected) => compare_str(location, expected, request.host()),
            Attribute::Path(expected) => compare_str(location, expected, Some(request.path())),
            Attribute::Extension(expected) => {
                compare_str(location, expected, request.path_extension())
            }
            Attribute::Method(expected) => {
                let actual = request.method();
                let matched = actual == expected;
                options::dump_condition(location, expected, actual, matched);
                matched
            }
            Attribute::QueryContains(expected) => {
                query::contains(location, expected, request.query_items())
            }
            Attribute::HeaderPresent(name) => header::present(location, name, request),
            Attribute::HeaderValue { name, value } => {
                header::has_value(location, name, value, request)
            }
            Attribute::Body(expected) => body::equals_raw(location, expected, request),
            Attribute::JsonBody(expected) => body::equals_json(location, expected, request),
            Attribute::FormContains(expected) => body::form_contains(location, expected, request),
        }
    }
}

fn compare_str(
    location: Option<&'static Location<'static>>,
    expected: &str,
    actual: Option<&str>,
) -> bool {
    let matched = actual == Some(expected);
    options::dump_condition(location, &Some(expected), &actual, matched);
    matched
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[QueryItem]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        match &item.value {
            Some(value) => write!(f, "{}={}", item.name, value)?,
            None => f.write_str(&item.name)?,
        }
    }
    f.write_str("]")
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Scheme(v) => write!(f, "scheme == {:?}", v),
            Attribute::Host(v) => write!(f, "host == {:?}", v),
            Attribute::Path(v) => write!(f, "path == {:?}", v),
            Attribute::Extension(v) => write!(f, "extension == {:?}", v),
            Attribute::Method(m) => write!(f, "method == {}", m),
            Attribute::QueryContains(items) => {
                f.write_str("query contains ")?;
                write_items(f, items)
            }
            Attribute::HeaderPresent(name) => write!(f, "header {:?} present", name),
            Attribute::HeaderValue { name, value } => write!(f, "header {:?} == {:?}", name, value),
            Attribute::Body(bytes) => write!(f, "body == <{} bytes>", bytes.len()),
            Attribute::JsonBody(json) => write!(f, "json body == {}", json),
            Attribute::FormContains(items) => {
                f.write_str("form contains ")?;
                write_items(f, items)
            }
        }
    }
}

/// An [`Attribute`] plus the call site that created it.
///
/// Equality ignores the call site.
#[derive(Debug, Clone)]
pub struct AttributeCondition {
    pub attribute: Attribute,
    pub location: Option<&'static Location<'static>>,
}

impl AttributeCondition {
    pub fn matches(&self, request: &Request) -> bool {
        self.attribute.evaluate(request, self.location)
    }
}

impl PartialEq for AttributeCondition {
    fn eq(&self, other: &Self) -> bool {
        self.attribute == other.attribute
    }
}

impl fmt::Display for AttributeCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.attribute, options::site(self.location))
    }
}

/// Wrap an attribute into a condition tagged with the caller's location.
#[track_caller]
pub(crate) fn leaf(attribute: Attribute) -> Condition {
    Condition::Attribute(AttributeCondition {
        attribute,
        location: Some(Location::caller()),
    })
}

/// Scheme conditions.
pub struct Scheme;

impl Scheme {
    /// Scheme equals `scheme` exactly.
    #[track_caller]
    pub fn is(scheme: impl Into<String>) -> Condition {
        leaf(Attribute::Scheme(scheme.into()))
    }
}

/// Host conditions.
pub struct Host;

impl Host {
    /// Host equals `host` exactly.
    #[track_caller]
    pub fn is(host: impl Into<String>) -> Condition {
        leaf(Attribute::Host(host.into()))
    }
}

/// Path conditions.
pub struct Path;

impl Path {
    /// Decoded path equals `path` exactly.
    #[track_caller]
    pub fn is(path: impl Into<String>) -> Condition {
        leaf(Attribute::Path(path.into()))
    }
}

/// Path extension conditions.
pub struct Extension;

impl Extension {
    /// Extension of the last path segment equals `ext` (no leading dot).
    #[track_caller]
    pub fn is(ext: impl Into<String>) -> Condition {
        leaf(Attribute::Extension(ext.into()))
    }
}

impl Method {
    /// Request method equals this method.
    #[track_caller]
    pub fn condition(&self) -> Condition {
        leaf(Attribute::Method(self.clone()))
    }
}
