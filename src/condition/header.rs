//! Header conditions.

use super::attribute::{leaf, Attribute};
use super::Condition;
use crate::options;
use crate::request::Request;
use std::panic::Location;

/// Header field conditions.
///
/// Field names compare case-insensitively, values exactly.
pub struct Header;

impl Header {
    /// Request carries the field, with any value.
    #[track_caller]
    pub fn contains(name: impl Into<String>) -> Condition {
        leaf(Attribute::HeaderPresent(name.into()))
    }

    /// Request carries the field with exactly `value`.
    #[track_caller]
    pub fn contains_value(name: impl Into<String>, value: impl Into<String>) -> Condition {
        leaf(Attribute::HeaderValue {
            name: name.into(),
            value: value.into(),
        })
    }
}

pub(super) fn present(
    location: Option<&'static Location<'static>>,
    name: &str,
    request: &Request,
) -> bool {
    let actual = request.header(name);
    let matched = actual.is_some();
    options::dump_condition(location, &format!("{}: <any>", name), &actual, matched);
    matched
}

pub(super) fn has_value(
    location: Option<&'static Location<'static>>,
    name: &str,
    value: &str,
    request: &Request,
) -> bool {
    let actual = request.header(name);
    let matched = actual == Some(value);
    options::dump_condition(location, &Some(value), &actual, matched);
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request {
        Request::get("https://example.com/")
            .with_header("Authorization", "Bearer token")
            .with_header("Accept", "application/json")
    }

    #[test]
    fn test_presence() {
        assert!(Header::contains("authorization").matches(&request()));
        assert!(Header::contains("ACCEPT").matches(&request()));
        assert!(!Header::contains("X-Missing").matches(&request()));
    }

    #[test]
    fn test_value_is_case_sensitive() {
        assert!(Header::contains_value("accept", "application/json").matches(&request()));
        assert!(!Header::contains_value("accept", "Application/JSON").matches(&request()));
        assert!(!Header::contains_value("x-missing", "").matches(&request()));
    }

    #[test]
    fn test_equality() {
        assert_eq!(Header::contains("a"), Header::contains("a"));
        assert_ne!(Header::contains("a"), Header::contains_value("a", "1"));
        assert_eq!(Header::contains_value("a", "1"), Header::contains_value("a", "1"));
    }
}
