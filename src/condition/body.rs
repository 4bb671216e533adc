//! Body conditions: raw bytes, JSON, and form-encoded.

use super::attribute::{leaf, Attribute};
use super::query::{canonical, is_subset};
use super::Condition;
use crate::error::StubError;
use crate::options;
use crate::request::{QueryItem, Request};
use serde_json::{Number, Value};
use std::panic::Location;

/// Body conditions.
pub struct Body;

impl Body {
    /// Body equals `bytes` exactly.
    #[track_caller]
    pub fn is(bytes: impl Into<Vec<u8>>) -> Condition {
        leaf(Attribute::Body(bytes.into()))
    }

    /// Body decodes to JSON equal to `json`.
    ///
    /// Object key order is ignored, array order is not. Bodies that are
    /// not valid JSON never match.
    #[track_caller]
    pub fn is_json(json: Value) -> Condition {
        leaf(Attribute::JsonBody(json))
    }

    /// Body is form-encoded and contains every `name -> value` pair.
    #[track_caller]
    pub fn is_form<I, K, V>(fields: I) -> Condition
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let items = fields
            .into_iter()
            .map(|(name, value)| QueryItem {
                name: name.into(),
                value: value.map(Into::into),
            })
            .collect();
        leaf(Attribute::FormContains(canonical(items)))
    }

    /// Body is form-encoded and contains every item.
    #[track_caller]
    pub fn is_form_items<I>(items: I) -> Condition
    where
        I: IntoIterator<Item = QueryItem>,
    {
        leaf(Attribute::FormContains(canonical(items.into_iter().collect())))
    }
}

pub(super) fn equals_raw(
    location: Option<&'static Location<'static>>,
    expected: &[u8],
    request: &Request,
) -> bool {
    let actual = request.body();
    let matched = actual == Some(expected);
    options::dump_condition(
        location,
        &String::from_utf8_lossy(expected),
        &actual.map(String::from_utf8_lossy),
        matched,
    );
    matched
}

pub(super) fn equals_json(
    location: Option<&'static Location<'static>>,
    expected: &Value,
    request: &Request,
) -> bool {
    let actual = match request.json_body() {
        Some(Ok(actual)) => actual,
        Some(Err(e)) => {
            let error = StubError::MalformedRequest(format!("body is not JSON: {}", e));
            options::debug_log(location, error.to_string());
            options::dump_condition(location, expected, &None::<Value>, false);
            return false;
        }
        None => {
            options::dump_condition(location, expected, &None::<Value>, false);
            return false;
        }
    };
    let matched = json_eq(expected, &actual);
    options::dump_condition(location, expected, &actual, matched);
    matched
}

pub(super) fn form_contains(
    location: Option<&'static Location<'static>>,
    expected: &[QueryItem],
    request: &Request,
) -> bool {
    let actual = request.form_body();
    let matched = match &actual {
        Some(items) => is_subset(expected, items),
        None => {
            if request.body().is_some() {
                let error = StubError::MalformedRequest("body is not UTF-8 form data".to_string());
                options::debug_log(location, error.to_string());
            }
            false
        }
    };
    options::dump_condition(location, expected, &actual, matched);
    matched
}

/// Deep JSON equality.
///
/// Objects compare as maps, arrays element by element in order, and numbers
/// by value, so `1` equals `1.0`.
pub fn json_eq(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Number(l), Value::Number(r)) => numbers_eq(l, r),
        (Value::Array(l), Value::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(a, b)| json_eq(a, b))
        }
        (Value::Object(l), Value::Object(r)) => {
            l.len() == r.len()
                && l.iter()
                    .all(|(key, a)| r.get(key).is_some_and(|b| json_eq(a, b)))
        }
        _ => lhs == rhs,
    }
}

fn numbers_eq(lhs: &Number, rhs: &Number) -> bool {
    if let (Some(l), Some(r)) = (lhs.as_i64(), rhs.as_i64()) {
        return l == r;
    }
    if let (Some(l), Some(r)) = (lhs.as_u64(), rhs.as_u64()) {
        return l == r;
    }
    match (lhs.as_f64(), rhs.as_f64()) {
        (Some(l), Some(r)) => l == r,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post(body: &str) -> Request {
        Request::post("https://api.example.com/items").with_body(body)
    }

    #[test]
    fn test_raw_body() {
        let c = Body::is("hello");
        assert!(c.matches(&post("hello")));
        assert!(!c.matches(&post("hello!")));
        assert!(!c.matches(&Request::get("/")));
    }

    #[test]
    fn test_json_object_ignores_key_order() {
        let c = Body::is_json(json!({"name": "John", "age": 30}));
        assert!(c.matches(&post(r#"{"age": 30, "name": "John"}"#)));
        assert!(!c.matches(&post(r#"{"age": 30}"#)));
        assert!(!c.matches(&post(r#"{"age": 30, "name": "John", "extra": true}"#)));
    }

    #[test]
    fn test_json_array_order_matters() {
        let c = Body::is_json(json!([{"id": 1}, {"id": 2}]));
        assert!(c.matches(&post(r#"[{"id":1},{"id":2}]"#)));
        assert!(!c.matches(&post(r#"[{"id":2},{"id":1}]"#)));
    }

    #[test]
    fn test_json_malformed_body_is_false() {
        let c = Body::is_json(json!({"a": 1}));
        assert!(!c.matches(&post("not json")));
        assert!(!c.matches(&post("")));
        assert!(!c.matches(&Request::post("/items")));
    }

    #[test]
    fn test_json_numbers_compare_by_value() {
        assert!(json_eq(&json!(1), &json!(1.0)));
        assert!(json_eq(&json!({"n": [1, 2.5]}), &json!({"n": [1.0, 2.5]})));
        assert!(!json_eq(&json!(1), &json!(2)));
        assert!(!json_eq(&json!(1), &json!("1")));
        assert!(json_eq(&json!(u64::MAX), &json!(u64::MAX)));
    }

    #[test]
    fn test_form_body_subset() {
        let c = Body::is_form([("user", Some("alice")), ("remember", None)]);
        assert!(c.matches(&post("user=alice&remember=1&extra=x")));
        assert!(c.matches(&post("remember&user=alice")));
        assert!(!c.matches(&post("user=bob&remember=1")));
        assert!(!c.matches(&post("user=alice")));
        assert!(!c.matches(&Request::post("/items").with_body(vec![0xff, 0xfe])));
    }

    #[test]
    fn test_form_body_decodes_plus() {
        let c = Body::is_form_items([QueryItem::new("q", "a b")]);
        assert!(c.matches(&post("q=a+b")));
        assert!(c.matches(&post("q=a%20b")));
    }
}
