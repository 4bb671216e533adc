//! Query parameter containment.

use super::attribute::{leaf, Attribute};
use super::Condition;
use crate::options;
use crate::request::QueryItem;
use std::panic::Location;

/// Query parameter conditions.
///
/// All conditions are subset checks: the request may carry extra
/// parameters.
pub struct QueryParams;

impl QueryParams {
    /// Query contains every `name -> value` pair; a `None` value only
    /// requires the name to be present.
    #[track_caller]
    pub fn contains<I, K, V>(params: I) -> Condition
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let items = params
            .into_iter()
            .map(|(name, value)| QueryItem {
                name: name.into(),
                value: value.map(Into::into),
            })
            .collect();
        leaf(Attribute::QueryContains(canonical(items)))
    }

    /// Query contains every item.
    #[track_caller]
    pub fn contains_items<I>(items: I) -> Condition
    where
        I: IntoIterator<Item = QueryItem>,
    {
        leaf(Attribute::QueryContains(canonical(items.into_iter().collect())))
    }

    /// Query contains every name, with any value.
    #[track_caller]
    pub fn contains_names<I, K>(names: I) -> Condition
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        leaf(Attribute::QueryContains(canonical(
            names.into_iter().map(|name| QueryItem::name_only(name)).collect(),
        )))
    }
}

/// Sort and dedup so equal sets compare equal regardless of input order.
pub(super) fn canonical(mut items: Vec<QueryItem>) -> Vec<QueryItem> {
    items.sort();
    items.dedup();
    items
}

/// Whether `actual` contains every item of `expected`.
pub(super) fn is_subset(expected: &[QueryItem], actual: &[QueryItem]) -> bool {
    expected.iter().all(|want| {
        actual.iter().any(|have| {
            have.name == want.name
                && match &want.value {
                    Some(value) => have.value.as_ref() == Some(value),
                    None => true,
                }
        })
    })
}

pub(super) fn contains(
    location: Option<&'static Location<'static>>,
    expected: &[QueryItem],
    actual: Option<&[QueryItem]>,
) -> bool {
    let matched = match actual {
        Some(actual) => is_subset(expected, actual),
        None => expected.is_empty(),
    };
    options::dump_condition(location, expected, &actual, matched);
    matched
}
