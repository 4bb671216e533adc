//! Raw request matchers.
//!
//! A [`Matcher`] is the smallest unit of matching: a pure predicate over a
//! [`Request`], optionally tagged with the call site that created it.
//! Composition through [`Matcher::and`] and [`Matcher::or`] evaluates both
//! operands every time so that comparison dumps stay complete.

use crate::options;
use crate::request::Request;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::panic::Location;
use std::sync::Arc;

type Predicate = dyn Fn(&Request) -> bool + Send + Sync;

/// A pure predicate over a request.
#[derive(Clone)]
pub struct Matcher {
    predicate: Arc<Predicate>,
    location: Option<&'static Location<'static>>,
}

impl Matcher {
    /// Wrap an arbitrary predicate.
    #[track_caller]
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Request) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            location: Some(Location::caller()),
        }
    }

    /// Compare an extracted value against an expected one.
    ///
    /// `expected = None` means the field must be absent. Two absent values
    /// are equal; absent vs. present is not.
    #[track_caller]
    pub fn compare<T, F>(extract: F, expected: Option<T>) -> Self
    where
        T: PartialEq + fmt::Debug + Send + Sync + 'static,
        F: Fn(&Request) -> Option<T> + Send + Sync + 'static,
    {
        let location = Location::caller();
        Self {
            predicate: Arc::new(move |request: &Request| {
                let actual = extract(request);
                let matched = actual == expected;
                options::dump_condition(Some(location), &expected, &actual, matched);
                matched
            }),
            location: Some(location),
        }
    }

    /// Matcher that accepts every request.
    pub fn always() -> Self {
        Self {
            predicate: Arc::new(|_: &Request| true),
            location: None,
        }
    }

    /// Evaluate against a request.
    pub fn matches(&self, request: &Request) -> bool {
        (self.predicate)(request)
    }

    /// Call site that created this matcher, when known.
    pub fn location(&self) -> Option<&'static Location<'static>> {
        self.location
    }

    /// Conjunction; both sides are always evaluated.
    pub fn and(self, other: Matcher) -> Self {
        let location = self.location.or(other.location);
        Self {
            predicate: Arc::new(move |request: &Request| {
                let lhs = self.matches(request);
                let rhs = other.matches(request);
                lhs && rhs
            }),
            location,
        }
    }

    /// Disjunction; both sides are always evaluated.
    pub fn or(self, other: Matcher) -> Self {
        let location = self.location.or(other.location);
        Self {
            predicate: Arc::new(move |request: &Request| {
                let lhs = self.matches(request);
                let rhs = other.matches(request);
                lhs || rhs
            }),
            location,
        }
    }

    /// Negation.
    pub fn negate(self) -> Self {
        let location = self.location;
        Self {
            predicate: Arc::new(move |request: &Request| !self.matches(request)),
            location,
        }
    }

    /// Identity comparison used by condition equality.
    pub(crate) fn same_as(&self, other: &Matcher) -> bool {
        Arc::ptr_eq(&self.predicate, &other.predicate)
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("location", &options::site(self.location))
            .finish()
    }
}

impl BitAnd for Matcher {
    type Output = Matcher;

    fn bitand(self, rhs: Matcher) -> Matcher {
        self.and(rhs)
    }
}

impl BitOr for Matcher {
    type Output = Matcher;

    fn bitor(self, rhs: Matcher) -> Matcher {
        self.or(rhs)
    }
}

impl Not for Matcher {
    type Output = Matcher;

    fn not(self) -> Matcher {
        self.negate()
    }
}
