//! Conditions: named predicates over a request.
//!
//! A [`Condition`] is a small tree. Leaves are attribute comparisons (one per
//! request dimension) or raw [`Matcher`]s; inner nodes are AND, OR and NOT.
//! Keeping the tree around instead of collapsing it into a closure gives us
//! structural equality and readable evaluation traces.
//!
//! # Example
//!
//! ```
//! use stub_networking::condition::{Header, Host, Path};
//! use stub_networking::Request;
//!
//! let condition = Host::is("api.example.com") & (Path::is("/a") | Path::is("/b"));
//! let request = Request::get("https://api.example.com/b").with_header("Accept", "*/*");
//! assert!(condition.matches(&request));
//! assert!(!(condition & Header::contains("Authorization")).matches(&request));
//! ```

mod attribute;
mod body;
mod header;
mod query;
mod trace;

pub use attribute::{Attribute, AttributeCondition, Extension, Host, Path, Scheme};
pub use body::Body;
pub use header::Header;
pub use query::QueryParams;
pub use trace::ConditionTrace;

use crate::matcher::Matcher;
use crate::request::Request;
use std::ops::{BitAnd, BitOr, Not};

/// A predicate over a request, kept as a tree for diagnostics.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Matches every request.
    Always,
    /// Comparison on one request attribute.
    Attribute(AttributeCondition),
    /// Arbitrary predicate.
    Custom(Matcher),
    /// Both operands must match.
    And(Box<Condition>, Box<Condition>),
    /// Either operand must match.
    Or(Box<Condition>, Box<Condition>),
    /// Operand must not match.
    Not(Box<Condition>),
}

impl Condition {
    /// Evaluate against a request.
    ///
    /// AND and OR evaluate both operands, left first.
    pub fn matches(&self, request: &Request) -> bool {
        match self {
            Condition::Always => true,
            Condition::Attribute(leaf) => leaf.matches(request),
            Condition::Custom(matcher) => matcher.matches(request),
            Condition::And(lhs, rhs) => {
                let l = lhs.matches(request);
                let r = rhs.matches(request);
                l && r
            }
            Condition::Or(lhs, rhs) => {
                let l = lhs.matches(request);
                let r = rhs.matches(request);
                l || r
            }
            Condition::Not(inner) => !inner.matches(request),
        }
    }

    /// Evaluate and record the result of every node.
    pub fn trace(&self, request: &Request) -> ConditionTrace {
        match self {
            Condition::Always => ConditionTrace::Leaf {
                matched: true,
                description: "always".to_string(),
            },
            Condition::Attribute(leaf) => ConditionTrace::Leaf {
                matched: leaf.matches(request),
                description: leaf.to_string(),
            },
            Condition::Custom(matcher) => ConditionTrace::Leaf {
                matched: matcher.matches(request),
                description: format!(
                    "custom matcher at {}",
                    crate::options::site(matcher.location())
                ),
            },
            Condition::And(lhs, rhs) => {
                let children = vec![lhs.trace(request), rhs.trace(request)];
                let matched = children.iter().all(ConditionTrace::matched);
                ConditionTrace::And { matched, children }
            }
            Condition::Or(lhs, rhs) => {
                let children = vec![lhs.trace(request), rhs.trace(request)];
                let matched = children.iter().any(ConditionTrace::matched);
                ConditionTrace::Or { matched, children }
            }
            Condition::Not(inner) => {
                let inner = inner.trace(request);
                ConditionTrace::Not {
                    matched: !inner.matched(),
                    inner: Box::new(inner),
                }
            }
        }
    }

    /// Conjunction. `Always` is the identity and is dropped.
    pub fn and(self, other: Condition) -> Condition {
        match (self, other) {
            (Condition::Always, c) | (c, Condition::Always) => c,
            (lhs, rhs) => Condition::And(Box::new(lhs), Box::new(rhs)),
        }
    }

    /// Disjunction.
    pub fn or(self, other: Condition) -> Condition {
        Condition::Or(Box::new(self), Box::new(other))
    }

    /// Negation.
    pub fn negate(self) -> Condition {
        Condition::Not(Box::new(self))
    }

    /// Collapse into a raw matcher.
    pub fn matcher(&self) -> Matcher {
        match self {
            Condition::Custom(matcher) => matcher.clone(),
            Condition::Always => Matcher::always(),
            other => {
                let condition = other.clone();
                Matcher::new(move |request| condition.matches(request))
            }
        }
    }
}

impl Default for Condition {
    fn default() -> Self {
        Condition::Always
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Condition::Always, Condition::Always) => true,
            (Condition::Attribute(l), Condition::Attribute(r)) => l == r,
            (Condition::Custom(l), Condition::Custom(r)) => l.same_as(r),
            (Condition::And(l1, l2), Condition::And(r1, r2))
            | (Condition::Or(l1, l2), Condition::Or(r1, r2)) => l1 == r1 && l2 == r2,
            (Condition::Not(l), Condition::Not(r)) => l == r,
            _ => false,
        }
    }
}

impl From<Matcher> for Condition {
    fn from(matcher: Matcher) -> Self {
        Condition::Custom(matcher)
    }
}

impl From<AttributeCondition> for Condition {
    fn from(leaf: AttributeCondition) -> Self {
        Condition::Attribute(leaf)
    }
}

impl BitAnd for Condition {
    type Output = Condition;

    fn bitand(self, rhs: Condition) -> Condition {
        self.and(rhs)
    }
}

impl BitOr for Condition {
    type Output = Condition;

    fn bitor(self, rhs: Condition) -> Condition {
        self.or(rhs)
    }
}

impl Not for Condition {
    type Output = Condition;

    fn not(self) -> Condition {
        self.negate()
    }
}

/// `lhs && rhs` as a free function.
pub fn and(lhs: Condition, rhs: Condition) -> Condition {
    lhs.and(rhs)
}

/// `lhs || rhs` as a free function.
pub fn or(lhs: Condition, rhs: Condition) -> Condition {
    lhs.or(rhs)
}
