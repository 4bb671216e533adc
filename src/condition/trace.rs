//! Evaluation traces for conditions.

use std::fmt;

/// Result of evaluating every node of a condition tree.
///
/// AND and OR children are all evaluated; `matched` is still the correct
/// boolean result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionTrace {
    Leaf {
        matched: bool,
        description: String,
    },
    And {
        matched: bool,
        children: Vec<ConditionTrace>,
    },
    Or {
        matched: bool,
        children: Vec<ConditionTrace>,
    },
    Not {
        matched: bool,
        inner: Box<ConditionTrace>,
    },
}

impl ConditionTrace {
    pub fn matched(&self) -> bool {
        match self {
            ConditionTrace::Leaf { matched, .. }
            | ConditionTrace::And { matched, .. }
            | ConditionTrace::Or { matched, .. }
            | ConditionTrace::Not { matched, .. } => *matched,
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let mark = if self.matched() { "+" } else { "-" };
        let pad = "  ".repeat(depth);
        match self {
            ConditionTrace::Leaf { description, .. } => {
                writeln!(f, "{}{} {}", pad, mark, description)
            }
            ConditionTrace::And { children, .. } | ConditionTrace::Or { children, .. } => {
                let op = if matches!(self, ConditionTrace::And { .. }) { "and" } else { "or" };
                writeln!(f, "{}{} {}", pad, mark, op)?;
                for child in children {
                    child.write_indented(f, depth + 1)?;
                }
                Ok(())
            }
            ConditionTrace::Not { inner, .. } => {
                writeln!(f, "{}{} not", pad, mark)?;
                inner.write_indented(f, depth + 1)
            }
        }
    }
}

impl fmt::Display for ConditionTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_marks_results() {
        let trace = ConditionTrace::Not {
            matched: true,
            inner: Box::new(ConditionTrace::Leaf {
                matched: false,
                description: "host == \"a\"".to_string(),
            }),
        };
        assert_eq!(trace.to_string(), "+ not\n  - host == \"a\"\n");
    }
}
