//! Element queries: label resolution plus pattern matching.
//!
//! Counting tolerates any number of matches; anything that acts on an
//! element goes through [`exactly_one`] so an action never lands on the
//! wrong one of several candidates.

use serde::Serialize;

use crate::dom::{Document, NodeId};
use crate::error::UiError;
use crate::label::{candidates_of, AreaPolicy, ElementCategory};
use crate::pattern::MatchExpression;

/// A node plus the label that matched when it was resolved.
///
/// Only meaningful for the document it was resolved in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedElement {
    pub node: NodeId,
    pub label: String,
}

/// Every candidate of `category` with a label satisfying `expr`.
pub fn matching(
    doc: &Document,
    category: ElementCategory,
    expr: &MatchExpression,
    policy: AreaPolicy,
) -> Vec<ResolvedElement> {
    candidates_of(doc, category, policy)
        .into_iter()
        .filter_map(|candidate| {
            let label = candidate.labels.into_iter().find(|label| expr.is_match(label))?;
            Some(ResolvedElement {
                node: candidate.node,
                label,
            })
        })
        .collect()
}

/// Number of distinct elements matching.
pub fn count(doc: &Document, category: ElementCategory, expr: &MatchExpression, policy: AreaPolicy) -> usize {
    matching(doc, category, expr, policy).len()
}

/// The single matching element.
pub fn exactly_one(
    doc: &Document,
    category: ElementCategory,
    expr: &MatchExpression,
    policy: AreaPolicy,
) -> Result<ResolvedElement, UiError> {
    let mut found = matching(doc, category, expr, policy);
    match found.len() {
        0 => Err(UiError::NoMatch {
            category,
            expr: expr.to_string(),
        }),
        1 => Ok(found.remove(0)),
        count => Err(UiError::AmbiguousMatch {
            category,
            expr: expr.to_string(),
            count,
        }),
    }
}

/// Fails unless nothing matches.
pub fn none(doc: &Document, category: ElementCategory, expr: &MatchExpression, policy: AreaPolicy) -> Result<(), UiError> {
    match count(doc, category, expr, policy) {
        0 => Ok(()),
        count => Err(UiError::UnexpectedMatch {
            category,
            expr: expr.to_string(),
            count,
        }),
    }
}

/// Fails unless something matches; returns how many did.
pub fn any_match(
    doc: &Document,
    category: ElementCategory,
    expr: &MatchExpression,
    policy: AreaPolicy,
) -> Result<usize, UiError> {
    match count(doc, category, expr, policy) {
        0 => Err(UiError::NoMatch {
            category,
            expr: expr.to_string(),
        }),
        count => Ok(count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <main>
          <button title="Click an icon"><img alt="😁"></button>
          <button title="Click another icon"><img alt="😁"></button>
          <button>Complex <b>label</b></button>
        </main>"#;

    fn expr(text: &str) -> MatchExpression {
        MatchExpression::from(text)
    }

    #[test]
    fn test_count_distinct_elements() {
        let doc = Document::parse(PAGE);
        let policy = AreaPolicy::default();
        assert_eq!(count(&doc, ElementCategory::Button, &expr("😁"), policy), 2);
        assert_eq!(count(&doc, ElementCategory::Button, &expr("*=icon"), policy), 2);
        assert_eq!(count(&doc, ElementCategory::Button, &expr("Nope"), policy), 0);
    }

    #[test]
    fn test_exactly_one_reports_ambiguity_and_absence() {
        let doc = Document::parse(PAGE);
        let policy = AreaPolicy::default();
        let err = exactly_one(&doc, ElementCategory::Button, &expr("😁"), policy).unwrap_err();
        assert!(matches!(err, UiError::AmbiguousMatch { count: 2, .. }));

        let err = exactly_one(&doc, ElementCategory::Link, &expr("😁"), policy).unwrap_err();
        assert!(matches!(err, UiError::NoMatch { category: ElementCategory::Link, .. }));
    }

    #[test]
    fn test_exactly_one_label_satisfies_expression() {
        let doc = Document::parse(PAGE);
        let query = expr("^=Compl");
        let found = exactly_one(&doc, ElementCategory::Button, &query, AreaPolicy::default()).unwrap();
        assert_eq!(found.label, "Complex label");
        assert!(query.is_match(&found.label));
    }

    #[test]
    fn test_none_and_any_match() {
        let doc = Document::parse(PAGE);
        let policy = AreaPolicy::default();
        assert!(none(&doc, ElementCategory::Decoration, &expr("😁"), policy).is_ok());
        let err = none(&doc, ElementCategory::Button, &expr("😁"), policy).unwrap_err();
        assert!(matches!(err, UiError::UnexpectedMatch { count: 2, .. }));
        assert_eq!(any_match(&doc, ElementCategory::Button, &expr("😁"), policy).unwrap(), 2);
        assert!(any_match(&doc, ElementCategory::Button, &expr("Missing"), policy).is_err());
    }

    #[test]
    fn test_any_counts_at_least_each_category() {
        let doc = Document::parse(PAGE);
        let policy = AreaPolicy::default();
        for text in ["😁", "Complex label", "*=icon"] {
            let any = count(&doc, ElementCategory::Any, &expr(text), policy);
            for category in ElementCategory::CONCRETE {
                assert!(any >= count(&doc, category, &expr(text), policy));
            }
        }
    }
}
