//! Constraint evaluation for in-memory document filtering and ordering.
//!
//! Filtering follows document-store semantics: a `Where` constraint never
//! matches a document that lacks the field, and an `OrderBy` constraint
//! drops documents that lack the field it sorts on.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use docschema_core::{
    error::ModelError,
    query::{Constraint, ConstraintVisitor, Operator, SortDirection},
    value::{Document, Value},
};

/// Borrowed, comparable view of a document value.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    Date(&'a DateTime<Utc>),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
}

impl<'a> From<&'a Value> for Comparable<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => Comparable::Null,
            Value::Bool(value) => Comparable::Bool(*value),
            Value::Number(value) => Comparable::Number(*value),
            Value::Date(value) => Comparable::Date(value),
            Value::String(value) => Comparable::String(value),
            Value::Array(values) => Comparable::Array(
                values
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>(),
            ),
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::Date(a), Comparable::Date(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    /// Only values of the same scalar kind are ordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::Date(a), Comparable::Date(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl<'a> Comparable<'a> {
    fn kind_rank(&self) -> u8 {
        match self {
            Comparable::Null => 0,
            Comparable::Bool(_) => 1,
            Comparable::Number(_) => 2,
            Comparable::Date(_) => 3,
            Comparable::String(_) => 4,
            Comparable::Array(_) => 5,
        }
    }

    /// Total order used for sorting: kinds first (null, boolean, number,
    /// date, string, array), then values within a kind.
    pub(crate) fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Comparable::Array(a), Comparable::Array(b)) => {
                for (left, right) in a.iter().zip(b.iter()) {
                    let ordering = left.total_cmp(right);
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                a.len().cmp(&b.len())
            }
            (Comparable::Number(a), Comparable::Number(b)) => a.total_cmp(b),
            _ => self
                .partial_cmp(other)
                .unwrap_or_else(|| self.kind_rank().cmp(&other.kind_rank())),
        }
    }

    fn items(&self) -> Option<&[Comparable<'a>]> {
        match self {
            Comparable::Array(items) => Some(items),
            _ => None,
        }
    }
}

/// Evaluates `Where` constraints against one document.
pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// `true` when the document satisfies every `Where` constraint.
    pub fn matches(&mut self, constraints: &[Constraint]) -> Result<bool, ModelError> {
        for constraint in constraints {
            if !self.visit_constraint(constraint)? {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

impl<'a> ConstraintVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = ModelError;

    fn visit_where(&mut self, field: &str, op: Operator, value: &Value) -> Result<Self::Output, Self::Error> {
        let Some(field_value) = self.document.get(field) else {
            return Ok(false);
        };

        let left = Comparable::from(field_value);
        let right = Comparable::from(value);

        match op {
            Operator::Eq => Ok(left == right),
            Operator::Ne => Ok(left != right),
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => match left.partial_cmp(&right) {
                Some(ordering) => Ok(match op {
                    Operator::Gt => ordering == Ordering::Greater,
                    Operator::Gte => ordering != Ordering::Less,
                    Operator::Lt => ordering == Ordering::Less,
                    _ => ordering != Ordering::Greater,
                }),
                None => Ok(false),
            },
            Operator::In | Operator::NotIn => {
                let candidates = right.items().ok_or_else(|| {
                    ModelError::InvalidQuery(format!("'{op}' on '{field}' needs an array of values"))
                })?;
                let found = candidates
                    .iter()
                    .any(|candidate| *candidate == left);

                Ok(if op == Operator::In { found } else { !found })
            }
            Operator::ArrayContains => Ok(left
                .items()
                .is_some_and(|items| items.iter().any(|item| *item == right))),
            Operator::ArrayContainsAny => {
                let candidates = right.items().ok_or_else(|| {
                    ModelError::InvalidQuery(format!("'{op}' on '{field}' needs an array of values"))
                })?;

                Ok(left.items().is_some_and(|items| {
                    items
                        .iter()
                        .any(|item| candidates.contains(item))
                }))
            }
        }
    }

    fn visit_order_by(&mut self, field: &str, _direction: SortDirection) -> Result<Self::Output, Self::Error> {
        Ok(self.document.contains_key(field))
    }
}

/// Compares two documents on the given sort keys, earlier keys first.
pub(crate) fn compare_documents(a: &Document, b: &Document, keys: &[(&str, SortDirection)]) -> Ordering {
    for (field, direction) in keys {
        let left = a
            .get(*field)
            .map(Comparable::from)
            .unwrap_or(Comparable::Null);
        let right = b
            .get(*field)
            .map(Comparable::from)
            .unwrap_or(Comparable::Null);

        let ordering = match direction {
            SortDirection::Asc => left.total_cmp(&right),
            SortDirection::Desc => right.total_cmp(&left),
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use docschema_core::document;

    fn matches(document: &Document, constraint: Constraint) -> bool {
        DocumentEvaluator::new(document)
            .matches(&[constraint])
            .unwrap()
    }

    #[test]
    fn comparison_operators() {
        let post = document! { "views" => 10, "title" => "b" };

        assert!(matches(&post, Constraint::where_("views", Operator::Eq, 10)));
        assert!(matches(&post, Constraint::where_("views", Operator::Ne, 11)));
        assert!(matches(&post, Constraint::where_("views", Operator::Gt, 9)));
        assert!(matches(&post, Constraint::where_("views", Operator::Gte, 10)));
        assert!(matches(&post, Constraint::where_("views", Operator::Lt, 11)));
        assert!(matches(&post, Constraint::where_("views", Operator::Lte, 10)));
        assert!(matches(&post, Constraint::where_("title", Operator::Gt, "a")));
        assert!(!matches(&post, Constraint::where_("views", Operator::Gt, "9")));
    }

    #[test]
    fn missing_fields_never_match() {
        let post = document! { "title" => "a" };

        assert!(!matches(&post, Constraint::where_("views", Operator::Ne, 1)));
        assert!(!matches(&post, Constraint::where_("views", Operator::NotIn, vec![1])));
    }

    #[test]
    fn membership_operators() {
        let post = document! { "status" => "live", "tags" => vec!["rust", "db"] };

        assert!(matches(&post, Constraint::where_("status", Operator::In, vec!["draft", "live"])));
        assert!(!matches(&post, Constraint::where_("status", Operator::NotIn, vec!["live"])));
        assert!(matches(&post, Constraint::where_("tags", Operator::ArrayContains, "db")));
        assert!(!matches(&post, Constraint::where_("status", Operator::ArrayContains, "live")));
        assert!(matches(&post, Constraint::where_("tags", Operator::ArrayContainsAny, vec!["go", "rust"])));
        assert!(!matches(&post, Constraint::where_("tags", Operator::ArrayContainsAny, vec!["go"])));
    }

    #[test]
    fn membership_needs_an_array_operand() {
        let post = document! { "status" => "live" };

        let err = DocumentEvaluator::new(&post)
            .matches(&[Constraint::where_("status", Operator::In, "live")])
            .unwrap_err();

        assert!(matches!(err, ModelError::InvalidQuery(_)));
    }

    #[test]
    fn multi_key_ordering() {
        let a = document! { "status" => "live", "views" => 1 };
        let b = document! { "status" => "live", "views" => 5 };
        let c = document! { "status" => "draft", "views" => 9 };
        let keys = [("status", SortDirection::Asc), ("views", SortDirection::Desc)];

        let mut docs = vec![&a, &b, &c];
        docs.sort_by(|x, y| compare_documents(x, y, &keys));

        assert_eq!(docs, vec![&c, &b, &a]);
    }

    #[test]
    fn mixed_kinds_sort_by_kind() {
        let null = Value::Null;
        let number = Value::from(3);
        let text = Value::from("3");

        assert_eq!(Comparable::from(&null).total_cmp(&Comparable::from(&number)), Ordering::Less);
        assert_eq!(Comparable::from(&text).total_cmp(&Comparable::from(&number)), Ordering::Greater);
    }
}
