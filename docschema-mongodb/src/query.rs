//! Constraint translation into MongoDB filter and sort documents.
//!
//! Filters keep the semantics of the in-memory adapter: no constraint
//! matches a document that lacks the field, array operators only match
//! array fields, and sorting on a field excludes documents without it.
//!
//! MongoDB applies scalar comparisons to each element of an array field.
//! The in-memory adapter compares the array as a whole, so a scalar operand
//! never matches an array there. Translated filters exclude array fields
//! from scalar comparisons and let them through scalar negations.

use bson::{Bson, Document as BsonDocument, doc};

use docschema_core::{
    error::{ModelError, ModelResult},
    query::{Constraint, ConstraintVisitor, Operator, SortDirection},
    value::Value,
};

use crate::sanitizer::FieldNameSanitizer;

/// One translated constraint.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MongoClause {
    Filter(BsonDocument),
    Sort(String, i32),
}

/// A complete MongoDB query: the filter and the optional sort specification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MongoQuery {
    pub filter: BsonDocument,
    pub sort: Option<BsonDocument>,
}

pub(crate) struct MongoQueryTranslator;

impl MongoQueryTranslator {
    /// Folds constraints into one query. Filters are combined with `$and`.
    pub(crate) fn translate(constraints: &[Constraint]) -> ModelResult<MongoQuery> {
        let mut filters = Vec::new();
        let mut sort = BsonDocument::new();

        for constraint in constraints {
            match MongoQueryTranslator.visit_constraint(constraint)? {
                MongoClause::Filter(filter) => filters.push(filter),
                MongoClause::Sort(field, direction) => {
                    filters.push(doc! { field.as_str(): { "$exists": true } });
                    sort.insert(field, direction);
                }
            }
        }

        let filter = match filters.len() {
            0 => doc! {},
            1 => filters.remove(0),
            _ => doc! { "$and": filters },
        };

        Ok(MongoQuery {
            filter,
            sort: (!sort.is_empty()).then_some(sort),
        })
    }

    fn operand_list(field: &str, op: Operator, value: &Value) -> ModelResult<Bson> {
        match value {
            Value::Array(_) => Ok(Bson::from(value.clone())),
            _ => Err(ModelError::InvalidQuery(format!(
                "'{op}' on '{field}' needs an array of values"
            ))),
        }
    }

    /// Whether the operand only holds scalars, so the field is compared per element by MongoDB.
    fn compares_scalars(op: Operator, value: &Value) -> bool {
        match (op, value) {
            (Operator::In | Operator::NotIn, Value::Array(items)) => !items
                .iter()
                .any(|item| matches!(item, Value::Array(_))),
            (_, Value::Array(_)) => false,
            _ => true,
        }
    }
}

impl ConstraintVisitor for MongoQueryTranslator {
    type Output = MongoClause;
    type Error = ModelError;

    fn visit_where(&mut self, field: &str, op: Operator, value: &Value) -> Result<Self::Output, Self::Error> {
        let key = FieldNameSanitizer::sanitize(field);
        let operand = Bson::from(value.clone());

        let mut condition = match op {
            Operator::Eq => doc! { "$eq": operand },
            Operator::Ne => doc! { "$exists": true, "$ne": operand },
            Operator::Gt => doc! { "$gt": operand },
            Operator::Gte => doc! { "$gte": operand },
            Operator::Lt => doc! { "$lt": operand },
            Operator::Lte => doc! { "$lte": operand },
            Operator::In => doc! { "$in": Self::operand_list(field, op, value)? },
            Operator::NotIn => doc! { "$exists": true, "$nin": Self::operand_list(field, op, value)? },
            Operator::ArrayContains => doc! { "$elemMatch": { "$eq": operand } },
            Operator::ArrayContainsAny => doc! {
                "$elemMatch": { "$in": Self::operand_list(field, op, value)? }
            },
        };

        let filter = match op {
            Operator::ArrayContains | Operator::ArrayContainsAny => doc! { key: condition },
            Operator::Ne | Operator::NotIn if Self::compares_scalars(op, value) => doc! {
                "$or": [
                    { key.as_str(): { "$type": "array" } },
                    { key.as_str(): condition },
                ]
            },
            _ if Self::compares_scalars(op, value) => {
                condition.insert("$not", doc! { "$type": "array" });
                doc! { key: condition }
            }
            _ => doc! { key: condition },
        };

        Ok(MongoClause::Filter(filter))
    }

    fn visit_order_by(&mut self, field: &str, direction: SortDirection) -> Result<Self::Output, Self::Error> {
        Ok(MongoClause::Sort(
            FieldNameSanitizer::sanitize(field),
            match direction {
                SortDirection::Asc => 1,
                SortDirection::Desc => -1,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_constraints_match_everything() {
        assert_eq!(MongoQueryTranslator::translate(&[]).unwrap(), MongoQuery::default());
    }

    #[test]
    fn single_filter_is_not_wrapped() {
        let query = MongoQueryTranslator::translate(&[Constraint::where_("views", Operator::Gt, 10)]).unwrap();

        assert_eq!(query.filter, doc! { "views": { "$gt": 10.0, "$not": { "$type": "array" } } });
        assert_eq!(query.sort, None);
    }

    #[test]
    fn filters_and_sorts_combine_in_order() {
        let query = MongoQueryTranslator::translate(&[
            Constraint::where_("status", Operator::In, vec!["draft", "live"]),
            Constraint::order_by("createdAt", SortDirection::Desc),
            Constraint::order_by("title", SortDirection::Asc),
        ])
        .unwrap();

        assert_eq!(
            query.filter,
            doc! {
                "$and": [
                    { "status": { "$in": ["draft", "live"], "$not": { "$type": "array" } } },
                    { "createdAt": { "$exists": true } },
                    { "title": { "$exists": true } },
                ]
            }
        );
        assert_eq!(query.sort, Some(doc! { "createdAt": -1, "title": 1 }));
    }

    #[test]
    fn array_operators_use_elem_match() {
        let contains = MongoQueryTranslator::translate(&[Constraint::where_("tags", Operator::ArrayContains, "rust")]).unwrap();
        let any = MongoQueryTranslator::translate(&[Constraint::where_("tags", Operator::ArrayContainsAny, vec!["a", "b"])]).unwrap();

        assert_eq!(contains.filter, doc! { "tags": { "$elemMatch": { "$eq": "rust" } } });
        assert_eq!(any.filter, doc! { "tags": { "$elemMatch": { "$in": ["a", "b"] } } });
    }

    #[test]
    fn negations_require_the_field() {
        let query = MongoQueryTranslator::translate(&[Constraint::where_("status", Operator::Ne, "draft")]).unwrap();

        assert_eq!(
            query.filter,
            doc! {
                "$or": [
                    { "status": { "$type": "array" } },
                    { "status": { "$exists": true, "$ne": "draft" } },
                ]
            }
        );
    }

    #[test]
    fn membership_without_a_list_is_rejected() {
        let err = MongoQueryTranslator::translate(&[Constraint::where_("status", Operator::NotIn, "draft")]).unwrap_err();

        assert!(matches!(err, ModelError::InvalidQuery(_)));
    }

    #[test]
    fn field_names_are_sanitized() {
        let query = MongoQueryTranslator::translate(&[Constraint::where_("a.b", Operator::Eq, true)]).unwrap();

        assert_eq!(query.filter, doc! { "a__dot__b": { "$eq": true, "$not": { "$type": "array" } } });
    }

    #[test]
    fn scalar_comparisons_skip_array_fields() {
        let eq = MongoQueryTranslator::translate(&[Constraint::where_("tags", Operator::Eq, "rust")]).unwrap();
        let not_in = MongoQueryTranslator::translate(&[Constraint::where_("tags", Operator::NotIn, vec!["rust"])]).unwrap();

        assert_eq!(eq.filter, doc! { "tags": { "$eq": "rust", "$not": { "$type": "array" } } });
        assert_eq!(
            not_in.filter,
            doc! {
                "$or": [
                    { "tags": { "$type": "array" } },
                    { "tags": { "$exists": true, "$nin": ["rust"] } },
                ]
            }
        );
    }

    #[test]
    fn whole_array_operands_compare_whole_arrays() {
        let eq = MongoQueryTranslator::translate(&[Constraint::where_("tags", Operator::Eq, vec!["a", "b"])]).unwrap();
        let is_in = MongoQueryTranslator::translate(&[Constraint::where_(
            "tags",
            Operator::In,
            Value::Array(vec![Value::Array(vec![Value::from("a")])]),
        )])
        .unwrap();

        assert_eq!(eq.filter, doc! { "tags": { "$eq": ["a", "b"] } });
        assert_eq!(is_in.filter, doc! { "tags": { "$in": [["a"]] } });
    }
}
