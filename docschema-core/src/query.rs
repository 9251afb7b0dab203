//! Query DSL and its translation into backend constraints.
//!
//! A query is an ordered list of [`QueryEntry`] values. Each entry is either a
//! filter (`field`, [`Condition`], value) or a sort (`field`, [`SortOrder`]).
//! [`translate`] turns every entry into exactly one [`Constraint`], keeping
//! the order. Constraints are what persistence adapters consume.
//!
//! # Building queries
//!
//! ```ignore
//! use docschema::query::{Filter, Query, SortDirection};
//!
//! let query = Query::builder()
//!     .filter(Filter::gt("views", 10))
//!     .sort("createdAt", -1)
//!     .build();
//! ```
//!
//! # JSON form
//!
//! Entries can also be parsed from JSON. An entry that carries a `condition`
//! key is a filter no matter what else it contains, either at the top level
//! or inside its single field:
//!
//! ```json
//! [{ "views": { "condition": "gt", "value": 10 } }, { "createdAt": -1 }]
//! [{ "field": "views", "condition": "gt", "value": 10 }]
//! ```
//!
//! Everything else is a sort whose only key is the field name.
//!
//! The translator never consults a schema, so any field can be queried.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

use crate::{
    error::{ModelError, ModelResult},
    value::Value,
};

const CONDITION_KEY: &str = "condition";

/// Filter condition names accepted by the DSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Condition {
    Equals,
    NotEquals,
    Gt,
    Lt,
    Gte,
    Lte,
    In,
    NotIn,
    ArrayContains,
    ArrayContainsAny,
}

impl Condition {
    /// The backend operator this condition maps to.
    pub fn operator(self) -> Operator {
        match self {
            Condition::Equals => Operator::Eq,
            Condition::NotEquals => Operator::Ne,
            Condition::Gt => Operator::Gt,
            Condition::Lt => Operator::Lt,
            Condition::Gte => Operator::Gte,
            Condition::Lte => Operator::Lte,
            Condition::In => Operator::In,
            Condition::NotIn => Operator::NotIn,
            Condition::ArrayContains => Operator::ArrayContains,
            Condition::ArrayContainsAny => Operator::ArrayContainsAny,
        }
    }
}

/// Native comparison operators of the backend constraint model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
    In,
    NotIn,
    ArrayContains,
    ArrayContainsAny,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Gte => ">=",
            Operator::Lte => "<=",
            Operator::In => "in",
            Operator::NotIn => "not-in",
            Operator::ArrayContains => "array-contains",
            Operator::ArrayContainsAny => "array-contains-any",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Sort order as written by the caller: symbolic, or the `1` / `-1` shorthand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortOrder {
    Direction(SortDirection),
    Numeric(f64),
}

impl SortOrder {
    /// Resolves the shorthand. `1` is ascending, `-1` descending.
    ///
    /// # Errors
    ///
    /// Any other number is a [`ModelError::InvalidQuery`].
    pub fn normalize(self) -> ModelResult<SortDirection> {
        match self {
            SortOrder::Direction(direction) => Ok(direction),
            SortOrder::Numeric(n) if n == 1.0 => Ok(SortDirection::Asc),
            SortOrder::Numeric(n) if n == -1.0 => Ok(SortDirection::Desc),
            SortOrder::Numeric(n) => Err(ModelError::InvalidQuery(format!(
                "Sort direction must be 1, -1, \"asc\" or \"desc\", found {n}"
            ))),
        }
    }
}

impl From<SortDirection> for SortOrder {
    fn from(direction: SortDirection) -> Self {
        SortOrder::Direction(direction)
    }
}

impl From<i32> for SortOrder {
    fn from(n: i32) -> Self {
        SortOrder::Numeric(n as f64)
    }
}

impl From<i64> for SortOrder {
    fn from(n: i64) -> Self {
        SortOrder::Numeric(n as f64)
    }
}

/// One element of the query DSL.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "JsonValue")]
pub enum QueryEntry {
    Filter {
        field: String,
        condition: Condition,
        value: Value,
    },
    Sort {
        field: String,
        order: SortOrder,
    },
}

impl QueryEntry {
    pub fn filter(field: impl Into<String>, condition: Condition, value: impl Into<Value>) -> Self {
        QueryEntry::Filter {
            field: field.into(),
            condition,
            value: value.into(),
        }
    }

    pub fn sort(field: impl Into<String>, order: impl Into<SortOrder>) -> Self {
        QueryEntry::Sort {
            field: field.into(),
            order: order.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            QueryEntry::Filter { field, .. } | QueryEntry::Sort { field, .. } => field,
        }
    }

    /// Parses one entry from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidQuery`] for anything that is neither a
    /// filter nor a single-key sort.
    pub fn from_json(value: JsonValue) -> ModelResult<Self> {
        let JsonValue::Object(mut object) = value else {
            return Err(ModelError::InvalidQuery(format!(
                "Query entry must be an object, found {value}"
            )));
        };

        if object.contains_key(CONDITION_KEY) {
            let field = match object.remove("field") {
                Some(JsonValue::String(field)) => field,
                _ => {
                    return Err(ModelError::InvalidQuery(
                        "Filter entry is missing a string 'field'".to_string(),
                    ));
                }
            };
            return Self::filter_from_json(field, object);
        }

        if object.len() != 1 {
            return Err(ModelError::InvalidQuery(format!(
                "Query entry must name exactly one field, found {}",
                object.len()
            )));
        }

        let Some((field, spec)) = object.into_iter().next() else {
            return Err(ModelError::InvalidQuery("Empty query entry".to_string()));
        };

        match spec {
            JsonValue::Object(spec) if spec.contains_key(CONDITION_KEY) => {
                Self::filter_from_json(field, spec)
            }
            other => Ok(QueryEntry::Sort {
                field,
                order: Self::order_from_json(other)?,
            }),
        }
    }

    fn filter_from_json(field: String, mut spec: Map<String, JsonValue>) -> ModelResult<Self> {
        let condition = spec
            .remove(CONDITION_KEY)
            .map(serde_json::from_value::<Condition>)
            .transpose()
            .map_err(|e| ModelError::InvalidQuery(format!("Unknown condition for '{field}': {e}")))?
            .ok_or_else(|| ModelError::InvalidQuery(format!("Missing condition for '{field}'")))?;
        let value = Value::from_json(
            spec.remove("value")
                .unwrap_or(JsonValue::Null),
        )?;

        Ok(QueryEntry::Filter { field, condition, value })
    }

    fn order_from_json(order: JsonValue) -> ModelResult<SortOrder> {
        match order {
            JsonValue::Number(n) => n
                .as_f64()
                .map(SortOrder::Numeric)
                .ok_or_else(|| ModelError::InvalidQuery(format!("Invalid sort direction {n}"))),
            JsonValue::String(direction) => match direction.as_str() {
                "asc" => Ok(SortOrder::Direction(SortDirection::Asc)),
                "desc" => Ok(SortOrder::Direction(SortDirection::Desc)),
                other => Err(ModelError::InvalidQuery(format!(
                    "Invalid sort direction \"{other}\""
                ))),
            },
            other => Err(ModelError::InvalidQuery(format!(
                "Invalid sort direction {other}"
            ))),
        }
    }
}

impl TryFrom<JsonValue> for QueryEntry {
    type Error = ModelError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        QueryEntry::from_json(value)
    }
}

/// A translated, backend-agnostic query instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Where {
        field: String,
        op: Operator,
        value: Value,
    },
    OrderBy {
        field: String,
        direction: SortDirection,
    },
}

impl Constraint {
    pub fn where_(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Constraint::Where {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn order_by(field: impl Into<String>, direction: SortDirection) -> Self {
        Constraint::OrderBy { field: field.into(), direction }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Where { field, op, value } => write!(f, "where({field} {op} {value})"),
            Constraint::OrderBy { field, direction } => {
                write!(f, "orderBy({field} {})", direction.as_str())
            }
        }
    }
}

/// Translates one entry.
pub fn translate_entry(entry: &QueryEntry) -> ModelResult<Constraint> {
    match entry {
        QueryEntry::Filter { field, condition, value } => Ok(Constraint::Where {
            field: field.clone(),
            op: condition.operator(),
            value: value.clone(),
        }),
        QueryEntry::Sort { field, order } => Ok(Constraint::OrderBy {
            field: field.clone(),
            direction: order.normalize()?,
        }),
    }
}

/// Translates entries into constraints, one per entry, in order.
pub fn translate(entries: &[QueryEntry]) -> ModelResult<Vec<Constraint>> {
    entries
        .iter()
        .map(translate_entry)
        .collect()
}

/// An ordered list of query entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub entries: Vec<QueryEntry>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }

    /// Parses a JSON array of entries.
    pub fn from_json(value: JsonValue) -> ModelResult<Self> {
        match value {
            JsonValue::Array(entries) => Ok(Query {
                entries: entries
                    .into_iter()
                    .map(QueryEntry::from_json)
                    .collect::<ModelResult<Vec<_>>>()?,
            }),
            other => Err(ModelError::InvalidQuery(format!(
                "Query must be an array of entries, found {other}"
            ))),
        }
    }

    pub fn translate(&self) -> ModelResult<Vec<Constraint>> {
        translate(&self.entries)
    }
}

impl From<Vec<QueryEntry>> for Query {
    fn from(entries: Vec<QueryEntry>) -> Self {
        Query { entries }
    }
}

impl From<QueryEntry> for Query {
    fn from(entry: QueryEntry) -> Self {
        Query { entries: vec![entry] }
    }
}

impl FromIterator<QueryEntry> for Query {
    fn from_iter<I: IntoIterator<Item = QueryEntry>>(iter: I) -> Self {
        Query { entries: iter.into_iter().collect() }
    }
}

/// Helper struct for constructing filter entries.
///
/// ```ignore
/// use docschema::query::Filter;
///
/// let entry = Filter::array_contains("tags", "rust");
/// ```
pub struct Filter;

impl Filter {
    /// Matches documents where the field equals the value.
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> QueryEntry {
        QueryEntry::filter(field, Condition::Equals, value)
    }

    /// Matches documents where the field does not equal the value.
    pub fn not_equals(field: impl Into<String>, value: impl Into<Value>) -> QueryEntry {
        QueryEntry::filter(field, Condition::NotEquals, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> QueryEntry {
        QueryEntry::filter(field, Condition::Gt, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> QueryEntry {
        QueryEntry::filter(field, Condition::Lt, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> QueryEntry {
        QueryEntry::filter(field, Condition::Gte, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> QueryEntry {
        QueryEntry::filter(field, Condition::Lte, value)
    }

    /// Matches documents where the field equals any of the listed values.
    pub fn is_in(field: impl Into<String>, values: impl Into<Value>) -> QueryEntry {
        QueryEntry::filter(field, Condition::In, values)
    }

    /// Matches documents where the field equals none of the listed values.
    pub fn not_in(field: impl Into<String>, values: impl Into<Value>) -> QueryEntry {
        QueryEntry::filter(field, Condition::NotIn, values)
    }

    /// Matches documents whose array field contains the value.
    pub fn array_contains(field: impl Into<String>, value: impl Into<Value>) -> QueryEntry {
        QueryEntry::filter(field, Condition::ArrayContains, value)
    }

    /// Matches documents whose array field contains any of the listed values.
    pub fn array_contains_any(field: impl Into<String>, values: impl Into<Value>) -> QueryEntry {
        QueryEntry::filter(field, Condition::ArrayContainsAny, values)
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    pub fn new() -> Self {
        QueryBuilder { query: Query::default() }
    }

    /// Appends a filter entry.
    pub fn filter(mut self, entry: QueryEntry) -> Self {
        self.query.entries.push(entry);
        self
    }

    /// Appends a sort entry.
    pub fn sort(mut self, field: impl Into<String>, order: impl Into<SortOrder>) -> Self {
        self.query
            .entries
            .push(QueryEntry::sort(field, order));
        self
    }

    pub fn build(self) -> Query {
        self.query
    }
}

/// Visitor over translated constraints, implemented by adapters that turn
/// constraints into their native form.
pub trait ConstraintVisitor {
    type Output;
    type Error: Into<ModelError>;

    fn visit_where(&mut self, field: &str, op: Operator, value: &Value) -> Result<Self::Output, Self::Error>;
    fn visit_order_by(&mut self, field: &str, direction: SortDirection) -> Result<Self::Output, Self::Error>;

    fn visit_constraint(&mut self, constraint: &Constraint) -> Result<Self::Output, Self::Error> {
        match constraint {
            Constraint::Where { field, op, value } => self.visit_where(field, *op, value),
            Constraint::OrderBy { field, direction } => self.visit_order_by(field, *direction),
        }
    }
}
