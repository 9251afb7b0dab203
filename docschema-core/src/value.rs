//! Document values and their conversions.
//!
//! Documents are maps from field names to a closed set of value kinds
//! ([`Value`]). Anything outside that set is rejected at the boundary where it
//! enters the system, whether that is JSON input or BSON read back from a
//! backend.
//!
//! # JSON representation
//!
//! JSON `null`, booleans, numbers, strings and arrays map directly. Dates use
//! the extended-JSON form `{"$date": "<RFC 3339>"}`. Any other object is an
//! [`ModelError::InvalidDocument`].

use bson::Bson;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Number, Value as JsonValue};
use std::{collections::BTreeMap, fmt};

use crate::error::{ModelError, ModelResult};

const DATE_KEY: &str = "$date";
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A single document value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "JsonValue", into = "JsonValue")]
pub enum Value {
    /// The null sentinel.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value. Integers and floats share one kind.
    Number(f64),
    /// String value.
    String(String),
    /// Point in time, always UTC.
    Date(DateTime<Utc>),
    /// Ordered list of values.
    Array(Vec<Value>),
}

/// A document body: field name to value.
pub type Document = BTreeMap<String, Value>;

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Date(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Name of this value's kind, as used in log output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Array(_) => "array",
        }
    }

    /// Converts a JSON value into a document value.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidDocument`] for objects other than `{"$date": ..}`
    /// and for malformed dates.
    pub fn from_json(value: JsonValue) -> ModelResult<Self> {
        match value {
            JsonValue::Null => Ok(Value::Null),
            JsonValue::Bool(value) => Ok(Value::Bool(value)),
            JsonValue::Number(number) => number
                .as_f64()
                .map(Value::Number)
                .ok_or_else(|| {
                    ModelError::InvalidDocument(format!("Number {number} is not representable"))
                }),
            JsonValue::String(value) => Ok(Value::String(value)),
            JsonValue::Array(values) => Ok(Value::Array(
                values
                    .into_iter()
                    .map(Value::from_json)
                    .collect::<ModelResult<Vec<_>>>()?,
            )),
            JsonValue::Object(object) => Self::date_from_json(object),
        }
    }

    fn date_from_json(object: Map<String, JsonValue>) -> ModelResult<Self> {
        match (object.len(), object.get(DATE_KEY)) {
            (1, Some(JsonValue::String(raw))) => DateTime::parse_from_rfc3339(raw)
                .map(|date| Value::Date(date.with_timezone(&Utc)))
                .map_err(|e| ModelError::InvalidDocument(format!("Invalid date '{raw}': {e}"))),
            _ => Err(ModelError::InvalidDocument(
                "Nested objects are not supported as field values".to_string(),
            )),
        }
    }

    /// Converts this value into its JSON representation.
    pub fn to_json(&self) -> JsonValue {
        self.clone().into()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl TryFrom<JsonValue> for Value {
    type Error = ModelError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        Value::from_json(value)
    }
}

/// Integral numbers render as JSON integers so typed integer fields deserialize.
fn number_to_json(value: f64) -> JsonValue {
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        return JsonValue::from(value as i64);
    }

    Number::from_f64(value)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => JsonValue::Null,
            Value::Bool(value) => JsonValue::Bool(value),
            Value::Number(value) => number_to_json(value),
            Value::String(value) => JsonValue::String(value),
            Value::Date(date) => {
                let mut object = Map::new();
                object.insert(
                    DATE_KEY.to_string(),
                    JsonValue::String(date.to_rfc3339_opts(SecondsFormat::Millis, true)),
                );
                JsonValue::Object(object)
            }
            Value::Array(values) => JsonValue::Array(
                values
                    .into_iter()
                    .map(JsonValue::from)
                    .collect(),
            ),
        }
    }
}

impl From<Value> for Bson {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Bson::Null,
            Value::Bool(value) => Bson::Boolean(value),
            Value::Number(value) => Bson::Double(value),
            Value::String(value) => Bson::String(value),
            Value::Date(date) => Bson::DateTime(bson::DateTime::from_chrono(date)),
            Value::Array(values) => Bson::Array(
                values
                    .into_iter()
                    .map(Bson::from)
                    .collect(),
            ),
        }
    }
}

impl TryFrom<Bson> for Value {
    type Error = ModelError;

    fn try_from(bson: Bson) -> Result<Self, Self::Error> {
        match bson {
            Bson::Null => Ok(Value::Null),
            Bson::Boolean(value) => Ok(Value::Bool(value)),
            Bson::Int32(value) => Ok(Value::Number(value as f64)),
            Bson::Int64(value) => Ok(Value::Number(value as f64)),
            Bson::Double(value) => Ok(Value::Number(value)),
            Bson::String(value) => Ok(Value::String(value)),
            Bson::DateTime(value) => Ok(Value::Date(value.to_chrono())),
            Bson::Array(values) => Ok(Value::Array(
                values
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<ModelResult<Vec<_>>>()?,
            )),
            other => Err(ModelError::InvalidDocument(format!(
                "Unsupported BSON value {other}"
            ))),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Date(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(
            values
                .into_iter()
                .map(Into::into)
                .collect(),
        )
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value
            .map(Into::into)
            .unwrap_or(Value::Null)
    }
}

/// Builds a [`Document`] from `key => value` pairs.
///
/// ```ignore
/// let data = document! { "title" => "hi", "views" => 3 };
/// ```
#[macro_export]
macro_rules! document {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut document = $crate::value::Document::new();
        $(
            document.insert(::std::string::String::from($key), $crate::value::Value::from($value));
        )*
        document
    }};
}

/// Parses a JSON object into a [`Document`].
///
/// # Errors
///
/// Returns [`ModelError::InvalidDocument`] when `value` is not an object or
/// contains an unsupported value.
pub fn document_from_json(value: JsonValue) -> ModelResult<Document> {
    match value {
        JsonValue::Object(object) => object
            .into_iter()
            .map(|(key, value)| Value::from_json(value).map(|value| (key, value)))
            .collect(),
        other => Err(ModelError::InvalidDocument(format!(
            "Expected a JSON object, found {other}"
        ))),
    }
}

/// Renders a [`Document`] as a JSON object.
pub fn document_to_json(document: &Document) -> JsonValue {
    JsonValue::Object(
        document
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect(),
    )
}

/// Serializes any `Serialize` type into a [`Document`] through its JSON form.
pub fn to_document<T: Serialize>(value: &T) -> ModelResult<Document> {
    document_from_json(serde_json::to_value(value)?)
}

/// Serde helpers that keep `DateTime<Utc>` struct fields in the date form,
/// so typed documents validate against `date` fields.
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Post {
///     #[serde(with = "docschema::value::extended_date")]
///     created_at: DateTime<Utc>,
/// }
/// ```
pub mod extended_date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error};

    use super::Value;

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        Value::Date(*date)
            .to_json()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Date(date) => Ok(date),
            other => Err(D::Error::custom(format!(
                "expected a date, found {}",
                other.kind_name()
            ))),
        }
    }
}

/// A document as read back from a persistence adapter: its ID plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Document,
}

impl StoredDocument {
    pub fn new(id: impl Into<String>, fields: Document) -> Self {
        Self { id: id.into(), fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Renders the document as `{"id": .., ...fields}`.
    ///
    /// A stored field literally named `id` is shadowed by the document ID.
    pub fn to_json(&self) -> JsonValue {
        let mut json = document_to_json(&self.fields);
        if let JsonValue::Object(object) = &mut json {
            object.insert("id".to_string(), JsonValue::String(self.id.clone()));
        }
        json
    }

    /// Deserializes the document, ID included, into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Serialization`] if `T` does not match.
    pub fn deserialize<T: DeserializeOwned>(&self) -> ModelResult<T> {
        Ok(serde_json::from_value(self.to_json())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn json_scalars_map_to_value_kinds() {
        let document = document_from_json(json!({
            "title": "hi",
            "views": 10,
            "ratio": 0.5,
            "published": true,
            "deletedAt": null,
            "tags": ["a", "b"],
        }))
        .unwrap();

        assert_eq!(document["title"], Value::from("hi"));
        assert_eq!(document["views"], Value::Number(10.0));
        assert_eq!(document["ratio"], Value::Number(0.5));
        assert_eq!(document["published"], Value::Bool(true));
        assert!(document["deletedAt"].is_null());
        assert_eq!(document["tags"], Value::from(vec!["a", "b"]));
    }

    #[test]
    fn extended_json_dates_parse() {
        let value = Value::from_json(json!({ "$date": "2024-03-01T12:00:00Z" })).unwrap();

        assert_eq!(
            value,
            Value::Date(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
        );
        assert_eq!(value.to_json(), json!({ "$date": "2024-03-01T12:00:00.000Z" }));
    }

    #[test]
    fn nested_objects_are_rejected() {
        let err = Value::from_json(json!({ "street": "Main" })).unwrap_err();

        assert!(matches!(err, ModelError::InvalidDocument(_)));
    }

    #[test]
    fn non_object_documents_are_rejected() {
        assert!(document_from_json(json!([1, 2])).is_err());
    }

    #[test]
    fn bson_conversion_keeps_kinds() {
        let date = Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap();
        let bson = Bson::from(Value::Array(vec![Value::from(1), Value::from(date)]));

        assert_eq!(
            Value::try_from(bson).unwrap(),
            Value::Array(vec![Value::Number(1.0), Value::Date(date)])
        );
        assert_eq!(Value::try_from(Bson::Int64(7)).unwrap(), Value::Number(7.0));
        assert!(Value::try_from(Bson::Document(bson::doc! { "a": 1 })).is_err());
    }

    #[test]
    fn stored_documents_expose_their_id() {
        #[derive(Deserialize)]
        struct Post {
            id: String,
            title: String,
        }

        let stored = StoredDocument::new("p1", crate::document! { "title" => "hi" });
        let post: Post = stored.deserialize().unwrap();

        assert_eq!(post.id, "p1");
        assert_eq!(post.title, "hi");
    }

    #[test]
    fn serde_round_trips_through_json() {
        let value: Value = serde_json::from_str(r#"[1, 2.5, "x", null]"#).unwrap();

        assert_eq!(serde_json::to_string(&value).unwrap(), r#"[1,2.5,"x",null]"#);
    }
}
