//! Field-name sanitization for MongoDB compatibility.
//!
//! MongoDB reserves dots (nested paths) and dollar signs (operators) in field
//! names and rejects null bytes. Document field names are escaped on the way
//! in and restored on the way out; values are stored untouched so filters on
//! them keep working.

use bson::{Bson, Document as BsonDocument};

use docschema_core::{
    error::ModelResult,
    value::{Document, Value},
};

pub(crate) struct FieldNameSanitizer;

impl FieldNameSanitizer {
    const REPLACEMENTS: [(&'static str, &'static str); 3] = [
        (".", "__dot__"),
        ("$", "__dollar__"),
        ("\0", "__null__"),
    ];

    pub(crate) fn sanitize(input: &str) -> String {
        let mut sanitized = input.to_string();
        for (target, replacement) in Self::REPLACEMENTS.iter() {
            sanitized = sanitized.replace(*target, *replacement);
        }
        sanitized
    }

    pub(crate) fn restore(input: &str) -> String {
        let mut restored = input.to_string();
        for (target, replacement) in Self::REPLACEMENTS.iter().rev() {
            restored = restored.replace(*replacement, *target);
        }
        restored
    }

    /// Converts a document body into BSON with escaped field names.
    pub(crate) fn to_bson(document: Document) -> BsonDocument {
        document
            .into_iter()
            .map(|(key, value)| (Self::sanitize(&key), Bson::from(value)))
            .collect()
    }

    /// Converts stored BSON back into a document body, skipping `skip` keys.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDocument` for BSON values outside the supported kinds.
    pub(crate) fn from_bson(document: BsonDocument, skip: &[&str]) -> ModelResult<Document> {
        document
            .into_iter()
            .filter(|(key, _)| !skip.contains(&key.as_str()))
            .map(|(key, value)| Value::try_from(value).map(|value| (Self::restore(&key), value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use docschema_core::document;

    #[test]
    fn reserved_characters_are_escaped_and_restored() {
        let escaped = FieldNameSanitizer::sanitize("price.$usd");

        assert_eq!(escaped, "price__dot____dollar__usd");
        assert_eq!(FieldNameSanitizer::restore(&escaped), "price.$usd");
    }

    #[test]
    fn values_are_left_alone() {
        let bson = FieldNameSanitizer::to_bson(document! { "a.b" => "x.y" });

        assert_eq!(bson, doc! { "a__dot__b": "x.y" });
    }

    #[test]
    fn restoring_skips_internal_keys() {
        let restored = FieldNameSanitizer::from_bson(doc! { "_id": "p1", "a__dot__b": 1 }, &["_id"]).unwrap();

        assert_eq!(restored, document! { "a.b" => 1 });
    }

    #[test]
    fn unsupported_bson_is_rejected() {
        assert!(FieldNameSanitizer::from_bson(doc! { "nested": { "a": 1 } }, &[]).is_err());
    }
}
