//! Error types and result types for schema-bound model operations.
//!
//! Use [`ModelResult<T>`] as the return type for fallible operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when working with models.
///
/// Validation failures carry the validator's reason verbatim, so
/// `err.to_string()` is exactly the human-readable message (for example
/// `"views is required."`).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A model was registered or used without a name or schema.
    #[error("{0}")]
    Configuration(String),
    /// A document does not match the model's schema.
    #[error("{0}")]
    Validation(String),
    /// The requested document was not found in the collection.
    /// The first argument is the document ID, the second is the collection name.
    #[error("Document {0} not found in collection {1}")]
    NotFound(String, String),
    /// A query entry could not be parsed or translated.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// A value falls outside the supported value kinds.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// Serialization/deserialization error when converting between formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// An error reported by the persistence adapter. Passed through untouched.
    #[error("Backend error: {0}")]
    Backend(String),
    /// Error during adapter initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
}

/// A specialized `Result` type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

impl ModelError {
    /// Returns `true` for [`ModelError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, ModelError::NotFound(..))
    }
}

impl From<BsonError> for ModelError {
    fn from(err: BsonError) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for ModelError {
    fn from(err: SerdeJsonError) -> Self {
        ModelError::Serialization(err.to_string())
    }
}
