//! Schema-bound models.
//!
//! A [`Model`] ties a collection name to a [`SchemaDescriptor`] and a
//! [`PersistenceAdapter`]. Writes are validated against the schema before the
//! adapter sees them; reads translate the query DSL into constraints.
//!
//! Models are normally produced by a [`Registry`](crate::registry::Registry),
//! which pluralizes the name and shares its adapter and options.
//!
//! # Example
//!
//! ```ignore
//! use docschema::{document, prelude::*};
//!
//! let posts = registry.model("post", schema)?;
//! let id = posts.add(document! { "title" => "hi", "views" => 0 }, None).await?;
//! posts.edit(document! { "views" => 1 }, &id).await?;
//!
//! let popular = posts
//!     .get(Query::builder().filter(Filter::gt("views", 0)).build())
//!     .await?;
//! ```

use log::{debug, trace};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{
    fmt,
    sync::{Arc, OnceLock},
};

use crate::{
    adapter::PersistenceAdapter,
    error::{ModelError, ModelResult},
    query::Query,
    schema::SchemaDescriptor,
    validate::{MissingRequired, validate_document},
    value::{Document, StoredDocument, to_document},
};

pub(crate) const NAME_REQUIRED: &str = "Model name is required";

/// Write-time behavior shared by every model of a registry.
///
/// Deserializable, so it can live in a JSON config file:
///
/// ```json
/// { "missingRequired": "ignore", "applyDefaults": false }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelOptions {
    /// How `add` treats required fields left out of the input.
    pub missing_required: MissingRequired,
    /// Whether `add` fills absent fields with their schema defaults.
    pub apply_defaults: bool,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            missing_required: MissingRequired::Reject,
            apply_defaults: true,
        }
    }
}

/// A named collection whose writes are checked against a schema.
///
/// # Type Parameters
///
/// * `A` - The persistence adapter. May be unsized, e.g. `dyn PersistenceAdapter`.
pub struct Model<A: ?Sized> {
    name: OnceLock<String>,
    schema: Arc<SchemaDescriptor>,
    adapter: Arc<A>,
    options: ModelOptions,
}

impl<A: ?Sized> Clone for Model<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            schema: Arc::clone(&self.schema),
            adapter: Arc::clone(&self.adapter),
            options: self.options,
        }
    }
}

impl<A: ?Sized> fmt::Debug for Model<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name.get())
            .field("schema", &self.schema)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<A: PersistenceAdapter + ?Sized> Model<A> {
    /// Creates an unnamed model. Every operation fails until [`set_name`](Self::set_name) is called.
    pub fn new(schema: Arc<SchemaDescriptor>, adapter: Arc<A>, options: ModelOptions) -> Self {
        Self {
            name: OnceLock::new(),
            schema,
            adapter,
            options,
        }
    }

    /// Creates a model bound to the collection `name`, used as given.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Configuration`] when `name` is empty.
    pub fn with_name(
        name: impl Into<String>,
        schema: Arc<SchemaDescriptor>,
        adapter: Arc<A>,
        options: ModelOptions,
    ) -> ModelResult<Self> {
        let model = Self::new(schema, adapter, options);
        model.set_name(name)?;
        Ok(model)
    }

    /// The collection name, if one has been set.
    pub fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    /// Names the model. A model can be named once.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Configuration`] for an empty name or when the
    /// model already has one.
    pub fn set_name(&self, name: impl Into<String>) -> ModelResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(ModelError::Configuration(NAME_REQUIRED.to_string()));
        }

        self.name
            .set(name)
            .map_err(|name| ModelError::Configuration(format!("Model is already named, cannot rename to {name}")))
    }

    pub fn schema(&self) -> &Arc<SchemaDescriptor> {
        &self.schema
    }

    pub fn adapter(&self) -> &Arc<A> {
        &self.adapter
    }

    pub fn options(&self) -> ModelOptions {
        self.options
    }

    fn collection(&self) -> ModelResult<&str> {
        self.name
            .get()
            .map(String::as_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ModelError::Configuration(NAME_REQUIRED.to_string()))
    }

    /// Lists the documents matching `query`, in the order the query asks for.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidQuery`] for an untranslatable entry, or the
    /// adapter's error unchanged.
    pub async fn get(&self, query: impl Into<Query>) -> ModelResult<Vec<StoredDocument>> {
        let collection = self.collection()?;
        let constraints = query.into().translate()?;

        trace!("listing {collection} with {} constraint(s)", constraints.len());

        self.adapter
            .list_documents(collection, constraints)
            .await
    }

    /// Reads one document.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFound`] when the document does not exist.
    pub async fn get_one(&self, id: &str) -> ModelResult<StoredDocument> {
        let collection = self.collection()?;

        trace!("reading {collection}/{id}");

        self.adapter
            .read_document(collection, id)
            .await
    }

    /// Validates and stores a new document, returning its ID.
    ///
    /// With an explicit `id` any document already stored under it is
    /// replaced. Without one the adapter picks the ID.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Validation`] with the first failing field's reason.
    /// Nothing reaches the adapter in that case.
    pub async fn add(&self, mut data: Document, id: Option<&str>) -> ModelResult<String> {
        let collection = self.collection()?;

        if self.options.apply_defaults {
            self.schema.apply_defaults(&mut data);
        }

        validate_document(&self.schema, &data, self.options.missing_required).into_result()?;

        let id = self
            .adapter
            .create_document(collection, data, id.map(str::to_string))
            .await?;

        debug!("added {collection}/{id}");

        Ok(id)
    }

    /// Validates `data` and merges it into the stored document `id`.
    ///
    /// Only the supplied fields are checked, so a partial update does not
    /// have to repeat required fields. Defaults are never applied.
    pub async fn edit(&self, data: Document, id: &str) -> ModelResult<()> {
        let collection = self.collection()?;

        validate_document(&self.schema, &data, MissingRequired::Ignore).into_result()?;

        self.adapter
            .update_document(collection, id, data)
            .await?;

        debug!("edited {collection}/{id}");

        Ok(())
    }

    /// Deletes a document. Deleting a missing document succeeds.
    pub async fn delete(&self, id: &str) -> ModelResult<()> {
        let collection = self.collection()?;

        self.adapter
            .delete_document(collection, id)
            .await?;

        debug!("deleted {collection}/{id}");

        Ok(())
    }

    /// [`add`](Self::add) for any serializable value.
    ///
    /// `None` fields serialize to null, so optional struct fields usually
    /// want `#[serde(skip_serializing_if = "Option::is_none")]`.
    pub async fn add_typed<T: Serialize>(&self, value: &T, id: Option<&str>) -> ModelResult<String> {
        self.add(to_document(value)?, id).await
    }

    /// [`get_one`](Self::get_one), deserialized into `T`. The ID is exposed as `id`.
    pub async fn get_one_typed<T: DeserializeOwned>(&self, id: &str) -> ModelResult<T> {
        self.get_one(id)
            .await?
            .deserialize()
    }

    /// [`get`](Self::get), deserialized into `T`.
    pub async fn get_typed<T: DeserializeOwned>(&self, query: impl Into<Query>) -> ModelResult<Vec<T>> {
        self.get(query)
            .await?
            .iter()
            .map(StoredDocument::deserialize)
            .collect()
    }
}
