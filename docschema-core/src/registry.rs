//! The model factory.
//!
//! A [`Registry`] holds the adapter, the pluralizer and the [`ModelOptions`]
//! that every model it creates shares. Registering a model pluralizes its
//! name into the collection name and attaches the schema.
//!
//! # Example
//!
//! ```ignore
//! use docschema::{memory::InMemoryAdapter, prelude::*};
//!
//! let registry = Registry::builder()
//!     .adapter(InMemoryAdapter::new())
//!     .options(ModelOptions::default())
//!     .build()?;
//!
//! let posts = registry.model("post", schema)?;
//! assert_eq!(posts.name(), Some("posts"));
//! ```

use log::debug;
use std::{fmt, sync::Arc};

use crate::{
    adapter::PersistenceAdapter,
    error::{ModelError, ModelResult},
    model::{Model, ModelOptions, NAME_REQUIRED},
    pluralize::{EnglishPluralizer, Pluralize},
    schema::SchemaDescriptor,
};

const SCHEMA_REQUIRED: &str = "Schema is required";

/// Produces named, schema-bound [`Model`]s over one shared adapter.
///
/// Registries keep no record of what they produced: registering the same
/// name twice yields two independent models.
pub struct Registry<A: ?Sized> {
    adapter: Arc<A>,
    pluralizer: Arc<dyn Pluralize>,
    options: ModelOptions,
}

impl<A: ?Sized> Clone for Registry<A> {
    fn clone(&self) -> Self {
        Self {
            adapter: Arc::clone(&self.adapter),
            pluralizer: Arc::clone(&self.pluralizer),
            options: self.options,
        }
    }
}

impl<A: ?Sized> fmt::Debug for Registry<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("pluralizer", &self.pluralizer)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<A: PersistenceAdapter + ?Sized> Registry<A> {
    /// Creates a registry with the English pluralizer and default options.
    pub fn new(adapter: Arc<A>) -> Self {
        Self {
            adapter,
            pluralizer: Arc::new(EnglishPluralizer::new()),
            options: ModelOptions::default(),
        }
    }

    pub fn builder() -> RegistryBuilder<A> {
        RegistryBuilder::new()
    }

    pub fn adapter(&self) -> &Arc<A> {
        &self.adapter
    }

    pub fn options(&self) -> ModelOptions {
        self.options
    }

    /// Creates a model for `name` bound to `schema`.
    ///
    /// The collection name is the plural of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Configuration`] when `name` is empty, when its
    /// plural is empty, or when `schema` is `None`.
    pub fn register(&self, name: &str, schema: Option<Arc<SchemaDescriptor>>) -> ModelResult<Model<A>> {
        if name.is_empty() {
            return Err(ModelError::Configuration(NAME_REQUIRED.to_string()));
        }

        let schema = schema.ok_or_else(|| ModelError::Configuration(SCHEMA_REQUIRED.to_string()))?;

        let collection = self.pluralizer.plural(name);
        if collection.is_empty() {
            return Err(ModelError::Configuration(NAME_REQUIRED.to_string()));
        }

        debug!("registering model {name} as collection {collection}");

        let model = Model::new(schema, Arc::clone(&self.adapter), self.options);
        model.set_name(collection)?;

        Ok(model)
    }

    /// [`register`](Self::register) for a schema that is known to be present.
    pub fn model(&self, name: &str, schema: impl Into<Arc<SchemaDescriptor>>) -> ModelResult<Model<A>> {
        self.register(name, Some(schema.into()))
    }
}

/// Builder for [`Registry`].
///
/// An adapter is required; the pluralizer defaults to [`EnglishPluralizer`]
/// and the options to [`ModelOptions::default`].
pub struct RegistryBuilder<A: ?Sized> {
    adapter: Option<Arc<A>>,
    pluralizer: Option<Arc<dyn Pluralize>>,
    options: ModelOptions,
}

impl<A: ?Sized> Default for RegistryBuilder<A> {
    fn default() -> Self {
        Self {
            adapter: None,
            pluralizer: None,
            options: ModelOptions::default(),
        }
    }
}

impl<A: PersistenceAdapter + ?Sized> RegistryBuilder<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an adapter the registry takes ownership of.
    pub fn adapter(mut self, adapter: A) -> Self
    where
        A: Sized,
    {
        self.adapter = Some(Arc::new(adapter));
        self
    }

    /// Sets an adapter that is already shared, e.g. an `Arc<dyn PersistenceAdapter>`.
    pub fn shared_adapter(mut self, adapter: Arc<A>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn pluralizer(mut self, pluralizer: impl Pluralize + 'static) -> Self {
        self.pluralizer = Some(Arc::new(pluralizer));
        self
    }

    pub fn options(mut self, options: ModelOptions) -> Self {
        self.options = options;
        self
    }

    /// # Errors
    ///
    /// Returns [`ModelError::Initialization`] when no adapter was set.
    pub fn build(self) -> ModelResult<Registry<A>> {
        let adapter = self
            .adapter
            .ok_or_else(|| ModelError::Initialization("Registry requires a persistence adapter".to_string()))?;

        Ok(Registry {
            adapter,
            pluralizer: self
                .pluralizer
                .unwrap_or_else(|| Arc::new(EnglishPluralizer::new())),
            options: self.options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapter::SharedAdapter,
        pluralize::Verbatim,
        query::Constraint,
        schema::FieldType,
        value::{Document, StoredDocument},
    };
    use async_trait::async_trait;

    #[derive(Debug, Default)]
    struct NullAdapter;

    #[async_trait]
    impl PersistenceAdapter for NullAdapter {
        async fn list_documents(&self, _: &str, _: Vec<Constraint>) -> ModelResult<Vec<StoredDocument>> {
            Ok(Vec::new())
        }

        async fn read_document(&self, collection: &str, id: &str) -> ModelResult<StoredDocument> {
            Err(ModelError::NotFound(id.to_string(), collection.to_string()))
        }

        async fn create_document(&self, _: &str, _: Document, id: Option<String>) -> ModelResult<String> {
            Ok(id.unwrap_or_default())
        }

        async fn update_document(&self, _: &str, _: &str, _: Document) -> ModelResult<()> {
            Ok(())
        }

        async fn delete_document(&self, _: &str, _: &str) -> ModelResult<()> {
            Ok(())
        }
    }

    fn schema() -> Arc<SchemaDescriptor> {
        Arc::new(
            SchemaDescriptor::builder()
                .field("title", FieldType::String)
                .build(),
        )
    }

    fn registry() -> Registry<NullAdapter> {
        Registry::new(Arc::new(NullAdapter))
    }

    #[test]
    fn names_are_pluralized() {
        let registry = registry();

        assert_eq!(registry.model("post", schema()).unwrap().name(), Some("posts"));
        assert_eq!(registry.model("category", schema()).unwrap().name(), Some("categories"));
        assert_eq!(registry.model("person", schema()).unwrap().name(), Some("people"));
    }

    #[test]
    fn empty_names_are_rejected() {
        let err = registry().model("", schema()).unwrap_err();

        assert_eq!(err, ModelError::Configuration("Model name is required".to_string()));
    }

    #[test]
    fn blank_plurals_are_rejected() {
        let err = registry().model("   ", schema()).unwrap_err();

        assert_eq!(err.to_string(), "Model name is required");
    }

    #[test]
    fn missing_schemas_are_rejected() {
        let err = registry().register("post", None).unwrap_err();

        assert_eq!(err, ModelError::Configuration("Schema is required".to_string()));
    }

    #[test]
    fn repeated_registration_shares_the_schema() {
        let registry = registry();
        let schema = schema();

        let first = registry.model("post", Arc::clone(&schema)).unwrap();
        let second = registry.model("post", Arc::clone(&schema)).unwrap();

        assert_eq!(first.name(), second.name());
        assert!(Arc::ptr_eq(first.schema(), second.schema()));
        assert!(Arc::ptr_eq(first.adapter(), second.adapter()));
    }

    #[test]
    fn builder_requires_an_adapter() {
        let err = RegistryBuilder::<NullAdapter>::new()
            .build()
            .unwrap_err();

        assert!(matches!(err, ModelError::Initialization(_)));
    }

    #[test]
    fn builder_accepts_pluralizer_and_options() {
        let options = ModelOptions {
            apply_defaults: false,
            ..ModelOptions::default()
        };
        let registry = Registry::builder()
            .adapter(NullAdapter)
            .pluralizer(Verbatim)
            .options(options)
            .build()
            .unwrap();

        let model = registry.model("post", schema()).unwrap();

        assert_eq!(model.name(), Some("post"));
        assert_eq!(model.options(), options);
    }

    #[test]
    fn shared_dyn_adapters_are_accepted() {
        let adapter: SharedAdapter = Arc::new(NullAdapter);
        let registry = Registry::builder()
            .shared_adapter(adapter)
            .build()
            .unwrap();

        assert_eq!(registry.model("tag", schema()).unwrap().name(), Some("tags"));
    }
}
