//! SchemaRegistry trait definition
//!
//! The async interface the core consumes to resolve schema ids and register
//! schemas under a subject.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RegistryError;
use crate::schema::Schema;

/// A source of schemas keyed by registry id.
///
/// Implementations may be slow (network round trips); wrap them in a
/// [`CachingRegistry`](super::CachingRegistry) to avoid repeated fetches.
#[async_trait]
pub trait SchemaRegistry: Send + Sync {
    /// Fetch the schema registered under `schema_id`.
    ///
    /// # Errors
    /// - `RegistryError::NotFound` if no schema has that id
    /// - `RegistryError::Transport` if the registry cannot be reached
    async fn fetch_schema(&self, schema_id: u32) -> Result<Arc<Schema>, RegistryError>;

    /// Register `schema` under `subject`, returning its id.
    ///
    /// Registering a schema that is already known for the subject returns
    /// the existing id.
    async fn register_schema(&self, subject: &str, schema: &Schema) -> Result<u32, RegistryError>;
}

/// A boxed SchemaRegistry for dynamic dispatch
pub type BoxedRegistry = Box<dyn SchemaRegistry>;

#[async_trait]
impl SchemaRegistry for BoxedRegistry {
    async fn fetch_schema(&self, schema_id: u32) -> Result<Arc<Schema>, RegistryError> {
        (**self).fetch_schema(schema_id).await
    }

    async fn register_schema(&self, subject: &str, schema: &Schema) -> Result<u32, RegistryError> {
        (**self).register_schema(subject, schema).await
    }
}

#[async_trait]
impl<R: SchemaRegistry + ?Sized> SchemaRegistry for Arc<R> {
    async fn fetch_schema(&self, schema_id: u32) -> Result<Arc<Schema>, RegistryError> {
        (**self).fetch_schema(schema_id).await
    }

    async fn register_schema(&self, subject: &str, schema: &Schema) -> Result<u32, RegistryError> {
        (**self).register_schema(subject, schema).await
    }
}
