//! In-memory schema cache.
//!
//! Two append-only maps shield a slow registry: `id -> schema` for decoding
//! and `(subject, canonical schema) -> id` for registration. A schema id is
//! never redefined by a registry, so entries are kept for the life of the
//! cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::schema::Schema;

#[derive(Debug, Default)]
struct CacheState {
    schemas_by_id: HashMap<u32, Arc<Schema>>,
    ids_by_schema: HashMap<(String, String), u32>,
}

/// Concurrency-safe bidirectional schema cache.
///
/// All state sits behind one mutex, held only for a map operation.
#[derive(Debug, Default)]
pub struct SchemaCache {
    state: Mutex<CacheState>,
}

impl SchemaCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        // The maps hold no invariants a panicking writer could break.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a schema by registry id.
    pub fn lookup_by_id(&self, schema_id: u32) -> Option<Arc<Schema>> {
        self.state().schemas_by_id.get(&schema_id).cloned()
    }

    /// Store a schema under its id, replacing any previous entry.
    pub fn store_by_id(&self, schema_id: u32, schema: Arc<Schema>) -> Arc<Schema> {
        debug!(schema_id, "Caching schema by id");
        self.state()
            .schemas_by_id
            .insert(schema_id, Arc::clone(&schema));
        schema
    }

    /// Look up the id registered for `schema` under `subject`.
    pub fn lookup_id_by_subject_schema(&self, subject: &str, schema: &Schema) -> Option<u32> {
        let key = (subject.to_string(), schema.canonical_form());
        self.state().ids_by_schema.get(&key).copied()
    }

    /// Record the id registered for `schema` under `subject`.
    pub fn store_id_by_subject_schema(&self, subject: &str, schema: &Schema, schema_id: u32) -> u32 {
        debug!(subject, schema_id, "Caching schema id by subject");
        let key = (subject.to_string(), schema.canonical_form());
        self.state().ids_by_schema.insert(key, schema_id);
        schema_id
    }

    /// Number of schemas cached by id.
    pub fn len(&self) -> usize {
        self.state().schemas_by_id.len()
    }

    /// True if no schema is cached by id.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
