//! Caching decorator over any [`SchemaRegistry`].
//!
//! Fetches go to the upstream registry at most once per schema id for as
//! long as the decorator lives. Concurrent misses for the same id share a
//! single in-flight upstream call.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::cache::SchemaCache;
use super::traits::SchemaRegistry;
use crate::error::RegistryError;
use crate::schema::Schema;

type Flight = Arc<OnceCell<Arc<Schema>>>;

enum Joined {
    Cached(Arc<Schema>),
    Flight(Flight),
}

/// A [`SchemaRegistry`] that caches an upstream registry.
pub struct CachingRegistry<R> {
    upstream: R,
    cache: SchemaCache,
    inflight: Mutex<HashMap<u32, Flight>>,
}

impl<R: SchemaRegistry> CachingRegistry<R> {
    /// Wrap `upstream` with an empty cache.
    pub fn new(upstream: R) -> Self {
        Self {
            upstream,
            cache: SchemaCache::new(),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// The wrapped registry.
    pub fn upstream(&self) -> &R {
        &self.upstream
    }

    /// The local cache.
    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// Unwrap the decorator, discarding the cache.
    pub fn into_inner(self) -> R {
        self.upstream
    }

    /// Join the in-flight fetch for `schema_id`, starting one if none exists.
    ///
    /// A flight stores into the cache before it is removed from `inflight`,
    /// so checking the cache under the `inflight` lock sees every landed
    /// flight.
    fn join_flight(&self, schema_id: u32) -> Joined {
        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(schema) = self.cache.lookup_by_id(schema_id) {
            return Joined::Cached(schema);
        }
        if let Some(flight) = inflight.get(&schema_id) {
            debug!(schema_id, "Joining in-flight schema fetch");
            return Joined::Flight(Arc::clone(flight));
        }
        let flight: Flight = Arc::new(OnceCell::new());
        inflight.insert(schema_id, Arc::clone(&flight));
        Joined::Flight(flight)
    }

    fn land_flight(&self, schema_id: u32, flight: &Flight) {
        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        // A later flight may already have replaced ours after a failure.
        if inflight
            .get(&schema_id)
            .is_some_and(|current| Arc::ptr_eq(current, flight))
        {
            inflight.remove(&schema_id);
        }
    }
}

impl<R> std::fmt::Debug for CachingRegistry<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingRegistry")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<R: SchemaRegistry> SchemaRegistry for CachingRegistry<R> {
    async fn fetch_schema(&self, schema_id: u32) -> Result<Arc<Schema>, RegistryError> {
        if let Some(schema) = self.cache.lookup_by_id(schema_id) {
            return Ok(schema);
        }

        let flight = match self.join_flight(schema_id) {
            Joined::Cached(schema) => return Ok(schema),
            Joined::Flight(flight) => flight,
        };
        let result = flight
            .get_or_try_init(|| async {
                info!(schema_id, "Fetching schema from registry");
                let schema = self.upstream.fetch_schema(schema_id).await?;
                Ok::<_, RegistryError>(self.cache.store_by_id(schema_id, schema))
            })
            .await
            .map(Arc::clone);
        self.land_flight(schema_id, &flight);

        if let Err(e) = &result {
            warn!(schema_id, error = %e, "Schema fetch failed");
        }
        result
    }

    async fn register_schema(&self, subject: &str, schema: &Schema) -> Result<u32, RegistryError> {
        if let Some(schema_id) = self.cache.lookup_id_by_subject_schema(subject, schema) {
            return Ok(schema_id);
        }

        info!(subject, "Registering schema");
        let schema_id = self.upstream.register_schema(subject, schema).await?;
        self.cache
            .store_id_by_subject_schema(subject, schema, schema_id);
        if self.cache.lookup_by_id(schema_id).is_none() {
            self.cache.store_by_id(schema_id, Arc::new(schema.clone()));
        }
        Ok(schema_id)
    }
}
