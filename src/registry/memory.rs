//! In-memory schema registry.
//!
//! Serves schemas from a map and assigns sequential ids on registration.
//! Supports latency simulation and transport-error injection for exercising
//! the caching layer.
//!
//! Usage in tests:
//!   let registry = InMemoryRegistry::new()
//!       .with_schema(1, schema)
//!       .with_transport_failures(2);

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::debug;

use super::traits::SchemaRegistry;
use crate::error::RegistryError;
use crate::schema::Schema;

#[derive(Debug, Default)]
struct Registrations {
    schemas: HashMap<u32, Arc<Schema>>,
    subjects: HashMap<(String, String), u32>,
    /// None once `u32::MAX` has been handed out or seeded
    next_id: Option<u32>,
}

impl Registrations {
    fn allocate_id(&mut self) -> Option<u32> {
        let id = self.next_id?;
        self.next_id = id.checked_add(1);
        Some(id)
    }
}

/// A registry backed by in-process maps.
#[derive(Debug)]
pub struct InMemoryRegistry {
    state: Mutex<Registrations>,
    /// Remaining fetches that fail with a transport error
    failures_remaining: AtomicUsize,
    fetch_count: AtomicUsize,
    register_count: AtomicUsize,
    latency: Option<Duration>,
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRegistry {
    /// Create an empty registry. The first registered schema gets id 1.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Registrations {
                next_id: Some(1),
                ..Default::default()
            }),
            failures_remaining: AtomicUsize::new(0),
            fetch_count: AtomicUsize::new(0),
            register_count: AtomicUsize::new(0),
            latency: None,
        }
    }

    /// Serve `schema` under a fixed id.
    pub fn with_schema(self, schema_id: u32, schema: Schema) -> Self {
        {
            let mut state = self.state();
            state.schemas.insert(schema_id, Arc::new(schema));
            // Ids are handed out above every seeded id.
            if state.next_id.is_some_and(|next| next <= schema_id) {
                state.next_id = schema_id.checked_add(1);
            }
        }
        self
    }

    /// Fail the next `count` fetches with `RegistryError::Transport`.
    pub fn with_transport_failures(self, count: usize) -> Self {
        self.failures_remaining.store(count, Ordering::SeqCst);
        self
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of `fetch_schema` calls made, including failed ones.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Number of `register_schema` calls made.
    pub fn register_count(&self) -> usize {
        self.register_count.load(Ordering::SeqCst)
    }

    fn state(&self) -> MutexGuard<'_, Registrations> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_failure(&self) -> bool {
        self.failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            sleep(latency).await;
        }
    }
}

#[async_trait]
impl SchemaRegistry for InMemoryRegistry {
    async fn fetch_schema(&self, schema_id: u32) -> Result<Arc<Schema>, RegistryError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.take_failure() {
            return Err(RegistryError::Transport(format!(
                "injected failure fetching schema {}",
                schema_id
            )));
        }

        self.state()
            .schemas
            .get(&schema_id)
            .cloned()
            .ok_or(RegistryError::NotFound(schema_id))
    }

    async fn register_schema(&self, subject: &str, schema: &Schema) -> Result<u32, RegistryError> {
        self.register_count.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let key = (subject.to_string(), schema.canonical_form());
        let mut state = self.state();
        if let Some(&existing) = state.subjects.get(&key) {
            return Ok(existing);
        }

        // The same schema under another subject keeps its id.
        let existing = state
            .schemas
            .iter()
            .find(|(_, s)| s.canonical_form() == key.1)
            .map(|(id, _)| *id);
        let schema_id = match existing {
            Some(id) => id,
            None => {
                let id = state.allocate_id().ok_or_else(|| {
                    RegistryError::Transport("schema id space exhausted".to_string())
                })?;
                state.schemas.insert(id, Arc::new(schema.clone()));
                id
            }
        };
        state.subjects.insert(key, schema_id);
        debug!(subject, schema_id, "Registered schema");
        Ok(schema_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, RecordType, Type};

    fn schema(name: &str) -> Schema {
        Schema::record(RecordType::new(name, vec![Field::new("a", Type::Long)]))
    }

    #[tokio::test]
    async fn test_fetch_known_and_unknown() {
        let registry = InMemoryRegistry::new().with_schema(5, schema("A"));
        let fetched = registry.fetch_schema(5).await.unwrap();
        assert_eq!(fetched.fullname(), Some("A"));
        assert_eq!(
            registry.fetch_schema(6).await.unwrap_err(),
            RegistryError::NotFound(6)
        );
        assert_eq!(registry.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_register_assigns_sequential_ids() {
        let registry = InMemoryRegistry::new();
        assert_eq!(registry.register_schema("s", &schema("A")).await.unwrap(), 1);
        assert_eq!(registry.register_schema("s", &schema("B")).await.unwrap(), 2);
        assert_eq!(registry.register_schema("s", &schema("A")).await.unwrap(), 1);
        assert_eq!(registry.register_schema("t", &schema("A")).await.unwrap(), 1);
        assert_eq!(registry.register_count(), 4);

        let fetched = registry.fetch_schema(2).await.unwrap();
        assert_eq!(fetched.fullname(), Some("B"));
    }

    #[tokio::test]
    async fn test_register_after_fixed_ids() {
        let registry = InMemoryRegistry::new().with_schema(10, schema("A"));
        assert_eq!(registry.register_schema("s", &schema("B")).await.unwrap(), 11);
    }

    #[tokio::test]
    async fn test_register_never_reuses_max_id() {
        let registry = InMemoryRegistry::new().with_schema(u32::MAX, schema("A"));
        assert!(matches!(
            registry.register_schema("s", &schema("B")).await,
            Err(RegistryError::Transport(_))
        ));
        let kept = registry.fetch_schema(u32::MAX).await.unwrap();
        assert_eq!(kept.fullname(), Some("A"));

        // The same schema keeps its seeded id.
        assert_eq!(
            registry.register_schema("s", &schema("A")).await.unwrap(),
            u32::MAX
        );
    }

    #[tokio::test]
    async fn test_seeding_below_next_id_keeps_sequence() {
        let registry = InMemoryRegistry::new().with_schema(10, schema("A"));
        let registry = registry.with_schema(3, schema("B"));
        assert_eq!(registry.register_schema("s", &schema("C")).await.unwrap(), 11);
    }

    #[tokio::test]
    async fn test_injected_failures_run_out() {
        let registry = InMemoryRegistry::new()
            .with_schema(1, schema("A"))
            .with_transport_failures(2);

        assert!(matches!(
            registry.fetch_schema(1).await,
            Err(RegistryError::Transport(_))
        ));
        assert!(matches!(
            registry.fetch_schema(1).await,
            Err(RegistryError::Transport(_))
        ));
        assert!(registry.fetch_schema(1).await.is_ok());
        assert_eq!(registry.fetch_count(), 3);
    }
}
