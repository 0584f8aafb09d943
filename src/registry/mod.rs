//! Schema registry collaborator
//!
//! The core only needs two things from a registry: resolve an id to a
//! schema, and register a schema under a subject. [`SchemaRegistry`] is that
//! seam; [`CachingRegistry`] wraps any implementation with a local
//! [`SchemaCache`].

mod cache;
mod caching;
mod memory;
mod traits;

pub use cache::SchemaCache;
pub use caching::CachingRegistry;
pub use memory::InMemoryRegistry;
pub use traits::{BoxedRegistry, SchemaRegistry};
