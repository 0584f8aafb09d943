//! Framed message decoding against a schema registry.
//!
//! [`Messaging`] ties the pieces together: it splits a wire frame into schema
//! id and body, resolves the id through a [`CachingRegistry`], and decodes
//! the body onto a destination with a shared [`Decoder`] session.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::bind::Record;
use crate::error::{FrameError, MessagingError, SchemaError};
use crate::frame::{read_frame, write_frame};
use crate::reader::{Decoder, DecoderConfig};
use crate::registry::{CachingRegistry, SchemaRegistry};
use crate::schema::{parse_schema, Schema};

/// Configuration for [`Messaging`].
#[derive(Debug, Clone, Default)]
pub struct MessagingConfig {
    /// Configuration of the decoder session.
    pub decoder_config: DecoderConfig,
    /// Subject used by [`Messaging::register`] when the caller passes an
    /// empty subject and the schema has no name (default: None).
    pub default_subject: Option<String>,
}

impl MessagingConfig {
    /// Create a new MessagingConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the decoder configuration.
    pub fn with_decoder_config(mut self, config: DecoderConfig) -> Self {
        self.decoder_config = config;
        self
    }

    /// Set the fallback registration subject.
    pub fn with_default_subject(mut self, subject: impl Into<String>) -> Self {
        self.default_subject = Some(subject.into());
        self
    }
}

/// Decoder for registry-framed Avro messages.
///
/// Safe to share across tasks; every method takes `&self`.
///
/// # Example
/// ```
/// use avroframe::avro_record;
/// use avroframe::messaging::{Messaging, MessagingConfig};
/// use avroframe::registry::InMemoryRegistry;
/// use avroframe::schema::parse_schema;
///
/// #[derive(Debug, Default)]
/// struct Event {
///     id: i64,
/// }
/// avro_record!(Event { "id" => id });
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let schema = parse_schema(
///     r#"{"type": "record", "name": "Event", "fields": [{"name": "id", "type": "long"}]}"#,
/// ).unwrap();
/// let messaging = Messaging::new(InMemoryRegistry::new(), MessagingConfig::new());
/// let schema_id = messaging.register("", &schema).await.unwrap();
///
/// let frame = messaging.frame(schema_id, &[0x54]);
/// let mut event = Event::default();
/// messaging.decode(&frame, &mut event).await.unwrap();
/// assert_eq!(event.id, 42);
/// # });
/// ```
#[derive(Debug)]
pub struct Messaging<R> {
    registry: CachingRegistry<R>,
    decoder: Decoder,
    config: MessagingConfig,
}

impl<R: SchemaRegistry> Messaging<R> {
    /// Wrap `registry` in a cache and start a decoder session.
    pub fn new(registry: R, config: MessagingConfig) -> Self {
        Self {
            registry: CachingRegistry::new(registry),
            decoder: Decoder::with_config(config.decoder_config.clone()),
            config,
        }
    }

    /// The caching registry in front of the upstream one.
    pub fn registry(&self) -> &CachingRegistry<R> {
        &self.registry
    }

    /// The configuration.
    pub fn config(&self) -> &MessagingConfig {
        &self.config
    }

    /// Resolve the schema a framed message was written with.
    ///
    /// The frame is validated before the registry is consulted.
    pub async fn schema_for(&self, data: &[u8]) -> Result<(u32, Arc<Schema>), MessagingError> {
        let (schema_id, _) = split_frame(data)?;
        let schema = self.registry.fetch_schema(schema_id).await?;
        Ok((schema_id, schema))
    }

    /// Decode a framed message onto `target` using the writer's schema.
    pub async fn decode<T: Record>(&self, data: &[u8], target: &mut T) -> Result<(), MessagingError> {
        let (schema_id, body) = split_frame(data)?;
        let schema = self.registry.fetch_schema(schema_id).await?;
        debug!(schema_id, len = body.len(), "Decoding message");
        self.decode_body(schema_id, &schema, body, target)
    }

    /// Decode a framed message onto `target` using a locally held schema.
    ///
    /// The embedded schema id is validated but not resolved.
    pub fn decode_with_schema<T: Record>(
        &self,
        data: &[u8],
        target: &mut T,
        schema: &Schema,
    ) -> Result<(), MessagingError> {
        let (schema_id, body) = split_frame(data)?;
        self.decode_body(schema_id, schema, body, target)
    }

    fn decode_body<T: Record>(
        &self,
        schema_id: u32,
        schema: &Schema,
        body: &[u8],
        target: &mut T,
    ) -> Result<(), MessagingError> {
        self.decoder
            .decode_record(target, schema, body)
            .map_err(|source| MessagingError::Decode { schema_id, source })
    }

    /// Register `schema` under `subject`, returning its id.
    ///
    /// An empty subject falls back to the schema's fully-qualified name, then
    /// to the configured default subject.
    pub async fn register(&self, subject: &str, schema: &Schema) -> Result<u32, MessagingError> {
        let subject = self.resolve_subject(subject, schema)?;
        let schema_id = self.registry.register_schema(&subject, schema).await?;
        debug!(subject = %subject, schema_id, "Schema registered");
        Ok(schema_id)
    }

    /// Parse a JSON schema document and register it.
    pub async fn register_json(&self, subject: &str, json: &str) -> Result<u32, MessagingError> {
        let schema = parse_schema(json)?;
        self.register(subject, &schema).await
    }

    /// Frame an already-encoded body for `schema_id`.
    pub fn frame(&self, schema_id: u32, body: &[u8]) -> Bytes {
        write_frame(schema_id, body)
    }

    fn resolve_subject(&self, subject: &str, schema: &Schema) -> Result<String, SchemaError> {
        if !subject.is_empty() {
            return Ok(subject.to_string());
        }
        schema
            .fullname()
            .map(str::to_string)
            .or_else(|| self.config.default_subject.clone())
            .ok_or_else(|| {
                SchemaError::InvalidSchema(
                    "cannot derive a subject from an unnamed schema".to_string(),
                )
            })
    }
}

fn split_frame(data: &[u8]) -> Result<(u32, &[u8]), FrameError> {
    read_frame(data).map_err(|e| {
        warn!(len = data.len(), error = %e, "Rejected frame");
        e
    })
}
