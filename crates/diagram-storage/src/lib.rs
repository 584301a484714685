use diagram_core::{Graph, GraphDocument, RawDocument};
use thiserror::Error;

mod memory;
mod schema;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Key the diagram is persisted under. Bump the suffix when the stored shape
/// changes incompatibly.
pub const STORAGE_KEY: &str = "dynamic-diagram-flow-v1";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Other error: {0}")]
    Other(String),
}

/// Durable string key-value slot storage.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Persistence gateway for the diagram: one JSON document under one
/// versioned key.
pub struct DiagramStore {
    backend: Box<dyn KeyValueStore>,
    key: String,
}

impl DiagramStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self::with_key(backend, STORAGE_KEY)
    }

    pub fn with_key(backend: impl KeyValueStore + 'static, key: impl Into<String>) -> Self {
        Self {
            backend: Box::new(backend),
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Writes the whole document. View-only fields such as delete hooks are
    /// skipped by serialization.
    pub fn save(&self, doc: &GraphDocument) -> Result<(), StorageError> {
        let value = serde_json::to_string(doc)?;
        self.backend.set(&self.key, &value)?;
        tracing::debug!(
            "Persisted {} nodes and {} edges under {}",
            doc.nodes.len(),
            doc.edges.len(),
            self.key
        );
        Ok(())
    }

    pub fn save_graph(&self, graph: &Graph) -> Result<(), StorageError> {
        self.save(&graph.to_document())
    }

    /// Reads the persisted document. Missing, unreadable and unparsable
    /// entries all come back as `None`.
    pub fn load(&self) -> Option<RawDocument> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!("Failed to read saved diagram: {}", err);
                return None;
            }
        };

        match serde_json::from_str::<RawDocument>(&raw) {
            Ok(doc) => Some(doc),
            Err(err) => {
                tracing::warn!("Failed to parse saved diagram: {}", err);
                None
            }
        }
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.backend.remove(&self.key)
    }
}

#[cfg(test)]
mod tests;
