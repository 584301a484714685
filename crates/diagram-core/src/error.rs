use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Invalid metadata: expected nodes[] and edges[]")]
    InvalidImport,
    #[error("Invalid JSON file")]
    InvalidJson(#[source] serde_json::Error),
    #[error("Duplicate node id: {0}")]
    DuplicateNodeId(String),
    #[error("Duplicate edge id: {0}")]
    DuplicateEdgeId(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DiagramError {
    /// Errors caused by user-supplied documents; these are shown to the user
    /// and leave the graph untouched.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            DiagramError::InvalidImport | DiagramError::InvalidJson(_)
        )
    }
}
