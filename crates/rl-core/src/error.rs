use thiserror::Error;

/// Failures at the serialization boundary. Geometry and command operations
/// never fail; they clamp or become no-ops instead.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unknown element type {0:?}")]
    UnknownElementType(String),
    #[error("element is missing required field {0:?}")]
    MissingField(&'static str),
    #[error("container {0} does not exist")]
    UnknownContainer(String),
    #[error("element {0} already exists")]
    DuplicateId(String),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
