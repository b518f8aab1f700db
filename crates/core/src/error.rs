use crate::types::DbId;

/// Domain-level error taxonomy.
///
/// Policy and validation failures abort a mutation before any write occurs;
/// the API layer maps each variant to a transport status code.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Blocked by dependent records: {0}")]
    Dependency(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
