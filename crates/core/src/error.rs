//! Domain errors shared by every crate in the workspace.
//!
//! The API maps each variant to an HTTP status. Jobs treat `NotFound` and
//! `Validation` as permanent.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Malformed input such as an unknown content type or a reply to a
    /// comment on another post.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is known but may not see or change the resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Stored data the domain cannot interpret, e.g. a moderation row of an
    /// unknown type.
    #[error("Internal error: {0}")]
    Internal(String),
}
