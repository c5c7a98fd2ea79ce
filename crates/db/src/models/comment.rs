//! Comment entity model and DTOs.

use agora_core::multiloc::Multiloc;
use agora_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub post_id: DbId,
    /// `Idea` or `Initiative`.
    pub post_type: String,
    pub author_id: Option<DbId>,
    pub parent_id: Option<DbId>,
    pub body_multiloc: Json<Multiloc>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO for a comment. `body_multiloc` is validated by the caller.
#[derive(Debug, Clone)]
pub struct CreateComment {
    pub post_id: DbId,
    pub post_type: String,
    pub author_id: DbId,
    pub parent_id: Option<DbId>,
    pub body_multiloc: Multiloc,
}
