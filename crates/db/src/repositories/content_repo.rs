//! Existence checks across content tables.

use agora_core::content::ContentType;
use agora_core::types::DbId;
use sqlx::PgPool;

/// Polymorphic lookups keyed by [`ContentType`].
pub struct ContentRepo;

impl ContentRepo {
    /// Whether a row of `content_type` with `id` exists.
    pub async fn exists(
        pool: &PgPool,
        content_type: ContentType,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        // Table names come from a closed enum, never from input.
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
            content_type.table()
        );
        sqlx::query_scalar(&query).bind(id).fetch_one(pool).await
    }
}
