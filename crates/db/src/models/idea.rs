//! Idea and initiative entity models and DTOs.

use agora_core::multiloc::Multiloc;
use agora_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `ideas` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Idea {
    pub id: DbId,
    pub project_id: DbId,
    pub author_id: Option<DbId>,
    pub slug: String,
    pub title_multiloc: Json<Multiloc>,
    pub body_multiloc: Json<Multiloc>,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateIdea {
    pub project_id: DbId,
    pub author_id: Option<DbId>,
    pub slug: String,
    pub title_multiloc: Multiloc,
    pub body_multiloc: Multiloc,
}

/// A row from the `initiatives` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Initiative {
    pub id: DbId,
    pub author_id: Option<DbId>,
    pub slug: String,
    pub title_multiloc: Json<Multiloc>,
    pub body_multiloc: Json<Multiloc>,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateInitiative {
    pub author_id: Option<DbId>,
    pub slug: String,
    pub title_multiloc: Multiloc,
    pub body_multiloc: Multiloc,
}
