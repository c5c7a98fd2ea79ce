//! Handlers for activity feeds.

use agora_core::content::ContentType;
use agora_core::pagination::Paged;
use agora_core::types::DbId;
use agora_db::models::activity::Activity;
use agora_db::repositories::ActivityRepo;
use axum::extract::{Path, Query, State};
use axum::Json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/ideas/{id}/activities
///
/// Newest first. Activities of a deleted idea stay listed under its id.
pub async fn list_idea_activities(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(idea_id): Path<DbId>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<DataResponse<Paged<Activity>>>> {
    let activities =
        ActivityRepo::list_for_subject(&state.pool, ContentType::Idea, idea_id, params.page())
            .await?;
    Ok(Json(DataResponse { data: activities }))
}
