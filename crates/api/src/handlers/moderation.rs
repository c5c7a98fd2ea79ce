//! Handlers for the `/moderations` resource.
//!
//! Administrators see every item. Project moderators see the ideas of the
//! projects they moderate and the comments on those ideas. Only
//! administrators may change a status.

use agora_core::error::CoreError;
use agora_core::moderation::{
    ModeratableType, ModerationFilter, ModerationItem, ModerationScope, ModerationStatus,
};
use agora_core::pagination::{Page, Paged};
use agora_core::types::DbId;
use agora_db::repositories::{ModerationRepo, ModeratorRepo};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /moderations`.
#[derive(Debug, Deserialize)]
pub struct ModerationQuery {
    /// Comma-separated list, e.g. `Idea,Comment`. Absent means every type.
    pub moderatable_types: Option<String>,
    pub moderation_status: Option<String>,
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
}

impl ModerationQuery {
    fn filter(&self) -> Result<ModerationFilter, CoreError> {
        let moderatable_types = match &self.moderatable_types {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse)
                .collect::<Result<Vec<ModeratableType>, _>>()?,
            None => Vec::new(),
        };
        let status = self
            .moderation_status
            .as_deref()
            .map(str::parse::<ModerationStatus>)
            .transpose()?;
        Ok(ModerationFilter {
            moderatable_types,
            status,
        })
    }
}

/// Body of `PATCH /moderations/{moderatable_type}/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateModerationStatus {
    pub moderation_status: ModerationStatus,
}

/// Resolve what `user` may see in the moderation queue.
async fn scope_for(state: &AppState, user: &AuthUser) -> AppResult<ModerationScope> {
    if user.is_admin() {
        return Ok(ModerationScope::All);
    }
    let project_ids = ModeratorRepo::project_ids_for_user(&state.pool, user.user_id).await?;
    if project_ids.is_empty() {
        return Err(CoreError::Forbidden("Moderator role required".into()).into());
    }
    Ok(ModerationScope::Projects(project_ids))
}

/// GET /api/v1/moderations
pub async fn list_moderations(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ModerationQuery>,
) -> AppResult<Json<DataResponse<Paged<ModerationItem>>>> {
    let scope = scope_for(&state, &user).await?;
    let filter = params.filter()?;
    let page = Page::new(params.page_number, params.page_size);

    let rows = ModerationRepo::list(&state.pool, &scope, &filter, page).await?;
    let items = rows
        .items
        .into_iter()
        .map(ModerationItem::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(DataResponse {
        data: Paged {
            items,
            total: rows.total,
        },
    }))
}

/// PATCH /api/v1/moderations/{moderatable_type}/{id}
///
/// Returns the item with its new status, or 404 if no such item exists.
pub async fn update_moderation_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((moderatable_type, id)): Path<(String, DbId)>,
    Json(input): Json<UpdateModerationStatus>,
) -> AppResult<Json<DataResponse<ModerationItem>>> {
    let moderatable_type: ModeratableType = moderatable_type.parse()?;
    let not_found = || CoreError::NotFound {
        entity: "Moderation",
        id,
    };

    let previous = ModerationRepo::status_for(&state.pool, moderatable_type, id).await?;
    if !ModerationRepo::set_status(&state.pool, moderatable_type, id, input.moderation_status)
        .await?
    {
        return Err(not_found().into());
    }

    let row = ModerationRepo::find(&state.pool, moderatable_type, id)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(
        user_id = admin.user_id,
        moderatable_type = %moderatable_type,
        moderatable_id = id,
        from = %previous,
        to = %input.moderation_status,
        "Moderation status updated"
    );

    Ok(Json(DataResponse {
        data: ModerationItem::try_from(row)?,
    }))
}
