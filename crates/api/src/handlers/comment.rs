//! Handlers for comments on ideas and initiatives.
//!
//! Creating or deleting a comment records an activity through the
//! `log_activity` job; notifications follow asynchronously.

use agora_core::activity::ActivityAction;
use agora_core::content::{ContentType, SubjectRef};
use agora_core::error::CoreError;
use agora_core::multiloc::{validate_multiloc, LengthRule, MultilocRules};
use agora_core::types::DbId;
use agora_db::models::comment::{Comment, CreateComment};
use agora_db::repositories::{CommentRepo, IdeaRepo, InitiativeRepo};
use agora_jobs::enqueue_activity_job;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_BODY_LENGTH: usize = 10_000;

/// Body of `POST /{ideas,initiatives}/{id}/comments`.
///
/// `body_multiloc` stays raw JSON so malformed translations come back as
/// field errors rather than a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub body_multiloc: Option<serde_json::Value>,
    pub parent_id: Option<DbId>,
}

fn body_rules() -> MultilocRules {
    MultilocRules {
        presence: true,
        lengths: vec![LengthRule::Maximum(MAX_BODY_LENGTH)],
    }
}

/// POST /api/v1/ideas/{id}/comments
pub async fn create_idea_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(idea_id): Path<DbId>,
    Json(input): Json<CreateCommentRequest>,
) -> AppResult<impl IntoResponse> {
    IdeaRepo::find_by_id(&state.pool, idea_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Idea",
            id: idea_id,
        })?;
    create_comment(&state, &user, ContentType::Idea, idea_id, input).await
}

/// POST /api/v1/initiatives/{id}/comments
pub async fn create_initiative_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(initiative_id): Path<DbId>,
    Json(input): Json<CreateCommentRequest>,
) -> AppResult<impl IntoResponse> {
    InitiativeRepo::find_by_id(&state.pool, initiative_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Initiative",
            id: initiative_id,
        })?;
    create_comment(&state, &user, ContentType::Initiative, initiative_id, input).await
}

async fn create_comment(
    state: &AppState,
    user: &AuthUser,
    post_type: ContentType,
    post_id: DbId,
    input: CreateCommentRequest,
) -> AppResult<(StatusCode, Json<DataResponse<Comment>>)> {
    let body_multiloc = validate_multiloc(input.body_multiloc.as_ref(), &body_rules())
        .map_err(|errors| AppError::field("body_multiloc", errors))?
        .unwrap_or_default();

    if let Some(parent_id) = input.parent_id {
        let parent = CommentRepo::find_by_id(&state.pool, parent_id).await?;
        let same_post = parent
            .is_some_and(|p| p.post_id == post_id && p.post_type == post_type.as_str());
        if !same_post {
            return Err(CoreError::Validation(format!(
                "Parent comment {parent_id} does not belong to this post"
            ))
            .into());
        }
    }

    let mut tx = state.pool.begin().await?;
    let comment = CommentRepo::create(
        &mut *tx,
        &CreateComment {
            post_id,
            post_type: post_type.as_str().to_string(),
            author_id: user.user_id,
            parent_id: input.parent_id,
            body_multiloc,
        },
    )
    .await?;

    enqueue_activity_job(
        &mut *tx,
        SubjectRef::content(ContentType::Comment, comment.id),
        ActivityAction::Created,
        Some(user.user_id),
        comment.created_at,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        comment_id = comment.id,
        post_type = %post_type,
        post_id,
        user_id = user.user_id,
        "Comment created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

/// DELETE /api/v1/comments/{id}
///
/// Only the author or an administrator may delete. Replies go with their
/// parent, and each removed comment gets its own `deleted` activity referring
/// to it by composed identifier since the row is gone.
pub async fn delete_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let comment = CommentRepo::find_by_id(&state.pool, comment_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Comment",
            id: comment_id,
        })?;

    if comment.author_id != Some(user.user_id) && !user.is_admin() {
        return Err(CoreError::Forbidden(
            "Only the author or an admin can delete a comment".into(),
        )
        .into());
    }

    let mut tx = state.pool.begin().await?;
    let removed = CommentRepo::delete_thread(&mut *tx, comment_id).await?;
    if removed.is_empty() {
        return Err(CoreError::NotFound {
            entity: "Comment",
            id: comment_id,
        }
        .into());
    }

    let now = chrono::Utc::now();
    for &id in &removed {
        enqueue_activity_job(
            &mut *tx,
            SubjectRef::deleted(ContentType::Comment, id),
            ActivityAction::Deleted,
            Some(user.user_id),
            now,
        )
        .await?;
    }
    tx.commit().await?;

    tracing::info!(
        comment_id,
        replies = removed.len() - 1,
        user_id = user.user_id,
        "Comment deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
