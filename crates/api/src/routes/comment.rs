//! Routes for post comments and the idea activity feed.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{activity, comment};
use crate::state::AppState;

/// ```text
/// GET    /ideas/{id}/activities        -> list_idea_activities
/// POST   /ideas/{id}/comments          -> create_idea_comment
/// POST   /initiatives/{id}/comments    -> create_initiative_comment
/// DELETE /comments/{id}                -> delete_comment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ideas/{id}/activities", get(activity::list_idea_activities))
        .route("/ideas/{id}/comments", post(comment::create_idea_comment))
        .route(
            "/initiatives/{id}/comments",
            post(comment::create_initiative_comment),
        )
        .route("/comments/{id}", delete(comment::delete_comment))
}
