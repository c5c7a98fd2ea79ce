pub mod comment;
pub mod health;
pub mod moderation;
pub mod notification;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /moderations                                 list (admin or project moderator)
/// /moderations/{moderatable_type}/{id}         update status (admin)
///
/// /ideas/{id}/activities                       activity feed
/// /ideas/{id}/comments                         create comment
/// /initiatives/{id}/comments                   create comment
/// /comments/{id}                               delete (author or admin)
///
/// /notifications                               list own notifications
/// /notifications/{id}/read                     mark read
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/moderations", moderation::router())
        .merge(comment::router())
        .nest("/notifications", notification::router())
}
