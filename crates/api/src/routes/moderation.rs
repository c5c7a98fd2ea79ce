//! Route definitions for the `/moderations` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::moderation;
use crate::state::AppState;

/// Routes mounted at `/moderations`.
///
/// ```text
/// GET    /                            -> list_moderations
/// PATCH  /{moderatable_type}/{id}     -> update_moderation_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(moderation::list_moderations))
        .route(
            "/{moderatable_type}/{id}",
            patch(moderation::update_moderation_status),
        )
}
