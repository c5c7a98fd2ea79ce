//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod activity_repo;
pub mod comment_repo;
pub mod content_repo;
pub mod email_delivery_repo;
pub mod idea_repo;
pub mod invite_repo;
pub mod job_repo;
pub mod moderation_repo;
pub mod moderator_repo;
pub mod notification_repo;
pub mod phase_repo;
pub mod project_repo;
pub mod user_repo;

pub use activity_repo::ActivityRepo;
pub use comment_repo::CommentRepo;
pub use content_repo::ContentRepo;
pub use email_delivery_repo::EmailDeliveryRepo;
pub use idea_repo::{IdeaRepo, InitiativeRepo};
pub use invite_repo::InviteRepo;
pub use job_repo::JobRepo;
pub use moderation_repo::ModerationRepo;
pub use moderator_repo::ModeratorRepo;
pub use notification_repo::NotificationRepo;
pub use phase_repo::PhaseRepo;
pub use project_repo::ProjectRepo;
pub use user_repo::UserRepo;
