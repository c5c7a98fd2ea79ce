pub mod activity;
pub mod comment;
pub mod moderation;
pub mod notification;
