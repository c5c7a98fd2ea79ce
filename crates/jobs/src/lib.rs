//! Background work for the activity & moderation backend.
//!
//! - [`payload`]: the [`JobPayload`] envelope stored in the `jobs` table.
//! - [`log_activity`]: persists one activity per domain event.
//! - [`notifications`]: turns activities into notifications and campaigns.
//! - [`campaigns`]: campaign definitions and the [`CampaignSender`].
//! - [`scheduler`]: the periodic [`ActivityScheduler`].
//! - [`runner`]: the [`JobRunner`] claiming and dispatching jobs.
//! - [`delivery`]: email transports.

pub mod campaigns;
pub mod delivery;
pub mod error;
pub mod log_activity;
pub mod notifications;
pub mod payload;
pub mod runner;
pub mod scheduler;

pub use campaigns::{CampaignKind, CampaignSender, SendOutcome};
pub use delivery::email::{EmailConfig, EmailError, LogMailer, Mailer, OutgoingEmail, SmtpMailer};
pub use error::JobError;
pub use log_activity::{enqueue_activity_job, LogActivity, LogActivityArgs};
pub use notifications::{MakeNotifications, NotificationSummary};
pub use payload::JobPayload;
pub use runner::{JobRunner, RunnerConfig};
pub use scheduler::ActivityScheduler;
