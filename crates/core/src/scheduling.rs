//! Scan windows for the periodic activity scheduler.
//!
//! Every scheduler run looks back over `since` (normally the trigger
//! interval) from "now" in the tenant's timezone. Date-based events only fire
//! on the run whose window crosses midnight; invite reminders fire for
//! invites whose age passes the reminder delay inside the window.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Age after which an unaccepted invite triggers a reminder activity.
pub const INVITE_REMINDER_DELAY_DAYS: i64 = 3;

/// How far ahead an upcoming phase is announced.
pub const UPCOMING_PHASE_LEAD_DAYS: i64 = 7;

/// Parse an IANA timezone name such as `"Europe/Brussels"`.
pub fn parse_timezone(name: &str) -> Result<Tz, CoreError> {
    name.parse::<Tz>()
        .map_err(|e| CoreError::Validation(format!("Invalid timezone '{name}': {e}")))
}

/// The `[now - since, now]` interval of one scheduler run.
#[derive(Debug, Clone, Copy)]
pub struct ScanWindow {
    now: DateTime<Tz>,
    last_time: DateTime<Tz>,
}

impl ScanWindow {
    pub fn new(now: Timestamp, since: Duration, tz: Tz) -> Self {
        let now = now.with_timezone(&tz);
        Self {
            now,
            last_time: now - since,
        }
    }

    pub fn now_utc(&self) -> Timestamp {
        self.now.with_timezone(&Utc)
    }

    /// Tenant-local calendar date of "now".
    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    /// Whether the window starts on an earlier tenant-local date than it ends.
    ///
    /// Only such a run may emit date-bound activities; this keeps repeated
    /// runs during the same day from emitting them again.
    pub fn crosses_day_boundary(&self) -> bool {
        self.now.date_naive() != self.last_time.date_naive()
    }

    /// Start date of phases announced as upcoming on this run.
    pub fn upcoming_date(&self) -> NaiveDate {
        self.today() + Duration::days(UPCOMING_PHASE_LEAD_DAYS)
    }

    /// Creation interval `[last_time - 3 days, now - 3 days]` (UTC) of
    /// invites that become due for a reminder on this run.
    pub fn invite_window(&self) -> (Timestamp, Timestamp) {
        let delay = Duration::days(INVITE_REMINDER_DELAY_DAYS);
        (
            (self.last_time - delay).with_timezone(&Utc),
            (self.now - delay).with_timezone(&Utc),
        )
    }

    /// Midnight of `date` in the tenant timezone, as UTC.
    pub fn start_of_day(&self, date: NaiveDate) -> Timestamp {
        let tz = self.now.timezone();
        let naive = date.and_time(NaiveTime::MIN);
        tz.from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
    }
}
