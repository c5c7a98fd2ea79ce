use std::time::Duration;

use agora_core::scheduling::parse_timezone;
use agora_jobs::RunnerConfig;
use chrono_tz::Tz;

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub database_url: String,
    /// Tenant timezone used for day boundaries.
    pub timezone: Tz,
    /// Scheduler period, also the look-back window of each run.
    pub scheduler_interval: Duration,
    pub runner: RunnerConfig,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default |
    /// |---------------------------|---------|
    /// | `DATABASE_URL`            | --      |
    /// | `TENANT_TIMEZONE`         | `UTC`   |
    /// | `SCHEDULER_INTERVAL_SECS` | `3600`  |
    /// | `JOB_POLL_INTERVAL_MS`    | `1000`  |
    /// | `JOB_MAX_ATTEMPTS`        | `5`     |
    /// | `JOB_LOCK_TIMEOUT_SECS`   | `900`   |
    ///
    /// # Panics
    ///
    /// Panics on missing or malformed values, and on zero intervals, so
    /// misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let timezone = parse_timezone(
            &std::env::var("TENANT_TIMEZONE").unwrap_or_else(|_| "UTC".into()),
        )
        .expect("TENANT_TIMEZONE must be an IANA timezone name");

        let scheduler_interval_secs = positive("SCHEDULER_INTERVAL_SECS", "3600");
        let poll_interval_ms = positive("JOB_POLL_INTERVAL_MS", "1000");
        let max_attempts: i32 = env_or("JOB_MAX_ATTEMPTS", "5")
            .parse()
            .ok()
            .filter(|n| *n > 0)
            .expect("JOB_MAX_ATTEMPTS must be a positive i32");
        let lock_timeout_secs: u64 = env_or("JOB_LOCK_TIMEOUT_SECS", "900")
            .parse()
            .expect("JOB_LOCK_TIMEOUT_SECS must be a valid u64");

        Self {
            database_url,
            timezone,
            scheduler_interval: Duration::from_secs(scheduler_interval_secs),
            runner: RunnerConfig {
                poll_interval: Duration::from_millis(poll_interval_ms),
                max_attempts,
                lock_timeout: Duration::from_secs(lock_timeout_secs),
            },
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read a positive integer setting. Timer periods of zero would panic later
/// inside the spawned tasks.
fn positive(key: &str, default: &str) -> u64 {
    parse_positive(key, &env_or(key, default)).unwrap_or_else(|msg| panic!("{msg}"))
}

fn parse_positive(key: &str, raw: &str) -> Result<u64, String> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(format!("{key} must be greater than zero")),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("{key} must be a valid u64, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_intervals_are_rejected() {
        assert_eq!(
            parse_positive("SCHEDULER_INTERVAL_SECS", "0"),
            Err("SCHEDULER_INTERVAL_SECS must be greater than zero".to_string())
        );
        assert!(parse_positive("JOB_POLL_INTERVAL_MS", "0").is_err());
    }

    #[test]
    fn positive_values_parse() {
        assert_eq!(parse_positive("JOB_POLL_INTERVAL_MS", "250"), Ok(250));
        assert_eq!(parse_positive("SCHEDULER_INTERVAL_SECS", " 60 "), Ok(60));
        assert!(parse_positive("SCHEDULER_INTERVAL_SECS", "-5").is_err());
        assert!(parse_positive("SCHEDULER_INTERVAL_SECS", "hourly").is_err());
    }
}
