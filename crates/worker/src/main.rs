//! Background worker: claims queued jobs and runs the periodic scheduler.

use std::sync::Arc;
use std::time::Duration;

use agora_jobs::{
    ActivityScheduler, CampaignSender, EmailConfig, JobRunner, LogMailer, Mailer, SmtpMailer,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use config::WorkerConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agora_worker=debug,agora_jobs=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = WorkerConfig::from_env();
    tracing::info!(
        timezone = %config.timezone,
        scheduler_interval_secs = config.scheduler_interval.as_secs(),
        max_attempts = config.runner.max_attempts,
        "Loaded worker configuration"
    );

    // --- Database ---
    let pool = agora_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    agora_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    agora_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    // --- Email ---
    let mailer: Arc<dyn Mailer> = match EmailConfig::from_env() {
        Some(email_config) => {
            tracing::info!(smtp_host = %email_config.smtp_host, "Using SMTP mailer");
            Arc::new(SmtpMailer::new(email_config).expect("Failed to build SMTP transport"))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, campaign emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    // --- Services ---
    let cancel = CancellationToken::new();
    let sender = Arc::new(CampaignSender::new(pool.clone(), mailer));

    let runner = JobRunner::new(pool.clone(), sender, config.runner);
    let runner_cancel = cancel.clone();
    let runner_handle = tokio::spawn(async move { runner.run(runner_cancel).await });

    let scheduler = ActivityScheduler::new(pool, config.timezone, config.scheduler_interval);
    let scheduler_cancel = cancel.clone();
    let scheduler_handle = tokio::spawn(async move { scheduler.run(scheduler_cancel).await });

    tracing::info!("Worker started (job runner, activity scheduler)");

    shutdown_signal().await;
    cancel.cancel();

    let _ = tokio::time::timeout(Duration::from_secs(30), runner_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), scheduler_handle).await;
    tracing::info!("Worker stopped");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
