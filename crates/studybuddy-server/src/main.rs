mod config;
mod sweep;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use studybuddy_api::auth::{AppState, AppStateInner};
use studybuddy_db::Database;
use studybuddy_matcher::Matcher;
use studybuddy_otp::{ConsoleMailer, HttpMailer, Mailer, OtpConfig, OtpVerifier, SystemClock};
use studybuddy_types::vocabulary::Vocabulary;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "studybuddy_server=debug,studybuddy_api=debug,studybuddy_db=info,studybuddy_otp=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    let db = Arc::new(Database::open(&config.db_path)?);

    let vocabulary = match &config.vocabulary_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let vocab = Vocabulary::from_json(&raw)?;
            info!("Loaded vocabulary from {}", path.display());
            vocab
        }
        None => Vocabulary::default(),
    };

    let mut otp_config = OtpConfig {
        ttl: TimeDelta::seconds(config.otp_ttl_secs),
        max_attempts: config.otp_max_attempts,
        ..OtpConfig::default()
    };

    let mailer: Arc<dyn Mailer> = match config.mail_relay {
        Some(relay) => {
            info!("Sending OTP mail through {}", relay.url);
            let timeout = Duration::from_secs(relay.timeout_secs);
            // The relay's own deadline fires first and reports the real cause.
            otp_config.send_timeout = timeout + Duration::from_secs(5);
            Arc::new(HttpMailer::new(relay.url, relay.api_key, relay.from, timeout)?)
        }
        None => {
            warn!("No mail relay configured, OTP codes will be printed to the log");
            Arc::new(ConsoleMailer)
        }
    };
    let otp = Arc::new(OtpVerifier::new(mailer, Arc::new(SystemClock), otp_config));

    // Background sweep of dead challenges
    tokio::spawn(sweep::run_sweep_loop(
        otp.clone(),
        config.sweep_interval_secs,
        otp_config.ttl,
    ));

    let state: AppState = Arc::new(AppStateInner {
        db,
        otp,
        matcher: Matcher::default(),
        vocabulary,
        jwt_secret: config.jwt_secret,
        email_domain: config.email_domain,
        match_limit: config.match_limit,
    });

    let app = studybuddy_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("StudyBuddy server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
