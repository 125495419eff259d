use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

pub struct MailRelay {
    pub url: String,
    pub api_key: String,
    pub from: String,
    pub timeout_secs: u64,
}

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub email_domain: String,
    pub otp_ttl_secs: i64,
    pub otp_max_attempts: u32,
    pub match_limit: usize,
    pub mail_relay: Option<MailRelay>,
    pub vocabulary_path: Option<PathBuf>,
    pub sweep_interval_secs: u64,
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

fn parsed<T>(name: &str, default: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var_or(name, default)
        .parse()
        .with_context(|| format!("{} is not a valid value", name))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let jwt_secret = std::env::var("STUDYBUDDY_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("STUDYBUDDY_JWT_SECRET is unset or still a placeholder");
        }

        let mail_relay = match std::env::var("STUDYBUDDY_MAIL_RELAY_URL") {
            Ok(url) if !url.is_empty() => Some(MailRelay {
                url,
                api_key: std::env::var("STUDYBUDDY_MAIL_API_KEY")
                    .context("STUDYBUDDY_MAIL_API_KEY is required with a mail relay")?,
                from: var_or("STUDYBUDDY_MAIL_FROM", "StudyBuddy <no-reply@studybuddy.local>"),
                timeout_secs: parsed("STUDYBUDDY_MAIL_TIMEOUT_SECS", "10")?,
            }),
            _ => None,
        };

        let otp_ttl_secs: i64 = parsed("STUDYBUDDY_OTP_TTL_SECS", "600")?;
        if otp_ttl_secs <= 0 {
            bail!("STUDYBUDDY_OTP_TTL_SECS must be positive");
        }

        Ok(Self {
            host: var_or("STUDYBUDDY_HOST", "0.0.0.0"),
            port: parsed("STUDYBUDDY_PORT", "5001")?,
            db_path: var_or("STUDYBUDDY_DB_PATH", "studybuddy.db").into(),
            jwt_secret,
            email_domain: var_or("STUDYBUDDY_EMAIL_DOMAIN", ".nthu.edu.tw").to_lowercase(),
            otp_ttl_secs,
            otp_max_attempts: parsed("STUDYBUDDY_OTP_MAX_ATTEMPTS", "5")?,
            match_limit: parsed("STUDYBUDDY_MATCH_LIMIT", "3")?,
            mail_relay,
            vocabulary_path: std::env::var("STUDYBUDDY_VOCABULARY_PATH").ok().map(PathBuf::from),
            sweep_interval_secs: parsed("STUDYBUDDY_SWEEP_INTERVAL_SECS", "300")?,
        })
    }
}
