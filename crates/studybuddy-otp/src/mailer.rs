use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeDelta;
use serde::Serialize;
use studybuddy_types::models::OtpPurpose;
use tracing::{info, warn};

use crate::error::MailError;

pub const OTP_SUBJECT: &str = "StudyBuddy - Email Verification Code";

/// Outbound mail collaborator used to deliver codes.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_mail(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

pub fn otp_body(purpose: OtpPurpose, code: &str, ttl: TimeDelta) -> String {
    let action = match purpose {
        OtpPurpose::Registration => "complete your registration",
        OtpPurpose::Login => "sign in",
    };
    format!(
        "Use the verification code below to {action} on StudyBuddy:\n\n    {code}\n\n\
         This code will expire in {}. If you didn't request this \
         verification, please ignore this email.\n",
        describe_ttl(ttl)
    )
}

fn describe_ttl(ttl: TimeDelta) -> String {
    let secs = ttl.num_seconds();
    let (n, unit) = if secs % 60 == 0 {
        (secs / 60, "minute")
    } else {
        (secs, "second")
    };
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// Development mailer: writes the message to the log instead of sending it.
#[derive(Debug, Default)]
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send_mail(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        warn!("[DEV MODE] mail to {} ({}):\n{}", to, subject, body);
        Ok(())
    }
}

/// Posts messages as JSON to an HTTP mail relay.
pub struct HttpMailer {
    client: reqwest::Client,
    relay_url: String,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl HttpMailer {
    /// `timeout` bounds the whole request; connecting gets at most half of it.
    pub fn new(
        relay_url: String,
        api_key: String,
        from: String,
        timeout: Duration,
    ) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout / 2)
            .timeout(timeout)
            .build()
            .map_err(|e| MailError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            relay_url,
            api_key,
            from,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_mail(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let resp = self
            .client
            .post(&self.relay_url)
            .bearer_auth(&self.api_key)
            .json(&RelayMessage {
                from: &self.from,
                to,
                subject,
                text: body,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MailError::Transport(format!("relay timed out: {e}"))
                } else {
                    MailError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MailError::Rejected(status.as_u16()));
        }

        info!("Mail relayed to {}", to);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Keeps every message in memory. Can be switched into a failing mode.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    outbox: Mutex<Vec<SentMail>>,
    failing: AtomicBool,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.outbox.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The six-digit code in the most recent message to `to`.
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        let outbox = self.outbox.lock().unwrap_or_else(|e| e.into_inner());
        let mail = outbox.iter().rev().find(|m| m.to == to)?;
        mail.body
            .split(|c: char| !c.is_ascii_digit())
            .find(|run| run.len() == 6)
            .map(str::to_string)
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send_mail(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MailError::Transport("connection refused".into()));
        }
        self.outbox
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SentMail {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
        Ok(())
    }
}
