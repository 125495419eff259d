use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use studybuddy_types::models::OtpPurpose;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::challenge::{ChallengeState, OtpChallenge, generate_code};
use crate::clock::Clock;
use crate::error::{MailError, OtpError};
use crate::mailer::{Mailer, OTP_SUBJECT, otp_body};

#[derive(Debug, Clone, Copy)]
pub struct OtpConfig {
    pub ttl: TimeDelta,
    /// Wrong guesses allowed per issued code.
    pub max_attempts: u32,
    /// Upper bound on one mail dispatch. The key stays locked while the
    /// mailer runs, so this also bounds how long other calls on it wait.
    pub send_timeout: Duration,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl: TimeDelta::minutes(10),
            max_attempts: 5,
            send_timeout: Duration::from_secs(15),
        }
    }
}

/// Returned by a successful send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpIssued {
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct OtpKey {
    email: String,
    purpose: OtpPurpose,
}

impl OtpKey {
    fn new(email: &str, purpose: OtpPurpose) -> Self {
        Self {
            email: email.to_string(),
            purpose,
        }
    }
}

type Slot = Arc<Mutex<Option<OtpChallenge>>>;

/// Issues and checks one-time codes.
///
/// Every `(email, purpose)` key has its own async mutex, so operations on
/// one key are linearized while different keys never wait on each other.
/// The outer map lock is only held long enough to look up or insert a slot.
pub struct OtpVerifier {
    slots: RwLock<HashMap<OtpKey, Slot>>,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
    config: OtpConfig,
}

impl OtpVerifier {
    pub fn new(mailer: Arc<dyn Mailer>, clock: Arc<dyn Clock>, config: OtpConfig) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            mailer,
            clock,
            config,
        }
    }

    pub fn config(&self) -> OtpConfig {
        self.config
    }

    async fn slot(&self, key: OtpKey) -> Slot {
        if let Some(slot) = self.slots.read().await.get(&key) {
            return slot.clone();
        }
        self.slots.write().await.entry(key).or_default().clone()
    }

    async fn existing_slot(&self, key: &OtpKey) -> Option<Slot> {
        self.slots.read().await.get(key).cloned()
    }

    /// Issue a fresh code and mail it, replacing any earlier challenge.
    ///
    /// The key stays locked until the mail is dispatched. If delivery fails
    /// nothing is stored and the previous challenge, if any, is untouched.
    pub async fn send(&self, email: &str, purpose: OtpPurpose) -> Result<OtpIssued, OtpError> {
        let slot = self.slot(OtpKey::new(email, purpose)).await;
        let mut current = slot.lock().await;

        let challenge = OtpChallenge::issue(
            generate_code(),
            self.clock.now(),
            self.config.ttl,
            self.config.max_attempts,
        );
        let body = otp_body(purpose, challenge.code(), self.config.ttl);

        let delivery = tokio::time::timeout(
            self.config.send_timeout,
            self.mailer.send_mail(email, OTP_SUBJECT, &body),
        )
        .await
        .unwrap_or_else(|_| {
            Err(MailError::Transport(format!(
                "no response within {:?}",
                self.config.send_timeout
            )))
        });
        delivery.map_err(|e| {
            warn!("Failed to deliver {} code to {}: {}", purpose, email, e);
            OtpError::DeliveryFailed(e.to_string())
        })?;

        let issued = OtpIssued {
            issued_at: challenge.issued_at,
            expires_at: challenge.expires_at,
        };
        if current.replace(challenge).is_some() {
            debug!("Replaced earlier {} code for {}", purpose, email);
        }
        info!("Issued {} code for {}", purpose, email);
        Ok(issued)
    }

    /// Check a submitted code. On success the challenge is consumed.
    pub async fn verify(
        &self,
        email: &str,
        purpose: OtpPurpose,
        submitted: &str,
    ) -> Result<(), OtpError> {
        let slot = self
            .existing_slot(&OtpKey::new(email, purpose))
            .await
            .ok_or(OtpError::NoActiveChallenge)?;
        let mut current = slot.lock().await;
        let challenge = current.as_mut().ok_or(OtpError::NoActiveChallenge)?;

        match challenge.verify(submitted, self.clock.now()) {
            Ok(()) => {
                info!("Verified {} code for {}", purpose, email);
                Ok(())
            }
            Err(e) => {
                debug!(
                    "Rejected {} code for {}: {} ({} attempts left)",
                    purpose, email, e, challenge.attempts_remaining
                );
                Err(e)
            }
        }
    }

    /// Whether `email` has a verified, unexpired code for `purpose`.
    pub async fn is_verified(&self, email: &str, purpose: OtpPurpose) -> bool {
        let Some(slot) = self.existing_slot(&OtpKey::new(email, purpose)).await else {
            return false;
        };
        let current = slot.lock().await;
        current
            .as_ref()
            .is_some_and(|c| c.is_verified(self.clock.now()))
    }

    /// Consume a verified, unexpired challenge in one step.
    ///
    /// Returns `true` to exactly one caller per verification; the challenge
    /// is removed under the same lock that checked it.
    pub async fn take_verified(&self, email: &str, purpose: OtpPurpose) -> bool {
        let Some(slot) = self.existing_slot(&OtpKey::new(email, purpose)).await else {
            return false;
        };
        let mut current = slot.lock().await;
        let now = self.clock.now();
        if current.as_ref().is_some_and(|c| c.is_verified(now)) {
            current.take();
            info!("Redeemed {} verification for {}", purpose, email);
            true
        } else {
            false
        }
    }

    pub async fn state(&self, email: &str, purpose: OtpPurpose) -> ChallengeState {
        let Some(slot) = self.existing_slot(&OtpKey::new(email, purpose)).await else {
            return ChallengeState::NoChallenge;
        };
        let current = slot.lock().await;
        current
            .as_ref()
            .map_or(ChallengeState::NoChallenge, |c| c.state(self.clock.now()))
    }

    /// Drop the challenge once the flow it gated has completed.
    pub async fn clear(&self, email: &str, purpose: OtpPurpose) {
        if let Some(slot) = self.existing_slot(&OtpKey::new(email, purpose)).await {
            slot.lock().await.take();
        }
    }

    /// Remove empty slots and challenges that expired more than `grace` ago.
    ///
    /// Slots that are locked or referenced by an in-flight operation are
    /// kept; they will be looked at again on the next sweep.
    pub async fn purge_stale(&self, grace: TimeDelta) -> usize {
        let now = self.clock.now();
        let mut slots = self.slots.write().await;
        let before = slots.len();

        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            let keep = match slot.try_lock() {
                Ok(current) => current
                    .as_ref()
                    .is_some_and(|c| c.expires_at + grace >= now),
                Err(_) => true,
            };
            keep
        });

        before - slots.len()
    }
}
