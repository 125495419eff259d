use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;

use crate::error::OtpError;

/// Where an issued code sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeState {
    NoChallenge,
    Pending,
    Verified,
    Expired,
    Exhausted,
}

/// A single issued code. Replaced wholesale on every send.
#[derive(Clone)]
pub struct OtpChallenge {
    code: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub attempts_remaining: u32,
    pub consumed: bool,
}

impl OtpChallenge {
    pub fn issue(code: String, now: DateTime<Utc>, ttl: TimeDelta, max_attempts: u32) -> Self {
        Self {
            code,
            issued_at: now,
            expires_at: now + ttl,
            attempts_remaining: max_attempts,
            consumed: false,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn state(&self, now: DateTime<Utc>) -> ChallengeState {
        if self.consumed {
            ChallengeState::Verified
        } else if self.attempts_remaining == 0 {
            ChallengeState::Exhausted
        } else if now > self.expires_at {
            ChallengeState::Expired
        } else {
            ChallengeState::Pending
        }
    }

    /// Verified and still inside the window the code was issued for.
    pub fn is_verified(&self, now: DateTime<Utc>) -> bool {
        self.consumed && now <= self.expires_at
    }

    /// Check `submitted` against the stored code, consuming it on success.
    pub fn verify(&mut self, submitted: &str, now: DateTime<Utc>) -> Result<(), OtpError> {
        match self.state(now) {
            ChallengeState::Verified => return Err(OtpError::AlreadyConsumed),
            ChallengeState::Exhausted => return Err(OtpError::Exhausted),
            ChallengeState::Expired => return Err(OtpError::Expired),
            ChallengeState::Pending | ChallengeState::NoChallenge => {}
        }

        if !codes_equal(&self.code, submitted) {
            self.attempts_remaining -= 1;
            return Err(OtpError::CodeMismatch);
        }

        self.consumed = true;
        Ok(())
    }
}

impl fmt::Debug for OtpChallenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtpChallenge")
            .field("code", &"******")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .field("attempts_remaining", &self.attempts_remaining)
            .field("consumed", &self.consumed)
            .finish()
    }
}

/// Uniform over `000000..=999999`, zero-padded.
pub fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{:06}", n)
}

// Length check leaks only the length, which is fixed at six.
fn codes_equal(expected: &str, submitted: &str) -> bool {
    let (a, b) = (expected.as_bytes(), submitted.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge(now: DateTime<Utc>) -> OtpChallenge {
        OtpChallenge::issue("012345".into(), now, TimeDelta::minutes(10), 3)
    }

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..1000 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn verify_consumes_once() {
        let now = Utc::now();
        let mut c = challenge(now);
        assert_eq!(c.state(now), ChallengeState::Pending);

        assert_eq!(c.verify("012345", now), Ok(()));
        assert_eq!(c.state(now), ChallengeState::Verified);
        assert!(c.is_verified(now));
        assert_eq!(c.verify("012345", now), Err(OtpError::AlreadyConsumed));
    }

    #[test]
    fn leading_zero_is_significant() {
        let now = Utc::now();
        let mut c = challenge(now);
        assert_eq!(c.verify("12345", now), Err(OtpError::CodeMismatch));
        assert_eq!(c.verify("012345", now), Ok(()));
    }

    #[test]
    fn expiry_is_strictly_after_deadline() {
        let now = Utc::now();
        let mut c = challenge(now);
        let deadline = now + TimeDelta::minutes(10);
        assert_eq!(c.state(deadline), ChallengeState::Pending);

        let late = deadline + TimeDelta::seconds(1);
        assert_eq!(c.verify("012345", late), Err(OtpError::Expired));
        assert!(!c.consumed);
    }

    #[test]
    fn verification_lapses_with_the_code() {
        let now = Utc::now();
        let mut c = challenge(now);
        c.verify("012345", now).unwrap();
        assert!(!c.is_verified(now + TimeDelta::minutes(11)));
    }

    #[test]
    fn wrong_guesses_exhaust_the_code() {
        let now = Utc::now();
        let mut c = challenge(now);
        for _ in 0..3 {
            assert_eq!(c.verify("999999", now), Err(OtpError::CodeMismatch));
        }
        assert_eq!(c.state(now), ChallengeState::Exhausted);
        assert_eq!(c.verify("012345", now), Err(OtpError::Exhausted));
    }

    #[test]
    fn debug_output_hides_the_code() {
        let c = challenge(Utc::now());
        assert!(!format!("{:?}", c).contains("012345"));
    }
}
