//! One-time passcode verification keyed by `(email, purpose)`.

pub mod challenge;
pub mod clock;
pub mod error;
pub mod mailer;
pub mod verifier;

pub use challenge::{ChallengeState, OtpChallenge};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{MailError, OtpError};
pub use mailer::{ConsoleMailer, HttpMailer, Mailer, MemoryMailer};
pub use verifier::{OtpConfig, OtpIssued, OtpVerifier};
