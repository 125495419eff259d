use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use tracing::debug;

use studybuddy_otp::OtpVerifier;

/// Background task that drops long-dead OTP challenges.
///
/// Expiry itself is checked on every verify; this only bounds memory.
/// Challenges are kept for `grace` past their expiry so late attempts still
/// see `Expired` instead of "no active code".
pub async fn run_sweep_loop(otp: Arc<OtpVerifier>, interval_secs: u64, grace: TimeDelta) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));

    loop {
        interval.tick().await;

        let purged = otp.purge_stale(grace).await;
        if purged > 0 {
            debug!("Sweep: dropped {} stale OTP challenges", purged);
        }
    }
}
