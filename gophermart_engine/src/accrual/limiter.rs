//! An adaptive rate limiter for outgoing accrual requests.
//!
//! The limiter implements the Generic Cell Rate Algorithm (GCRA). Every request is a cell with a "weight" of
//! `t = 60s / requests_per_minute`. The limiter tracks the theoretical arrival time (`tat`) of the next cell, and
//! a request is conforming as long as it does not arrive earlier than `tat - tau`, where `tau = t * burst` is the
//! burst tolerance.
//!
//! The limiter starts out unlimited. The accrual service tells us its limit when it throttles us, at which point the
//! limiter is reconfigured with [`RateLimiter::reconfigure`].
use std::{cmp, time::Duration};

use log::*;
use thiserror::Error;
use tokio::{
    sync::Mutex,
    time::{sleep, Instant},
};
use tokio_util::sync::CancellationToken;

/// Upper bound on the burst size after a reconfiguration.
///
/// The accrual service pairs its per-minute limit with a burst of 10, but a full burst of 10 on a limit below 10
/// requests per minute would let more requests through in the first minute than the service allows. Quotas therefore
/// use `min(MAX_BURST, requests_per_minute)`, which means low limits get a smaller burst than the service would
/// tolerate.
pub const MAX_BURST: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    /// The "weight" of a single request in units of time.
    t: Duration,
    /// The "burst capacity" of the bucket.
    tau: Duration,
}

impl Quota {
    /// A quota of `requests_per_minute`, allowing up to `min(MAX_BURST, requests_per_minute)` back-to-back requests.
    /// Returns `None` if `requests_per_minute` is zero.
    pub fn per_minute(requests_per_minute: u32) -> Option<Self> {
        if requests_per_minute == 0 {
            return None;
        }
        let burst = cmp::min(MAX_BURST, requests_per_minute);
        let t = Duration::from_secs(60) / requests_per_minute;
        Some(Self { t, tau: t * burst })
    }

    pub fn replenish_interval(&self) -> Duration {
        self.t
    }

    pub fn burst(&self) -> u32 {
        (self.tau.as_nanos() / self.t.as_nanos().max(1)) as u32
    }
}

#[derive(Debug, Default)]
struct LimiterState {
    quota: Option<Quota>,
    tat: Option<Instant>,
}

impl LimiterState {
    /// Tests a single cell against the limiter and updates the state if it conforms. Otherwise, returns how long the
    /// caller has to wait before trying again.
    fn test_and_update(&mut self, now: Instant) -> Result<(), Duration> {
        let Some(quota) = self.quota else {
            return Ok(());
        };
        let tat = self.tat.unwrap_or(now + quota.t);
        let earliest = tat.checked_sub(quota.tau).unwrap_or(now);
        if now < earliest {
            return Err(earliest - now);
        }
        self.tat = Some(cmp::max(tat, now) + quota.t);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Error)]
#[error("Cancelled while waiting for the rate limiter")]
pub struct Cancelled;

/// A process-wide rate limiter, shared by reference (usually in an `Arc`) between everyone who calls the accrual
/// service.
#[derive(Debug, Default)]
pub struct RateLimiter {
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    /// Creates a limiter that lets every request through until it is reconfigured.
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: Quota) -> Self {
        Self { state: Mutex::new(LimiterState { quota: Some(quota), tat: None }) }
    }

    pub async fn quota(&self) -> Option<Quota> {
        self.state.lock().await.quota
    }

    /// Replaces the quota with `requests_per_minute`. The bucket starts out full. A value of zero is ignored.
    pub async fn reconfigure(&self, requests_per_minute: u32) {
        let Some(quota) = Quota::per_minute(requests_per_minute) else {
            warn!("🛰️ Ignoring a rate limit of zero requests per minute");
            return;
        };
        let mut state = self.state.lock().await;
        state.quota = Some(quota);
        state.tat = None;
        info!(
            "🛰️ Accrual requests limited to {requests_per_minute}/min (one every {:?}, burst {})",
            quota.t,
            quota.burst()
        );
    }

    /// Takes a token if one is available right now.
    pub async fn check(&self) -> Result<(), Duration> {
        self.state.lock().await.test_and_update(Instant::now())
    }

    /// Waits until a token is available and takes it. The lock is only held while testing, never while sleeping, so
    /// waiting callers do not block each other.
    ///
    /// Returns [`Cancelled`] as soon as `cancel` fires.
    pub async fn until_ready(&self, cancel: &CancellationToken) -> Result<(), Cancelled> {
        loop {
            if cancel.is_cancelled() {
                return Err(Cancelled);
            }
            let wait = match self.check().await {
                Ok(()) => return Ok(()),
                Err(wait) => wait,
            };
            trace!("🛰️ Rate limited. Waiting {wait:?}");
            tokio::select! {
                _ = cancel.cancelled() => return Err(Cancelled),
                _ = sleep(wait) => {},
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn quota_burst_is_capped() {
        let q = Quota::per_minute(5).unwrap();
        assert_eq!(q.replenish_interval(), Duration::from_secs(12));
        assert_eq!(q.burst(), 5);
        let q = Quota::per_minute(600).unwrap();
        assert_eq!(q.replenish_interval(), Duration::from_millis(100));
        assert_eq!(q.burst(), 10);
        assert!(Quota::per_minute(0).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn unlimited_never_waits() {
        let limiter = RateLimiter::unlimited();
        for _ in 0..1000 {
            assert!(limiter.check().await.is_ok());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sixth_request_in_a_minute_is_delayed() {
        let limiter = RateLimiter::unlimited();
        limiter.reconfigure(5).await;
        for i in 0..5 {
            assert!(limiter.check().await.is_ok(), "request {i} should be allowed");
        }
        let wait = limiter.check().await.unwrap_err();
        assert_eq!(wait, Duration::from_secs(12));
        tokio::time::advance(Duration::from_secs(12)).await;
        assert!(limiter.check().await.is_ok());
        assert!(limiter.check().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_leaves_quota_untouched() {
        let limiter = RateLimiter::unlimited();
        limiter.reconfigure(0).await;
        assert!(limiter.quota().await.is_none());
        limiter.reconfigure(30).await;
        limiter.reconfigure(0).await;
        assert_eq!(limiter.quota().await, Quota::per_minute(30));
    }

    #[tokio::test(start_paused = true)]
    async fn until_ready_sleeps_for_the_next_token() {
        let limiter = RateLimiter::with_quota(Quota::per_minute(60).unwrap());
        let cancel = CancellationToken::new();
        let start = Instant::now();
        for _ in 0..10 {
            limiter.until_ready(&cancel).await.unwrap();
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
        limiter.until_ready(&cancel).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn until_ready_is_cancellable() {
        let limiter = Arc::new(RateLimiter::with_quota(Quota::per_minute(1).unwrap()));
        let cancel = CancellationToken::new();
        limiter.until_ready(&cancel).await.unwrap();
        let waiter = {
            let limiter = Arc::clone(&limiter);
            let cancel = cancel.clone();
            tokio::spawn(async move { limiter.until_ready(&cancel).await })
        };
        tokio::time::sleep(Duration::from_secs(5)).await;
        cancel.cancel();
        let result = waiter.await.unwrap();
        assert!(result.is_err());
        assert!(limiter.check().await.is_err());
    }
}
