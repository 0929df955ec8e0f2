//! Fixed-interval polling bounded by a wall-clock deadline.
//!
//! A probe runs immediately, then once per interval for as long as the
//! deadline has not passed. The sleep between probes races a cancellation
//! token so a caller can abandon the wait early.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(31);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self { Self { interval: DEFAULT_POLL_INTERVAL, timeout: DEFAULT_WAIT_TIMEOUT } }
}

#[derive(Debug, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Ready(T),
    TimedOut { attempts: u32 },
    Cancelled { attempts: u32 },
}

/// Runs `probe` until it yields `Some`, the deadline passes, or `cancel` fires.
///
/// The deadline starts when this function is called. Probe errors end the
/// loop and are returned as-is.
pub async fn poll_until<T, E, F, Fut>(policy: &PollPolicy, cancel: &CancellationToken, mut probe: F) -> Result<PollOutcome<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let deadline = Instant::now() + policy.timeout;
    let mut attempts = 0u32;
    while Instant::now() < deadline {
        if cancel.is_cancelled() { return Ok(PollOutcome::Cancelled { attempts }); }
        attempts += 1;
        if let Some(v) = probe().await? { return Ok(PollOutcome::Ready(v)); }
        debug!(attempts, interval_ms = policy.interval.as_millis() as u64, "poll.pending");
        tokio::select! {
            _ = cancel.cancelled() => return Ok(PollOutcome::Cancelled { attempts }),
            _ = tokio::time::sleep(policy.interval) => {}
        }
    }
    Ok(PollOutcome::TimedOut { attempts })
}
