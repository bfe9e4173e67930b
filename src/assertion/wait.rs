use std::time::{Duration, Instant};

use tracing::trace;

use crate::error::HarnessError;

pub const DEFAULT_EXPECT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Bounds for a retried observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_EXPECT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl WaitOptions {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }
}

/// How a bounded wait ended, with the last observation either way.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome<T> {
    Ready(T),
    TimedOut(T),
}

impl<T> WaitOutcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, WaitOutcome::Ready(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            WaitOutcome::Ready(t) | WaitOutcome::TimedOut(t) => t,
        }
    }
}

/// Re-run `check` until it reports success or the timeout elapses.
///
/// The check always runs at least once. A check error is an observation
/// like any other: it is retried, and returned only if it is still the
/// latest result when the timeout elapses. Pages that reload mid-check
/// (a form POST, a redirect) fail a read or two before they settle.
pub fn poll_until<T, F>(options: &WaitOptions, mut check: F) -> Result<WaitOutcome<T>, HarnessError>
where
    F: FnMut() -> Result<(bool, T), HarnessError>,
{
    let start = Instant::now();
    loop {
        let latest = match check() {
            Ok((true, observed)) => return Ok(WaitOutcome::Ready(observed)),
            Ok((false, observed)) => Ok(observed),
            Err(e) => Err(e),
        };

        let elapsed = start.elapsed();
        if elapsed >= options.timeout {
            return latest.map(WaitOutcome::TimedOut);
        }
        if let Err(e) = &latest {
            trace!("observation failed, retrying: {}", e);
        }

        let remaining = options.timeout - elapsed;
        std::thread::sleep(options.poll_interval.min(remaining));
    }
}
