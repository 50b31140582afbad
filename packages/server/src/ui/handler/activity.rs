//! Last-activity marker shared by the two halves of a connection.
//!
//! Frames read from the client and frames pushed to it both count as
//! activity; the idle deadline is measured from whichever happened last.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use tokio::time::Instant;

#[derive(Debug)]
pub struct Activity {
    origin: Instant,
    /// Milliseconds since `origin` of the latest activity
    last_millis: AtomicU64,
}

impl Activity {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            last_millis: AtomicU64::new(0),
        }
    }

    /// Record activity now.
    pub fn touch(&self) {
        let elapsed = u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.last_millis.fetch_max(elapsed, Ordering::Relaxed);
    }

    pub fn last(&self) -> Instant {
        self.origin + Duration::from_millis(self.last_millis.load(Ordering::Relaxed))
    }

    /// Instant at which the connection counts as idle unless touched again.
    pub fn deadline(&self, idle_timeout: Duration) -> Instant {
        self.last() + idle_timeout
    }

    pub fn is_idle(&self, idle_timeout: Duration) -> bool {
        self.deadline(idle_timeout) <= Instant::now()
    }
}

impl Default for Activity {
    fn default() -> Self {
        Self::new()
    }
}
