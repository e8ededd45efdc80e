//! Trailing-edge debounce for rapid edits
//!
//! Every call to [`Debouncer::settle`] takes a ticket and sleeps for the
//! delay. Only the caller holding the newest ticket when its sleep ends is
//! told to proceed; everyone else was superseded by a later edit.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Default debounce delay
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Debounce controller shared by concurrent edit handlers
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    latest: AtomicU64,
}

impl Debouncer {
    /// Create a debouncer with the given delay
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            latest: AtomicU64::new(0),
        }
    }

    /// Configured delay
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait out the delay; true if no newer call arrived meanwhile
    pub async fn settle(&self) -> bool {
        let ticket = self.bump();
        tokio::time::sleep(self.delay).await;
        self.latest.load(Ordering::SeqCst) == ticket
    }

    /// Supersede every pending [`settle`](Self::settle) call
    pub fn cancel_pending(&self) {
        self.bump();
    }

    fn bump(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst).wrapping_add(1)
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_debouncer_default_delay() {
        assert_eq!(Debouncer::default().delay(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_call_settles() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        assert!(debouncer.settle().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_last_of_rapid_calls_settles() {
        let debouncer = Arc::new(Debouncer::new(Duration::from_millis(300)));

        let first = tokio::spawn({
            let debouncer = Arc::clone(&debouncer);
            async move { debouncer.settle().await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = tokio::spawn({
            let debouncer = Arc::clone(&debouncer);
            async move { debouncer.settle().await }
        });

        assert!(!first.await.unwrap());
        assert!(second.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_pending_supersedes_sleepers() {
        let debouncer = Arc::new(Debouncer::new(Duration::from_millis(300)));
        let pending = tokio::spawn({
            let debouncer = Arc::clone(&debouncer);
            async move { debouncer.settle().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        debouncer.cancel_pending();
        assert!(!pending.await.unwrap());
    }
}
