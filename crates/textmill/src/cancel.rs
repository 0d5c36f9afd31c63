use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared by one batch of jobs.
///
/// Set once by the consumer, read at well-defined boundary points by every
/// worker and pipeline step. Never preemptive: units already running when
/// the flag is set complete normally and their output is discarded.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Clears the flag. Called by the orchestrator before a new batch starts.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_starts_unset() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_is_visible_through_clones() {
        let token = CancelToken::new();
        let observer = token.clone();

        token.cancel();
        assert!(observer.is_cancelled());
    }

    #[test]
    fn test_reset_clears_flag() {
        let token = CancelToken::new();
        token.cancel();
        token.reset();
        assert!(!token.is_cancelled());
    }
}
