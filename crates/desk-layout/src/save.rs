use std::time::Duration;

const DEFAULT_DELAY: Duration = Duration::from_millis(300);

/// Coalesces bursts of save requests into one write.
///
/// Every request re-arms the delay; [`SaveDebouncer::poll`] reports a save
/// once the delay has passed without another request.
#[derive(Debug, Clone)]
pub struct SaveDebouncer {
    delay: Duration,
    pending_since: Option<Duration>,
}

impl Default for SaveDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl SaveDebouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending_since: None,
        }
    }

    pub fn request(&mut self, now: Duration) {
        self.pending_since = Some(now);
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// True exactly once per burst, when it is time to write.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.pending_since {
            Some(since) if now.saturating_sub(since) >= self.delay => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }
}
