use std::time::{Duration, Instant};

/// Trailing-edge debounce handle for document persistence.
///
/// Holds at most one pending deadline; queueing again replaces it, which
/// cancels the earlier one.
#[derive(Debug)]
pub(super) struct PersistDebouncer {
    delay: Duration,
    pending: Option<Instant>,
}

impl PersistDebouncer {
    pub(super) const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub(super) const fn delay(&self) -> Duration {
        self.delay
    }

    pub(super) fn queue(&mut self, now: Instant) {
        self.pending = Some(now + self.delay);
    }

    pub(super) const fn deadline(&self) -> Option<Instant> {
        self.pending
    }

    /// Returns true (and disarms) once the pending deadline has passed.
    pub(super) fn take_ready(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(due) if now >= due => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Disarm without waiting. Returns whether anything was pending.
    pub(super) const fn take_pending(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
