// src/watch/debounce.rs

use std::time::Duration;

use tokio::time::Instant;

/// Cancel-and-restart quiet-period deadline.
///
/// Every `reset` pushes the deadline to `now + quiet`, so a flush only
/// happens once no event has arrived for a full quiet period, however long
/// the burst before it lasted.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    pub fn reset(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn clear(&mut self) {
        self.deadline = None;
    }
}
