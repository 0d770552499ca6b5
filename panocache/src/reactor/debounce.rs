//! Restartable quiet-period timer.

use std::time::Duration;

use tokio::time::Instant;

/// Fires once after `window` has passed without a new [`arm`](Self::arm).
///
/// Every `arm` pushes the deadline out again; after firing the timer is idle
/// until armed anew.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Starts or restarts the quiet period.
    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.window);
    }

    /// Completes when the quiet period ends; pending forever while idle.
    ///
    /// Cancel safe: dropping the future keeps the deadline.
    pub async fn fired(&mut self) {
        match self.deadline {
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                self.deadline = None;
            }
            None => std::future::pending().await,
        }
    }
}
