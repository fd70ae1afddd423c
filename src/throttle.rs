//! Rate limiting for generation calls
//!
//! Two rules apply to every external call: a fixed cool-down after each call,
//! and a sliding one-minute window that never admits more than
//! `calls_per_minute` calls.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::debug;

const WINDOW: Duration = Duration::from_secs(60);

pub struct Throttle {
    delay: Duration,
    calls_per_minute: usize,
    recent: Mutex<VecDeque<Instant>>,
}

impl Throttle {
    pub fn new(delay: Duration, calls_per_minute: u32) -> Self {
        Self {
            delay,
            calls_per_minute: calls_per_minute.max(1) as usize,
            recent: Mutex::new(VecDeque::new()),
        }
    }

    /// No waiting at all. For tests and offline runs.
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO, u32::MAX)
    }

    /// Wait until the window has room, then record a call.
    pub async fn acquire(&self) {
        let mut recent = self.recent.lock().await;
        loop {
            let now = Instant::now();
            while recent.front().is_some_and(|t| now.duration_since(*t) >= WINDOW) {
                recent.pop_front();
            }
            if recent.len() < self.calls_per_minute {
                recent.push_back(now);
                return;
            }
            if let Some(oldest) = recent.front().copied() {
                debug!("Rate limit of {}/min reached, waiting", self.calls_per_minute);
                sleep_until(oldest + WINDOW).await;
            }
        }
    }

    /// The fixed pause taken after each external call.
    pub async fn cool_down(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}
