// Minimum-interval throttle for the translation endpoint.
//
// The public translate endpoint has no documented quota but starts returning
// 429s under bursts. Requests are spaced at least `1 / rate` seconds apart;
// a caller that arrives early sleeps out the remainder.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Spaces requests at a fixed minimum interval. Clones share state.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<Slot>>,
}

struct Slot {
    interval: Duration,
    /// Earliest instant the next request may start
    next_free: Option<Instant>,
}

impl RateLimiter {
    /// Allow `requests_per_second` requests per second. A non-positive rate
    /// disables throttling.
    pub fn new(requests_per_second: f64) -> Self {
        let interval = if requests_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / requests_per_second)
        } else {
            Duration::ZERO
        };
        Self {
            inner: Arc::new(Mutex::new(Slot {
                interval,
                next_free: None,
            })),
        }
    }

    pub async fn acquire(&self) {
        // Reserve a slot under the lock, sleep outside it.
        let wait_until = {
            let mut slot = self.inner.lock().await;
            let now = Instant::now();
            let start = match slot.next_free {
                Some(t) if t > now => t,
                _ => now,
            };
            slot.next_free = Some(start + slot.interval);
            start
        };
        tokio::time::sleep_until(wait_until).await;
    }
}
