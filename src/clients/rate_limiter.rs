use crate::clients::clock::Clock;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Sliding-window limiter: at most `max_calls` within any `period`.
/// `acquire` blocks (through the clock) until a slot is free.
pub struct RateLimiter {
    max_calls: usize,
    period: Duration,
    calls: VecDeque<Instant>,
    clock: Rc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(max_calls: u32, period: Duration, clock: Rc<dyn Clock>) -> Self {
        Self {
            max_calls: max_calls.max(1) as usize,
            period,
            calls: VecDeque::with_capacity(max_calls as usize),
            clock,
        }
    }

    /// Wait for a free slot and record the call. Returns the time spent waiting.
    pub fn acquire(&mut self) -> Duration {
        let mut waited = Duration::ZERO;

        loop {
            let now = self.clock.now();
            self.evict_expired(now);

            if self.calls.len() < self.max_calls {
                self.calls.push_back(now);
                return waited;
            }

            let wait = match self.calls.front() {
                Some(oldest) => (*oldest + self.period).saturating_duration_since(now),
                None => Duration::ZERO,
            };
            debug!(
                "Rate limit of {} calls per {:.1}s reached, waiting {:.2}s",
                self.max_calls,
                self.period.as_secs_f64(),
                wait.as_secs_f64()
            );
            self.clock.sleep(wait);
            waited += wait;
        }
    }

    /// Calls recorded inside the current window.
    pub fn in_flight(&mut self) -> usize {
        let now = self.clock.now();
        self.evict_expired(now);
        self.calls.len()
    }

    fn evict_expired(&mut self, now: Instant) {
        while let Some(oldest) = self.calls.front() {
            if now.duration_since(*oldest) >= self.period {
                self.calls.pop_front();
            } else {
                break;
            }
        }
    }
}
