use crate::clients::clock::Clock;
use crate::error::{CollectorError, Result};
use crate::settings::{GeocodingSettings, MetricsSettings};
use std::time::Duration;
use tracing::warn;

/// Bounded retry with exponential backoff. Only errors for which
/// `CollectorError::is_transient` holds are retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn exponential(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff,
        }
    }

    /// Same delay between every attempt.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::exponential(max_attempts, delay, delay)
    }

    pub fn for_metrics(settings: &MetricsSettings) -> Self {
        Self::exponential(
            settings.max_attempts,
            Duration::from_millis(settings.initial_backoff_ms),
            Duration::from_millis(settings.max_backoff_ms),
        )
    }

    pub fn for_geocoding(settings: &GeocodingSettings) -> Self {
        Self::fixed(
            settings.max_attempts,
            Duration::from_millis(settings.throttle_backoff_ms),
        )
    }

    /// Delay after the given failed attempt (1-based): initial * 2^(n-1), capped.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Run `op` (given the 1-based attempt number) until it succeeds, fails
    /// permanently, or attempts run out.
    pub fn run<T, F>(&self, clock: &dyn Clock, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Result<T>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(CollectorError::TransientStatus { status, url }) => {
                    if attempt >= self.max_attempts {
                        warn!(
                            "{} still failing with {} after {} attempts",
                            url, status, attempt
                        );
                        return Err(CollectorError::RetriesExhausted {
                            attempts: attempt,
                            status,
                        });
                    }
                    let delay = self.delay_after(attempt);
                    warn!(
                        "Transient {} from {} (attempt {}/{}), retrying in {:.1}s",
                        status,
                        url,
                        attempt,
                        self.max_attempts,
                        delay.as_secs_f64()
                    );
                    clock.sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
