// Request pacing for model calls.
//
// Hosted model APIs often cap requests per second per key. When
// TITLER_REQUESTS_PER_SECOND is set, every call through OpenAiInvoker waits
// for its turn here, so a wide fan-out does not burst past the provider limit.
// Each acquire reserves the next free instant, so concurrent callers are
// spaced out instead of all waking at once.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Enforces a minimum interval between consecutive requests.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_slot: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    /// Allow at most `requests_per_second` requests per second.
    /// Returns None for zero, negative or non-finite rates.
    pub fn per_second(requests_per_second: f64) -> Option<Self> {
        if !requests_per_second.is_finite() || requests_per_second <= 0.0 {
            return None;
        }
        Some(Self {
            interval: Duration::from_secs_f64(1.0 / requests_per_second),
            next_slot: Arc::new(Mutex::new(None)),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until this caller's reserved slot arrives.
    pub async fn acquire(&self) {
        let wait_until = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(reserved) if reserved > now => reserved,
                _ => now,
            };
            *next = Some(slot + self.interval);
            slot
        };
        // Lock is released before sleeping so other callers can reserve
        tokio::time::sleep_until(wait_until).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_rates() {
        assert!(RateLimiter::per_second(0.0).is_none());
        assert!(RateLimiter::per_second(-2.0).is_none());
        assert!(RateLimiter::per_second(f64::NAN).is_none());
        assert!(RateLimiter::per_second(f64::INFINITY).is_none());
    }

    #[tokio::test]
    async fn first_request_is_immediate() {
        let limiter = RateLimiter::per_second(1.0).unwrap();
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn second_request_waits_one_interval() {
        let limiter = RateLimiter::per_second(5.0).unwrap(); // 200ms apart
        limiter.acquire().await;
        let start = Instant::now();
        limiter.acquire().await;
        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_millis(150),
            "Expected ~200ms delay, got {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn concurrent_callers_are_spaced_out() {
        let limiter = RateLimiter::per_second(10.0).unwrap(); // 100ms apart
        let start = Instant::now();
        let a = limiter.clone();
        let b = limiter.clone();
        let c = limiter.clone();
        tokio::join!(a.acquire(), b.acquire(), c.acquire());
        // Third caller gets the slot two intervals out
        assert!(start.elapsed() >= Duration::from_millis(180));
    }
}
