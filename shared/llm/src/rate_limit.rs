use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Spaces outgoing requests at least `interval` apart.
///
/// The lock is held while waiting so concurrent callers queue up and each
/// one is released a full interval after the previous.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Zero disables limiting.
    pub fn per_minute(requests: u32) -> Self {
        let interval = if requests == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(60) / requests
        };
        Self {
            interval,
            last_request: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the next request may go out, then mark it as started.
    /// Returns how long the caller was held back.
    pub async fn acquire(&self) -> Duration {
        let mut last_request = self.last_request.lock().await;

        let wait_time = last_request
            .map(|last| self.interval.saturating_sub(last.elapsed()))
            .unwrap_or(Duration::ZERO);

        if wait_time > Duration::ZERO {
            debug!(?wait_time, "Rate limiting Gemini request");
            tokio::time::sleep(wait_time).await;
        }

        *last_request = Some(Instant::now());
        wait_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_request_past_quota_waits() {
        let limiter = RateLimiter::per_minute(2);
        assert_eq!(limiter.interval(), Duration::from_secs(30));

        let started = Instant::now();
        assert_eq!(limiter.acquire().await, Duration::ZERO);
        assert_eq!(limiter.acquire().await, Duration::from_secs(30));
        assert_eq!(started.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_queue() {
        let limiter = Arc::new(RateLimiter::per_minute(10));
        let started = Instant::now();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.acquire().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(started.elapsed(), Duration::from_secs(12));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_requests_do_not_wait() {
        let limiter = RateLimiter::per_minute(10);
        limiter.acquire().await;
        tokio::time::sleep(Duration::from_secs(7)).await;
        assert_eq!(limiter.acquire().await, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_zero_disables_limit() {
        let limiter = RateLimiter::per_minute(0);
        assert_eq!(limiter.acquire().await, Duration::ZERO);
        assert_eq!(limiter.acquire().await, Duration::ZERO);
    }
}
