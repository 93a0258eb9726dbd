use std::time::Duration;
use tokio::time::Instant;

/// Enforces the minimum interval between two outbound requests
///
/// Listing fetches and results-page fetches share one throttle, so the
/// politeness budget is cumulative across both paths.
#[derive(Debug, Clone)]
pub struct Throttle {
    /// Minimum spacing between requests
    min_interval: Duration,

    /// Timestamp of the last request
    last_request_time: Option<Instant>,

    /// Number of requests issued through this throttle
    request_count: u64,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request_time: None,
            request_count: 0,
        }
    }

    /// Checks if a request can be made now
    pub fn can_request(&self, now: Instant) -> bool {
        self.time_until_next_request(now).is_none()
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.min_interval {
            Some(self.min_interval - elapsed)
        } else {
            None
        }
    }

    /// Records that a request was made
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
    }

    /// Sleeps until the interval has passed, then records the request
    pub async fn acquire(&mut self) {
        if let Some(wait) = self.time_until_next_request(Instant::now()) {
            tracing::trace!("Politeness delay: waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }
        self.record_request(Instant::now());
    }

    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
