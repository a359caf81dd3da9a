//! Minimum-spacing gate for translate calls.
//!
//! The service rejects clients that call it too often. All calls from a batch
//! share one [`RateLimiter`]: callers queue on a fair mutex, so they pass the
//! gate in arrival order, and each one waits until `min_interval` has elapsed
//! since the previous caller passed. The gate does not bound how many calls
//! are in flight; it only spaces out their starts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use crate::error::ServiceError;

use super::{AspectRatio, ImageSize, Translator};

/// Default spacing between calls.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(3300);

/// Serializing gate holding the time the last caller passed.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait for this caller's turn.
    ///
    /// The first call passes immediately. Later calls return no sooner than
    /// `min_interval` after the previous call returned from `acquire`.
    pub async fn acquire(&self) {
        let mut last_call = self.last_call.lock().await;

        if let Some(previous) = *last_call {
            let ready_at = previous + self.min_interval;
            if ready_at > Instant::now() {
                debug!(
                    wait_ms = (ready_at - Instant::now()).as_millis() as u64,
                    "Waiting for rate limiter"
                );
                sleep_until(ready_at).await;
            }
        }

        *last_call = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

/// A translator whose calls all pass through a shared [`RateLimiter`].
pub struct Throttled<T> {
    inner: T,
    limiter: Arc<RateLimiter>,
}

impl<T: Translator> Throttled<T> {
    pub fn new(inner: T, limiter: Arc<RateLimiter>) -> Self {
        Self { inner, limiter }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Translator> Translator for Throttled<T> {
    async fn translate(
        &self,
        image: Bytes,
        size: ImageSize,
        aspect_ratio: Option<AspectRatio>,
    ) -> Result<Bytes, ServiceError> {
        self.limiter.acquire().await;
        self.inner.translate(image, size, aspect_ratio).await
    }
}
