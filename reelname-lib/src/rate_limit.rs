//! Minimum-interval rate limiting for metadata providers.

use std::sync::Arc;

use reelname_core::{MediaFile, MetadataProvider, ProviderError};
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Spaces calls at least `interval` apart across all tasks sharing it.
///
/// Callers queue on the mutex, so waits are served in arrival order.
#[derive(Clone)]
pub struct RateLimiter {
    interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Limiter allowing `rps` calls per second.
    ///
    /// `None` when `rps` is not positive, or so small that the interval
    /// does not fit in a [`Duration`].
    pub fn per_second(rps: f64) -> Option<Self> {
        if !(rps.is_finite() && rps > 0.0) {
            return None;
        }
        Duration::try_from_secs_f64(rps.recip()).ok().map(Self::new)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until at least `interval` has passed since the previous call.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// A provider wrapped with a [`RateLimiter`].
///
/// The limiter is acquired in [`MetadataProvider::ready`], so the pipeline's
/// per-file timeout only covers the inner call.
pub struct RateLimited<P> {
    inner: P,
    limiter: RateLimiter,
}

impl<P> RateLimited<P> {
    pub fn new(inner: P, limiter: RateLimiter) -> Self {
        Self { inner, limiter }
    }
}

impl<P: MetadataProvider> MetadataProvider for RateLimited<P> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn ready(&self) -> impl std::future::Future<Output = ()> + Send {
        async move {
            self.inner.ready().await;
            self.limiter.acquire().await;
        }
    }

    fn provide(
        &self,
        file: &mut MediaFile,
    ) -> impl std::future::Future<Output = Result<(), ProviderError>> + Send {
        self.inner.provide(file)
    }
}
