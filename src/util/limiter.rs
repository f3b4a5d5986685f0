use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Process-wide cap on simultaneous outstanding requests, keyed by remote
/// host.
///
/// One semaphore per host, created on first use and shared across all
/// generations for the process lifetime. Permits are released when the
/// returned guard drops, so holding the guard across send and body read
/// bounds the number of in-flight connections to that host.
#[derive(Debug, Clone)]
pub struct HostLimiter {
    permits: usize,
    hosts: Arc<Mutex<HashMap<String, Arc<Semaphore>>>>,
}

impl HostLimiter {
    /// Creates a limiter allowing up to `permits` concurrent requests per
    /// host. A cap of zero is treated as one.
    pub fn new(permits: usize) -> Self {
        Self {
            permits: permits.max(1),
            hosts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Waits for an admission slot for `host`. The permit must be held for
    /// the duration of the request.
    pub async fn acquire(&self, host: &str) -> OwnedSemaphorePermit {
        let semaphore = {
            let mut hosts = self
                .hosts
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            hosts
                .entry(host.to_owned())
                .or_insert_with(|| Arc::new(Semaphore::new(self.permits)))
                .clone()
        };

        // The semaphores are never closed, so acquire cannot fail.
        semaphore
            .acquire_owned()
            .await
            .expect("host limiter semaphore closed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread")]
    async fn caps_simultaneous_holders_per_host() {
        let limiter = HostLimiter::new(4);
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..32 {
            let limiter = limiter.clone();
            let current = current.clone();
            let peak = peak.clone();
            tasks.push(tokio::spawn(async move {
                let _permit = limiter.acquire("shop.example.com").await;
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                current.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let peak = peak.load(Ordering::SeqCst);
        assert!(peak >= 1, "no task ever held a permit");
        assert!(peak <= 4, "peak concurrency {peak} exceeded cap of 4");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn hosts_are_limited_independently() {
        let limiter = HostLimiter::new(1);

        let first = limiter.acquire("a.example.com").await;
        // A different host is not blocked by the held permit.
        let second = tokio::time::timeout(
            Duration::from_millis(100),
            limiter.acquire("b.example.com"),
        )
        .await;
        assert!(second.is_ok());
        drop(first);
    }

    #[tokio::test]
    async fn zero_cap_is_raised_to_one() {
        let limiter = HostLimiter::new(0);
        let _permit = limiter.acquire("shop.example.com").await;
    }
}
