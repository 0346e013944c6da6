//! Token bucket limiter
//!
//! Each key owns a bucket of `capacity` tokens refilled continuously at
//! `refill_per_sec`. Refill happens lazily on access. A key seen for the first
//! time starts full so short bursts are allowed.

use dashmap::DashMap;
use std::time::{Duration, Instant};

use super::limiter::Limiter;

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

pub struct TokenBucket {
    buckets: DashMap<String, Bucket>,
    capacity: f64,
    refill_per_sec: f64,
}

impl TokenBucket {
    pub fn new(capacity: u32, refill_per_sec: f64) -> Self {
        TokenBucket {
            buckets: DashMap::new(),
            capacity: f64::from(capacity),
            refill_per_sec: refill_per_sec.max(0.0),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity as u32
    }

    fn refilled(&self, bucket: &Bucket, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(bucket.last_refill).as_secs_f64();
        (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity)
    }

    // Caller holds the shard lock for this key, so refill + take is atomic.
    fn take(&self, bucket: &mut Bucket, now: Instant) -> bool {
        bucket.tokens = self.refilled(bucket, now);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

impl Limiter for TokenBucket {
    fn allow(&self, key: &str) -> bool {
        let now = Instant::now();

        if let Some(mut bucket) = self.buckets.get_mut(key) {
            return self.take(&mut bucket, now);
        }

        let mut bucket = self.buckets.entry(key.to_string()).or_insert(Bucket {
            tokens: self.capacity,
            last_refill: now,
        });
        self.take(&mut bucket, now)
    }

    fn reset(&self, key: &str) {
        self.buckets.remove(key);
    }

    fn reset_all(&self) {
        self.buckets.clear();
    }

    fn len(&self) -> usize {
        self.buckets.len()
    }

    /// A bucket is evicted only once it would be full again, since a
    /// re-created bucket starts full.
    fn sweep_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut evicted = 0;

        self.buckets.retain(|_, bucket| {
            let idle = now.saturating_duration_since(bucket.last_refill) >= max_idle;
            let full = self.refilled(bucket, now) >= self.capacity;
            if idle && full {
                evicted += 1;
                false
            } else {
                true
            }
        });

        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::sleep;

    #[test]
    fn test_first_capacity_calls_pass_then_reject() {
        let bucket = TokenBucket::new(5, 2.0);

        for _ in 0..5 {
            assert!(bucket.allow("user:1"));
        }
        assert!(!bucket.allow("user:1"));
    }

    #[tokio::test]
    async fn test_refills_after_interval() {
        let bucket = TokenBucket::new(2, 20.0);

        assert!(bucket.allow("user:1"));
        assert!(bucket.allow("user:1"));
        assert!(!bucket.allow("user:1"));

        // 1 / 20 tokens per second = 50ms
        sleep(Duration::from_millis(80)).await;
        assert!(bucket.allow("user:1"));
    }

    #[test]
    fn test_per_key_isolation() {
        let bucket = TokenBucket::new(1, 0.0);

        assert!(bucket.allow("user:1"));
        assert!(!bucket.allow("user:1"));

        assert!(bucket.allow("user:2"));
        assert!(!bucket.allow("user:2"));
    }

    #[test]
    fn test_reset_restores_full_bucket() {
        let bucket = TokenBucket::new(2, 0.0);

        assert!(bucket.allow("a"));
        assert!(bucket.allow("a"));
        assert!(!bucket.allow("a"));
        assert!(bucket.allow("b"));

        bucket.reset("a");
        assert!(bucket.allow("a"));
        assert!(bucket.allow("a"));

        bucket.reset_all();
        assert!(bucket.is_empty());
        assert!(bucket.allow("b"));
    }

    #[test]
    fn test_zero_capacity_rejects_everything() {
        let bucket = TokenBucket::new(0, 10.0);
        assert!(!bucket.allow("a"));
    }

    #[test]
    fn test_concurrent_same_key_admits_exactly_capacity() {
        let bucket = Arc::new(TokenBucket::new(20, 0.0));
        let admitted = Arc::new(AtomicUsize::new(0));

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let bucket = Arc::clone(&bucket);
                let admitted = Arc::clone(&admitted);
                scope.spawn(move || {
                    for _ in 0..10 {
                        if bucket.allow("hot") {
                            admitted.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                });
            }
        });

        assert_eq!(admitted.load(Ordering::SeqCst), 20);
    }

    #[tokio::test]
    async fn test_sweep_keeps_growth_bounded() {
        let bucket = TokenBucket::new(5, 1000.0);

        for id in 0..10_000 {
            assert!(bucket.allow(&format!("user:{id}")));
        }
        assert_eq!(bucket.len(), 10_000);

        sleep(Duration::from_millis(30)).await;
        assert_eq!(bucket.sweep_idle(Duration::from_millis(10)), 10_000);
        assert!(bucket.is_empty());
    }

    #[test]
    fn test_sweep_keeps_drained_buckets() {
        let bucket = TokenBucket::new(1, 0.0);

        assert!(bucket.allow("drained"));
        assert_eq!(bucket.sweep_idle(Duration::ZERO), 0);
        assert!(!bucket.allow("drained"));
    }
}
