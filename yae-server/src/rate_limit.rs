//! A per-key token bucket, refilled continuously rather than in discrete
//! per-minute windows so a caller can't burst right at a window boundary.

use std::time::Instant;

use dashmap::DashMap;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

pub struct RateLimiter {
    buckets: DashMap<String, Bucket>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
        }
    }

    /// Consumes one token from `key`'s bucket (capacity `limit_per_min`,
    /// refilling at `limit_per_min / 60` tokens/sec). Returns `false` once
    /// the bucket is empty.
    pub fn check(&self, key: &str, limit_per_min: u32) -> bool {
        let capacity = limit_per_min as f64;
        let refill_per_sec = capacity / 60.0;
        let now = Instant::now();
        let mut bucket = self
            .buckets
            .entry(key.to_string())
            .or_insert_with(|| Bucket {
                tokens: capacity,
                last_refill: now,
            });
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * refill_per_sec).min(capacity);
        bucket.last_refill = now;
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: a capacity-3 bucket allows 3 immediate calls, then rejects.
    #[test]
    fn bucket_allows_capacity_then_rejects() {
        let limiter = RateLimiter::new();
        assert!(limiter.check("k", 3));
        assert!(limiter.check("k", 3));
        assert!(limiter.check("k", 3));
        assert!(!limiter.check("k", 3));
    }

    /// **Scenario**: separate keys have independent buckets.
    #[test]
    fn separate_keys_do_not_share_a_bucket() {
        let limiter = RateLimiter::new();
        assert!(limiter.check("a", 1));
        assert!(!limiter.check("a", 1));
        assert!(limiter.check("b", 1));
    }
}
