//! Shared byte-throughput limiter for concurrent transfers.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{self, Instant};

/// Token bucket enforcing an aggregate bytes-per-second budget.
///
/// One instance is shared (via `Arc`) by every transfer in a copy
/// invocation, so the configured rate caps the sum of all streams, not each
/// stream individually. The bucket runs a debt model: a caller always takes
/// its bytes and then sleeps off any deficit, so a single chunk larger than
/// the burst window still passes.
///
/// It apportions bandwidth; it does not serialize transfers.
pub struct RateLimiter {
    bytes_per_sec: f64,
    burst: f64,
    bucket: Mutex<Bucket>,
}

struct Bucket {
    available: f64,
    refilled_at: Instant,
}

impl RateLimiter {
    /// `bytes_per_sec` must be positive; the burst window is one second of
    /// budget.
    pub fn new(bytes_per_sec: u64) -> Self {
        let rate = bytes_per_sec.max(1) as f64;
        RateLimiter {
            bytes_per_sec: rate,
            burst: rate,
            bucket: Mutex::new(Bucket {
                available: rate,
                refilled_at: Instant::now(),
            }),
        }
    }

    /// Charge `bytes` against the shared budget, sleeping until the
    /// aggregate rate allows them.
    pub async fn throttle(&self, bytes: u64) {
        let delay = {
            let mut bucket = self.bucket.lock().await;
            let now = Instant::now();
            let elapsed = now.duration_since(bucket.refilled_at).as_secs_f64();
            bucket.available =
                (bucket.available + elapsed * self.bytes_per_sec).min(self.burst);
            bucket.refilled_at = now;
            bucket.available -= bytes as f64;
            if bucket.available >= 0.0 {
                None
            } else {
                Some(Duration::from_secs_f64(-bucket.available / self.bytes_per_sec))
            }
        };

        if let Some(delay) = delay {
            time::sleep(delay).await;
        }
    }
}
