//! Progress metering.
//!
//! Rate-limits progress emissions so UIs are not flooded, and derives the
//! transfer speed from the bytes seen since the previous emission.

use std::time::{Duration, Instant};

/// One rate-limited progress emission.
#[derive(Clone, Copy, Debug)]
pub struct MeterTick {
    /// Transfer speed over the interval since the previous tick.
    pub speed_bps: f64,
}

/// Accumulates byte deltas and yields at most one tick per interval.
pub struct ProgressMeter {
    min_interval: Duration,
    started: Instant,
    last_emit: Option<Instant>,
    bytes_since_emit: u64,
}

impl ProgressMeter {
    /// Create a meter with the specified minimum emission interval.
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            started: Instant::now(),
            last_emit: None,
            bytes_since_emit: 0,
        }
    }

    /// Create a meter with the default interval of 100ms.
    #[must_use]
    pub fn default_interval() -> Self {
        Self::new(Duration::from_millis(100))
    }

    /// Record a byte delta. Returns a tick when enough time has passed
    /// since the previous emission; the first record always ticks.
    #[allow(clippy::cast_precision_loss)]
    pub fn record(&mut self, bytes: u64) -> Option<MeterTick> {
        self.bytes_since_emit += bytes;

        let now = Instant::now();
        let elapsed = match self.last_emit {
            None => now.duration_since(self.started),
            Some(last) if now.duration_since(last) >= self.min_interval => {
                now.duration_since(last)
            }
            Some(_) => return None,
        };

        let secs = elapsed.as_secs_f64().max(1e-6);
        let tick = MeterTick {
            speed_bps: self.bytes_since_emit as f64 / secs,
        };
        self.bytes_since_emit = 0;
        self.last_emit = Some(now);
        Some(tick)
    }
}
