use std::time::{Duration, Instant};
use sysinfo::{System, SystemExt};

const REFRESH_EVERY: Duration = Duration::from_millis(500);
const BACKOFF: Duration = Duration::from_millis(25);

/// Low-overhead memory watcher owned by the line producer.
/// Refreshes at most every `REFRESH_EVERY`; between refreshes the cached
/// available/total fraction is reused.
pub struct MemoryWatch {
    sys: System,
    threshold: f64,
    last_check: Option<Instant>,
    last_frac: f64,
    warned: bool,
}

impl MemoryWatch {
    /// `threshold` is a fraction of total RAM, e.g. 0.10 for 10% available.
    pub fn new(threshold: f64) -> Self {
        Self {
            sys: System::new(),
            threshold: threshold.clamp(0.0, 1.0),
            last_check: None,
            last_frac: 1.0,
            warned: false,
        }
    }

    /// Recent estimate of available memory fraction (0.0..=1.0).
    pub fn available_fraction(&mut self) -> f64 {
        let now = Instant::now();
        let stale = self.last_check.map_or(true, |t| now.duration_since(t) >= REFRESH_EVERY);
        if stale {
            self.sys.refresh_memory();
            let total = self.sys.total_memory() as f64;
            let avail = self.sys.available_memory() as f64;
            self.last_frac = if total > 0.0 { (avail / total).clamp(0.0, 1.0) } else { 1.0 };
            self.last_check = Some(now);
        }
        self.last_frac
    }

    /// Sleep briefly if available memory is under the threshold.
    /// Returns whether it backed off.
    pub fn throttle_if_low(&mut self) -> bool {
        let frac = self.available_fraction();
        if frac >= self.threshold {
            return false;
        }
        if !self.warned {
            tracing::warn!(available = frac, threshold = self.threshold, "low memory, throttling input");
            self.warned = true;
        }
        std::thread::sleep(BACKOFF);
        true
    }
}
