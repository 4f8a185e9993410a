//! Timing utilities for the producer loops and the consumer tick.
//!
//! The acquisition loop runs at the capture source's native rate and
//! reports an FPS estimate with every snapshot; the consumer re-arms on
//! a fixed cadence. Both sides measure against `std::time::Instant`.

use std::time::{Duration, Instant};

/// Exponentially damped frames-per-second estimate for a free-running
/// producer loop.
///
/// `tick()` is called once per produced frame and returns the current
/// estimate. The first tick yields 0.0 since no interval exists yet.
#[derive(Debug)]
pub struct FpsEstimator {
    last: Option<Instant>,
    fps: f64,
    damping: f64,
}

impl FpsEstimator {
    /// Create an estimator with the default damping factor.
    pub fn new() -> Self {
        Self::with_damping(0.2)
    }

    /// Create an estimator with a custom damping factor in `(0, 1]`.
    pub fn with_damping(damping: f64) -> Self {
        Self {
            last: None,
            fps: 0.0,
            damping: damping.clamp(f64::MIN_POSITIVE, 1.0),
        }
    }

    /// Record a frame boundary and return the updated estimate.
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f64 {
        if let Some(last) = self.last {
            // Floor the interval so a burst of frames cannot divide by
            // a zero-length duration.
            let secs = now.duration_since(last).as_secs_f64().max(0.001);
            let instant_fps = 1.0 / secs;
            if self.fps == 0.0 {
                self.fps = instant_fps;
            } else {
                self.fps += (instant_fps - self.fps) * self.damping;
            }
        }
        self.last = Some(now);
        self.fps
    }

    /// Current estimate without recording a frame.
    pub fn current(&self) -> f64 {
        self.fps
    }
}

impl Default for FpsEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-cadence gate for the consumer tick.
///
/// `due()` answers whether the interval has elapsed since the last
/// accepted tick; the first call always fires.
#[derive(Debug)]
pub struct TickInterval {
    interval: Duration,
    last_tick: Option<Instant>,
}

impl TickInterval {
    /// Create a gate with the given period.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_tick: None,
        }
    }

    /// Create a gate from a millisecond period.
    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Check whether the next tick is due, updating internal state if so.
    pub fn due(&mut self) -> bool {
        self.due_at(Instant::now())
    }

    fn due_at(&mut self, now: Instant) -> bool {
        match self.last_tick {
            None => {
                self.last_tick = Some(now);
                true
            }
            Some(last) if now.duration_since(last) >= self.interval => {
                self.last_tick = Some(now);
                true
            }
            _ => false,
        }
    }

    /// The configured period.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}
