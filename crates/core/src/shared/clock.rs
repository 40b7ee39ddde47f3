use std::time::Duration;

/// Source of the deliberate pauses in a run (rate-limit pacing and
/// training-status polling).
pub trait Clock: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Blocks the calling thread for real.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}
