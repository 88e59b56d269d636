//! Request and batch timing

use std::time::{Duration, Instant};

/// Wall-clock timer tagged with what it measures
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    label: String,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            label: label.into(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Consume the timer, logging the measurement at debug level
    pub fn stop(self) -> Duration {
        let elapsed = self.elapsed();
        tracing::debug!("{} took {}ms", self.label, elapsed.as_millis());
        elapsed
    }

    /// [`Timer::stop`] in whole milliseconds, saturating
    pub fn stop_ms(self) -> u64 {
        u64::try_from(self.stop().as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_elapsed_grows() {
        let timer = Timer::start("POST http://x/");
        sleep(Duration::from_millis(10));
        assert!(timer.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_stop_ms_covers_sleep() {
        let timer = Timer::start("batch run");
        sleep(Duration::from_millis(5));
        assert!(timer.stop_ms() >= 5);
    }
}
