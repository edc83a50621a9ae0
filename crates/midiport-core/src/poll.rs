//! Process-wide poll interval for blocking receives.
//!
//! Transport receive primitives return immediately, so a blocking
//! `receive()` sleeps this long between attempts. The value is shared by
//! every port in the process; there is no per-port override.

use crate::error::{Error, Result};
use atomic_float::AtomicF64;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// 1 ms.
pub const DEFAULT_POLL_INTERVAL_SECS: f64 = 0.001;

pub struct PollInterval {
    seconds: AtomicF64,
}

static GLOBAL: PollInterval = PollInterval::new(DEFAULT_POLL_INTERVAL_SECS);

impl PollInterval {
    const fn new(seconds: f64) -> Self {
        Self {
            seconds: AtomicF64::new(seconds),
        }
    }

    pub fn global() -> &'static PollInterval {
        &GLOBAL
    }

    pub fn get(&self) -> Duration {
        Duration::try_from_secs_f64(self.seconds.load(Ordering::Acquire)).unwrap_or(Duration::MAX)
    }

    pub fn set(&self, interval: Duration) {
        self.seconds.store(interval.as_secs_f64(), Ordering::Release);
    }

    pub fn set_secs(&self, seconds: f64) -> Result<()> {
        if Duration::try_from_secs_f64(seconds).is_err() {
            return Err(Error::InvalidConfig(format!(
                "poll interval must be a non-negative number of seconds that fits a Duration, got {}",
                seconds
            )));
        }
        self.seconds.store(seconds, Ordering::Release);
        Ok(())
    }

    pub fn reset(&self) {
        self.seconds
            .store(DEFAULT_POLL_INTERVAL_SECS, Ordering::Release);
    }

    /// Sleep for one interval.
    pub fn sleep(&self) {
        std::thread::sleep(self.get());
    }
}

pub fn poll_interval() -> Duration {
    PollInterval::global().get()
}

pub fn set_poll_interval(interval: Duration) {
    PollInterval::global().set(interval);
}

pub fn set_poll_interval_secs(seconds: f64) -> Result<()> {
    PollInterval::global().set_secs(seconds)
}

pub fn reset_poll_interval() {
    PollInterval::global().reset();
}

#[cfg(test)]
mod tests {
    use super::*;

    // Local instances only: the global is shared with every other test thread.

    #[test]
    fn test_default_is_one_millisecond() {
        let interval = PollInterval::new(DEFAULT_POLL_INTERVAL_SECS);
        assert_eq!(interval.get(), Duration::from_millis(1));
    }

    #[test]
    fn test_set_and_reset() {
        let interval = PollInterval::new(DEFAULT_POLL_INTERVAL_SECS);
        interval.set(Duration::from_millis(5));
        assert_eq!(interval.get(), Duration::from_millis(5));

        interval.set_secs(0.25).unwrap();
        assert_eq!(interval.get(), Duration::from_millis(250));

        interval.reset();
        assert_eq!(interval.get(), Duration::from_millis(1));
    }

    #[test]
    fn test_rejects_invalid_seconds() {
        let interval = PollInterval::new(DEFAULT_POLL_INTERVAL_SECS);
        assert!(matches!(
            interval.set_secs(-1.0),
            Err(Error::InvalidConfig(_))
        ));
        assert!(interval.set_secs(f64::NAN).is_err());
        assert!(interval.set_secs(f64::INFINITY).is_err());
        assert_eq!(interval.get(), Duration::from_millis(1));
    }

    #[test]
    fn test_oversized_interval() {
        let interval = PollInterval::new(DEFAULT_POLL_INTERVAL_SECS);
        assert!(matches!(
            interval.set_secs(1e20),
            Err(Error::InvalidConfig(_))
        ));
        assert_eq!(interval.get(), Duration::from_millis(1));

        // Rounding through f64 can push Duration::MAX past its own range.
        interval.set(Duration::MAX);
        assert!(interval.get() >= Duration::from_secs(u64::MAX / 2));
    }
}
