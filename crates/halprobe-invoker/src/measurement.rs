//! Wall-clock timing of native calls.

use std::time::{Duration, Instant};

/// Times one native call.
///
/// ```
/// use halprobe_invoker::Measurement;
///
/// let measurement = Measurement::start();
/// let elapsed = measurement.stop();
/// assert!(elapsed.as_secs() < 60);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Measurement {
    started: Instant,
}

impl Measurement {
    /// Starts timing now.
    #[must_use]
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Returns the time elapsed since [`Measurement::start`].
    #[must_use]
    pub fn stop(self) -> Duration {
        self.started.elapsed()
    }
}

/// Converts a duration to whole nanoseconds, saturating at `u64::MAX`.
#[must_use]
pub fn as_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
