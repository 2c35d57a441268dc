//! Countdown timer engine
//!
//! Converts wall-clock progress into a fill level. The engine has two states,
//! stopped and running: `stop` freezes `elapsed`, `start` resumes from the
//! frozen value. Time is injected by the caller as `Instant`s so the external
//! scheduler decides how often to tick.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::ClockError;

/// Longest countdown a single dial or group member may hold (999:59:59)
pub const MAX_TIMER_DURATION: Duration = Duration::from_secs(999 * 3600 + 59 * 60 + 59);

/// Result of a single [`TimerEngine::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTick {
    /// Elapsed time after the tick
    pub elapsed: Duration,
    /// Time left before the countdown completes
    pub remaining: Duration,
    /// True only on the tick that reached the full duration
    pub finished: bool,
}

/// Elapsed-time tracker for one countdown.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    /// Duration that fills every segment
    total: Duration,
    /// Elapsed time as of the last stop or tick
    elapsed: Duration,
    /// Elapsed time when the current run began
    elapsed_at_resume: Duration,
    /// Resume reference; `Some` while running
    resumed_at: Option<Instant>,
}

impl TimerEngine {
    /// Create a stopped timer with nothing elapsed
    pub fn new(total: Duration) -> Self {
        Self {
            total,
            elapsed: Duration::ZERO,
            elapsed_at_resume: Duration::ZERO,
            resumed_at: None,
        }
    }

    /// Rebuild a timer from persisted values. A running timer resumes from
    /// `elapsed` with `now` as its new reference.
    pub fn resumed(total: Duration, elapsed: Duration, running: bool, now: Instant) -> Self {
        let elapsed = elapsed.min(total);
        Self {
            total,
            elapsed,
            elapsed_at_resume: elapsed,
            resumed_at: (running && elapsed < total && !total.is_zero()).then_some(now),
        }
    }

    /// Duration that fills every segment
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Elapsed time as of the last stop or tick
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Time left as of the last stop or tick
    pub fn remaining(&self) -> Duration {
        self.total.saturating_sub(self.elapsed)
    }

    /// Whether the timer is counting
    pub fn is_running(&self) -> bool {
        self.resumed_at.is_some()
    }

    /// Whether the full duration has elapsed
    pub fn is_complete(&self) -> bool {
        !self.total.is_zero() && self.elapsed >= self.total
    }

    /// Replace the duration. The timer stops and rewinds to zero.
    pub fn set_total(&mut self, total: Duration) {
        self.total = total;
        self.rewind();
    }

    /// Start or resume counting from the current elapsed value.
    ///
    /// Starting a running or already-complete timer is a no-op.
    pub fn start(&mut self, now: Instant) -> Result<(), ClockError> {
        if self.total.is_zero() {
            return Err(ClockError::invalid_state(
                "cannot start a timer with no duration",
            ));
        }
        if self.is_running() || self.is_complete() {
            return Ok(());
        }
        debug!(elapsed = ?self.elapsed, total = ?self.total, "timer started");
        self.elapsed_at_resume = self.elapsed;
        self.resumed_at = Some(now);
        Ok(())
    }

    /// Halt counting, preserving elapsed time up to `now`.
    pub fn stop(&mut self, now: Instant) {
        if let Some(at) = self.resumed_at.take() {
            self.elapsed = self.measure(at, now);
            debug!(elapsed = ?self.elapsed, "timer stopped");
        }
    }

    /// Recompute elapsed time. Stops itself on reaching the full duration.
    pub fn tick(&mut self, now: Instant) -> TimerTick {
        let mut finished = false;
        if let Some(at) = self.resumed_at {
            self.elapsed = self.measure(at, now);
            if self.elapsed >= self.total {
                self.elapsed = self.total;
                self.resumed_at = None;
                finished = true;
                debug!(total = ?self.total, "timer finished");
            }
        }
        TimerTick {
            elapsed: self.elapsed,
            remaining: self.remaining(),
            finished,
        }
    }

    /// Move elapsed forward to at least `to` (never backwards).
    pub fn fast_forward(&mut self, to: Duration) {
        let to = to.min(self.total);
        if to > self.elapsed {
            let jump = to - self.elapsed;
            self.elapsed = to;
            self.elapsed_at_resume = self.elapsed_at_resume.saturating_add(jump);
        }
    }

    /// Stop and zero the elapsed time
    pub fn rewind(&mut self) {
        self.elapsed = Duration::ZERO;
        self.elapsed_at_resume = Duration::ZERO;
        self.resumed_at = None;
    }

    /// Segments that should be filled after the current elapsed time
    pub fn target_filled(&self, segment_count: u32) -> u32 {
        proportional_fill(segment_count, self.elapsed, self.total)
    }

    // A clock reading earlier than the resume reference counts as no progress,
    // and elapsed never moves backwards.
    fn measure(&self, resumed_at: Instant, now: Instant) -> Duration {
        self.elapsed_at_resume
            .saturating_add(now.saturating_duration_since(resumed_at))
            .max(self.elapsed)
            .min(self.total)
    }
}

impl PartialEq for TimerEngine {
    fn eq(&self, other: &Self) -> bool {
        self.total == other.total
            && self.elapsed == other.elapsed
            && self.is_running() == other.is_running()
    }
}

/// `floor(segment_count * elapsed / total)`, clamped to `segment_count`.
///
/// Each segment corresponds to `total / segment_count` of elapsed time, so
/// segments fill at a uniform rate across the whole duration.
pub fn proportional_fill(segment_count: u32, elapsed: Duration, total: Duration) -> u32 {
    let total = total.as_nanos();
    if total == 0 {
        return 0;
    }
    let filled = u128::from(segment_count) * elapsed.as_nanos() / total;
    filled.min(u128::from(segment_count)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_with_zero_duration_fails() {
        let mut timer = TimerEngine::new(Duration::ZERO);
        assert!(matches!(
            timer.start(Instant::now()),
            Err(ClockError::InvalidState(_))
        ));
        assert!(!timer.is_running());
    }

    #[test]
    fn test_stop_preserves_elapsed_and_start_resumes() {
        let t0 = Instant::now();
        let mut timer = TimerEngine::new(Duration::from_secs(100));
        timer.start(t0).unwrap();
        timer.stop(t0 + Duration::from_secs(30));
        assert_eq!(timer.elapsed(), Duration::from_secs(30));

        // Time passing while stopped does not count
        let t1 = t0 + Duration::from_secs(500);
        timer.start(t1).unwrap();
        let tick = timer.tick(t1 + Duration::from_secs(10));
        assert_eq!(tick.elapsed, Duration::from_secs(40));
        assert_eq!(tick.remaining, Duration::from_secs(60));
    }

    #[test]
    fn test_clock_skew_is_clamped() {
        let t0 = Instant::now() + Duration::from_secs(1000);
        let mut timer = TimerEngine::new(Duration::from_secs(100));
        timer.start(t0).unwrap();
        timer.tick(t0 + Duration::from_secs(20));
        let tick = timer.tick(t0 - Duration::from_secs(5));
        assert_eq!(tick.elapsed, Duration::from_secs(20));
    }

    #[test]
    fn test_proportional_fill_is_uniform() {
        let total = Duration::from_secs(240);
        assert_eq!(proportional_fill(4, Duration::from_secs(59), total), 0);
        assert_eq!(proportional_fill(4, Duration::from_secs(60), total), 1);
        assert_eq!(proportional_fill(4, Duration::from_secs(180), total), 3);
        assert_eq!(proportional_fill(4, Duration::from_secs(999), total), 4);
        assert_eq!(proportional_fill(4, Duration::from_secs(10), Duration::ZERO), 0);
    }

    #[test]
    fn test_fast_forward_never_rewinds() {
        let mut timer = TimerEngine::new(Duration::from_secs(60));
        timer.fast_forward(Duration::from_secs(20));
        timer.fast_forward(Duration::from_secs(10));
        assert_eq!(timer.elapsed(), Duration::from_secs(20));
        timer.fast_forward(Duration::from_secs(600));
        assert_eq!(timer.elapsed(), Duration::from_secs(60));
        assert!(timer.is_complete());
    }

    #[test]
    fn test_huge_total_saturates_instead_of_overflowing() {
        let t0 = Instant::now();
        let mut timer = TimerEngine::new(Duration::MAX);
        timer.fast_forward(Duration::MAX - Duration::from_secs(1));
        timer.start(t0).unwrap();
        let tick = timer.tick(t0 + Duration::from_secs(10));
        assert_eq!(tick.elapsed, Duration::MAX);
        assert!(tick.finished);
    }
}
