//! CPU Clock.
use std::{
    thread,
    time::{Duration, Instant},
};

use crate::constants::*;

/// Deadline driving the 60 Hz delay and sound timers.
///
/// Time is supplied by the caller as the duration elapsed since the
/// host started, so the interpreter itself never reads the wall clock.
///
/// At most one tick fires per check. When the host falls behind, missed
/// ticks are skipped instead of caught up, and the deadline only moves
/// forward by a single period.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TimerClock {
    next_update: Duration,
}

impl TimerClock {
    pub fn new() -> Self {
        Default::default()
    }

    pub(crate) fn from_deadline(next_update: Duration) -> Self {
        Self { next_update }
    }

    /// Time at which the next tick will fire.
    pub fn deadline(&self) -> Duration {
        self.next_update
    }

    /// Returns `true` when the deadline has passed, and moves the deadline
    /// forward by one timer period.
    ///
    /// The deadline is never left more than one period ahead of `now`.
    /// A deadline restored from a save state written later in another
    /// session's lifetime is pulled back, so timers resume promptly.
    pub fn tick(&mut self, now: Duration) -> bool {
        let latest = now + TIMER_PERIOD;
        if self.next_update > latest {
            self.next_update = latest;
        }

        if now > self.next_update {
            self.next_update += TIMER_PERIOD;
            true
        } else {
            false
        }
    }
}

/// Timer to synchronize the host thread with the software clock of the virtual CPU.
///
/// It is designed to work with the yielding cooperative pattern
/// of the interpreter loop. When the VM yields control back to the
/// caller, time elapses until it is resumed. Once the interpreter
/// is resumed, the elapsed time is taken into account when determining
/// the next cycle.
pub struct Clock {
    interval: Duration,
    last: Instant,
}

impl Clock {
    /// Creates a new clock with the current time as internal state.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Instant::now(),
        }
    }

    /// Set the clock state back to zero.
    pub fn reset(&mut self) {
        self.last = Instant::now()
    }

    /// Check without blocking whether a cycle has elapsed, resetting the
    /// clock when it has.
    pub fn ready(&mut self) -> bool {
        if self.last.elapsed() >= self.interval {
            self.reset();
            true
        } else {
            false
        }
    }

    /// Block the current thread until the next clock cycle.
    pub fn wait(&mut self) {
        loop {
            let elapsed = self.last.elapsed();
            if elapsed < self.interval {
                // Sleep does not have enough resolution, and causes
                // the clock to run at 30 FPS.
                //
                // Spinning a loop causes high CPU usage and fan madness.
                //
                // Yielding in a loop is the best alternative.
                thread::yield_now();
            } else {
                // Reset back to zero, rather than trying to catch up.
                //
                // If the VM was paused for debugging, and a large
                // amount of time has elapsed until it is resumed,
                // it should simply continue at the next cycle running
                // at its usual speed.
                self.reset();
                return;
            }
        }
    }
}
