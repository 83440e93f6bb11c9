//! Step and turn arithmetic
//!
//! Time is cut into steps of `period` seconds: `step = floor(t / period)`.
//! With `n` authorities, step `s` belongs to the authority at index
//! `s % n`. A turn window is the step's wall-clock span
//! `[step * period, step * period + period]`.
//!
//! Everything here is pure; callers supply the local index and set size
//! from whichever authority set governs the step in question.

use crate::error::{AuraError, Result};

/// Wall-clock bounds of one step, in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnWindow {
    /// First second of the step
    pub start: u64,
    /// Start of the following step
    pub end: u64,
}

/// Outcome of [`TurnScheduler::check_step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepCheck {
    /// Whether the local authority may seal now
    pub allowed: bool,
    /// Window of the step containing the checked time
    pub window: TurnWindow,
}

/// Step arithmetic for a fixed step duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnScheduler {
    period: u64,
}

impl TurnScheduler {
    /// Creates a scheduler with `period` seconds per step.
    pub fn new(period: u64) -> Result<Self> {
        if period == 0 {
            return Err(AuraError::InvalidPeriod);
        }
        Ok(Self { period })
    }

    /// Seconds per step.
    pub fn period(&self) -> u64 {
        self.period
    }

    /// Step containing unix time `timestamp`.
    pub fn step_at(&self, timestamp: u64) -> u64 {
        timestamp / self.period
    }

    /// Wall-clock window of `step`.
    pub fn window(&self, step: u64) -> TurnWindow {
        let start = step.saturating_mul(self.period);
        TurnWindow {
            start,
            end: start.saturating_add(self.period),
        }
    }

    /// Returns true if the authority at `index` owns `step` in a set of `count`.
    pub fn owns(&self, step: u64, index: usize, count: usize) -> bool {
        count != 0 && step % count as u64 == index as u64
    }

    /// Checks whether the authority at `index` may seal at `now`.
    ///
    /// The step containing `now` must belong to `index`. A non-zero
    /// `tolerance` is a unix timestamp that must not fall after the end of
    /// that step; zero disables the check.
    pub fn check_step(&self, now: u64, tolerance: u64, index: usize, count: usize) -> StepCheck {
        let step = self.step_at(now);
        let window = self.window(step);
        let allowed = self.owns(step, index, count) && (tolerance == 0 || tolerance <= window.end);
        StepCheck { allowed, window }
    }

    /// First step at or after `from` owned by the authority at `index`.
    ///
    /// Returns `None` for an empty set or an out-of-range index.
    pub fn next_owned_step(&self, from: u64, index: usize, count: usize) -> Option<u64> {
        if count == 0 || index >= count {
            return None;
        }
        let count = count as u64;
        let offset = (index as u64 + count - from % count) % count;
        from.checked_add(offset)
    }
}
