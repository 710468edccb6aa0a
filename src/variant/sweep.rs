//! Inclusive parameter grids for scale and rotation sweeps.

use crate::util::{FragMatchError, FragMatchResult};

/// Relative slack allowed when deciding whether the last step reaches `limit`.
const LIMIT_SLACK: f32 = 1e-4;

/// Largest number of values a sweep may hold.
pub const MAX_SWEEP_VALUES: usize = 10_000;

/// Discrete grid `start, start + step, ...` up to and including `limit`.
///
/// Values are computed as `start + idx * step` rather than by repeated
/// addition, so long sweeps do not drift past their limit.
#[derive(Clone, Debug, PartialEq)]
pub struct Sweep {
    start: f32,
    limit: f32,
    step: f32,
    len: usize,
}

impl Sweep {
    /// Scale factors from 0.9 to `limit` in steps of 0.025.
    pub fn scale(limit: f32) -> FragMatchResult<Self> {
        Self::new(0.9, limit, 0.025)
    }

    /// Rotation angles in degrees from 2.0 to `limit` in steps of 2.0.
    pub fn rotation(limit: f32) -> FragMatchResult<Self> {
        Self::new(2.0, limit, 2.0)
    }

    /// Creates a grid over `[start, limit]` with a positive step.
    ///
    /// Grids with more than [`MAX_SWEEP_VALUES`] values are rejected.
    pub fn new(start: f32, limit: f32, step: f32) -> FragMatchResult<Self> {
        if !start.is_finite() || !limit.is_finite() || !step.is_finite() {
            return Err(FragMatchError::InvalidSweep {
                reason: "non-finite sweep parameters",
            });
        }
        if step <= 0.0 {
            return Err(FragMatchError::InvalidSweep {
                reason: "step must be > 0",
            });
        }
        if limit < start {
            return Err(FragMatchError::InvalidSweep {
                reason: "limit must not be below start",
            });
        }

        let steps = (f64::from(limit) - f64::from(start)) / f64::from(step);
        let last_idx = (steps + f64::from(LIMIT_SLACK)).floor();
        if last_idx >= MAX_SWEEP_VALUES as f64 {
            return Err(FragMatchError::InvalidSweep {
                reason: "too many sweep values",
            });
        }
        let len = last_idx as usize + 1;

        Ok(Self {
            start,
            limit,
            step,
            len,
        })
    }

    /// Returns the number of values in the grid.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the grid has no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the first value.
    pub fn start(&self) -> f32 {
        self.start
    }

    /// Returns the inclusive upper limit.
    pub fn limit(&self) -> f32 {
        self.limit
    }

    /// Returns the step size.
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Returns the value at `idx`.
    pub fn value_at(&self, idx: usize) -> f32 {
        debug_assert!(idx < self.len);
        self.start + (idx as f32) * self.step
    }

    /// Iterates over all values in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.len).map(|idx| self.value_at(idx))
    }
}
