//! Shared PID math pipeline: anti-windup, deadband, derivative-spike
//! rejection, and output clamping, in a position-form and a delta-form
//! variant over one error history.

use serde::{Deserialize, Serialize};

use super::history::ErrorHistory;

/// PID gain triple.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Gains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

impl Gains {
    pub const fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self { kp, ki, kd }
    }
}

/// Limit configuration shared by every control mode.
///
/// Every field uses 0 (or 0.0) as a sentinel for "no limit applied". A
/// deliberate zero-valued limit is therefore indistinguishable from a
/// disabled one; callers needing a genuine zero bound must encode it
/// differently.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Limits {
    /// Lower target bound.
    pub low_lim: i32,
    /// Upper target bound.
    pub high_lim: i32,
    /// Integrator magnitude bound.
    pub int_lim: i32,
    /// Integrator freeze range: errors at or beyond it leave the integrator
    /// untouched for that tick.
    pub int_rng: i32,
    /// Derivative spike threshold: a larger one-tick error jump zeroes the
    /// D term.
    pub max_derr: i32,
    /// Final output magnitude bound.
    pub maxout: f32,
    /// Error magnitude below which P and D see a zero error.
    pub deadband: f32,
}

/// Position- and delta-form PID over an error history.
///
/// Owns the integrator, which persists across ticks until [`reset`] is
/// called.
///
/// [`reset`]: PidKernel::reset
pub struct PidKernel {
    gains: Gains,
    limits: Limits,
    integrator: i32,
}

impl PidKernel {
    pub const fn new(gains: Gains, limits: Limits) -> Self {
        Self {
            gains,
            limits,
            integrator: 0,
        }
    }

    pub fn set_gains(&mut self, kp: f32, ki: f32, kd: f32) {
        self.gains = Gains::new(kp, ki, kd);
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn integrator(&self) -> i32 {
        self.integrator
    }

    /// Clear the accumulated integrator.
    pub fn reset(&mut self) {
        self.integrator = 0;
    }

    /// Position-form output over the two most recent samples.
    pub fn position<const N: usize>(&mut self, history: &ErrorHistory<N>) -> f32 {
        self.pipeline(history.recent(0), history.recent(1))
    }

    /// Delta-form output for rate-of-change-oriented control: runs the same
    /// pipeline on the first differences of the three most recent samples.
    pub fn delta<const N: usize>(&mut self, history: &ErrorHistory<N>) -> f32 {
        let err_now = history.recent(1) - history.recent(0);
        let err_last = history.recent(2) - history.recent(1);
        self.pipeline(err_now, err_last)
    }

    // Integrator update precedes deadband zeroing: a small error still
    // integrates even while P and D ignore it.
    fn pipeline(&mut self, err_now: i32, err_last: i32) -> f32 {
        let mut err_now = err_now;

        if self.limits.int_rng == 0 || err_now.abs() < self.limits.int_rng {
            self.integrator = self.integrator.saturating_add(err_now);
        }
        if self.limits.int_lim != 0 {
            self.integrator = self
                .integrator
                .clamp(-self.limits.int_lim, self.limits.int_lim);
        }
        if self.limits.deadband != 0.0 && (err_now.abs() as f32) < self.limits.deadband {
            err_now = 0;
        }

        let pout = self.gains.kp * err_now as f32;
        let iout = self.gains.ki * self.integrator as f32;
        let mut dout = self.gains.kd * (err_now - err_last) as f32;
        if self.limits.max_derr != 0 && (err_now - err_last).abs() > self.limits.max_derr {
            dout = 0.0;
        }

        let out = pout + iout + dout;
        if self.limits.maxout != 0.0 {
            out.clamp(-self.limits.maxout, self.limits.maxout)
        } else {
            out
        }
    }
}
