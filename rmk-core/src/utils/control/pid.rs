//! Multi-mode PID controller: per-mode error synthesis over one math kernel.

use core::mem::MaybeUninit;

use serde::{Deserialize, Serialize};

use crate::utils::control::feed_forward::{FeedForward, ZERO_FEED_FORWARD};
use crate::utils::control::history::{ErrorHistory, HISTORY_DEPTH};
use crate::utils::control::kernel::{Gains, Limits, PidKernel};
use crate::utils::fault::{FaultReporter, LOG_FAULTS};
use crate::utils::feedback::{MotorFeedback, PowerTelemetry};

/// How a tick's raw error is derived from the target and feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// The caller-supplied value already is the error; no target clamping.
    ManualError,
    /// Angle servo: wraparound-aware target clamp, error from the encoder.
    Angle,
    /// Speed servo: linear target clamp, error from the measured speed.
    Speed,
    /// Chassis power regulation against the telemetry source.
    Power,
}

/// Multi-mode PID controller over one motor.
///
/// Owns the feedback handle, the math kernel, and the error history. One
/// [`compute`] call per control tick; scheduling belongs to the caller, and
/// so does serialization if two tasks ever share an actuator.
///
/// [`compute`]: Controller::compute
pub struct Controller<'a, M> {
    mode: ControlMode,
    motor: M,
    kernel: PidKernel,
    history: ErrorHistory<HISTORY_DEPTH>,
    last_target: i32,
    feed_forward: &'a dyn FeedForward,
    telemetry: Option<&'a dyn PowerTelemetry>,
    faults: &'a dyn FaultReporter,
}

impl<'a, M> Controller<'a, M>
where
    M: MotorFeedback,
{
    /// Build a controller around `motor`, refreshing feedback once so the
    /// last applied target starts at the current angle.
    ///
    /// The zero feed-forward strategy and the tracing fault reporter are
    /// installed; swap them with [`set_feed_forward`] and
    /// [`set_fault_reporter`]. [`ControlMode::Power`] additionally needs
    /// [`set_telemetry`] before the first tick.
    ///
    /// [`set_feed_forward`]: Controller::set_feed_forward
    /// [`set_fault_reporter`]: Controller::set_fault_reporter
    /// [`set_telemetry`]: Controller::set_telemetry
    pub fn new(mode: ControlMode, mut motor: M, limits: Limits, gains: Gains) -> Self {
        motor.refresh();
        let last_target = motor.angle();
        Controller {
            mode,
            motor,
            kernel: PidKernel::new(gains, limits),
            history: ErrorHistory::new(),
            last_target,
            feed_forward: &ZERO_FEED_FORWARD,
            telemetry: None,
            faults: &LOG_FAULTS,
        }
    }

    /// In-place counterpart of [`new`] for caller-owned storage (static
    /// cells, pre-reserved task memory).
    ///
    /// [`new`]: Controller::new
    pub fn init_in(
        slot: &mut MaybeUninit<Self>,
        mode: ControlMode,
        motor: M,
        limits: Limits,
        gains: Gains,
    ) -> &mut Self {
        slot.write(Self::new(mode, motor, limits, gains))
    }

    pub fn set_gains(&mut self, kp: f32, ki: f32, kd: f32) {
        self.kernel.set_gains(kp, ki, kd);
    }

    /// Install a feed-forward strategy; takes effect on the next tick.
    pub fn set_feed_forward(&mut self, strategy: &'a dyn FeedForward) {
        self.feed_forward = strategy;
    }

    /// Attach the chassis power source required by [`ControlMode::Power`].
    pub fn set_telemetry(&mut self, source: &'a dyn PowerTelemetry) {
        self.telemetry = Some(source);
    }

    pub fn set_fault_reporter(&mut self, reporter: &'a dyn FaultReporter) {
        self.faults = reporter;
    }

    /// Clear the integrator and the error history.
    pub fn reset(&mut self) {
        self.kernel.reset();
        self.history = ErrorHistory::new();
    }

    pub fn integrator(&self) -> i32 {
        self.kernel.integrator()
    }

    pub fn last_target(&self) -> i32 {
        self.last_target
    }

    pub fn motor(&self) -> &M {
        &self.motor
    }

    pub fn motor_mut(&mut self) -> &mut M {
        &mut self.motor
    }

    /// Run one control tick: derive the mode's error, advance the history,
    /// and return the PID output plus the feed-forward contribution.
    ///
    /// An unsupported configuration (power mode with no telemetry source)
    /// reports one fault and returns a neutral 0 so the loop keeps running.
    pub fn compute(&mut self, target: i32) -> i32 {
        let base = match self.mode {
            ControlMode::ManualError => self.manual_tick(target),
            ControlMode::Angle => {
                self.motor.refresh();
                self.angle_tick(target)
            }
            ControlMode::Speed => {
                self.motor.refresh();
                self.speed_tick(target)
            }
            ControlMode::Power => {
                let Some(source) = self.telemetry else {
                    self.faults
                        .report("compute", line!(), "power mode with no telemetry source");
                    return 0;
                };
                let power = source.chassis_power();
                self.power_tick(target, power)
            }
        };
        base + self.feed_forward.correction()
    }

    fn manual_tick(&mut self, error: i32) -> i32 {
        self.history.push(error);
        self.kernel.position(&self.history) as i32
    }

    fn angle_tick(&mut self, target: i32) -> i32 {
        let limits = *self.kernel.limits();
        let mut target = target;
        // Bounds live in the circular encoder domain; a linear comparison
        // would mis-clamp targets near the wrap point.
        if limits.low_lim != 0 && self.motor.angle_delta_sign(target - limits.low_lim) < 0 {
            target = limits.low_lim;
        } else if limits.high_lim != 0 && self.motor.angle_delta_sign(target - limits.high_lim) > 0 {
            target = limits.high_lim;
        }
        self.last_target = target;
        self.history.push(self.motor.angle_error(target));
        self.kernel.position(&self.history) as i32
    }

    fn speed_tick(&mut self, target: i32) -> i32 {
        let target = self.clip_target(target);
        self.history.push(self.motor.speed_error(target));
        self.kernel.position(&self.history) as i32
    }

    fn power_tick(&mut self, target: i32, power: i32) -> i32 {
        let target = self.clip_target(target);
        self.history.push(target - power);
        self.kernel.position(&self.history) as i32
    }

    // Linear target clipping for the non-circular modes. Unconditional: the
    // sentinel convention does not apply to linear bounds.
    fn clip_target(&self, mut target: i32) -> i32 {
        let limits = self.kernel.limits();
        if target < limits.low_lim {
            target = limits.low_lim;
        } else if target > limits.high_lim {
            target = limits.high_lim;
        }
        target
    }
}
