//! Collaborator traits for actuator feedback and chassis telemetry.
//!
//! The kernel never touches hardware. Implementations own encoder access and
//! the wraparound comparison for circular angle domains (see
//! [`crate::utils::math::angle`]); the control loop treats every read as
//! instantaneous.

/// Synchronous feedback source for one motor.
pub trait MotorFeedback {
    /// Pull fresh encoder data; called once per tick before angle or speed
    /// reads.
    fn refresh(&mut self);

    /// Current angle, in encoder counts.
    fn angle(&self) -> i32;

    /// Wraparound-aware signed error between `target` and the current angle.
    fn angle_error(&self, target: i32) -> i32;

    /// Sign of `delta` interpreted in the circular angle domain: negative,
    /// zero, or positive.
    fn angle_delta_sign(&self, delta: i32) -> i32;

    /// Signed error between `target` and the current speed.
    fn speed_error(&self, target: i32) -> i32;
}

/// Read-only chassis power source used by power-limited control.
pub trait PowerTelemetry {
    /// Current chassis power draw, in the controller's power units.
    fn chassis_power(&self) -> i32;
}
