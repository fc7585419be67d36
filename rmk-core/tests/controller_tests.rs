use core::cell::RefCell;
use core::mem::MaybeUninit;

use rmk_core::utils::control::{
    ControlCommand, ControlMode, Controller, ErrorHistory, FeedForward, Gains, Limits, PidKernel,
};
use rmk_core::utils::fault::FaultReporter;
use rmk_core::utils::feedback::{MotorFeedback, PowerTelemetry};
use rmk_core::utils::math::angle::{wrap_delta, ENCODER_COUNTS};

/// Encoder-backed motor stub with settable angle and speed.
struct StubMotor {
    angle: i32,
    speed: i32,
}

impl StubMotor {
    fn new() -> Self {
        Self { angle: 0, speed: 0 }
    }

    fn at_angle(angle: i32) -> Self {
        Self { angle, speed: 0 }
    }
}

impl MotorFeedback for StubMotor {
    fn refresh(&mut self) {}

    fn angle(&self) -> i32 {
        self.angle
    }

    fn angle_error(&self, target: i32) -> i32 {
        wrap_delta(target - self.angle, ENCODER_COUNTS)
    }

    fn angle_delta_sign(&self, delta: i32) -> i32 {
        wrap_delta(delta, ENCODER_COUNTS)
    }

    fn speed_error(&self, target: i32) -> i32 {
        target - self.speed
    }
}

struct FixedPower(i32);

impl PowerTelemetry for FixedPower {
    fn chassis_power(&self) -> i32 {
        self.0
    }
}

#[derive(Default)]
struct RecordingReporter {
    reports: RefCell<Vec<(String, u32, String)>>,
}

impl FaultReporter for RecordingReporter {
    fn report(&self, site: &str, line: u32, message: &str) {
        self.reports
            .borrow_mut()
            .push((site.into(), line, message.into()));
    }
}

struct Bias(i32);

impl FeedForward for Bias {
    fn correction(&self) -> i32 {
        self.0
    }
}

fn manual(limits: Limits, gains: Gains) -> Controller<'static, StubMotor> {
    Controller::new(ControlMode::ManualError, StubMotor::new(), limits, gains)
}

#[test]
fn history_tracks_most_recent_push() {
    let mut h = ErrorHistory::<5>::new();
    for v in [10, 20, 30, 40, 50, 60] {
        h.push(v);
    }
    assert_eq!(h.recent(0), 60);
    assert_eq!(h.recent(1), 50);
}

#[test]
fn history_wraps_oldest_first() {
    let mut h = ErrorHistory::<5>::new();
    for v in 1..=12 {
        h.push(v);
    }
    for n in 0..5 {
        assert_eq!(h.recent(n), 12 - n as i32);
    }
}

#[test]
fn proportional_passthrough() {
    let mut ctl = manual(Limits::default(), Gains::new(1.0, 0.0, 0.0));
    assert_eq!(ctl.compute(42), 42);
}

#[test]
fn integrator_saturates_at_bound() {
    let limits = Limits {
        int_lim: 100,
        ..Limits::default()
    };
    let mut ctl = manual(limits, Gains::new(0.0, 1.0, 0.0));
    let mut out = 0;
    for _ in 0..10 {
        out = ctl.compute(1000);
    }
    assert_eq!(ctl.integrator(), 100);
    assert_eq!(out, 100);
}

#[test]
fn integrator_bounded_over_mixed_errors() {
    let limits = Limits {
        int_lim: 30,
        ..Limits::default()
    };
    let mut ctl = manual(limits, Gains::new(0.0, 1.0, 0.0));
    for err in [5, -40, 300, -300, 17, 29, -1000, 1000] {
        ctl.compute(err);
        assert!(ctl.integrator().abs() <= 30);
    }
}

#[test]
fn integrator_freezes_on_large_error() {
    let limits = Limits {
        int_rng: 50,
        ..Limits::default()
    };
    let mut ctl = manual(limits, Gains::new(0.0, 1.0, 0.0));
    assert_eq!(ctl.compute(100), 0);
    assert_eq!(ctl.integrator(), 0);
    assert_eq!(ctl.compute(10), 10);
    assert_eq!(ctl.integrator(), 10);
}

#[test]
fn deadband_skips_p_but_not_i() {
    let limits = Limits {
        deadband: 20.0,
        ..Limits::default()
    };
    let mut ctl = manual(limits, Gains::new(1.0, 0.0, 0.0));
    // P sees a zeroed error, the integrator still accumulates the true one.
    assert_eq!(ctl.compute(5), 0);
    assert_eq!(ctl.integrator(), 5);
}

#[test]
fn output_clamped_to_maxout() {
    let limits = Limits {
        maxout: 10.0,
        ..Limits::default()
    };
    let mut ctl = manual(limits, Gains::new(5.0, 0.0, 0.0));
    assert_eq!(ctl.compute(100), 10);
    assert_eq!(ctl.compute(-100), -10);
}

#[test]
fn derivative_spike_rejected() {
    let limits = Limits {
        max_derr: 5,
        ..Limits::default()
    };
    let mut ctl = manual(limits, Gains::new(0.0, 0.0, 3.0));
    ctl.compute(0);
    // One-tick jump of 10 exceeds the threshold, so D contributes nothing.
    assert_eq!(ctl.compute(10), 0);
}

#[test]
fn derivative_applies_below_threshold() {
    let mut ctl = manual(Limits::default(), Gains::new(0.0, 0.0, 3.0));
    ctl.compute(0);
    assert_eq!(ctl.compute(10), 30);
}

#[test]
fn angle_clamp_is_wraparound_aware() {
    // Window crossing the encoder wrap point: low at 8000, high at 200.
    let limits = Limits {
        low_lim: 8000,
        high_lim: 200,
        ..Limits::default()
    };
    let mut ctl = Controller::new(
        ControlMode::Angle,
        StubMotor::at_angle(0),
        limits,
        Gains::new(1.0, 0.0, 0.0),
    );
    // 100 sits inside the window; a linear comparison would have clamped it
    // up to 8000.
    assert_eq!(ctl.compute(100), 100);
    assert_eq!(ctl.last_target(), 100);
    // 300 sits past the high bound on the circular domain.
    ctl.reset();
    assert_eq!(ctl.compute(300), 200);
    assert_eq!(ctl.last_target(), 200);
}

#[test]
fn last_target_seeded_from_current_angle() {
    let ctl = Controller::new(
        ControlMode::Angle,
        StubMotor::at_angle(123),
        Limits::default(),
        Gains::new(1.0, 0.0, 0.0),
    );
    assert_eq!(ctl.last_target(), 123);
}

#[test]
fn speed_clamp_is_linear() {
    let limits = Limits {
        low_lim: -50,
        high_lim: 50,
        ..Limits::default()
    };
    let mut ctl = Controller::new(
        ControlMode::Speed,
        StubMotor::new(),
        limits,
        Gains::new(1.0, 0.0, 0.0),
    );
    assert_eq!(ctl.compute(100), 50);
    assert_eq!(ctl.compute(-100), -50);
}

#[test]
fn power_error_against_telemetry() {
    let limits = Limits {
        low_lim: -1000,
        high_lim: 1000,
        ..Limits::default()
    };
    let meter = FixedPower(80);
    let mut ctl = Controller::new(
        ControlMode::Power,
        StubMotor::new(),
        limits,
        Gains::new(1.0, 0.0, 0.0),
    );
    ctl.set_telemetry(&meter);
    assert_eq!(ctl.compute(100), 20);
}

#[test]
fn power_without_telemetry_reports_once_and_yields_zero() {
    let reporter = RecordingReporter::default();
    let limits = Limits {
        low_lim: -1000,
        high_lim: 1000,
        ..Limits::default()
    };
    let mut ctl = Controller::new(
        ControlMode::Power,
        StubMotor::new(),
        limits,
        Gains::new(1.0, 1.0, 1.0),
    );
    ctl.set_fault_reporter(&reporter);
    assert_eq!(ctl.compute(100), 0);
    let reports = reporter.reports.borrow();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, "compute");
    // Nothing was pushed or integrated on the faulted tick.
    assert_eq!(ctl.integrator(), 0);
}

#[test]
fn feed_forward_replacement_takes_effect_next_tick() {
    let bias = Bias(7);
    let mut ctl = manual(Limits::default(), Gains::new(1.0, 0.0, 0.0));
    assert_eq!(ctl.compute(10), 10);
    ctl.set_feed_forward(&bias);
    assert_eq!(ctl.compute(10), 17);
}

#[test]
fn feed_forward_applies_in_every_mode() {
    let bias = Bias(-3);
    let limits = Limits {
        low_lim: -50,
        high_lim: 50,
        ..Limits::default()
    };
    let mut ctl = Controller::new(
        ControlMode::Speed,
        StubMotor::new(),
        limits,
        Gains::new(1.0, 0.0, 0.0),
    );
    ctl.set_feed_forward(&bias);
    assert_eq!(ctl.compute(20), 17);
}

#[test]
fn delta_form_runs_on_first_differences() {
    let mut kernel = PidKernel::new(Gains::new(1.0, 0.0, 0.0), Limits::default());
    let mut history = ErrorHistory::<5>::new();
    history.push(2);
    // err_now' = recent(1) - recent(0) = 0 - 2.
    assert_eq!(kernel.delta(&history), -2.0);
    assert_eq!(kernel.integrator(), -2);
    history.push(5);
    // err_now' = 2 - 5, err_last' = 0 - 2.
    assert_eq!(kernel.delta(&history), -3.0);
}

#[test]
fn reset_clears_integrator_and_history() {
    let mut ctl = manual(Limits::default(), Gains::new(0.0, 1.0, 0.0));
    ctl.compute(10);
    assert_eq!(ctl.integrator(), 10);
    ctl.reset();
    assert_eq!(ctl.integrator(), 0);
    assert_eq!(ctl.compute(0), 0);
}

#[test]
fn retuned_gains_apply_next_tick() {
    let mut ctl = manual(Limits::default(), Gains::new(1.0, 0.0, 0.0));
    assert_eq!(ctl.compute(10), 10);
    ctl.set_gains(3.0, 0.0, 0.0);
    assert_eq!(ctl.compute(10), 30);
}

#[test]
fn init_in_writes_caller_storage() {
    let mut slot = MaybeUninit::uninit();
    let ctl = Controller::init_in(
        &mut slot,
        ControlMode::ManualError,
        StubMotor::new(),
        Limits::default(),
        Gains::new(1.0, 0.0, 0.0),
    );
    assert_eq!(ctl.compute(42), 42);
}

#[test]
fn wrap_delta_folds_across_the_seam() {
    assert_eq!(wrap_delta(100, ENCODER_COUNTS), 100);
    assert_eq!(wrap_delta(8100, ENCODER_COUNTS), -92);
    assert_eq!(wrap_delta(-8100, ENCODER_COUNTS), 92);
    assert_eq!(wrap_delta(4096, ENCODER_COUNTS), 4096);
    assert_eq!(wrap_delta(-4096, ENCODER_COUNTS), 4096);
}

#[test]
fn command_wire_shape() {
    match serde_json::from_str::<ControlCommand>(r#"{"cc":"t","v":1500}"#).unwrap() {
        ControlCommand::T { v } => assert_eq!(v, 1500),
        other => panic!("unexpected command: {:?}", other),
    }
    match serde_json::from_str::<ControlCommand>(r#"{"cc":"g","kp":2.5,"ki":0.0,"kd":1.0}"#)
        .unwrap()
    {
        ControlCommand::G { kp, ki, kd } => {
            assert_eq!(kp, 2.5);
            assert_eq!(ki, 0.0);
            assert_eq!(kd, 1.0);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}
