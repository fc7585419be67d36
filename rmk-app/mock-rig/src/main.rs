//! Simulation rig for the motion-control kernel: drives a [`Controller`]
//! against a first-order motor model under an embassy ticker, with commands
//! injected over `CONTROL_CHANNEL`.

use core::cell::Cell;

use clap::Parser;
use embassy_executor::{Executor, Spawner};
use embassy_time::{Duration, Ticker, Timer};
use rmk_core::mk_static;
use rmk_core::utils::control::{
    ControlCommand, ControlMode, Controller, Gains, Limits, CONTROL_CHANNEL,
};
use rmk_core::utils::feedback::{MotorFeedback, PowerTelemetry};
use rmk_core::utils::math::angle::{wrap_delta, ENCODER_COUNTS};
use rmk_core::utils::remote::{RemoteFrame, FRAME_LEN};
use static_cell::StaticCell;
use tracing::{error, info};

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// Control mode: manual, angle, speed, or power
    #[clap(long, default_value = "speed")]
    mode: String,
    #[clap(long, default_value_t = 2.5)]
    kp: f32,
    #[clap(long, default_value_t = 0.01)]
    ki: f32,
    #[clap(long, default_value_t = 1.2)]
    kd: f32,
    /// Output magnitude bound (0 disables)
    #[clap(long, default_value_t = 16000.0)]
    maxout: f32,
    /// Lower target bound
    #[clap(long, default_value_t = -16384, allow_hyphen_values = true)]
    low_lim: i32,
    /// Upper target bound
    #[clap(long, default_value_t = 16384)]
    high_lim: i32,
    /// Initial loop target
    #[clap(long, default_value_t = 3000, allow_hyphen_values = true)]
    target: i32,
    /// Control period in milliseconds
    #[clap(long, default_value_t = rmk_core::utils::control::CONTROL_PERIOD.as_millis())]
    period_ms: u64,
    /// Ticks to simulate (0 = run until interrupted)
    #[clap(long, default_value_t = 400)]
    ticks: u32,
    /// JSON command script, e.g. '[{"cc":"t","v":1000}]', played back during the run
    #[clap(long)]
    script: Option<String>,
    /// Raw 18-byte operator frame as hex; channel 1 deflection overrides --target
    #[clap(long)]
    frame: Option<String>,
}

/// First-order motor model on a circular 13-bit encoder.
struct SimMotor {
    angle: i32,
    speed: f32,
    command: f32,
}

impl SimMotor {
    const SPEED_PER_OUTPUT: f32 = 0.05;

    fn new() -> Self {
        Self {
            angle: 0,
            speed: 0.0,
            command: 0.0,
        }
    }

    /// Latch one controller output and advance the model by `dt` seconds.
    fn step(&mut self, output: i32, dt: f32) {
        self.command = output as f32;
        let target_speed = self.command * Self::SPEED_PER_OUTPUT;
        self.speed += (target_speed - self.speed) * (dt * 8.0).min(1.0);
        self.angle = (self.angle + (self.speed * dt * 60.0) as i32).rem_euclid(ENCODER_COUNTS);
    }
}

impl MotorFeedback for SimMotor {
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
        target - self.speed as i32
    }
}

/// Chassis power estimate fed back into power mode; the loop task updates it
/// from the commanded output every tick.
struct SimPowerMeter {
    watts: Cell<i32>,
}

impl SimPowerMeter {
    fn new() -> Self {
        Self { watts: Cell::new(0) }
    }
}

impl PowerTelemetry for SimPowerMeter {
    fn chassis_power(&self) -> i32 {
        self.watts.get()
    }
}

#[embassy_executor::task]
async fn control_task(
    mut ctrl: Controller<'static, SimMotor>,
    meter: &'static SimPowerMeter,
    mut target: i32,
    period_ms: u64,
    ticks: u32,
) {
    let dt = period_ms as f32 / 1000.0;
    let mut ticker = Ticker::every(Duration::from_millis(period_ms));
    let mut n = 0u32;
    loop {
        while let Ok(cmd) = CONTROL_CHANNEL.try_receive() {
            match cmd {
                ControlCommand::T { v } => {
                    info!(v, "target updated");
                    target = v;
                }
                ControlCommand::G { kp, ki, kd } => {
                    info!(kp, ki, kd, "gains updated");
                    ctrl.set_gains(kp, ki, kd);
                }
            }
        }

        let out = ctrl.compute(target);
        ctrl.motor_mut().step(out, dt);
        meter
            .watts
            .set((ctrl.motor().speed.abs() * 0.4) as i32 + (out.abs() / 100));

        if n % 50 == 0 {
            info!(
                tick = n,
                out,
                angle = ctrl.motor().angle,
                speed = ctrl.motor().speed,
                power = meter.watts.get(),
                "loop"
            );
        }
        n += 1;
        if ticks != 0 && n >= ticks {
            info!(ticks, "simulation complete");
            std::process::exit(0);
        }
        ticker.next().await;
    }
}

#[embassy_executor::task]
async fn script_task(commands: Vec<ControlCommand>, period_ms: u64) {
    // Space the scripted commands out so each one is visible in the log.
    for cmd in commands {
        Timer::after(Duration::from_millis(period_ms * 40)).await;
        CONTROL_CHANNEL.send(cmd).await;
    }
}

#[embassy_executor::task]
async fn main_task(spawner: Spawner, opts: Opts) {
    let mode = match opts.mode.as_str() {
        "manual" => ControlMode::ManualError,
        "angle" => ControlMode::Angle,
        "speed" => ControlMode::Speed,
        "power" => ControlMode::Power,
        other => {
            error!("unknown mode: {}", other);
            std::process::exit(2);
        }
    };
    let limits = Limits {
        low_lim: opts.low_lim,
        high_lim: opts.high_lim,
        maxout: opts.maxout,
        ..Limits::default()
    };

    let mut target = opts.target;
    if let Some(hex) = &opts.frame {
        match parse_frame(hex).and_then(|buf| {
            RemoteFrame::decode(&buf).map_err(|e| format!("frame rejected: {:?}", e))
        }) {
            Ok(frame) => {
                target = i32::from(frame.rocker_offset(1)) * 4;
                info!(?frame, target, "operator frame decoded");
            }
            Err(e) => {
                error!("{}", e);
                std::process::exit(2);
            }
        }
    }

    let mut ctrl = Controller::new(mode, SimMotor::new(), limits, Gains::new(opts.kp, opts.ki, opts.kd));
    let meter: &'static SimPowerMeter = mk_static!(SimPowerMeter, SimPowerMeter::new());
    ctrl.set_telemetry(meter);

    if let Some(script) = &opts.script {
        match serde_json::from_str::<Vec<ControlCommand>>(script) {
            Ok(commands) => spawner.spawn(script_task(commands, opts.period_ms)).unwrap(),
            Err(e) => {
                error!("bad command script: {}", e);
                std::process::exit(2);
            }
        }
    }

    info!(mode = ?mode, target, period_ms = opts.period_ms, "starting control loop");
    spawner
        .spawn(control_task(ctrl, meter, target, opts.period_ms, opts.ticks))
        .unwrap();
}

/// Parse a 36-hex-digit string into a raw remote frame.
fn parse_frame(hex: &str) -> Result<[u8; FRAME_LEN], String> {
    let hex = hex.trim();
    if !hex.is_ascii() || hex.len() != FRAME_LEN * 2 {
        return Err(format!(
            "expected {} hex digits, got {}",
            FRAME_LEN * 2,
            hex.len()
        ));
    }
    let mut buf = [0u8; FRAME_LEN];
    for (i, slot) in buf.iter_mut().enumerate() {
        *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|e| format!("bad hex at byte {}: {}", i, e))?;
    }
    Ok(buf)
}

static EXECUTOR: StaticCell<Executor> = StaticCell::new();

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let opts: Opts = Opts::parse();
    let executor = EXECUTOR.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(main_task(spawner, opts)).unwrap();
    });
}
