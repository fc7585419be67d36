//! Control-loop building blocks.
//!
//! The pieces compose leaf to root: `history` keeps recent error samples,
//! `kernel` turns them into a PID output, `pid` derives the per-mode error
//! and drives the kernel once per tick, `feed_forward` contributes the
//! additive correction. Commands reach the loop over `CONTROL_CHANNEL`.

pub mod feed_forward;
pub mod history;
pub mod kernel;
pub mod pid;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use serde::{Deserialize, Serialize};

pub use feed_forward::{FeedForward, ZeroFeedForward, ZERO_FEED_FORWARD};
pub use history::{ErrorHistory, HISTORY_DEPTH};
pub use kernel::{Gains, Limits, PidKernel};
pub use pid::{ControlMode, Controller};

/// Nominal period of the stock control loop.
pub const CONTROL_PERIOD: embassy_time::Duration = embassy_time::Duration::from_millis(5);

/// Channel used to feed the control task (`ControlCommand` messages).
pub static CONTROL_CHANNEL: embassy_sync::channel::Channel<
    CriticalSectionRawMutex,
    ControlCommand,
    16,
> = embassy_sync::channel::Channel::new();

/// Command variants accepted by a running control task.
///
/// Serialized as JSON with tag `"cc"`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(tag = "cc", rename_all = "snake_case")]
pub enum ControlCommand {
    /// New loop target (angle, speed, or power, depending on controller mode).
    T { v: i32 },
    /// Retune the PID gains on the fly.
    G { kp: f32, ki: f32, kd: f32 },
}
