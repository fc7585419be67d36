//! Utility re-exports and helper macros for the motion-control kernel.
//!
//! This module groups the control loop, its collaborator traits, and the
//! supporting math and decode helpers:
//!
//! - `control`: PID math kernel, mode dispatch, error history, feed-forward
//! - `feedback`: motor feedback and chassis power telemetry traits
//! - `fault`: fault reporting collaborator
//! - `math`: wraparound arithmetic for circular encoder domains
//! - `remote`: operator remote frame decoding
//!
//! The `mk_static!` macro simplifies static initialization in no-std contexts.

pub mod control;
pub mod fault;
pub mod feedback;
pub mod math;
pub mod remote;

pub use control::pid::Controller;
pub use control::CONTROL_CHANNEL;
pub use embassy_time::*;

#[macro_export]
/// Initialize a no-std static cell and write the given value into it.
///
/// This macro creates a `static_cell::StaticCell` for type `$t` and initializes
/// it with `$val`, returning a mutable reference to the stored value.
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        STATIC_CELL.uninit().write($val)
    }};
}
