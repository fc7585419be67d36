//! Motion-control kernel for real-time robot actuators on no-std embedded platforms.
//!
//! For a runnable simulation against a mocked motor, see the `mock-rig` crate.
#![no_std]

pub mod utils;
