//! Math utilities for the motion-control kernel.
//!
//! This module provides wraparound arithmetic for circular encoder domains.

pub mod angle;
