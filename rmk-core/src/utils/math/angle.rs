//! Wraparound arithmetic for circular encoder domains.
//!
//! A magnetic encoder reports angles in a fixed number of counts per
//! revolution, so the raw difference of two readings can be off by a full
//! turn. Feedback implementations fold differences through [`wrap_delta`]
//! before handing them to the control loop as errors.

/// Counts per revolution of the stock 13-bit magnetic encoder.
pub const ENCODER_COUNTS: i32 = 8192;

/// Fold `delta` into `(-range/2, range/2]`, the shortest signed path
/// between two circular readings.
pub fn wrap_delta(delta: i32, range: i32) -> i32 {
    let half = range / 2;
    let mut delta = delta % range;
    if delta > half {
        delta -= range;
    } else if delta <= -half {
        delta += range;
    }
    delta
}
