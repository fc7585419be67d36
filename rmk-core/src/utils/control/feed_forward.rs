//! Pluggable additive feed-forward correction.

/// Correction evaluated once per tick and added to the PID output.
///
/// Implementations carry their own context; the value itself is the opaque
/// state the strategy closes over.
pub trait FeedForward {
    /// Current correction, in output units.
    fn correction(&self) -> i32;
}

/// Strategy that contributes nothing.
pub struct ZeroFeedForward;

impl FeedForward for ZeroFeedForward {
    fn correction(&self) -> i32 {
        0
    }
}

/// Default strategy installed by every constructor; a controller never runs
/// without one.
pub static ZERO_FEED_FORWARD: ZeroFeedForward = ZeroFeedForward;
