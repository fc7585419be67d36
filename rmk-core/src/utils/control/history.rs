//! Fixed-depth ring of recent error samples.

/// History depth shared by the stock controllers.
pub const HISTORY_DEPTH: usize = 5;

/// Circular buffer holding the `N` most recent error samples.
///
/// The write index advances before every write, so the latest sample is at
/// `recent(0)` and the oldest surviving one at `recent(N - 1)`. The index
/// stays in `[0, N)` by construction.
pub struct ErrorHistory<const N: usize> {
    err: [i32; N],
    idx: usize,
}

impl<const N: usize> ErrorHistory<N> {
    pub const fn new() -> Self {
        Self { err: [0; N], idx: 0 }
    }

    /// Advance the write index and store `value` as the most recent sample.
    pub fn push(&mut self, value: i32) {
        self.idx = (self.idx + 1) % N;
        self.err[self.idx] = value;
    }

    /// Sample written `n` pushes before the most recent one.
    ///
    /// Defined for `n < N`; the lookup index is `(idx + N - n) mod N`.
    pub fn recent(&self, n: usize) -> i32 {
        debug_assert!(n < N, "history lookback {} exceeds depth {}", n, N);
        self.err[(self.idx + N - n % N) % N]
    }
}

impl<const N: usize> Default for ErrorHistory<N> {
    fn default() -> Self {
        Self::new()
    }
}
