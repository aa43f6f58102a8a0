/// Elapsed time (seconds) past which [`TimeController`] rolls its origin back to zero.
///
/// One `f32` step at this magnitude is just under a millisecond (2^-10 s).
pub const ELAPSED_TIME_LIMIT_SECS: f32 = 8_192.0;

/// Largest accepted limit; an `f32` step here is about 2 ms.
pub const MAX_ELAPSED_TIME_LIMIT_SECS: f32 = 16_384.0;

/// Converts absolute frame timestamps into delta and elapsed time for animation logic.
///
/// Usage per logical frame:
/// 1. [`update_delta_time`](Self::update_delta_time) with the frame timestamp,
/// 2. consume [`delta_time_millis`](Self::delta_time_millis),
/// 3. [`reset_delta_time`](Self::reset_delta_time) with the same timestamp.
///
/// Elapsed time only grows on reset, by the delta measured since the previous reset.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeController {
    /// Accumulated in `f64` so small deltas are never rounded away; read out as `f32`.
    elapsed_time: f64,
    delta_time_millis: i64,
    last_time_millis: i64,
    elapsed_time_limit: f32,
}

impl TimeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the threshold used by [`reset_elapsed_time_if_needed`](Self::reset_elapsed_time_if_needed).
    ///
    /// Values above [`MAX_ELAPSED_TIME_LIMIT_SECS`] are clamped to it.
    pub fn with_elapsed_time_limit(mut self, limit_secs: f32) -> Self {
        self.elapsed_time_limit = limit_secs.min(MAX_ELAPSED_TIME_LIMIT_SECS);
        self
    }

    /// Rolls the baseline over to `current_time_millis` and folds the pending delta into
    /// the elapsed time.
    pub fn reset_delta_time(&mut self, current_time_millis: i64) {
        self.last_time_millis = current_time_millis;
        self.elapsed_time += self.delta_time_millis as f64 * 0.001;
        self.delta_time_millis = 0;
    }

    /// Measures the delta since the last reset. The baseline is left untouched.
    ///
    /// Non-monotonic timestamps produce a negative delta; nothing clamps it.
    pub fn update_delta_time(&mut self, current_time_millis: i64) {
        self.delta_time_millis = current_time_millis - self.last_time_millis;
    }

    /// Zeroes the elapsed time once it passes the configured limit.
    ///
    /// Returns `true` when the origin jumped. Consumers that need unbounded growth must
    /// tolerate this; periodic animations (elapsed modulo a period) are unaffected.
    pub fn reset_elapsed_time_if_needed(&mut self) -> bool {
        if self.elapsed_time > self.elapsed_time_limit as f64 {
            self.elapsed_time = 0.0;
            true
        } else {
            false
        }
    }

    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time as f32
    }

    pub fn delta_time_millis(&self) -> i64 {
        self.delta_time_millis
    }

    pub fn delta_time_secs(&self) -> f32 {
        self.delta_time_millis as f32 * 0.001
    }

    pub fn last_time_millis(&self) -> i64 {
        self.last_time_millis
    }

    pub fn elapsed_time_limit(&self) -> f32 {
        self.elapsed_time_limit
    }
}

impl Default for TimeController {
    fn default() -> Self {
        Self {
            elapsed_time: 0.0,
            delta_time_millis: 0,
            last_time_millis: 0,
            elapsed_time_limit: ELAPSED_TIME_LIMIT_SECS,
        }
    }
}
