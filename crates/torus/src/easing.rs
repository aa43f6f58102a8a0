use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Interpolation curves used by wallpaper animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Curve {
    Linear,
    #[default]
    Smoothstep,
    EaseInOut,
}

impl Curve {
    /// Maps progress `t` (clamped to `[0, 1]`; NaN counts as 0) onto the curve.
    pub fn sample(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Curve::Linear => t,
            Curve::Smoothstep => t * t * (3.0 - 2.0 * t),
            // Quadratic in on the first half, mirrored quadratic out on the second.
            Curve::EaseInOut if t < 0.5 => 2.0 * t * t,
            Curve::EaseInOut => {
                let rest = 1.0 - t;
                1.0 - 2.0 * rest * rest
            }
        }
    }
}

impl FromStr for Curve {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Curve::Linear),
            "smoothstep" | "smooth" => Ok(Curve::Smoothstep),
            "ease-in-out" | "easeinout" | "ease" => Ok(Curve::EaseInOut),
            other => Err(format!(
                "unknown curve '{other}'; expected linear, smoothstep, or ease-in-out"
            )),
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Curve::Linear => f.write_str("linear"),
            Curve::Smoothstep => f.write_str("smoothstep"),
            Curve::EaseInOut => f.write_str("ease-in-out"),
        }
    }
}

/// Two-way mix driven by elapsed animation time rather than wall clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeEnvelope {
    start_secs: f32,
    duration_secs: f32,
    curve: Curve,
}

impl FadeEnvelope {
    pub fn new(duration_secs: f32, curve: Curve, start_secs: f32) -> Option<Self> {
        if duration_secs <= 0.0 || duration_secs.is_nan() {
            None
        } else {
            Some(Self {
                start_secs,
                duration_secs,
                curve,
            })
        }
    }

    /// Returns `(outgoing, incoming, finished)` at `now_secs`.
    ///
    /// Times before the start (e.g. after an elapsed-time origin reset) count as zero
    /// progress.
    pub fn mixes(&self, now_secs: f32) -> (f32, f32, bool) {
        let elapsed = (now_secs - self.start_secs).max(0.0);
        let progress = elapsed / self.duration_secs.max(f32::EPSILON);
        let mix = self.curve.sample(progress);
        let finished = progress >= 1.0;
        (1.0 - mix, mix, finished)
    }
}
