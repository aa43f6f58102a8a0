use std::time::Duration;

use torus::{argb, Canvas, Curve, FadeEnvelope, SurfaceSize, TimeController, WallpaperEngine};

/// Demo wallpaper: a vertical gradient whose brightness pulses over `period` and fades
/// in after every resume.
pub struct PulseEngine {
    curve: Curve,
    period_secs: f32,
    fade_in_secs: f32,
    fade: Option<FadeEnvelope>,
    fade_pending: bool,
    brightness: f32,
    size: SurfaceSize,
}

impl PulseEngine {
    pub fn new(curve: Curve, period: Duration, fade_in: Duration) -> Self {
        Self {
            curve,
            period_secs: period.as_secs_f32().max(f32::EPSILON),
            fade_in_secs: fade_in.as_secs_f32(),
            fade: None,
            fade_pending: false,
            brightness: 0.0,
            size: SurfaceSize::default(),
        }
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }
}

impl WallpaperEngine for PulseEngine {
    fn create(&mut self, size: SurfaceSize) {
        self.size = size;
        tracing::debug!(width = size.width, height = size.height, curve = %self.curve, "pulse wallpaper created");
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn resume(&mut self) {
        self.fade_pending = true;
    }

    fn update(&mut self, time: &TimeController) {
        let now = time.elapsed_time();
        if self.fade_pending {
            self.fade = FadeEnvelope::new(self.fade_in_secs, Curve::Smoothstep, now);
            self.fade_pending = false;
        }

        // Triangle wave over one period, shaped by the curve.
        let phase = (now % self.period_secs) / self.period_secs;
        let wave = if phase < 0.5 {
            phase * 2.0
        } else {
            2.0 - phase * 2.0
        };
        let level = self.curve.sample(wave);

        let fade_mix = match self.fade {
            Some(envelope) => {
                let (_, incoming, finished) = envelope.mixes(now);
                if finished {
                    self.fade = None;
                }
                incoming
            }
            None => 1.0,
        };
        self.brightness = (0.15 + 0.85 * level) * fade_mix;
    }

    fn render(&mut self, canvas: &mut Canvas, _time: &TimeController) -> bool {
        let height = canvas.height().max(1) as f32;
        for y in 0..canvas.height() {
            let shade = self.brightness * (1.0 - 0.5 * y as f32 / height);
            let colour = argb(shade * 0.25, shade * 0.55, shade);
            for x in 0..canvas.width() {
                canvas.set_pixel(x, y, colour);
            }
        }
        true
    }

    fn destroy(&mut self) {
        tracing::debug!(brightness = self.brightness(), "pulse wallpaper destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advance(time: &mut TimeController, engine: &mut PulseEngine, millis: i64) {
        let now = time.last_time_millis() + millis;
        time.update_delta_time(now);
        engine.update(time);
        time.reset_delta_time(now);
    }

    #[test]
    fn fades_in_after_resume() {
        let mut engine = PulseEngine::new(
            Curve::Linear,
            Duration::from_secs(2),
            Duration::from_millis(500),
        );
        engine.create(SurfaceSize::new(4, 4));
        engine.resume();

        let mut time = TimeController::new();
        advance(&mut time, &mut engine, 0);
        assert_eq!(engine.brightness(), 0.0);

        advance(&mut time, &mut engine, 600);
        advance(&mut time, &mut engine, 0);
        assert!(engine.brightness() > 0.15);
    }

    #[test]
    fn renders_gradient() {
        let mut engine =
            PulseEngine::new(Curve::Smoothstep, Duration::from_secs(1), Duration::ZERO);
        engine.create(SurfaceSize::new(2, 4));
        let mut time = TimeController::new();
        advance(&mut time, &mut engine, 500);
        advance(&mut time, &mut engine, 0);

        let mut canvas = Canvas::new(SurfaceSize::new(2, 4));
        assert!(engine.render(&mut canvas, &time));
        let top = canvas.pixel(0, 0).unwrap();
        let bottom = canvas.pixel(1, 3).unwrap();
        assert_ne!(top, 0);
        assert!(top & 0xFF > bottom & 0xFF);
    }
}
