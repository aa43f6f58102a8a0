use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Frame rate used until [`FpsThrottler::update_fps`] is called.
pub const DEFAULT_FPS: f32 = 60.0;

const NANOS_TO_MILLIS: f64 = 1.0 / 1_000_000.0;

/// Cloneable handle for asking the throttler to admit one frame in on-demand mode.
///
/// Safe to use from any thread. The render thread takes the flag just before drawing, so
/// a request made while a frame is being drawn stays pending for the next one.
#[derive(Debug, Clone, Default)]
pub struct RenderRequester {
    flag: Arc<AtomicBool>,
}

impl RenderRequester {
    /// Sets the one-shot request. Repeated calls before the next render starts collapse
    /// into one.
    pub fn request(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Clears the flag and returns whether it was set.
    fn take(&self) -> bool {
        self.flag.swap(false, Ordering::AcqRel)
    }
}

/// Gates render attempts either to a target frame rate (continuous mode) or to explicit
/// requests (on-demand mode).
#[derive(Debug)]
pub struct FpsThrottler {
    fps: f32,
    frame_time_millis: f64,
    /// Start time of the last accepted frame; `None` until the first render.
    last_frame_time_nanos: Option<i64>,
    continuous_rendering_mode: bool,
    requester: RenderRequester,
}

impl FpsThrottler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches to continuous mode at `fps`, or to on-demand mode when `fps <= 0`.
    ///
    /// On-demand leaves the stored rate untouched so a later positive value is the only
    /// way back to pacing.
    pub fn update_fps(&mut self, fps: f32) {
        if fps <= 0.0 {
            self.continuous_rendering_mode = false;
            tracing::debug!(fps, "throttler switched to on-demand rendering");
            return;
        }
        self.continuous_rendering_mode = true;
        self.fps = fps;
        self.frame_time_millis = 1000.0 / fps as f64;
        tracing::debug!(
            fps,
            frame_time_ms = self.frame_time_millis,
            "throttler switched to continuous rendering"
        );
    }

    pub fn set_continuous_rendering_mode(&mut self, continuous: bool) {
        self.continuous_rendering_mode = continuous;
    }

    pub fn request_rendering(&self) {
        self.requester.request();
    }

    /// Handle sharing this throttler's request flag, for use on other threads.
    pub fn requester(&self) -> RenderRequester {
        self.requester.clone()
    }

    /// Whether a frame starting at `frame_time_nanos` would be admitted. Never mutates.
    pub fn can_render(&self, frame_time_nanos: i64) -> bool {
        if !self.continuous_rendering_mode {
            return self.requester.is_requested();
        }
        match self.last_frame_time_nanos {
            None => true,
            Some(last) => {
                let since_last_ms = (frame_time_nanos - last) as f64 * NANOS_TO_MILLIS;
                since_last_ms >= self.frame_time_millis
            }
        }
    }

    /// Runs `on_render_permitted` when the frame is admitted and records it if the
    /// callback reports success.
    ///
    /// The recorded timestamp is the frame's start, so render duration does not skew
    /// pacing. A declined callback leaves every field as it was, pending request included.
    /// The request is taken before the callback runs, so one raised during the callback
    /// is kept for the next frame.
    pub fn try_render<F>(&mut self, frame_time_nanos: i64, on_render_permitted: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        if !self.can_render(frame_time_nanos) {
            return false;
        }
        let was_requested = self.requester.take();
        if !on_render_permitted() {
            if was_requested {
                self.requester.request();
            }
            return false;
        }
        self.last_frame_time_nanos = Some(frame_time_nanos);
        true
    }

    /// Forgets the last accepted frame so the next continuous frame renders immediately.
    pub fn reset(&mut self) {
        self.last_frame_time_nanos = None;
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn frame_time_millis(&self) -> f64 {
        self.frame_time_millis
    }

    pub fn is_continuous(&self) -> bool {
        self.continuous_rendering_mode
    }

    pub fn is_render_requested(&self) -> bool {
        self.requester.is_requested()
    }

    pub fn last_frame_time_nanos(&self) -> Option<i64> {
        self.last_frame_time_nanos
    }
}

impl Default for FpsThrottler {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            frame_time_millis: 1000.0 / DEFAULT_FPS as f64,
            last_frame_time_nanos: None,
            continuous_rendering_mode: true,
            requester: RenderRequester::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const MS: i64 = 1_000_000;

    #[test]
    fn first_continuous_frame_always_renders() {
        let mut throttler = FpsThrottler::new();
        throttler.update_fps(30.0);
        assert!(throttler.try_render(0, || true));
        assert_eq!(throttler.last_frame_time_nanos(), Some(0));
    }

    #[test]
    fn continuous_mode_paces_to_frame_time() {
        let mut throttler = FpsThrottler::new();
        throttler.update_fps(50.0);
        assert!((throttler.frame_time_millis() - 20.0).abs() < 1e-9);

        assert!(throttler.try_render(100 * MS, || true));
        assert!(!throttler.try_render(110 * MS, || true));
        assert!(!throttler.try_render(119 * MS, || true));
        assert!(throttler.try_render(120 * MS, || true));
        assert_eq!(throttler.last_frame_time_nanos(), Some(120 * MS));
    }

    #[test]
    fn declined_callback_keeps_state() {
        let mut throttler = FpsThrottler::new();
        throttler.update_fps(60.0);
        assert!(!throttler.try_render(5 * MS, || false));
        assert_eq!(throttler.last_frame_time_nanos(), None);

        // Retrying the same timestamp gives the same decision.
        assert!(throttler.can_render(5 * MS));
        assert!(throttler.can_render(5 * MS));
        assert!(throttler.try_render(5 * MS, || true));
    }

    #[test]
    fn callback_not_invoked_when_throttled() {
        let mut throttler = FpsThrottler::new();
        throttler.update_fps(10.0);
        assert!(throttler.try_render(0, || true));
        let mut called = false;
        assert!(!throttler.try_render(50 * MS, || {
            called = true;
            true
        }));
        assert!(!called);
    }

    #[test]
    fn on_demand_requires_request() {
        let mut throttler = FpsThrottler::new();
        throttler.update_fps(0.0);
        assert!(!throttler.is_continuous());
        assert!(!throttler.try_render(0, || true));

        throttler.request_rendering();
        throttler.request_rendering();
        assert!(throttler.try_render(MS, || true));
        assert!(!throttler.is_render_requested());
        assert!(!throttler.try_render(1_000 * MS, || true));
    }

    #[test]
    fn on_demand_request_survives_declined_render() {
        let mut throttler = FpsThrottler::new();
        throttler.update_fps(-1.0);
        throttler.request_rendering();
        assert!(!throttler.try_render(0, || false));
        assert!(throttler.is_render_requested());
        assert!(throttler.try_render(0, || true));
    }

    #[test]
    fn request_raised_while_drawing_is_kept() {
        let mut throttler = FpsThrottler::new();
        throttler.update_fps(0.0);
        throttler.request_rendering();
        let requester = throttler.requester();
        assert!(throttler.try_render(0, || {
            requester.request();
            true
        }));
        assert!(throttler.is_render_requested());
        assert!(throttler.try_render(MS, || true));
        assert!(!throttler.is_render_requested());
    }

    #[test]
    fn continuous_render_consumes_stale_request() {
        let mut throttler = FpsThrottler::new();
        throttler.request_rendering();
        assert!(throttler.try_render(0, || true));
        assert!(!throttler.is_render_requested());
    }

    #[test]
    fn switching_modes_keeps_last_frame() {
        let mut throttler = FpsThrottler::new();
        throttler.update_fps(60.0);
        assert!(throttler.try_render(0, || true));

        throttler.update_fps(0.0);
        assert_eq!(throttler.fps(), 60.0);
        assert_eq!(throttler.last_frame_time_nanos(), Some(0));
        assert!(!throttler.try_render(100 * MS, || true));

        throttler.update_fps(60.0);
        assert!(!throttler.can_render(10 * MS));
        assert!(throttler.can_render(17 * MS));
    }

    #[test]
    fn explicit_mode_override() {
        let mut throttler = FpsThrottler::new();
        throttler.set_continuous_rendering_mode(false);
        assert!(!throttler.can_render(0));
        throttler.set_continuous_rendering_mode(true);
        assert!(throttler.can_render(0));
    }

    #[test]
    fn reset_forgets_last_frame() {
        let mut throttler = FpsThrottler::new();
        assert!(throttler.try_render(0, || true));
        assert!(!throttler.can_render(MS));
        throttler.reset();
        assert!(throttler.can_render(MS));
    }

    #[test]
    fn requests_cross_threads() {
        let mut throttler = FpsThrottler::new();
        throttler.update_fps(0.0);
        let requester = throttler.requester();
        thread::spawn(move || requester.request())
            .join()
            .expect("requester thread");
        assert!(throttler.try_render(0, || true));
    }
}
