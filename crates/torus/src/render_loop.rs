use serde::Serialize;

use crate::canvas::{Canvas, SurfaceSize};
use crate::engine::WallpaperEngine;
use crate::throttle::{FpsThrottler, RenderRequester};
use crate::time::{TimeController, ELAPSED_TIME_LIMIT_SECS};

const NANOS_PER_MILLI: i64 = 1_000_000;

/// Settings applied when a [`RenderLoop`] is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopOptions {
    /// Target frame rate; `<= 0` starts in on-demand mode.
    pub fps: f32,
    pub elapsed_time_limit: f32,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            fps: crate::throttle::DEFAULT_FPS,
            elapsed_time_limit: ELAPSED_TIME_LIMIT_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Created,
    Running,
    Paused,
    Destroyed,
}

/// What happened to one display refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The loop is not running; nothing was touched.
    Paused,
    /// Frame pacing or the absence of a request held the frame back.
    Throttled,
    /// The frame was admitted but the engine or surface did not draw.
    Declined,
    Rendered,
}

/// Counters accumulated across [`RenderLoop::do_frame`] calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LoopStats {
    pub frames: u64,
    pub rendered: u64,
    pub throttled: u64,
    pub declined: u64,
    pub elapsed_secs: f32,
}

/// Per-refresh update/render cycle for one wallpaper engine.
pub struct RenderLoop<E: WallpaperEngine> {
    engine: E,
    time: TimeController,
    throttler: FpsThrottler,
    canvas: Canvas,
    state: LoopState,
    stats: LoopStats,
}

impl<E: WallpaperEngine> RenderLoop<E> {
    pub fn new(engine: E, options: LoopOptions) -> Self {
        let mut throttler = FpsThrottler::new();
        throttler.update_fps(options.fps);
        Self {
            engine,
            time: TimeController::new().with_elapsed_time_limit(options.elapsed_time_limit),
            throttler,
            canvas: Canvas::new(SurfaceSize::default()),
            state: LoopState::Created,
            stats: LoopStats::default(),
        }
    }

    pub fn create(&mut self, size: SurfaceSize) {
        self.canvas.resize(size);
        self.engine.create(size);
        self.throttler.request_rendering();
        tracing::debug!(width = size.width, height = size.height, "engine created");
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        if self.state == LoopState::Destroyed {
            return;
        }
        self.canvas.resize(size);
        self.engine.resize(size);
        self.throttler.reset();
        self.throttler.request_rendering();
        tracing::debug!(width = size.width, height = size.height, "surface resized");
    }

    /// Starts or restarts frame processing at `now_nanos`.
    ///
    /// The time baseline moves to `now_nanos` so time spent paused never shows up as a
    /// delta.
    pub fn resume(&mut self, now_nanos: i64) {
        if matches!(self.state, LoopState::Running | LoopState::Destroyed) {
            return;
        }
        // No delta is pending between frames, so this only moves the baseline.
        self.time.reset_delta_time(now_nanos / NANOS_PER_MILLI);
        self.state = LoopState::Running;
        self.engine.resume();
        self.throttler.request_rendering();
        tracing::debug!(now_nanos, "render loop resumed");
    }

    pub fn pause(&mut self) {
        if self.state != LoopState::Running {
            return;
        }
        self.state = LoopState::Paused;
        self.engine.pause();
        tracing::debug!("render loop paused");
    }

    pub fn destroy(&mut self) {
        if self.state == LoopState::Destroyed {
            return;
        }
        self.pause();
        self.engine.destroy();
        self.state = LoopState::Destroyed;
        tracing::debug!(stats = ?self.stats, "engine destroyed");
    }

    pub fn set_fps(&mut self, fps: f32) {
        self.throttler.update_fps(fps);
    }

    pub fn requester(&self) -> RenderRequester {
        self.throttler.requester()
    }

    /// Handles one display refresh starting at `frame_time_nanos`.
    pub fn do_frame(&mut self, frame_time_nanos: i64) -> FrameOutcome {
        if self.state != LoopState::Running {
            return FrameOutcome::Paused;
        }
        self.stats.frames += 1;

        let now_millis = frame_time_nanos / NANOS_PER_MILLI;
        self.time.update_delta_time(now_millis);
        self.engine.update(&self.time);
        self.time.reset_delta_time(now_millis);
        if self.time.reset_elapsed_time_if_needed() {
            tracing::warn!(
                limit = self.time.elapsed_time_limit(),
                "elapsed time passed its limit; animation origin reset"
            );
        }
        self.stats.elapsed_secs = self.time.elapsed_time();

        if !self.throttler.can_render(frame_time_nanos) {
            tracing::trace!(frame_time_nanos, "frame skipped by throttler");
            self.stats.throttled += 1;
            return FrameOutcome::Throttled;
        }

        let engine = &mut self.engine;
        let canvas = &mut self.canvas;
        let time = &self.time;
        let rendered = self.throttler.try_render(frame_time_nanos, || {
            canvas.is_valid() && engine.render(canvas, time)
        });

        if rendered {
            tracing::trace!(frame_time_nanos, "frame rendered");
            self.stats.rendered += 1;
            FrameOutcome::Rendered
        } else {
            tracing::trace!(frame_time_nanos, "frame declined by engine or surface");
            self.stats.declined += 1;
            FrameOutcome::Declined
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn time(&self) -> &TimeController {
        &self.time
    }

    pub fn throttler(&self) -> &FpsThrottler {
        &self.throttler
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}
