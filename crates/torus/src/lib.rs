//! Frame-paced wallpaper rendering core.
//!
//! [`TimeController`] turns frame timestamps into delta and elapsed time,
//! [`FpsThrottler`] decides which display refreshes actually render, and
//! [`RenderLoop`] ties both to a [`WallpaperEngine`]. [`Vsync`] and [`drive`] run the
//! loop headless on the current thread.

mod canvas;
mod driver;
mod easing;
mod engine;
mod error;
mod render_loop;
mod throttle;
mod time;
mod vsync;

pub use canvas::{argb, Canvas, SurfaceSize};
pub use driver::{drive, LoopCommand};
pub use easing::{Curve, FadeEnvelope};
pub use engine::WallpaperEngine;
pub use error::TorusError;
pub use render_loop::{FrameOutcome, LoopOptions, LoopState, LoopStats, RenderLoop};
pub use throttle::{FpsThrottler, RenderRequester, DEFAULT_FPS};
pub use time::{TimeController, ELAPSED_TIME_LIMIT_SECS, MAX_ELAPSED_TIME_LIMIT_SECS};
pub use vsync::Vsync;
