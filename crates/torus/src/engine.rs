use crate::canvas::{Canvas, SurfaceSize};
use crate::time::TimeController;

/// Wallpaper content driven by a [`RenderLoop`](crate::RenderLoop).
///
/// Lifecycle: `create` once, then any number of `resume`/`pause` and `resize` calls,
/// then `destroy`. While running, `update` runs every display refresh and `render` only
/// on frames the throttler admits.
pub trait WallpaperEngine {
    /// Called once the surface exists.
    fn create(&mut self, size: SurfaceSize);

    fn resize(&mut self, _size: SurfaceSize) {}

    fn resume(&mut self) {}

    fn pause(&mut self) {}

    /// Advances animation state. `time` holds the delta for this step.
    fn update(&mut self, _time: &TimeController) {}

    /// Draws the current state. Returning `false` means nothing was presented and the
    /// frame will be retried.
    fn render(&mut self, canvas: &mut Canvas, time: &TimeController) -> bool;

    fn destroy(&mut self) {}
}
