use std::time::{Duration, Instant};

use crossbeam_channel::{after, never, select, Receiver};

use crate::canvas::SurfaceSize;
use crate::engine::WallpaperEngine;
use crate::error::TorusError;
use crate::render_loop::{LoopStats, RenderLoop};

/// Lifecycle and configuration changes sent to a running loop from other threads.
///
/// Render requests do not travel here; use [`RenderRequester`](crate::RenderRequester).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopCommand {
    SetFps(f32),
    Pause,
    Resume,
    Resize(SurfaceSize),
    Stop,
}

/// Pumps frame timestamps and commands into `render_loop` until stopped.
///
/// Returns when a [`LoopCommand::Stop`] arrives or `deadline` passes. A resume is
/// stamped with the most recent frame timestamp so it stays in the vsync time base.
pub fn drive<E: WallpaperEngine>(
    render_loop: &mut RenderLoop<E>,
    frames: &Receiver<i64>,
    commands: &Receiver<LoopCommand>,
    deadline: Option<Duration>,
) -> Result<LoopStats, TorusError> {
    let started = Instant::now();
    let timeout = deadline.map(after).unwrap_or_else(never);
    let idle = never();
    let mut commands_open = true;
    let mut last_frame_nanos = 0;

    loop {
        let command_rx = if commands_open { commands } else { &idle };
        select! {
            recv(frames) -> frame => match frame {
                Ok(nanos) => {
                    last_frame_nanos = nanos;
                    render_loop.do_frame(nanos);
                }
                Err(_) => return Err(TorusError::VsyncDisconnected),
            },
            recv(command_rx) -> command => match command {
                Ok(LoopCommand::SetFps(fps)) => render_loop.set_fps(fps),
                Ok(LoopCommand::Pause) => render_loop.pause(),
                Ok(LoopCommand::Resume) => render_loop.resume(last_frame_nanos),
                Ok(LoopCommand::Resize(size)) => render_loop.resize(size),
                Ok(LoopCommand::Stop) => break,
                Err(_) => {
                    tracing::debug!("command channel closed; driving until deadline");
                    commands_open = false;
                }
            },
            recv(timeout) -> _ => break,
        }
    }

    let stats = render_loop.stats();
    tracing::info!(
        frames = stats.frames,
        rendered = stats.rendered,
        throttled = stats.throttled,
        declined = stats.declined,
        wall_secs = started.elapsed().as_secs_f32(),
        "render loop stopped"
    );
    Ok(stats)
}
