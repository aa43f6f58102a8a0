use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, Receiver, Sender, TrySendError};

use crate::error::TorusError;

/// Headless display-refresh source.
///
/// A background thread emits frame start timestamps (nanoseconds since the source
/// started) at a fixed refresh rate. Ticks are dropped while the consumer still holds
/// an unread one, the same way a compositor coalesces missed frame callbacks.
pub struct Vsync {
    /// Dropping this wakes the tick thread and makes it exit.
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl Vsync {
    pub fn spawn(refresh_hz: f32) -> Result<(Self, Receiver<i64>), TorusError> {
        if !refresh_hz.is_finite() || refresh_hz <= 0.0 {
            return Err(TorusError::InvalidRefreshRate(refresh_hz));
        }
        let interval = Duration::try_from_secs_f32(1.0 / refresh_hz)
            .map_err(|_| TorusError::InvalidRefreshRate(refresh_hz))?;
        let (tx, rx) = bounded(1);
        let (stop_tx, stop_rx) = bounded::<()>(0);

        let handle = thread::Builder::new()
            .name("torus-vsync".into())
            .spawn(move || {
                let origin = Instant::now();
                let mut next = origin;
                loop {
                    let wait = next.saturating_duration_since(Instant::now());
                    select! {
                        recv(stop_rx) -> _ => break,
                        default(wait) => {}
                    }
                    let stamp = origin.elapsed().as_nanos().min(i64::MAX as u128) as i64;
                    match tx.try_send(stamp) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            tracing::trace!(stamp, "vsync tick dropped; consumer behind");
                        }
                        Err(TrySendError::Disconnected(_)) => break,
                    }
                    let Some(following) = next.checked_add(interval) else {
                        // The next tick is beyond what the clock can represent.
                        let _ = stop_rx.recv();
                        break;
                    };
                    next = following;
                    // Skip ahead instead of bursting after a long stall.
                    let now = Instant::now();
                    if next.checked_add(interval).is_some_and(|late| late < now) {
                        next = now;
                    }
                }
                tracing::debug!("vsync thread exiting");
            })
            .map_err(TorusError::Spawn)?;

        tracing::debug!(refresh_hz, "vsync source started");
        Ok((
            Self {
                stop: Some(stop_tx),
                handle: Some(handle),
                interval,
            },
            rx,
        ))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stops the tick thread and waits for it to exit.
    pub fn stop(&mut self) {
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("vsync thread panicked");
            }
        }
    }
}

impl Drop for Vsync {
    fn drop(&mut self) {
        self.stop();
    }
}
