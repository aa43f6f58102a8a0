use std::io;

#[derive(Debug, thiserror::Error)]
pub enum TorusError {
    #[error("refresh rate must be positive, got {0}")]
    InvalidRefreshRate(f32),
    #[error("failed to spawn vsync thread: {0}")]
    Spawn(#[source] io::Error),
    #[error("vsync source disconnected")]
    VsyncDisconnected,
}
