//! Errors reported when opening an animation for playback.

/// Error type for opening a playback.
///
/// Only opening can fail. Once an animation is loaded, ticks never report
/// errors; buffer misuse is treated as a bug and panics instead.
#[derive(thiserror::Error, Debug)]
pub enum PlaybackError {
    /// The source string was empty
    #[error("animation source is empty")]
    EmptySource,
    /// The animation engine rejected the source
    #[error("failed to load animation: {0}")]
    Load(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The animation has no frames
    #[error("animation has no frames")]
    EmptyTimeline,
    /// The frame rate is zero, negative or not finite
    #[error("invalid frame rate: {0}")]
    InvalidFrameRate(f64),
    /// The render surface would have no pixels
    #[error("invalid render size: {width}x{height}")]
    ZeroSize { width: u32, height: u32 },
}

impl PlaybackError {
    /// Wrap a loader error.
    pub fn load<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Load(Box::new(err))
    }
}
