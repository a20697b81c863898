//! Stream resource and the playback capability interface.

use crate::error::PlaybackError;
use crate::handle::AnimationLoader;
use crate::{PlaybackEngine, Scale, Texture};

/// Operations a host video player drives a playback through.
///
/// The host calls [`VideoPlayback::update`] once per frame of its own loop
/// and reads [`VideoPlayback::texture`] afterwards.
pub trait VideoPlayback {
    /// Start playback from the beginning, restarting if already playing.
    fn play(&mut self);
    /// Stop playback and rewind.
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
    fn set_paused(&mut self, paused: bool);
    fn is_paused(&self) -> bool;
    fn set_loop(&mut self, enable: bool);
    fn has_loop(&self) -> bool;
    /// Timeline length in seconds.
    fn length(&self) -> f64;
    /// Timestamp of the last presented frame in seconds.
    fn playback_position(&self) -> f64;
    /// Move the playback clock to `time` seconds.
    fn seek(&mut self, time: f64);
    /// Advance playback by `delta` seconds.
    fn update(&mut self, delta: f64);
    /// The presentation target.
    fn texture(&self) -> &Texture;

    /// Select an audio track. Animations carry no audio, so this does nothing.
    fn set_audio_track(&mut self, _track: usize) {}

    /// Number of audio channels produced.
    fn channels(&self) -> u32 {
        0
    }

    /// Audio mix rate in Hz.
    fn mix_rate(&self) -> u32 {
        0
    }
}

/// A playable animation resource.
///
/// Holds the animation source text and the scale frames are rendered at.
/// Each call to [`VideoStream::instance_playback`] opens an independent
/// playback.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VideoStream {
    data: String,
    scale: Scale,
}

impl VideoStream {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            scale: Scale::default(),
        }
    }

    pub fn set_data(&mut self, data: impl Into<String>) {
        self.data = data.into();
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn set_scale(&mut self, scale: Scale) {
        self.scale = scale;
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Open a new playback of this stream.
    pub fn instance_playback<L: AnimationLoader>(&self, loader: L) -> Result<PlaybackEngine<L>, PlaybackError> {
        let mut playback = PlaybackEngine::new(loader).with_scale(self.scale);
        playback.open_data(&self.data)?;
        Ok(playback)
    }
}
