use crate::TimingModel;

/// Playback configuration.
///
/// Mirrors the host's project settings. The engine snapshots the values on
/// every `play()`, so edits made while playing take effect on the next play.
///
/// With the `toml` feature a settings table can be parsed directly:
///
/// ```toml
/// delay_compensation_ms = 35.0
/// timing = "frame_rate"
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlaybackSettings {
    /// Audio/video delay compensation in milliseconds
    pub delay_compensation_ms: f64,
    /// Mapping from clock time to frames
    pub timing: TimingModel,
}

impl PlaybackSettings {
    /// Parse a settings table from a TOML string.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Delay compensation converted to seconds.
    pub fn delay_compensation_secs(&self) -> f64 {
        self.delay_compensation_ms / 1000.0
    }
}
