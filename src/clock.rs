//! Playback clock and the timing predicates derived from it.

/// Slack for comparisons between accumulated tick time and frame timestamps.
///
/// Ten ticks of `0.1` sum to `0.9999999999999999`, which must still count as
/// having reached the one second mark.
pub const TIME_EPSILON: f64 = 1e-9;

/// How the clock maps elapsed time onto the frame timeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TimingModel {
    /// Target index is `time * frame_rate`; a queued frame is presented once
    /// its timestamp is due.
    #[default]
    FrameRate,
    /// Target index is `time / frame_count` and a frame is presented only
    /// while the last presented timestamp is at or ahead of the clock.
    ///
    /// Kept for hosts that depend on the historical timing.
    Legacy,
}

/// Elapsed playback time measured against the frame timeline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaybackClock {
    /// Seconds since `play()`, advanced by ticks while playing
    time: f64,
    /// Timestamp of the most recently presented frame
    video_pos: f64,
    /// Fixed offset in seconds, read from settings on `play()`
    delay_compensation: f64,
    model: TimingModel,
}

impl PlaybackClock {
    pub fn new(model: TimingModel) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }

    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[inline]
    pub fn video_pos(&self) -> f64 {
        self.video_pos
    }

    #[inline]
    pub fn delay_compensation(&self) -> f64 {
        self.delay_compensation
    }

    #[inline]
    pub fn model(&self) -> TimingModel {
        self.model
    }

    pub fn set_model(&mut self, model: TimingModel) {
        self.model = model;
    }

    pub fn set_delay_compensation(&mut self, seconds: f64) {
        self.delay_compensation = seconds;
    }

    /// Record that a frame with `timestamp` was presented.
    pub fn set_video_pos(&mut self, timestamp: f64) {
        self.video_pos = timestamp;
    }

    pub fn advance(&mut self, delta: f64) {
        self.time += delta;
    }

    /// Set the elapsed time directly.
    pub fn seek(&mut self, time: f64) {
        self.time = time;
    }

    /// Zero every field except the timing model.
    pub fn reset(&mut self) {
        *self = Self::new(self.model);
    }

    /// Clock time shifted by the delay compensation.
    #[inline]
    fn presentation_time(&self) -> f64 {
        self.time + self.delay_compensation
    }

    /// Returns `true` when the clock is behind the last presented frame.
    ///
    /// Under [`TimingModel::FrameRate`] frames are presented up to the
    /// delay-compensated time, so that is what gets compared.
    pub fn is_behind_presentation(&self) -> bool {
        let now = match self.model {
            TimingModel::FrameRate => self.presentation_time(),
            TimingModel::Legacy => self.time,
        };
        now + TIME_EPSILON < self.video_pos
    }

    /// Index of the frame the clock currently asks for.
    pub fn target_lookahead_index(&self, frame_rate: f64, total_frames: usize) -> usize {
        let index = match self.model {
            TimingModel::FrameRate => self.time * frame_rate + TIME_EPSILON,
            TimingModel::Legacy => self.time / total_frames as f64,
        };
        index.max(0.0).floor() as usize
    }

    /// Returns `true` once the frames rasterized up to `horizon` reach past
    /// the presentation time.
    ///
    /// `horizon` counts timeline frames covered so far, so the last one
    /// rasterized sits at `(horizon - 1) / frame_rate`.
    pub fn has_enough_frames(&self, horizon: usize, frame_rate: f64) -> bool {
        if horizon == 0 {
            return false;
        }
        let buffered_until = (horizon - 1) as f64 / frame_rate;
        buffered_until + TIME_EPSILON >= self.presentation_time()
    }

    /// Returns `true` when a queued frame stamped `timestamp` may be presented.
    pub fn ready_to_present(&self, timestamp: f64) -> bool {
        match self.model {
            TimingModel::FrameRate => timestamp <= self.presentation_time() + TIME_EPSILON,
            TimingModel::Legacy => self.video_pos + TIME_EPSILON >= self.presentation_time(),
        }
    }
}
