//! Playback state machine.

use crate::buffer::FrameBuffer;
use crate::clock::{PlaybackClock, TIME_EPSILON};
use crate::error::PlaybackError;
use crate::handle::{cache_key, AnimationHandle, AnimationLoader};
use crate::looping::{LoopAction, LoopController};
use crate::stream::VideoPlayback;
use crate::{PlaybackSettings, RenderSize, Scale, Texture, TimingModel};

/// Coarse playback state. Pausing is tracked separately.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    /// Not playing; the initial state and the state after `stop()`
    #[default]
    Stopped,
    /// Playing, possibly paused
    Playing,
}

/// Plays an animation as a timed sequence of raster frames.
///
/// The engine does not keep time on its own. The host calls
/// [`VideoPlayback::update`] with the elapsed seconds once per frame of its
/// loop; each tick rasterizes as many lookahead frames as the clock demands
/// and publishes at most one of them to the [`Texture`].
///
/// With the default [`TimingModel::FrameRate`] the first tick after `play()`
/// publishes the newest frame due at that tick, so frame 0 is only shown if
/// the host's first tick has a zero delta.
///
/// ## Example
///
/// ```rust,ignore
/// use lottie_stream_core::{PlaybackEngine, VideoPlayback};
///
/// let mut playback = PlaybackEngine::new(loader);
/// playback.open_data(&json)?;
/// playback.set_loop(false);
/// playback.play();
///
/// while playback.is_playing() {
///     playback.update(1.0 / 60.0);
///     if let Some(image) = playback.texture().image() {
///         // upload image...
///     }
/// }
/// ```
pub struct PlaybackEngine<L: AnimationLoader> {
    loader: L,
    /// Source text the animation was opened from, reopened on `stop()`
    source: String,
    cache_key: String,
    animation: Option<L::Animation>,
    scale: Scale,
    size: RenderSize,
    buffer: FrameBuffer,
    clock: PlaybackClock,
    state: PlaybackState,
    paused: bool,
    looping: bool,
    settings: PlaybackSettings,
    texture: Texture,
    /// Frames published since the last `stop()`
    frames_presented: u64,
}

impl<L: AnimationLoader> PlaybackEngine<L> {
    /// Create a stopped engine with no animation.
    pub fn new(loader: L) -> Self {
        let settings = PlaybackSettings::default();
        Self {
            loader,
            source: String::new(),
            cache_key: String::new(),
            animation: None,
            scale: Scale::default(),
            size: RenderSize::default(),
            buffer: FrameBuffer::new(RenderSize::default()),
            clock: PlaybackClock::new(settings.timing),
            state: PlaybackState::Stopped,
            paused: false,
            looping: true,
            settings,
            texture: Texture::new(),
            frames_presented: 0,
        }
    }

    /// Render at `scale` times the animation's natural size.
    ///
    /// Applies to the next [`PlaybackEngine::open_data`].
    pub fn with_scale(mut self, scale: Scale) -> Self {
        self.scale = scale;
        self
    }

    /// Use `settings` from the next `play()` on.
    pub fn with_settings(mut self, settings: PlaybackSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Open an animation from its source text.
    ///
    /// On failure the engine is left stopped without an animation.
    pub fn open_data(&mut self, source: &str) -> Result<(), PlaybackError> {
        self.animation = None;
        self.source.clear();
        self.cache_key.clear();
        self.size = RenderSize::default();
        self.reset_session();
        self.state = PlaybackState::Stopped;

        if source.is_empty() {
            return Err(PlaybackError::EmptySource);
        }

        let key = cache_key(source);
        let animation = self.loader.load(source, &key).map_err(PlaybackError::load)?;

        if animation.frame_count() == 0 {
            return Err(PlaybackError::EmptyTimeline);
        }
        let frame_rate = animation.frame_rate();
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(PlaybackError::InvalidFrameRate(frame_rate));
        }
        let size = RenderSize::scaled(animation.natural_size(), self.scale);
        if size.is_empty() {
            return Err(PlaybackError::ZeroSize {
                width: size.width,
                height: size.height,
            });
        }

        tracing::debug!(
            frames = animation.frame_count(),
            frame_rate,
            width = size.width,
            height = size.height,
            "opened animation"
        );
        self.source = source.to_string();
        self.cache_key = key;
        self.size = size;
        self.buffer = FrameBuffer::new(size);
        self.animation = Some(animation);
        Ok(())
    }

    /// Returns `true` when an animation is loaded.
    #[inline]
    pub fn has_animation(&self) -> bool {
        self.animation.is_some()
    }

    /// The loaded animation.
    pub fn animation(&self) -> Option<&L::Animation> {
        self.animation.as_ref()
    }

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Size frames are rasterized at.
    #[inline]
    pub fn render_size(&self) -> RenderSize {
        self.size
    }

    #[inline]
    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    #[inline]
    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    /// Frames published since the last `stop()`.
    #[inline]
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    #[inline]
    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    /// Edit settings. Changes apply from the next `play()`.
    pub fn settings_mut(&mut self) -> &mut PlaybackSettings {
        &mut self.settings
    }

    /// Reopen the animation from its source.
    fn reload(&mut self) {
        if self.source.is_empty() {
            return;
        }
        match self.loader.load(&self.source, &self.cache_key) {
            Ok(animation) => self.animation = Some(animation),
            Err(err) => {
                tracing::warn!(error = %err, "failed to reopen animation");
                self.animation = None;
            }
        }
    }

    /// Empty the buffer and zero the clock and counters.
    fn reset_session(&mut self) {
        self.buffer.reset();
        self.clock.reset();
        self.clock.set_model(self.settings.timing);
        self.frames_presented = 0;
    }

    /// Start a fresh session on the current animation.
    fn begin_session(&mut self) {
        self.reset_session();
        self.clock.set_delay_compensation(self.settings.delay_compensation_secs());
        self.state = PlaybackState::Playing;
        self.paused = false;
    }

    /// Rewind to the start without reopening the animation.
    fn restart(&mut self) {
        tracing::debug!(time = self.clock.time(), "end of timeline, looping");
        self.set_paused(true);
        self.seek(0.0);
        self.set_paused(false);
        self.begin_session();
    }

    /// Rasterize frames until the buffer reaches past the clock or the
    /// timeline runs out.
    fn fill_lookahead(&mut self, total_frames: usize, frame_rate: f64) {
        let Some(animation) = self.animation.as_mut() else {
            return;
        };
        while self.buffer.next_frame() < total_frames
            && (self.buffer.is_empty() || !self.clock.has_enough_frames(self.buffer.next_frame(), frame_rate))
        {
            self.buffer.ensure_capacity(self.buffer.len() + 1);
            self.buffer.rasterize_next(animation);
        }
    }

    /// Publish the head of the buffer if it is due.
    fn present(&mut self, frame_rate: f64) {
        match self.clock.model() {
            TimingModel::FrameRate => {
                // Only the newest due frame is published; older due frames are stale
                let mut newest = None;
                while let Some(head) = self.buffer.front() {
                    if !self.clock.ready_to_present(head.timestamp(frame_rate)) {
                        break;
                    }
                    let slot = self.buffer.pop_front();
                    if let Some(stale) = newest.replace(slot) {
                        self.buffer.recycle(stale);
                    }
                }
                if let Some(slot) = newest {
                    self.publish(&slot, frame_rate);
                    self.buffer.recycle(slot);
                }
            }
            TimingModel::Legacy => {
                let mut presented = false;
                while !self.buffer.is_empty() && !presented {
                    let slot = self.buffer.pop_front();
                    if self.clock.ready_to_present(slot.timestamp(frame_rate)) {
                        self.publish(&slot, frame_rate);
                        presented = true;
                    }
                    self.buffer.recycle(slot);
                }
            }
        }
    }

    fn publish(&mut self, slot: &crate::FrameSlot, frame_rate: f64) {
        let size = slot.size();
        self.texture.publish(slot.to_rgba(), size.width, size.height);
        self.clock.set_video_pos(slot.timestamp(frame_rate));
        self.frames_presented += 1;
        tracing::trace!(frame_index = slot.frame_index(), "presented frame");
    }
}

impl<L: AnimationLoader> VideoPlayback for PlaybackEngine<L> {
    fn play(&mut self) {
        if self.state == PlaybackState::Playing {
            self.stop();
        }
        self.begin_session();
        tracing::debug!(delay_compensation = self.clock.delay_compensation(), "play");
    }

    fn stop(&mut self) {
        self.reload();
        self.reset_session();
        self.state = PlaybackState::Stopped;
        tracing::debug!("stop");
    }

    fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn set_loop(&mut self, enable: bool) {
        self.looping = enable;
    }

    fn has_loop(&self) -> bool {
        self.looping
    }

    fn length(&self) -> f64 {
        self.animation.as_ref().map_or(0.0, |a| a.duration())
    }

    fn playback_position(&self) -> f64 {
        self.clock.video_pos()
    }

    /// Retarget playback to `time` seconds.
    ///
    /// Queued frames are dropped and rasterization resumes at the frame
    /// under `time` on the next tick.
    fn seek(&mut self, time: f64) {
        let time = time.max(0.0);
        self.clock.seek(time);
        self.clock.set_video_pos(time);
        if let Some(animation) = self.animation.as_ref() {
            let total = animation.frame_count();
            let index = (time * animation.frame_rate() + TIME_EPSILON).floor() as usize;
            self.buffer.retarget(index.min(total));
        }
    }

    fn update(&mut self, delta: f64) {
        if self.state != PlaybackState::Playing || self.paused {
            return;
        }
        let Some(animation) = self.animation.as_ref() else {
            return;
        };
        let total_frames = animation.frame_count();
        let frame_rate = animation.frame_rate();

        self.clock.advance(delta);
        if self.clock.is_behind_presentation() {
            return;
        }

        let target = self.clock.target_lookahead_index(frame_rate, total_frames);
        tracing::trace!(time = self.clock.time(), target, "tick");
        if LoopController::evaluate(self.looping, target, total_frames, self.buffer.is_empty()) == LoopAction::Restart {
            self.restart();
            return;
        }

        self.fill_lookahead(total_frames, frame_rate);
        self.present(frame_rate);

        if LoopController::evaluate(self.looping, target, total_frames, self.buffer.is_empty()) == LoopAction::Halt {
            tracing::debug!(time = self.clock.time(), "end of timeline");
            self.stop();
        }
    }

    fn texture(&self) -> &Texture {
        &self.texture
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::testing::StripeLoader;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .try_init();
    }

    fn engine(source: &str) -> PlaybackEngine<StripeLoader> {
        init_tracing();
        let mut engine = PlaybackEngine::new(StripeLoader::default());
        engine.open_data(source).unwrap();
        engine
    }

    /// Red channel of the published image, which carries the frame index.
    fn shown_frame(engine: &PlaybackEngine<StripeLoader>) -> Option<u8> {
        engine.texture().image().map(|img| img.get_pixel(0, 0).0[0])
    }

    #[test]
    fn test_open_reports_length() {
        let short = engine("10@10 4x4");
        assert_eq!(short.length(), 1.0);
        assert_eq!(short.state(), PlaybackState::Stopped);

        let long = engine("48@24 4x4");
        assert_eq!(long.length(), 2.0);
    }

    #[test]
    fn test_open_empty_source_fails() {
        let mut engine = PlaybackEngine::new(StripeLoader::default());
        let err = engine.open_data("").unwrap_err();
        assert!(matches!(err, PlaybackError::EmptySource));
        assert!(!engine.is_playing());
        assert!(!engine.has_animation());
        assert_eq!(engine.length(), 0.0);
    }

    #[test]
    fn test_open_failure_clears_previous_animation() {
        let mut engine = engine("10@10 4x4");
        assert!(matches!(engine.open_data("nonsense"), Err(PlaybackError::Load(_))));
        assert!(!engine.has_animation());

        // Playing without an animation is inert
        engine.play();
        engine.update(0.5);
        assert!(engine.texture().image().is_none());
    }

    #[test]
    fn test_open_rejects_degenerate_animations() {
        let mut engine = PlaybackEngine::new(StripeLoader::default());
        assert!(matches!(engine.open_data("0@10 4x4"), Err(PlaybackError::EmptyTimeline)));
        assert!(matches!(engine.open_data("10@0 4x4"), Err(PlaybackError::InvalidFrameRate(_))));
        assert!(matches!(engine.open_data("10@10 0x4"), Err(PlaybackError::ZeroSize { .. })));
        assert!(!engine.has_animation());
    }

    #[test]
    fn test_ten_ticks_play_through_once() {
        let mut engine = engine("10@10 4x2");
        engine.set_loop(false);
        engine.play();

        let mut last_position = engine.playback_position();
        for tick in 1..=10 {
            engine.update(0.1);
            if tick < 10 {
                assert!(engine.is_playing(), "stopped early at tick {tick}");
                assert!(engine.playback_position() >= last_position);
                last_position = engine.playback_position();
            }
        }
        assert!(!engine.is_playing());
        assert_eq!(shown_frame(&engine), Some(9));
        assert_eq!(engine.texture().revision(), 9);
    }

    #[test]
    fn test_stays_playing_below_length() {
        let mut engine = engine("30@30 2x2");
        engine.set_loop(false);
        engine.play();

        for delta in [0.05, 0.2, 0.01, 0.3, 0.33] {
            engine.update(delta);
            assert!(engine.is_playing());
        }
        engine.update(0.2);
        assert!(!engine.is_playing());
    }

    #[test]
    fn test_each_frame_rasterized_once() {
        let loader = StripeLoader::default();
        let mut engine = PlaybackEngine::new(loader.clone());
        engine.open_data("10@10 2x2").unwrap();
        engine.set_loop(false);
        engine.play();
        for _ in 0..10 {
            engine.update(0.1);
        }
        assert_eq!(loader.renders.get(), 10);
    }

    #[test]
    fn test_large_tick_skips_to_newest_frame() {
        let mut engine = engine("10@10 2x2");
        engine.set_loop(false);
        engine.play();
        engine.update(0.45);
        assert_eq!(shown_frame(&engine), Some(4));
        assert_eq!(engine.frames_presented(), 1);
        assert!((engine.playback_position() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut engine = engine("10@10 2x2");
        engine.play();
        engine.update(0.25);
        engine.stop();

        let once = (
            engine.is_playing(),
            engine.buffer().capacity(),
            engine.buffer().len(),
            engine.clock().clone(),
            engine.frames_presented(),
        );
        engine.stop();
        let twice = (
            engine.is_playing(),
            engine.buffer().capacity(),
            engine.buffer().len(),
            engine.clock().clone(),
            engine.frames_presented(),
        );
        assert_eq!(once, twice);
        assert!(!twice.0);
        assert_eq!(twice.1, 0);
        assert_eq!(twice.3.time(), 0.0);
    }

    #[test]
    fn test_stop_reopens_animation() {
        let loader = StripeLoader::default();
        let mut engine = PlaybackEngine::new(loader.clone());
        engine.open_data("10@10 2x2").unwrap();
        assert_eq!(loader.loads.get(), 1);
        engine.stop();
        assert_eq!(loader.loads.get(), 2);
        assert!(engine.has_animation());
    }

    #[test]
    fn test_stop_keeps_last_texture() {
        let mut engine = engine("10@10 2x2");
        engine.play();
        engine.update(0.3);
        engine.stop();
        assert_eq!(shown_frame(&engine), Some(3));
    }

    #[test]
    fn test_loop_restarts_clock() {
        let mut engine = engine("10@10 2x2");
        engine.set_loop(true);
        engine.play();

        let mut saw_reset = false;
        for _ in 0..15 {
            engine.update(0.1);
            assert!(engine.is_playing());
            if engine.clock().time().abs() < 1e-9 {
                saw_reset = true;
            }
        }
        assert!(saw_reset);
        assert!(engine.clock().time() < engine.length());
    }

    #[test]
    fn test_capacity_never_shrinks_while_playing() {
        let mut engine = engine("20@10 2x2");
        engine.set_loop(false);
        engine.play();

        let mut capacity = engine.buffer().capacity();
        for delta in [0.05, 0.3, 0.01, 0.0, 0.2, 0.45, 0.1, 0.6] {
            engine.update(delta);
            if !engine.is_playing() {
                break;
            }
            assert!(engine.buffer().capacity() >= capacity);
            capacity = engine.buffer().capacity();
        }
    }

    #[test]
    fn test_seek_before_play_is_discarded() {
        let mut engine = engine("10@10 2x2");
        engine.seek(0.5);
        assert_eq!(engine.clock().time(), 0.5);

        engine.play();
        assert_eq!(engine.clock().time(), 0.0);
        assert_eq!(engine.playback_position(), 0.0);
    }

    #[test]
    fn test_seek_jumps_to_requested_frame() {
        let mut engine = engine("10@10 2x2");
        engine.set_loop(false);
        engine.play();
        engine.update(0.1);
        engine.update(0.1);
        engine.update(0.1);
        let capacity = engine.buffer().capacity();

        engine.seek(0.7);
        assert!(engine.buffer().is_empty());
        assert_eq!(engine.buffer().capacity(), capacity);
        assert_eq!(engine.buffer().next_frame(), 7);

        engine.update(0.1);
        assert_eq!(shown_frame(&engine), Some(8));
    }

    #[test]
    fn test_seek_backwards() {
        let mut engine = engine("10@10 2x2");
        engine.set_loop(false);
        engine.play();
        for _ in 0..6 {
            engine.update(0.1);
        }
        engine.seek(0.1);
        engine.update(0.1);
        assert_eq!(shown_frame(&engine), Some(2));
    }

    #[test]
    fn test_pause_freezes_clock_and_buffer() {
        let mut engine = engine("10@10 2x2");
        engine.play();
        engine.update(0.2);
        let time = engine.clock().time();
        let queued = engine.buffer().len();

        engine.set_paused(true);
        assert!(engine.is_paused());
        engine.update(0.3);
        assert_eq!(engine.clock().time(), time);
        assert_eq!(engine.buffer().len(), queued);
        assert!(engine.is_playing());

        engine.set_paused(false);
        engine.update(0.1);
        assert!(engine.clock().time() > time);
    }

    #[test]
    fn test_update_while_stopped_is_noop() {
        let mut engine = engine("10@10 2x2");
        engine.update(0.5);
        assert_eq!(engine.clock().time(), 0.0);
        assert!(engine.texture().image().is_none());
    }

    #[test]
    fn test_play_while_playing_restarts() {
        let loader = StripeLoader::default();
        let mut engine = PlaybackEngine::new(loader.clone());
        engine.open_data("10@10 2x2").unwrap();
        engine.play();
        engine.update(0.4);
        engine.set_paused(true);

        engine.play();
        assert!(engine.is_playing());
        assert!(!engine.is_paused());
        assert_eq!(engine.clock().time(), 0.0);
        assert_eq!(engine.buffer().capacity(), 0);
        assert_eq!(loader.loads.get(), 2);
    }

    #[test]
    fn test_delay_compensation_read_on_play() {
        let mut engine = engine("10@10 2x2");
        engine.settings_mut().delay_compensation_ms = 100.0;
        engine.play();
        assert!((engine.clock().delay_compensation() - 0.1).abs() < 1e-12);

        // Presentation runs one frame ahead of the clock
        engine.update(0.1);
        assert_eq!(shown_frame(&engine), Some(2));

        engine.settings_mut().delay_compensation_ms = 0.0;
        assert!((engine.clock().delay_compensation() - 0.1).abs() < 1e-12);
        engine.play();
        assert_eq!(engine.clock().delay_compensation(), 0.0);
    }

    /// Drive `ticks` updates of `delta` and collect each newly shown frame.
    fn run_ticks(engine: &mut PlaybackEngine<StripeLoader>, ticks: usize, delta: f64) -> Vec<u8> {
        let mut shown = Vec::new();
        let mut revision = engine.texture().revision();
        for _ in 0..ticks {
            engine.update(delta);
            if engine.texture().revision() != revision {
                revision = engine.texture().revision();
                shown.extend(shown_frame(engine));
            }
        }
        shown
    }

    #[test]
    fn test_long_delay_compensation_keeps_frame_rate() {
        let mut engine = engine("100@10 2x2");
        engine.set_loop(false);
        engine.settings_mut().delay_compensation_ms = 300.0;
        engine.play();

        let shown = run_ticks(&mut engine, 120, 1.0 / 60.0);
        assert!(shown.len() >= 18, "only {} frames shown: {shown:?}", shown.len());
        assert_eq!(shown[0], 3);
        assert!(shown.windows(2).all(|w| w[1] == w[0] + 1), "frames skipped: {shown:?}");
        assert!(engine.is_playing());
    }

    #[test]
    fn test_negative_delay_compensation_holds_first_frame() {
        let mut engine = engine("10@10 2x2");
        engine.set_loop(false);
        engine.settings_mut().delay_compensation_ms = -300.0;
        engine.play();

        // Nothing is due until time + delay reaches zero
        assert!(run_ticks(&mut engine, 2, 0.1).is_empty());
        assert!(engine.texture().image().is_none());

        let shown = run_ticks(&mut engine, 8, 0.1);
        assert_eq!(shown, vec![0, 1, 2, 3, 4, 5, 6, 7]);
        assert!(!engine.is_playing());
    }

    #[test]
    fn test_loop_keeps_animation_open() {
        let loader = StripeLoader::default();
        let mut engine = PlaybackEngine::new(loader.clone());
        engine.open_data("10@10 2x2").unwrap();
        engine.set_loop(true);
        engine.play();
        for _ in 0..25 {
            engine.update(0.1);
        }
        assert!(engine.is_playing());
        assert_eq!(loader.loads.get(), 1);
    }

    #[test]
    fn test_first_frame_needs_zero_tick() {
        let mut skipped = engine("10@10 2x2");
        skipped.play();
        skipped.update(0.1);
        assert_eq!(shown_frame(&skipped), Some(1));

        let mut shown = engine("10@10 2x2");
        shown.play();
        shown.update(0.0);
        assert_eq!(shown_frame(&shown), Some(0));
    }

    #[test]
    fn test_legacy_timing_never_catches_up() {
        let settings = PlaybackSettings {
            timing: TimingModel::Legacy,
            ..Default::default()
        };
        let mut engine = PlaybackEngine::new(StripeLoader::default()).with_settings(settings);
        engine.open_data("10@10 2x2").unwrap();
        engine.set_loop(false);
        engine.play();

        // At time zero the presented position equals the clock
        engine.update(0.0);
        assert_eq!(shown_frame(&engine), Some(0));

        // Once the clock moves ahead, queued frames rotate out unpresented
        engine.update(0.2);
        assert_eq!(engine.texture().revision(), 1);
        assert!(engine.buffer().is_empty());
        assert_eq!(engine.buffer().capacity(), 2);
        assert!(engine.is_playing());
    }

    #[test]
    fn test_scaled_frames() {
        let mut engine = PlaybackEngine::new(StripeLoader::default()).with_scale(Scale::uniform(0.5));
        engine.open_data("10@10 8x6").unwrap();
        engine.play();
        engine.update(0.1);
        assert_eq!(engine.texture().dimensions(), (4, 3));
    }
}
