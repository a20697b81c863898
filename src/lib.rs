//! # lottie-stream-core
//!
//! Frame-buffered playback of vector animations as video streams.
//!
//! This crate provides the platform-agnostic timing and buffering logic for
//! presenting an externally rasterized animation (e.g. Lottie) through a
//! video player:
//! - Rasterizing frames ahead of the playback clock into a growable ring
//! - Gating presentation on the clock and a configured delay compensation
//! - Play, pause, stop, seek and looping
//! - Publishing presented frames as RGBA images to a single-slot texture
//!
//! Parsing and rasterizing the animation itself is left to an
//! [`AnimationLoader`] / [`AnimationHandle`] implementation supplied by the
//! host.
//!
//! ## Features
//!
//! - `serde` - Enable serialization/deserialization for settings and streams
//! - `toml` - Parse [`PlaybackSettings`] from TOML
//! - `web` - Enable web/WASM canvas presentation of the texture
//!
//! ## Example
//!
//! ```rust,ignore
//! use lottie_stream_core::{VideoPlayback, VideoStream, Scale};
//!
//! let mut stream = VideoStream::new(json);
//! stream.set_scale(Scale::uniform(0.5));
//!
//! let mut playback = stream.instance_playback(MyLoader)?;
//! playback.play();
//!
//! // From the host's frame loop
//! playback.update(delta_seconds);
//! if let Some(image) = playback.texture().image() {
//!     // upload image...
//! }
//! ```

pub mod buffer;
pub mod clock;
pub mod color;
mod engine;
mod error;
pub mod frame;
pub mod handle;
pub mod looping;
mod settings;
mod sizing;
mod stream;
pub mod texture;

pub use buffer::FrameBuffer;
pub use clock::{PlaybackClock, TimingModel};
pub use engine::{PlaybackEngine, PlaybackState};
pub use error::PlaybackError;
pub use frame::FrameSlot;
pub use handle::{AnimationHandle, AnimationLoader, Surface};
pub use looping::{LoopAction, LoopController};
pub use settings::PlaybackSettings;
pub use sizing::{RenderSize, Scale};
pub use stream::{VideoPlayback, VideoStream};
pub use texture::Texture;

#[cfg(feature = "web")]
pub use texture::web::draw_to_canvas;
