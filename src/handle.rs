//! Interface to the external animation engine.
//!
//! The engine that parses and rasterizes the vector animation lives outside
//! this crate. Playback only needs to open an animation from its source text,
//! query its timeline and ask it to draw one frame into a caller-owned
//! surface.

/// A mutable pixel surface handed to [`AnimationHandle::render_frame`].
///
/// Pixels are packed `0xAARRGGBB` words, which is BGRA byte order in
/// little-endian memory.
#[derive(Debug)]
pub struct Surface<'a> {
    pixels: &'a mut [u32],
    width: u32,
    height: u32,
}

impl<'a> Surface<'a> {
    /// Wrap a pixel slice.
    ///
    /// Panics if the slice does not hold exactly `width * height` pixels.
    pub fn new(pixels: &'a mut [u32], width: u32, height: u32) -> Self {
        assert_eq!(
            pixels.len(),
            width as usize * height as usize,
            "surface of {}x{} needs {} pixels",
            width,
            height,
            width as usize * height as usize
        );
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Surface width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Surface height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes.
    #[inline]
    pub fn bytes_per_line(&self) -> usize {
        self.width as usize * 4
    }

    /// The pixels, row-major.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        self.pixels
    }
}

/// An opened animation.
pub trait AnimationHandle {
    /// Number of frames on the timeline.
    fn frame_count(&self) -> usize;

    /// Frames per second.
    fn frame_rate(&self) -> f64;

    /// Size the animation was authored at, as (width, height).
    fn natural_size(&self) -> (u32, u32);

    /// Rasterize `frame_index` into `surface`, scaling to the surface size.
    ///
    /// Must not fail once the animation has been opened.
    fn render_frame(&mut self, frame_index: usize, surface: &mut Surface<'_>);

    /// Timeline length in seconds.
    fn duration(&self) -> f64 {
        self.frame_count() as f64 / self.frame_rate()
    }
}

/// Opens animations from their source text.
///
/// Playback keeps the loader around so that `stop()` can re-open the same
/// source instead of rewinding the animation.
pub trait AnimationLoader {
    /// The animation type produced by this loader.
    type Animation: AnimationHandle;
    /// Error returned for sources the engine cannot open.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Open `source`. `cache_key` identifies the source for engines that
    /// cache parsed documents.
    fn load(&self, source: &str, cache_key: &str) -> Result<Self::Animation, Self::Error>;
}

/// Cache key for a source string: the xxh3 digest as 16 hex digits.
pub fn cache_key(source: &str) -> String {
    format!("{:016x}", xxhash_rust::xxh3::xxh3_64(source.as_bytes()))
}
