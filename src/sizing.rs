//! Render surface sizing.

/// Scale factor applied to an animation's natural size.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scale {
    pub x: f32,
    pub y: f32,
}

impl Scale {
    /// Scale both axes by the same factor.
    pub fn uniform(factor: f32) -> Self {
        Self {
            x: factor,
            y: factor,
        }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

/// Pixel dimensions of the surfaces frames are rasterized into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderSize {
    pub width: u32,
    pub height: u32,
}

impl RenderSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scale a natural size.
    ///
    /// Each scaled dimension is rounded and kept at one pixel or more, unless
    /// the natural dimension itself is zero.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use lottie_stream_core::{RenderSize, Scale};
    ///
    /// let size = RenderSize::scaled((512, 256), Scale { x: 0.5, y: 0.25 });
    /// assert_eq!(size, RenderSize::new(256, 64));
    /// ```
    pub fn scaled(natural: (u32, u32), scale: Scale) -> Self {
        fn axis(natural: u32, factor: f32) -> u32 {
            if natural == 0 {
                return 0;
            }
            let scaled = (natural as f64 * factor.max(0.0) as f64).round();
            scaled.clamp(1.0, u32::MAX as f64) as u32
        }

        Self {
            width: axis(natural.0, scale.x),
            height: axis(natural.1, scale.y),
        }
    }

    /// Number of pixels in one frame.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns `true` when a frame would hold no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }
}
