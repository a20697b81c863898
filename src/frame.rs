//! Pre-rasterized frame storage.

use crate::color::native_to_rgba;
use crate::handle::{AnimationHandle, Surface};
use crate::RenderSize;

/// One rasterized frame.
///
/// Holds `width * height` native-order pixels plus the timeline index they
/// were drawn for.
#[derive(Clone, Debug)]
pub struct FrameSlot {
    pixels: Vec<u32>,
    size: RenderSize,
    frame_index: usize,
}

impl FrameSlot {
    /// Allocate a blank slot for frames of `size`.
    pub fn new(size: RenderSize) -> Self {
        Self {
            pixels: vec![0; size.pixel_count()],
            size,
            frame_index: 0,
        }
    }

    /// Rasterize `frame_index` of `animation` into this slot.
    pub fn rasterize<A: AnimationHandle + ?Sized>(&mut self, animation: &mut A, frame_index: usize) {
        let mut surface = Surface::new(&mut self.pixels, self.size.width, self.size.height);
        animation.render_frame(frame_index, &mut surface);
        self.frame_index = frame_index;
    }

    /// Timeline index of the frame held.
    #[inline]
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Presentation time of the held frame in seconds.
    #[inline]
    pub fn timestamp(&self, frame_rate: f64) -> f64 {
        self.frame_index as f64 / frame_rate
    }

    #[inline]
    pub fn size(&self) -> RenderSize {
        self.size
    }

    /// Native-order pixels.
    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Pixels converted to presentation (RGBA) byte order.
    pub fn to_rgba(&self) -> Vec<u8> {
        native_to_rgba(&self.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::testing::{stripe_pixel, StripeAnimation};

    #[test]
    fn test_rasterize_tags_index() {
        let mut anim = StripeAnimation::new(10, 10.0, (3, 2));
        let mut slot = FrameSlot::new(RenderSize::new(3, 2));
        assert_eq!(slot.pixels().len(), 6);

        slot.rasterize(&mut anim, 7);
        assert_eq!(slot.frame_index(), 7);
        assert!(slot.pixels().iter().all(|&p| p == stripe_pixel(7)));
        assert!((slot.timestamp(10.0) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_to_rgba() {
        let mut anim = StripeAnimation::new(10, 10.0, (1, 1));
        let mut slot = FrameSlot::new(RenderSize::new(1, 1));
        slot.rasterize(&mut anim, 3);
        // red carries the index, blue the 0x40 marker
        assert_eq!(slot.to_rgba(), vec![3, 0, 0x40, 0xff]);
    }
}
