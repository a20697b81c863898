//! Lookahead ring of rasterized frames.

use std::collections::VecDeque;

use crate::frame::FrameSlot;
use crate::handle::AnimationHandle;
use crate::RenderSize;

/// Growable ring of pre-rasterized frames.
///
/// The ring always holds `capacity()` slots. The first `len()` of them are
/// queued frames in presentation order; the rest are spare slots waiting to
/// be rasterized into. Capacity grows on demand and only drops back to zero
/// through [`FrameBuffer::reset`], so a burst of rasterization latency is
/// absorbed by a deeper ring instead of stalling presentation.
///
/// ## Example
///
/// ```rust,ignore
/// let mut buffer = FrameBuffer::new(RenderSize::new(64, 64));
/// buffer.ensure_capacity(1);
/// buffer.rasterize_next(&mut animation);
///
/// let slot = buffer.pop_front();
/// // publish slot...
/// buffer.recycle(slot);
/// ```
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    slots: VecDeque<FrameSlot>,
    /// Leading slots that hold frames awaiting presentation
    queued: usize,
    /// Timeline index the next rasterized slot will receive
    next_frame: usize,
    size: RenderSize,
}

impl FrameBuffer {
    /// Create an empty buffer for frames of `size`.
    pub fn new(size: RenderSize) -> Self {
        Self {
            slots: VecDeque::new(),
            queued: 0,
            next_frame: 0,
            size,
        }
    }

    /// Grow the ring to hold at least `n` slots.
    pub fn ensure_capacity(&mut self, n: usize) {
        while self.slots.len() < n {
            self.slots.push_back(FrameSlot::new(self.size));
        }
    }

    /// Total number of slots, queued or spare.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of queued frames.
    #[inline]
    pub fn len(&self) -> usize {
        self.queued
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queued == 0
    }

    /// Timeline index of the next frame to rasterize.
    ///
    /// This is also the number of timeline frames covered so far, i.e. the
    /// lookahead horizon.
    #[inline]
    pub fn next_frame(&self) -> usize {
        self.next_frame
    }

    /// Frame size of every slot.
    #[inline]
    pub fn size(&self) -> RenderSize {
        self.size
    }

    /// Oldest queued frame.
    pub fn front(&self) -> Option<&FrameSlot> {
        if self.queued == 0 {
            None
        } else {
            self.slots.front()
        }
    }

    /// Rasterize `frame_index` into `slot`.
    pub fn rasterize_into<A: AnimationHandle + ?Sized>(slot: &mut FrameSlot, animation: &mut A, frame_index: usize) {
        tracing::trace!(frame_index, "rasterizing lookahead frame");
        slot.rasterize(animation, frame_index);
    }

    /// Rasterize the next timeline frame into the first spare slot and queue it.
    ///
    /// Panics when there is no spare slot; grow with
    /// [`FrameBuffer::ensure_capacity`] first.
    pub fn rasterize_next<A: AnimationHandle + ?Sized>(&mut self, animation: &mut A) {
        assert!(
            self.queued < self.slots.len(),
            "no spare slot: {} of {} queued",
            self.queued,
            self.slots.len()
        );
        let frame_index = self.next_frame;
        Self::rasterize_into(&mut self.slots[self.queued], animation, frame_index);
        self.queued += 1;
        self.next_frame += 1;
    }

    /// Remove the oldest queued frame.
    ///
    /// The ring is one slot short until the slot is handed back through
    /// [`FrameBuffer::recycle`]. Panics when nothing is queued.
    pub fn pop_front(&mut self) -> FrameSlot {
        assert!(self.queued > 0, "pop_front on an empty frame buffer");
        self.queued -= 1;
        match self.slots.pop_front() {
            Some(slot) => slot,
            None => unreachable!("queued count exceeds slot count"),
        }
    }

    /// Return a popped slot to the tail of the ring as a spare.
    pub fn recycle(&mut self, slot: FrameSlot) {
        debug_assert_eq!(slot.size(), self.size);
        self.slots.push_back(slot);
    }

    /// Drop every queued frame and continue rasterizing at `frame_index`.
    ///
    /// Capacity is kept.
    pub fn retarget(&mut self, frame_index: usize) {
        self.queued = 0;
        self.next_frame = frame_index;
    }

    /// Discard all slots.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.queued = 0;
        self.next_frame = 0;
    }
}
