//! End-of-timeline handling.

/// What the engine should do about the end of the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopAction {
    /// Keep playing
    Continue,
    /// Rewind to the start and play again
    Restart,
    /// Stop playback
    Halt,
}

/// Decides between restarting and halting once the clock runs past the
/// last frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoopController;

impl LoopController {
    /// Evaluate the end of the timeline.
    ///
    /// * `looping` - whether the stream loops
    /// * `target` - frame index the clock asks for
    /// * `total_frames` - length of the timeline in frames
    /// * `drained` - whether the lookahead buffer is empty
    pub fn evaluate(looping: bool, target: usize, total_frames: usize, drained: bool) -> LoopAction {
        if target < total_frames {
            return LoopAction::Continue;
        }
        if looping {
            LoopAction::Restart
        } else if drained {
            LoopAction::Halt
        } else {
            LoopAction::Continue
        }
    }
}
