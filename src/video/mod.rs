//! # Video Frames
//!
//! The RGB frame type, frame geometry helpers and the [`FrameEffect`] seam
//! the render job drives.

pub mod types;

pub use types::{resize_to_height, Frame};

use crate::error::Result;

/// Core trait for anything the render job can run over a frame sequence
pub trait FrameEffect: Send {
    /// Returns the unique name of this effect
    fn name(&self) -> &str;

    /// Produce one output frame
    ///
    /// # Arguments
    ///
    /// * `current` - The frame being rendered
    /// * `next` - The following input frame, when lookahead is enabled
    /// * `frame_index` - Zero-based index of the output frame
    fn process(&mut self, current: &Frame, next: Option<&Frame>, frame_index: usize) -> Result<Frame>;
}

/// Effect that returns every frame unchanged
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl FrameEffect for Passthrough {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn process(&mut self, current: &Frame, _next: Option<&Frame>, _frame_index: usize) -> Result<Frame> {
        Ok(current.clone())
    }
}
