//! # Retro-VHS
//!
//! Frame-accurate emulation of composite video and VHS tape artifacts.
//!
//! This library degrades clean RGB frames the way an NTSC composite signal
//! and a consumer VCR would: chroma bandwidth limits, subcarrier crosstalk,
//! ringing, tape noise, head-switching tear and color bleed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use retro_vhs::{video::Frame, vhs::{VhsConfig, VhsEngine}};
//!
//! # fn main() -> retro_vhs::Result<()> {
//! let mut config = VhsConfig::default();
//! config.set("_emulating_vhs", true)?;
//! config.set("_video_chroma_noise", 4000)?;
//!
//! let mut engine = VhsEngine::new(config);
//! let frame = Frame::open("input.png")?;
//! let out = engine.process_frame_pair(&frame, None)?;
//! out.save_png("output.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`vhs`] - The effect engine, its parameter set and random streams
//! - [`video`] - Frame type and geometry helpers
//! - [`render`] - Frame sequence render job
//! - [`config`] - Configuration management
//!
//! ## Custom Effects
//!
//! The render job drives anything implementing
//! [`FrameEffect`](video::FrameEffect):
//!
//! ```rust,no_run
//! use retro_vhs::{video::{Frame, FrameEffect}, Result};
//!
//! struct Invert;
//!
//! impl FrameEffect for Invert {
//!     fn name(&self) -> &str {
//!         "invert"
//!     }
//!
//!     fn process(&mut self, current: &Frame, _next: Option<&Frame>, _index: usize) -> Result<Frame> {
//!         let mut out = current.clone();
//!         for y in 0..out.height() {
//!             out.row_mut(y).iter_mut().for_each(|v| *v = 255 - *v);
//!         }
//!         Ok(out)
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod render;
pub mod vhs;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    config::{EngineConfig, EngineSettings},
    error::{Result, VhsError},
    render::{RenderJob, RenderSettings, StopHandle},
    vhs::{VhsConfig, VhsEngine},
    video::{Frame, FrameEffect},
};
