//! # VHS Engine
//!
//! Composite video and VHS tape emulation on 8-bit RGB frames.
//!
//! A frame is decoded into fixed-point YIQ planes and one field (every other
//! row) is pushed through the composite encoder, an optional tape
//! record/playback pass and the decoder before being written back as RGB.
//! Every stochastic stage draws from a single seeded [`RandomStream`], so a
//! given seed and parameter set always produce the same output.

pub mod composite;
pub mod engine;
pub mod filters;
pub mod noise;
pub mod params;
pub mod presets;
pub mod random;
pub mod resample;
pub mod ring_pattern;
pub mod ringing;
pub mod subcarrier;
pub mod tape;
pub mod yiq;

pub use engine::VhsEngine;
pub use noise::NoiseStrategy;
pub use params::{ParamKind, ParamSpec, ParamValue, VhsConfig};
pub use presets::random_preset;
pub use random::{FastRandom, RandomKind, RandomStream, XorWowRandom};
pub use subcarrier::PhaseShiftMode;
pub use tape::TapeSpeed;
pub use yiq::{Field, Plane, YiqPlanes};
