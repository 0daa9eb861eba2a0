//! The per-field effect pipeline.

use std::borrow::Cow;

use tracing::{debug, trace};

use super::composite::{self, color_bleed};
use super::noise::{self, NoiseStrategy};
use super::params::VhsConfig;
use super::random::{RandomStream, XorWowRandom};
use super::resample::blur_chroma;
use super::ringing::{apply_ringing, Ringing};
use super::subcarrier::{chroma_from_luma, chroma_into_luma, PhaseShiftMode, ScanlinePhase};
use super::tape::{self, HeadSwitch};
use super::yiq::{self, Field, YiqPlanes};
use crate::config::EngineSettings;
use crate::error::{FrameError, Result};
use crate::video::{Frame, FrameEffect};

/// Field number passed for the second field of an interlaced pair
pub const SECOND_FIELD_NUMBER: i32 = 2;

/// Composite/VHS artifact engine.
///
/// Owns the parameter set and the random stream that drives every
/// stochastic stage. One engine processes one frame at a time; give each
/// concurrent job its own engine.
pub struct VhsEngine {
    config: VhsConfig,
    rng: Box<dyn RandomStream>,
    noise: &'static dyn NoiseStrategy,
    /// Accumulated head-switch drift, in fractions of a field
    head_switch_drift: f64,
    alternate_chroma_phase: bool,
}

impl VhsEngine {
    /// Engine with the default XorWow stream and filtered noise
    pub fn new(config: VhsConfig) -> Self {
        Self::with_stream(config, Box::new(XorWowRandom::default()))
    }

    pub fn with_stream(config: VhsConfig, rng: Box<dyn RandomStream>) -> Self {
        Self {
            config,
            rng,
            noise: noise::noise_strategy(false),
            head_switch_drift: 0.0,
            alternate_chroma_phase: false,
        }
    }

    /// Engine configured from the `[engine]` section of a config file
    pub fn from_settings(config: VhsConfig, settings: &EngineSettings) -> Self {
        let mut engine = Self::with_stream(config, settings.random.stream(settings.seed));
        engine.noise = noise::noise_strategy(settings.precise_noise);
        engine.alternate_chroma_phase = settings.alternate_chroma_phase;
        engine
    }

    /// Use the exact running-noise recurrence instead of filtered noise
    pub fn with_precise_noise(mut self, precise: bool) -> Self {
        self.noise = noise::noise_strategy(precise);
        self
    }

    pub fn config(&self) -> &VhsConfig {
        &self.config
    }

    /// Parameters may change between frames, never during one
    pub fn config_mut(&mut self) -> &mut VhsConfig {
        &mut self.config
    }

    pub fn set_config(&mut self, config: VhsConfig) {
        self.config = config;
    }

    pub fn noise_strategy(&self) -> &'static dyn NoiseStrategy {
        self.noise
    }

    /// Run the full pipeline over one field of `src`, writing that field's
    /// rows into `dst`.
    ///
    /// Rows of the other field in `dst` are left as they are. `field_number`
    /// feeds the subcarrier phase table: 0 for the first field of a frame,
    /// 2 for the second. Rows are looked up in the phase table by their own
    /// index; [`process_frame_pair`](Self::process_frame_pair) shifts the
    /// second field down one scanline.
    pub fn composite_layer(
        &mut self,
        dst: &mut Frame,
        src: &Frame,
        field: Field,
        field_number: i32,
    ) -> Result<()> {
        self.composite_rows(dst, src, field, field_number, 0)
    }

    fn composite_rows(
        &mut self,
        dst: &mut Frame,
        src: &Frame,
        field: Field,
        field_number: i32,
        row_offset: i32,
    ) -> Result<()> {
        let (width, height) = src.dimensions();
        if dst.dimensions() != (width, height) {
            return Err(FrameError::ShapeMismatch {
                dst_width: dst.width(),
                dst_height: dst.height(),
                src_width: width,
                src_height: height,
            }
            .into());
        }
        if width == 0 || height == 0 {
            return Err(FrameError::Degenerate { width, height }.into());
        }

        let cfg = self.config.clamped();
        let rng = self.rng.as_mut();
        let phase = ScanlinePhase::new(
            PhaseShiftMode::from_degrees(cfg.video_scanline_phase_shift),
            cfg.video_scanline_phase_shift_offset,
        )
        .with_row_offset(row_offset);
        let bleed = (cfg.color_bleed_horiz as usize, cfg.color_bleed_vert as usize);

        let src = if cfg.black_line_cut {
            let mut cut = src.clone();
            cut.cut_black_line_border(Some(cfg.black_line_border as u32));
            Cow::Owned(cut)
        } else {
            Cow::Borrowed(src)
        };

        let mut yiq = yiq::decode(&src);

        if cfg.color_bleed_before {
            color_bleed(&mut yiq, field, bleed.0, bleed.1);
        }

        if cfg.composite_in_chroma_lowpass {
            trace!("composite input lowpass");
            composite::composite_lowpass(&mut yiq, field);
        }

        if cfg.ringing != 1.0 {
            let ringing = if cfg.enable_ringing2 {
                Ringing::Pattern {
                    power: cfg.ringing_power,
                    shift: cfg.ringing_shift,
                }
            } else {
                Ringing::Mask {
                    alpha: cfg.ringing,
                    noise_size: cfg.freq_noise_size,
                    noise_amplitude: cfg.freq_noise_amplitude,
                }
            };
            apply_ringing(&mut yiq, field, &ringing, cfg.ringing_clip, rng);
        }

        chroma_into_luma(&mut yiq, field, field_number, cfg.subcarrier_amplitude, phase);

        if cfg.composite_preemphasis != 0.0 && cfg.composite_preemphasis_cut > 0.0 {
            trace!("composite preemphasis {}", cfg.composite_preemphasis);
            composite::composite_preemphasis(
                &mut yiq.y,
                field,
                cfg.composite_preemphasis,
                cfg.composite_preemphasis_cut,
            );
        }

        if cfg.video_noise != 0 {
            self.noise.luma(&mut yiq.y, field, cfg.video_noise, rng);
        }

        if cfg.vhs_head_switching {
            let hs = HeadSwitch {
                point: cfg.vhs_head_switching_point + self.head_switch_drift,
                phase: cfg.vhs_head_switching_phase,
                phase_noise: cfg.vhs_head_switching_phase_noise,
                ntsc: cfg.output_ntsc,
            };
            tape::head_switching(&mut yiq.y, field, &hs, rng);
            self.head_switch_drift += cfg.head_switching_speed as f64 / 1000.0;
        }

        if !cfg.nocolor_subcarrier {
            chroma_from_luma(&mut yiq, field, field_number, cfg.subcarrier_amplitude_back, phase);
        }

        if cfg.video_chroma_noise != 0 {
            let (i, q) = yiq.chroma_mut();
            self.noise.chroma(i, q, field, cfg.video_chroma_noise, rng);
        }

        if cfg.video_chroma_phase_noise != 0 {
            let (i, q) = yiq.chroma_mut();
            noise::chroma_phase_noise(i, q, field, cfg.video_chroma_phase_noise, rng);
        }

        if cfg.emulating_vhs {
            emulate_vhs(&mut yiq, field, field_number, &cfg, phase, rng);
        }

        if cfg.video_chroma_loss != 0 {
            let (i, q) = yiq.chroma_mut();
            noise::chroma_loss(i, q, field, cfg.video_chroma_loss, rng);
        }

        if cfg.composite_out_chroma_lowpass {
            if cfg.composite_out_chroma_lowpass_lite {
                composite::composite_lowpass_lite(&mut yiq, field);
            } else {
                composite::composite_lowpass(&mut yiq, field);
            }
        }

        if !cfg.color_bleed_before {
            color_bleed(&mut yiq, field, bleed.0, bleed.1);
        }

        blur_chroma(&mut yiq.i, field);
        blur_chroma(&mut yiq.q, field);

        yiq::encode_into(&yiq, dst, field)
    }

    /// Compose one interlaced output frame.
    ///
    /// The even field comes from `current`; the odd field from `next`, or
    /// from `current` again when there is no next frame. The odd field is
    /// treated as a frame starting one scanline lower, so its row `y` takes
    /// the subcarrier phase of row `y + 1`.
    pub fn process_frame_pair(&mut self, current: &Frame, next: Option<&Frame>) -> Result<Frame> {
        let second = next.unwrap_or(current);
        if second.dimensions() != current.dimensions() {
            return Err(FrameError::ShapeMismatch {
                dst_width: current.width(),
                dst_height: current.height(),
                src_width: second.width(),
                src_height: second.height(),
            }
            .into());
        }

        let mut out = current.clone();
        self.composite_layer(&mut out, current, Field::Even, 0)?;
        self.composite_rows(&mut out, second, Field::Odd, SECOND_FIELD_NUMBER, 1)?;
        Ok(out)
    }
}

/// Record/playback pass through a VHS deck
fn emulate_vhs(
    yiq: &mut YiqPlanes,
    field: Field,
    field_number: i32,
    cfg: &VhsConfig,
    phase: ScanlinePhase,
    rng: &mut dyn RandomStream,
) {
    let speed = cfg.output_vhs_tape_speed;
    trace!("emulating VHS at {}", speed);

    if cfg.vhs_edge_wave != 0 {
        tape::edge_wave(yiq, field, cfg.vhs_edge_wave, speed.luma_cut(), rng);
    }

    tape::luma_lowpass(&mut yiq.y, field, speed.luma_cut());
    tape::chroma_lowpass(yiq, field, speed.chroma_cut(), speed.chroma_delay());

    if cfg.vhs_chroma_vert_blend && cfg.output_ntsc {
        tape::chroma_vert_blend(yiq, field);
    }

    tape::sharpen(&mut yiq.y, field, speed.luma_cut(), cfg.vhs_out_sharpen);

    if !cfg.vhs_svideo_out {
        chroma_into_luma(yiq, field, field_number, cfg.subcarrier_amplitude, phase);
        chroma_from_luma(yiq, field, field_number, cfg.subcarrier_amplitude, phase);
    }
}

impl FrameEffect for VhsEngine {
    fn name(&self) -> &str {
        "vhs"
    }

    fn process(&mut self, current: &Frame, next: Option<&Frame>, frame_index: usize) -> Result<Frame> {
        if self.alternate_chroma_phase {
            self.config.video_scanline_phase_shift_offset = if frame_index % 2 == 1 { 2 } else { 0 };
        }
        debug!(
            "processing frame {} ({}x{})",
            frame_index,
            current.width(),
            current.height()
        );
        self.process_frame_pair(current, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VhsError;
    use crate::vhs::random::RandomKind;

    fn quiet_config() -> VhsConfig {
        VhsConfig {
            emulating_vhs: false,
            ringing: 1.0,
            video_noise: 0,
            ..VhsConfig::default()
        }
    }

    fn assert_interior_matches(out: &Frame, expected: &Frame) {
        for y in (0..64).step_by(2) {
            for x in 20..44 {
                let (a, b) = (out.get_pixel(x, y), expected.get_pixel(x, y));
                for c in 0..3 {
                    assert!(a[c].abs_diff(b[c]) <= 1, "({}, {}): {:?} vs {:?}", x, y, a, b);
                }
            }
        }
    }

    fn gradient(width: u32, height: u32) -> Frame {
        let mut frame = Frame::new_black(width, height);
        for y in 0..height {
            for x in 0..width {
                let r = (x * 255 / width.max(1)) as u8;
                let g = (y * 255 / height.max(1)) as u8;
                frame.set_pixel(x, y, [r, g, 255 - r]);
            }
        }
        frame
    }

    fn noisy_config() -> VhsConfig {
        VhsConfig {
            video_noise: 800,
            video_chroma_noise: 2000,
            video_chroma_phase_noise: 10,
            video_chroma_loss: 500,
            vhs_head_switching: true,
            head_switching_speed: 5,
            emulating_vhs: true,
            vhs_edge_wave: 3,
            ringing: 0.5,
            freq_noise_size: 0.7,
            color_bleed_horiz: 2,
            color_bleed_vert: 1,
            ..VhsConfig::default()
        }
    }

    #[test]
    fn test_baseline_matches_codec_round_trip() {
        let frame = Frame::new_filled(64, 64, [180, 90, 40]);
        let expected = yiq::encode(&yiq::decode(&frame), Field::Even);

        let mut engine = VhsEngine::new(quiet_config());
        let mut out = frame.clone();
        engine.composite_layer(&mut out, &frame, Field::Even, 0).unwrap();
        assert_interior_matches(&out, &expected);
    }

    #[test]
    fn test_baseline_without_chroma_lowpass() {
        let frame = Frame::new_filled(64, 64, [180, 90, 40]);
        let expected = yiq::encode(&yiq::decode(&frame), Field::Even);
        let config = VhsConfig {
            composite_in_chroma_lowpass: false,
            composite_out_chroma_lowpass: false,
            ..quiet_config()
        };

        let mut engine = VhsEngine::new(config);
        let mut out = frame.clone();
        engine.composite_layer(&mut out, &frame, Field::Even, 0).unwrap();
        assert_interior_matches(&out, &expected);
    }

    #[test]
    fn test_second_field_follows_padded_scanline_phase() {
        // With 180 degree shifts, odd row 2k+1 of the second field is looked
        // up as row 2k+2 and lands on the same phase as even row 2k.
        let frame = Frame::new_filled(32, 16, [200, 60, 120]);
        let mut engine = VhsEngine::new(quiet_config());
        let out = engine.process_frame_pair(&frame, None).unwrap();

        for y in (0..16).step_by(2) {
            assert_eq!(out.row(y), out.row(y + 1), "rows {} and {}", y, y + 1);
        }
    }

    #[test]
    fn test_full_chroma_loss_outputs_gray_field() {
        let frame = gradient(32, 16);
        let config = VhsConfig {
            video_chroma_loss: 100_000,
            ..VhsConfig::default()
        };

        let mut first = None;
        for _ in 0..2 {
            let mut engine = VhsEngine::new(config.clone());
            let mut out = frame.clone();
            engine.composite_layer(&mut out, &frame, Field::Odd, 0).unwrap();

            for y in (1..16).step_by(2) {
                for x in 0..32 {
                    let [r, g, b] = out.get_pixel(x, y);
                    assert!(r == g && g == b, "({}, {}) not gray", x, y);
                }
            }
            assert_eq!(out.get_pixel(5, 0), frame.get_pixel(5, 0));

            if let Some(prev) = &first {
                assert_eq!(prev, &out);
            }
            first = Some(out);
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let frame = gradient(48, 24);
        let run = || {
            let mut engine = VhsEngine::with_stream(noisy_config(), RandomKind::XorWow.stream(99));
            let a = engine.process_frame_pair(&frame, None).unwrap();
            let b = engine.process_frame_pair(&a, Some(&frame)).unwrap();
            (a, b)
        };
        assert_eq!(run(), run());

        let mut other = VhsEngine::with_stream(noisy_config(), RandomKind::XorWow.stream(100));
        assert_ne!(other.process_frame_pair(&frame, None).unwrap(), run().0);
    }

    #[test]
    fn test_field_isolation() {
        let frame = gradient(32, 20);
        for field in [Field::Even, Field::Odd] {
            let mut engine = VhsEngine::new(noisy_config()).with_precise_noise(true);
            let mut dst = Frame::new_filled(32, 20, [7, 8, 9]);
            engine.composite_layer(&mut dst, &frame, field, 0).unwrap();

            for y in 0..20 {
                let untouched = (0..32).all(|x| dst.get_pixel(x, y) == [7, 8, 9]);
                assert_eq!(untouched, !field.contains(y as usize), "row {}", y);
            }
        }
    }

    #[test]
    fn test_tiny_frames_survive_default_pipeline() {
        for color in [[0, 0, 0], [255, 255, 255]] {
            let frame = Frame::new_filled(2, 2, color);
            let mut engine = VhsEngine::new(VhsConfig::default());
            let out = engine.process_frame_pair(&frame, None).unwrap();
            assert_eq!(out.dimensions(), (2, 2));
        }
    }

    #[test]
    fn test_shape_errors_fail_fast() {
        let mut engine = VhsEngine::new(VhsConfig::default());
        let src = Frame::new_black(8, 4);
        let mut dst = Frame::new_filled(8, 6, [1, 1, 1]);

        let err = engine.composite_layer(&mut dst, &src, Field::Even, 0).unwrap_err();
        assert!(matches!(err, VhsError::Frame(FrameError::ShapeMismatch { .. })));
        assert_eq!(dst, Frame::new_filled(8, 6, [1, 1, 1]));

        let empty = Frame::new_black(0, 0);
        let err = engine.composite_layer(&mut empty.clone(), &empty, Field::Even, 0).unwrap_err();
        assert!(err.is_recoverable());

        assert!(engine.process_frame_pair(&src, Some(&dst)).is_err());
    }

    #[test]
    fn test_head_switch_point_drifts() {
        let config = VhsConfig {
            vhs_head_switching: true,
            head_switching_speed: 10,
            ..VhsConfig::default()
        };
        let mut engine = VhsEngine::new(config);
        let frame = gradient(16, 8);
        engine.process_frame_pair(&frame, None).unwrap();
        assert!((engine.head_switch_drift - 0.02).abs() < 1e-12);
        // The configured point itself is not rewritten
        assert_eq!(engine.config().vhs_head_switching_point, VhsConfig::default().vhs_head_switching_point);
    }

    #[test]
    fn test_alternate_chroma_phase_by_frame() {
        let settings = EngineSettings {
            alternate_chroma_phase: true,
            ..EngineSettings::default()
        };
        let mut engine = VhsEngine::from_settings(VhsConfig::default(), &settings);
        let frame = gradient(16, 8);

        engine.process(&frame, None, 3).unwrap();
        assert_eq!(engine.config().video_scanline_phase_shift_offset, 2);
        engine.process(&frame, None, 4).unwrap();
        assert_eq!(engine.config().video_scanline_phase_shift_offset, 0);
    }
}
