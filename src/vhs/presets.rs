//! Seeded random parameter sets.

use tracing::debug;

use super::params::VhsConfig;
use super::random::{RandomKind, RandomStream};
use super::tape::TapeSpeed;

/// Sampling helpers on top of a [`RandomStream`]
struct Sampler<'a> {
    rng: &'a mut dyn RandomStream,
}

impl Sampler<'_> {
    fn random(&mut self) -> f64 {
        self.rng.next_f64()
    }

    fn chance(&mut self, p: f64) -> bool {
        self.random() < p
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.random()
    }

    /// Inclusive on both ends
    fn randint(&mut self, low: i32, high: i32) -> i32 {
        self.rng.next_int(low, high + 1)
    }

    fn choice<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.rng.next_int(0, items.len() as i32) as usize]
    }

    /// Triangular distribution on `[low, high]` peaking at `mode`
    fn triangular(&mut self, low: f64, high: f64, mode: f64) -> f64 {
        if high == low {
            return low;
        }
        let mut u = self.random();
        let mut c = (mode - low) / (high - low);
        let (mut low, mut high) = (low, high);
        if u > c {
            u = 1.0 - u;
            c = 1.0 - c;
            std::mem::swap(&mut low, &mut high);
        }
        low + (high - low) * (u * c).sqrt()
    }

    fn triangular_int(&mut self, low: f64, high: f64, mode: f64) -> i32 {
        self.triangular(low, high, mode) as i32
    }
}

/// Build a complete random parameter set from `seed`.
///
/// Distributions lean towards subtle artifacts: most noise amounts peak near
/// zero and the composite filters stay on four times out of five. The same
/// seed and stream kind always produce the same configuration.
pub fn random_preset(seed: u64, kind: RandomKind) -> VhsConfig {
    let mut stream = kind.stream(seed);
    let mut s = Sampler {
        rng: stream.as_mut(),
    };
    let mut config = VhsConfig::default();

    config.composite_preemphasis = s.triangular(0.0, 8.0, 0.0);
    config.vhs_out_sharpen = s.triangular(1.0, 5.0, 1.5);
    config.composite_in_chroma_lowpass = s.chance(0.8);
    config.composite_out_chroma_lowpass = s.chance(0.8);
    config.composite_out_chroma_lowpass_lite = s.chance(0.8);
    config.video_chroma_noise = s.triangular_int(0.0, 16384.0, 2.0);
    config.video_chroma_phase_noise = s.triangular_int(0.0, 50.0, 2.0);
    config.video_chroma_loss = s.triangular_int(0.0, 800.0, 10.0);
    config.video_noise = s.triangular_int(0.0, 4200.0, 2.0);
    config.emulating_vhs = s.chance(0.2);
    config.vhs_edge_wave = s.triangular_int(0.0, 5.0, 0.0);
    config.video_scanline_phase_shift = s.choice(&[0, 90, 180, 270]);
    config.video_scanline_phase_shift_offset = s.randint(0, 3);
    config.output_vhs_tape_speed = s.choice(&TapeSpeed::ALL);

    if s.chance(0.8) {
        config.ringing = s.uniform(0.3, 0.7);
        if s.chance(0.8) {
            config.freq_noise_size = s.uniform(0.5, 0.99);
            config.freq_noise_amplitude = s.uniform(0.5, 2.0);
        }
        config.enable_ringing2 = s.chance(0.5);
        config.ringing_power = s.randint(2, 7);
    }

    config.color_bleed_before = s.randint(0, 1) == 1;
    config.color_bleed_horiz = s.triangular_int(0.0, 8.0, 0.0);
    config.color_bleed_vert = s.triangular_int(0.0, 8.0, 0.0);

    debug!("random preset {} ({:?})", seed, kind);
    config
}
