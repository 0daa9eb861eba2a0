//! Frequency-domain ringing.
//!
//! A field plane is transformed with a 2D FFT, multiplied by a horizontal
//! frequency mask and transformed back. Masks are laid out in shifted order
//! (DC in the middle) and mapped onto the unshifted spectrum.

use rand::{rngs::SmallRng, Rng, SeedableRng};
use rayon::prelude::*;
use rustfft::{num_complex::Complex, FftPlanner};
use tracing::trace;

use super::random::RandomStream;
use super::ring_pattern::RING_PATTERN;
use super::yiq::{Field, Plane, YiqPlanes};

/// Ringing algorithm and its parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ringing {
    /// Rectangular passband of half-width `alpha · rows/2` with optional
    /// multiplicative noise outside the `noise_size` band
    Mask {
        alpha: f64,
        noise_size: f64,
        noise_amplitude: f64,
    },
    /// Ring pattern stretched by `1 + shift` and raised to `power`
    Pattern { power: i32, shift: f64 },
}

impl Ringing {
    fn needs_noise(&self) -> bool {
        matches!(self, Ringing::Mask { noise_size, .. } if *noise_size > 0.0)
    }
}

/// Apply `ringing` to the Y, I and Q rows of `field`.
///
/// Planes are processed in parallel. Mask noise is seeded from `rng` before
/// the planes are dispatched so the result does not depend on scheduling.
pub fn apply_ringing(
    yiq: &mut YiqPlanes,
    field: Field,
    ringing: &Ringing,
    clip: bool,
    rng: &mut dyn RandomStream,
) {
    let seeds: Vec<u64> = if ringing.needs_noise() {
        (0..3).map(|_| rng.next_u32() as u64).collect()
    } else {
        vec![0; 3]
    };

    let YiqPlanes { y, i, q } = yiq;
    let mut planes: [&mut Plane; 3] = [y, i, q];

    planes
        .par_iter_mut()
        .zip(seeds.par_iter())
        .for_each(|(plane, &seed)| {
            let rows = field.rows_in(plane.height());
            let cols = plane.width();
            if rows == 0 || cols == 0 {
                return;
            }

            let values = plane.extract_field(field);
            let rung = ring_field(&values, rows, cols, ringing, clip, seed);
            plane.store_field(field, &rung);
        });

    trace!("ringing applied: {:?}", ringing);
}

/// Ring a dense `rows × cols` matrix, returning the truncated result.
pub fn ring_field(
    values: &[i32],
    rows: usize,
    cols: usize,
    ringing: &Ringing,
    clip: bool,
    noise_seed: u64,
) -> Vec<i32> {
    let mut planner = FftPlanner::<f64>::new();
    let mut spectrum: Vec<Complex<f64>> = values
        .iter()
        .map(|&v| Complex::new(v as f64, 0.0))
        .collect();

    fft_2d(&mut planner, &mut spectrum, rows, cols, false);

    match *ringing {
        Ringing::Mask {
            alpha,
            noise_size,
            noise_amplitude,
        } => {
            let passband = passband_mask(rows, cols, alpha);
            let mut noise = (noise_size > 0.0).then(|| SmallRng::seed_from_u64(noise_seed));
            let in_quiet_band = quiet_band(cols, noise_size);
            let half = noise_amplitude / 2.0;

            for_each_shifted(&mut spectrum, rows, cols, |_, sc, bin| {
                let (mut m_re, mut m_im) = (passband[sc], passband[sc]);
                if let Some(rng) = noise.as_mut() {
                    if !in_quiet_band(sc) {
                        m_re += rng.gen::<f64>() * half - half / 2.0;
                        m_im += rng.gen::<f64>() * half - half / 2.0;
                    }
                }
                *bin = Complex::new(bin.re * m_re, bin.im * m_im);
            });
        }
        Ringing::Pattern { power, shift } => {
            let mask = pattern_mask(cols, power, shift);
            for_each_shifted(&mut spectrum, rows, cols, |_, sc, bin| {
                *bin *= mask[sc];
            });
        }
    }

    fft_2d(&mut planner, &mut spectrum, rows, cols, true);

    let scale = 1.0 / (rows * cols) as f64;
    let (lo, hi) = if clip {
        let lo = values.iter().copied().min().unwrap_or(0) as f64;
        let hi = values.iter().copied().max().unwrap_or(0) as f64;
        (lo, hi)
    } else {
        (f64::NEG_INFINITY, f64::INFINITY)
    };

    spectrum
        .iter()
        .map(|c| (c.re * scale).clamp(lo, hi) as i32)
        .collect()
}

/// Unnormalised 2D FFT of a row-major matrix: rows first, then columns
fn fft_2d(
    planner: &mut FftPlanner<f64>,
    data: &mut [Complex<f64>],
    rows: usize,
    cols: usize,
    inverse: bool,
) {
    let (row_fft, col_fft) = if inverse {
        (planner.plan_fft_inverse(cols), planner.plan_fft_inverse(rows))
    } else {
        (planner.plan_fft_forward(cols), planner.plan_fft_forward(rows))
    };

    row_fft.process(data);

    let mut column = vec![Complex::new(0.0, 0.0); rows];
    for x in 0..cols {
        for (y, c) in column.iter_mut().enumerate() {
            *c = data[y * cols + x];
        }
        col_fft.process(&mut column);
        for (y, c) in column.iter().enumerate() {
            data[y * cols + x] = *c;
        }
    }
}

/// Visit every bin along with its fft-shifted row and column
fn for_each_shifted<F>(data: &mut [Complex<f64>], rows: usize, cols: usize, mut f: F)
where
    F: FnMut(usize, usize, &mut Complex<f64>),
{
    for (r, row) in data.chunks_exact_mut(cols).enumerate().take(rows) {
        let sr = (r + rows / 2) % rows;
        for (c, bin) in row.iter_mut().enumerate() {
            f(sr, (c + cols / 2) % cols, bin);
        }
    }
}

/// 1 inside `ccol ± min(crow, 1 + alpha·crow)`, 0 elsewhere
fn passband_mask(rows: usize, cols: usize, alpha: f64) -> Vec<f64> {
    let (crow, ccol) = (rows / 2, cols / 2);
    let half_width = crow.min((1.0 + alpha * crow as f64) as usize);
    let lo = ccol.saturating_sub(half_width);
    let hi = (ccol + half_width).min(cols);

    (0..cols)
        .map(|c| if (lo..hi).contains(&c) { 1.0 } else { 0.0 })
        .collect()
}

/// Columns around DC that receive no frequency noise
fn quiet_band(cols: usize, noise_size: f64) -> impl Fn(usize) -> bool {
    let ccol = (cols / 2) as f64;
    let start = (ccol - (1.0 - noise_size) * ccol) as i64;
    let stop = (ccol + (1.0 - noise_size) * ccol) as i64;
    move |c| (start..stop).contains(&(c as i64))
}

/// Ring pattern resampled to `cols · (1 + shift)`, centre-cropped to `cols`
/// and raised to `power`.
fn pattern_mask(cols: usize, power: i32, shift: f64) -> Vec<f64> {
    let scaled_cols = ((cols as f64 * (1.0 + shift)) as usize).max(1);
    let stretched = resize_linear(&RING_PATTERN, scaled_cols);
    let start = (scaled_cols / 2).saturating_sub(cols / 2);
    let stop = (scaled_cols / 2 + cols / 2).min(scaled_cols);

    (0..cols)
        .map(|c| {
            let idx = start + c;
            if idx < stop {
                stretched[idx].powi(power)
            } else {
                0.0
            }
        })
        .collect()
}

/// Half-pixel-centred linear resampling of a 1D profile
fn resize_linear(src: &[f32], len: usize) -> Vec<f64> {
    let scale = src.len() as f64 / len as f64;
    let last = src.len() - 1;

    (0..len)
        .map(|dx| {
            let fx = (dx as f64 + 0.5) * scale - 0.5;
            let sx = fx.floor();
            let (sx, frac) = if sx < 0.0 {
                (0, 0.0)
            } else if sx as usize >= last {
                (last, 0.0)
            } else {
                (sx as usize, fx - sx)
            };
            let next = src[(sx + 1).min(last)] as f64;
            src[sx] as f64 * (1.0 - frac) + next * frac
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vhs::random::XorWowRandom;

    const NO_NOISE: Ringing = Ringing::Mask {
        alpha: 0.5,
        noise_size: 0.0,
        noise_amplitude: 2.0,
    };

    fn columns_alternating(rows: usize, cols: usize) -> Vec<i32> {
        (0..rows * cols)
            .map(|k| if k % 2 == 0 { 3000 } else { 1000 })
            .collect()
    }

    #[test]
    fn test_constant_field_passes_through() {
        let values = vec![5000; 8 * 64];
        for ringing in [NO_NOISE, Ringing::Pattern { power: 2, shift: 0.0 }] {
            let out = ring_field(&values, 8, 64, &ringing, false, 0);
            assert!(out.iter().all(|&v| (v - 5000).abs() <= 1), "{:?}", ringing);
        }
    }

    #[test]
    fn test_narrow_passband_removes_nyquist() {
        // Alternating columns: DC 2000 plus a Nyquist component of ±1000
        let values = columns_alternating(4, 64);
        let out = ring_field(&values, 4, 64, &NO_NOISE, false, 0);
        assert!(out.iter().all(|&v| (v - 2000).abs() <= 1), "{:?}", out);

        let pattern = Ringing::Pattern { power: 4, shift: 0.0 };
        let out = ring_field(&values, 4, 64, &pattern, false, 0);
        assert!(out.iter().all(|&v| (v - 2000).abs() <= 1), "{:?}", out);
    }

    #[test]
    fn test_full_passband_is_identity() {
        // rows >= cols: the rectangle covers every column
        let values: Vec<i32> = (0..16 * 8).map(|k| (k * 37 % 101) * 10).collect();
        let ringing = Ringing::Mask {
            alpha: 1.0,
            noise_size: 0.0,
            noise_amplitude: 0.0,
        };
        let out = ring_field(&values, 16, 8, &ringing, false, 0);
        for (a, b) in out.iter().zip(&values) {
            assert!((a - b).abs() <= 1);
        }
    }

    #[test]
    fn test_clip_bounds_output() {
        let mut values = vec![0; 8 * 16];
        for row in values.chunks_exact_mut(16) {
            row[8..].fill(10000);
        }
        let ringing = Ringing::Mask {
            alpha: 0.5,
            noise_size: 0.0,
            noise_amplitude: 2.0,
        };

        let ringy = ring_field(&values, 8, 16, &ringing, false, 0);
        assert!(ringy.iter().any(|&v| !(0..=10000).contains(&v)));

        let clipped = ring_field(&values, 8, 16, &ringing, true, 0);
        assert!(clipped.iter().all(|&v| (0..=10000).contains(&v)));
    }

    #[test]
    fn test_noise_is_seed_deterministic() {
        let values = columns_alternating(8, 16);
        let ringing = Ringing::Mask {
            alpha: 0.5,
            noise_size: 0.7,
            noise_amplitude: 2.0,
        };
        let a = ring_field(&values, 8, 16, &ringing, false, 11);
        let b = ring_field(&values, 8, 16, &ringing, false, 11);
        let c = ring_field(&values, 8, 16, &ringing, false, 12);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_apply_leaves_other_field() {
        let mut yiq = YiqPlanes::new(16, 6);
        for plane in [&mut yiq.y, &mut yiq.i, &mut yiq.q] {
            for row in plane.field_rows_mut(Field::Odd) {
                for (x, v) in row.iter_mut().enumerate() {
                    *v = if x % 2 == 0 { 900 } else { -900 };
                }
            }
        }
        let before = yiq.clone();
        let mut rng = XorWowRandom::default();
        apply_ringing(&mut yiq, Field::Even, &NO_NOISE, false, &mut rng);

        assert_eq!(yiq.y.extract_field(Field::Odd), before.y.extract_field(Field::Odd));
        assert_eq!(yiq.q.extract_field(Field::Odd), before.q.extract_field(Field::Odd));
    }

    #[test]
    fn test_linear_resize_matches_endpoints() {
        let out = resize_linear(&[0.0, 1.0], 4);
        assert_eq!(out, vec![0.0, 0.25, 0.75, 1.0]);
        assert_eq!(pattern_mask(8, 2, 0.0).len(), 8);
    }
}
