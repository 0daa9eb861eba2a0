//! Sample-level luma/chroma noise, chroma phase noise and chroma dropout.
//!
//! Amplitude noise comes in two flavours behind [`NoiseStrategy`]:
//!
//! - [`FilteredNoise`] draws a row of uniform integers and smooths it with a
//!   one-pole lowpass (α = 0.5) delayed by one sample. Each field row starts
//!   from a zero filter state. This is the default.
//! - [`RecurrenceNoise`] runs the integer recurrence
//!   `noise = (noise + rnd) / 2` sample by sample and carries the running
//!   value from row to row.
//!
//! Both look alike on screen but do not produce the same numbers.

use std::f64::consts::PI;

use super::filters::LowpassFilter;
use super::random::RandomStream;
use super::yiq::{Field, Plane};

/// Additive amplitude noise for one field
pub trait NoiseStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Perturb the luma rows of `field` by up to `±amplitude`
    fn luma(&self, y: &mut Plane, field: Field, amplitude: i32, rng: &mut dyn RandomStream);

    /// Perturb the I and Q rows of `field` by up to `±amplitude`
    fn chroma(
        &self,
        i: &mut Plane,
        q: &mut Plane,
        field: Field,
        amplitude: i32,
        rng: &mut dyn RandomStream,
    );
}

/// Pick the strategy for the `precise` configuration flag
pub fn noise_strategy(precise: bool) -> &'static dyn NoiseStrategy {
    if precise {
        &RecurrenceNoise
    } else {
        &FilteredNoise
    }
}

/// Lowpass-smoothed noise, filtered independently per row
#[derive(Debug, Clone, Copy, Default)]
pub struct FilteredNoise;

impl FilteredNoise {
    fn add_row_noise(row: &mut [i32], amplitude: i32, rng: &mut dyn RandomStream) {
        let modulus = amplitude * 2 + 1;
        let rnds: Vec<i32> = rng
            .rand_array(row.len())
            .into_iter()
            .map(|r| r % modulus - amplitude)
            .collect();

        let smoothed = LowpassFilter::with_alpha(0.5, 0.0).lowpass_array(&rnds);

        // One-sample delay: the first sample gets no noise
        for (dst, &n) in row.iter_mut().skip(1).zip(&smoothed) {
            *dst += n as i32;
        }
    }
}

impl NoiseStrategy for FilteredNoise {
    fn name(&self) -> &'static str {
        "filtered"
    }

    fn luma(&self, y: &mut Plane, field: Field, amplitude: i32, rng: &mut dyn RandomStream) {
        if amplitude <= 0 {
            return;
        }
        for row in y.field_rows_mut(field) {
            Self::add_row_noise(row, amplitude, rng);
        }
    }

    fn chroma(
        &self,
        i: &mut Plane,
        q: &mut Plane,
        field: Field,
        amplitude: i32,
        rng: &mut dyn RandomStream,
    ) {
        if amplitude <= 0 {
            return;
        }
        for row in i.field_rows_mut(field) {
            Self::add_row_noise(row, amplitude, rng);
        }
        for row in q.field_rows_mut(field) {
            Self::add_row_noise(row, amplitude, rng);
        }
    }
}

/// Exact running-noise recurrence
#[derive(Debug, Clone, Copy, Default)]
pub struct RecurrenceNoise;

impl NoiseStrategy for RecurrenceNoise {
    fn name(&self) -> &'static str {
        "recurrence"
    }

    fn luma(&self, y: &mut Plane, field: Field, amplitude: i32, rng: &mut dyn RandomStream) {
        if amplitude <= 0 {
            return;
        }
        let modulus = amplitude * 2 + 1;
        let mut noise = 0i32;

        for row in y.field_rows_mut(field) {
            let rnds = rng.rand_array(row.len());
            for (sample, rnd) in row.iter_mut().zip(rnds) {
                *sample += noise;
                noise = (noise + rnd % modulus - amplitude) / 2;
            }
        }
    }

    fn chroma(
        &self,
        i: &mut Plane,
        q: &mut Plane,
        field: Field,
        amplitude: i32,
        rng: &mut dyn RandomStream,
    ) {
        if amplitude <= 0 {
            return;
        }
        let modulus = amplitude * 2 + 1;
        let (mut noise_i, mut noise_q) = (0i32, 0i32);

        for (row_i, row_q) in i.field_rows_mut(field).zip(q.field_rows_mut(field)) {
            for (si, sq) in row_i.iter_mut().zip(row_q.iter_mut()) {
                *si += noise_i;
                noise_i = (noise_i + rng.rand() % modulus - amplitude) / 2;

                *sq += noise_q;
                noise_q = (noise_q + rng.rand() % modulus - amplitude) / 2;
            }
        }
    }
}

/// Rotate the (I, Q) vector of each field row by a slowly drifting angle.
///
/// The angle follows the same half-decay recurrence as the amplitude noise,
/// in units of π/100.
pub fn chroma_phase_noise(
    i: &mut Plane,
    q: &mut Plane,
    field: Field,
    amplitude: i32,
    rng: &mut dyn RandomStream,
) {
    if amplitude <= 0 {
        return;
    }
    let modulus = amplitude * 2 + 1;
    let mut noise = 0i32;

    for (row_i, row_q) in i.field_rows_mut(field).zip(q.field_rows_mut(field)) {
        noise = (noise + rng.rand() % modulus - amplitude) / 2;

        let theta = noise as f64 * PI / 100.0;
        let (sin, cos) = theta.sin_cos();

        for (si, sq) in row_i.iter_mut().zip(row_q.iter_mut()) {
            let (u, v) = (*si as f64, *sq as f64);
            *si = (u * cos - v * sin) as i32;
            *sq = (u * sin + v * cos) as i32;
        }
    }
}

/// Zero whole chroma rows with probability `loss / 100000` each.
pub fn chroma_loss(i: &mut Plane, q: &mut Plane, field: Field, loss: i32, rng: &mut dyn RandomStream) {
    if loss <= 0 {
        return;
    }
    for (row_i, row_q) in i.field_rows_mut(field).zip(q.field_rows_mut(field)) {
        if rng.rand() % 100_000 < loss {
            row_i.fill(0);
            row_q.fill(0);
        }
    }
}
