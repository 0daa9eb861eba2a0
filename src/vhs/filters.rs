//! Single-pole IIR building blocks tuned to analog cutoff frequencies.

use std::f64::consts::PI;

/// Sample rate of the simulated composite signal: four samples per NTSC
/// color subcarrier cycle (315/88 MHz × 4).
pub const VHS_RATE: f64 = 315_000_000.0 / 88.0 * 4.0;

/// Single-pole lowpass filter `y[n] = α·x[n] + (1 − α)·y[n−1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowpassFilter {
    alpha: f64,
    prev: f64,
}

impl LowpassFilter {
    /// Filter with the RC-equivalent coefficient for `cutoff_hz` at `rate`,
    /// starting from `initial` as its previous output.
    pub fn new(rate: f64, cutoff_hz: f64, initial: f64) -> Self {
        let time_interval = 1.0 / rate;
        let tau = 1.0 / (cutoff_hz * 2.0 * PI);
        Self {
            alpha: time_interval / (tau + time_interval),
            prev: initial,
        }
    }

    /// Filter with an explicit coefficient
    pub fn with_alpha(alpha: f64, initial: f64) -> Self {
        Self { alpha, prev: initial }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn prev(&self) -> f64 {
        self.prev
    }

    pub fn lowpass(&mut self, sample: f64) -> f64 {
        self.prev = sample * self.alpha + (self.prev - self.prev * self.alpha);
        self.prev
    }

    pub fn highpass(&mut self, sample: f64) -> f64 {
        sample - self.lowpass(sample)
    }

    /// Filter a whole sequence, seeded from the current `prev` value.
    ///
    /// Equivalent to calling [`lowpass`](Self::lowpass) on every sample of a
    /// copy of this filter: the first output already accounts for `prev`, so
    /// rows seeded with a non-zero reset value do not ramp up from zero.
    /// The filter itself is left unchanged.
    pub fn lowpass_array<T: Copy + Into<f64>>(&self, samples: &[T]) -> Vec<f64> {
        let mut state = *self;
        samples.iter().map(|&s| state.lowpass(s.into())).collect()
    }

    /// `samples − lowpass_array(samples)`, leaving the filter unchanged
    pub fn highpass_array(&self, samples: &[f64]) -> Vec<f64> {
        self.lowpass_array(samples)
            .into_iter()
            .zip(samples)
            .map(|(lp, &s)| s - lp)
            .collect()
    }
}

/// Three identical lowpass filters applied in series.
///
/// Approximates the steeper rolloff of the analog channel filters. Build a
/// fresh cascade per scanline; rows never share state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowpassCascade {
    stages: [LowpassFilter; 3],
}

impl LowpassCascade {
    pub fn new(cutoff_hz: f64, reset: f64) -> Self {
        Self::with_rate(VHS_RATE, cutoff_hz, reset)
    }

    pub fn with_rate(rate: f64, cutoff_hz: f64, reset: f64) -> Self {
        Self {
            stages: [LowpassFilter::new(rate, cutoff_hz, reset); 3],
        }
    }

    /// Run `row` through all three stages
    pub fn filter_row(&self, row: &[i32]) -> Vec<f64> {
        let [a, b, c] = &self.stages;
        let f0 = a.lowpass_array(row);
        let f1 = b.lowpass_array(&f0);
        c.lowpass_array(&f1)
    }

    /// Lowpass `row` in place and advance it by `delay` samples.
    ///
    /// The last `delay` samples keep their unfiltered values.
    pub fn filter_row_delayed(&self, row: &mut [i32], delay: usize) {
        let filtered = self.filter_row(row);
        let width = row.len();
        if delay >= width {
            return;
        }
        for (dst, &v) in row[..width - delay].iter_mut().zip(&filtered[delay..]) {
            *dst = v as i32;
        }
    }
}
