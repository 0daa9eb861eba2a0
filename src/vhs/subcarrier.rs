//! Composite color subcarrier: folding chroma into luma and recovering it.
//!
//! The subcarrier runs at a quarter of the sample rate, so one cycle spans
//! four samples and the I/Q multipliers form a period-4 tile. Which phase a
//! scanline starts on is decided by [`ScanlinePhase`].

use super::yiq::{Field, YiqPlanes};

const I_MULT: [i32; 4] = [1, 0, -1, 0];
const Q_MULT: [i32; 4] = [0, 1, 0, -1];

/// Per-scanline phase advance of the subcarrier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseShiftMode {
    /// Advance a quarter cycle every two scanlines
    Deg90,
    /// Flip every other scanline pair (NTSC)
    Deg180,
    /// Constant per field
    Deg270,
    /// Use the configured offset only
    Fixed,
}

impl PhaseShiftMode {
    /// Map a degree value to a mode; anything unrecognised is `Fixed`
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees {
            90 => PhaseShiftMode::Deg90,
            180 => PhaseShiftMode::Deg180,
            270 => PhaseShiftMode::Deg270,
            _ => PhaseShiftMode::Fixed,
        }
    }
}

/// Phase bookkeeping shared by modulation and demodulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanlinePhase {
    pub mode: PhaseShiftMode,
    /// Extra phase offset in quarter cycles (0..=3)
    pub offset: i32,
    /// Added to every row index before the table lookup
    pub row_offset: i32,
}

impl ScanlinePhase {
    pub fn new(mode: PhaseShiftMode, offset: i32) -> Self {
        Self {
            mode,
            offset,
            row_offset: 0,
        }
    }

    /// Address rows as if the frame started `rows` scanlines higher.
    ///
    /// The second field of an interlaced pair sits one scanline below the
    /// first, so its row `y` is looked up as `y + 1`.
    pub fn with_row_offset(mut self, rows: i32) -> Self {
        self.row_offset = rows;
        self
    }

    /// Starting index into the period-4 multiplier tile for scanline `y`.
    pub fn xi(&self, field_number: i32, y: usize) -> usize {
        let y = y as i32 + self.row_offset;
        let xi = match self.mode {
            PhaseShiftMode::Deg90 => field_number + self.offset + (y >> 1),
            PhaseShiftMode::Deg180 => ((field_number + y) & 2) + self.offset,
            PhaseShiftMode::Deg270 => field_number + self.offset,
            PhaseShiftMode::Fixed => self.offset,
        };
        (xi & 3) as usize
    }
}

/// Modulate I/Q onto the luma rows of `field`, then clear the chroma rows.
///
/// `Y += floor((I·amp·Iₘ + Q·amp·Qₘ) / 50)` with the multipliers taken from
/// the tile at `xi + x`.
pub fn chroma_into_luma(
    yiq: &mut YiqPlanes,
    field: Field,
    field_number: i32,
    amplitude: i32,
    phase: ScanlinePhase,
) {
    let height = yiq.height();
    let YiqPlanes { y: yp, i: ip, q: qp } = yiq;

    for y in (field.index()..height).step_by(2) {
        let xi = phase.xi(field_number, y);
        let (iy, qy) = (ip.row_mut(y), qp.row_mut(y));

        for (x, luma) in yp.row_mut(y).iter_mut().enumerate() {
            let k = (xi + x) & 3;
            let chroma = iy[x] * amplitude * I_MULT[k] + qy[x] * amplitude * Q_MULT[k];
            *luma += chroma.div_euclid(50);
        }

        iy.fill(0);
        qy.fill(0);
    }
}

/// Separate the subcarrier from the luma rows of `field` and decode I/Q.
///
/// A four-tap running sum splits each row into a lowpassed luma and the
/// residual chroma carrier. The carrier is sign-corrected per phase, scaled
/// by `50 / amplitude` and sampled at every other pixel; odd samples are
/// interpolated from their neighbours and the last two columns are zero.
/// An amplitude of 0 decodes to zero chroma.
pub fn chroma_from_luma(
    yiq: &mut YiqPlanes,
    field: Field,
    field_number: i32,
    amplitude: i32,
    phase: ScanlinePhase,
) {
    let width = yiq.width();
    let height = yiq.height();
    if width == 0 {
        return;
    }

    let YiqPlanes { y: yp, i: ip, q: qp } = yiq;
    let mut chroma = vec![0i32; width];

    for y in (field.index()..height).step_by(2) {
        let luma = yp.row_mut(y);

        // Split into moving average and carrier residual
        let mut acc = luma[0] + luma.get(1).copied().unwrap_or(0);
        let mut behind = [0i32; 2];
        for k in 0..width {
            let next = luma.get(k + 2).copied().unwrap_or(0);
            acc += next - behind[k & 1];
            behind[k & 1] = luma[k];

            let acc4 = acc.div_euclid(4);
            chroma[k] = next - acc4;
            luma[k] = acc4;
        }

        let xi = phase.xi(field_number, y);
        let flip = (4 - xi) & 3;
        for (k, c) in chroma.iter_mut().enumerate() {
            if k >= flip + 2 && (k - flip) & 3 >= 2 {
                *c = -*c;
            }
        }

        let (iy, qy) = (ip.row_mut(y), qp.row_mut(y));
        let demod = |k: usize| -> i32 {
            match chroma.get(k) {
                Some(&c) if amplitude != 0 => -(c as f64 * 50.0 / amplitude as f64) as i32,
                _ => 0,
            }
        };

        for j in (0..width).step_by(2) {
            iy[j] = demod(xi + j);
            qy[j] = demod(xi + 1 + j);
        }

        for k in (1..width.saturating_sub(2)).step_by(2) {
            iy[k] = (iy[k - 1] + iy[k + 1]) >> 1;
            qy[k] = (qy[k - 1] + qy[k + 1]) >> 1;
        }

        let tail = width.saturating_sub(2);
        iy[tail..].fill(0);
        qy[tail..].fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vhs::yiq::Plane;

    fn gradient_row(width: usize) -> YiqPlanes {
        let ramp = |base: i32, step: i32| -> Vec<i32> {
            (0..width as i32).map(|k| base + step * k).collect()
        };
        YiqPlanes {
            y: Plane::from_vec(width, 1, ramp(25600, 40)),
            i: Plane::from_vec(width, 1, ramp(3000, 50)),
            q: Plane::from_vec(width, 1, ramp(-2000, 30)),
        }
    }

    fn round_trip_error(encode_offset: i32, decode_offset: i32) -> f64 {
        let original = gradient_row(64);
        let mut yiq = original.clone();

        let enc = ScanlinePhase::new(PhaseShiftMode::Deg180, encode_offset);
        let dec = ScanlinePhase::new(PhaseShiftMode::Deg180, decode_offset);
        chroma_into_luma(&mut yiq, Field::Even, 0, 50, enc);
        chroma_from_luma(&mut yiq, Field::Even, 0, 50, dec);

        let total: i32 = (4..60)
            .map(|k| {
                (yiq.i.row(0)[k] - original.i.row(0)[k]).abs()
                    + (yiq.q.row(0)[k] - original.q.row(0)[k]).abs()
            })
            .sum();
        total as f64 / (2.0 * 56.0)
    }

    #[test]
    fn test_xi_table() {
        let p90 = ScanlinePhase::new(PhaseShiftMode::Deg90, 1);
        assert_eq!(p90.xi(0, 0), 1);
        assert_eq!(p90.xi(0, 2), 2);
        assert_eq!(p90.xi(2, 7), 2);

        let p180 = ScanlinePhase::new(PhaseShiftMode::Deg180, 0);
        assert_eq!(p180.xi(0, 0), 0);
        assert_eq!(p180.xi(0, 2), 2);
        assert_eq!(p180.xi(0, 4), 0);
        assert_eq!(p180.xi(2, 1), 2);

        let p270 = ScanlinePhase::new(PhaseShiftMode::Deg270, 3);
        assert_eq!(p270.xi(2, 100), 1);

        let fixed = ScanlinePhase::new(PhaseShiftMode::from_degrees(0), 6);
        assert_eq!(fixed.xi(5, 9), 2);
    }

    #[test]
    fn test_xi_second_field_rows() {
        let rows = [1usize, 3, 5, 7];
        let lookup = |mode| {
            let phase = ScanlinePhase::new(mode, 0).with_row_offset(1);
            rows.iter().map(|&y| phase.xi(2, y)).collect::<Vec<_>>()
        };

        assert_eq!(lookup(PhaseShiftMode::Deg180), [0, 2, 0, 2]);
        assert_eq!(lookup(PhaseShiftMode::Deg90), [3, 0, 1, 2]);
        assert_eq!(lookup(PhaseShiftMode::Deg270), [2, 2, 2, 2]);
    }

    #[test]
    fn test_into_luma_clears_chroma() {
        let mut yiq = gradient_row(8);
        let phase = ScanlinePhase::new(PhaseShiftMode::Deg180, 0);
        chroma_into_luma(&mut yiq, Field::Even, 0, 50, phase);

        assert!(yiq.i.data().iter().all(|&v| v == 0));
        assert!(yiq.q.data().iter().all(|&v| v == 0));
        // x = 0: I·1; x = 1: Q·1 (negative, floored); x = 2: −I
        assert_eq!(yiq.y.row(0)[0], 25600 + 3000);
        assert_eq!(yiq.y.row(0)[1], 25640 + (-1970));
        assert_eq!(yiq.y.row(0)[2], 25680 - 3100);
    }

    #[test]
    fn test_matched_phase_reconstructs_chroma() {
        for offset in 0..4 {
            let err = round_trip_error(offset, offset);
            assert!(err < 1000.0, "offset {} error {}", offset, err);
        }
    }

    #[test]
    fn test_mismatched_phase_smears_chroma() {
        for (enc, dec) in [(0, 1), (0, 2), (1, 3), (3, 0), (2, 1)] {
            let matched = round_trip_error(enc, enc);
            let mismatched = round_trip_error(enc, dec);
            assert!(mismatched > 2000.0, "{} -> {} error {}", enc, dec, mismatched);
            assert!(mismatched > matched * 4.0);
        }
    }

    #[test]
    fn test_from_luma_edges() {
        let phase = ScanlinePhase::new(PhaseShiftMode::Deg180, 0);

        let mut yiq = gradient_row(16);
        chroma_from_luma(&mut yiq, Field::Even, 0, 50, phase);
        assert_eq!(&yiq.i.row(0)[14..], &[0, 0]);
        assert_eq!(&yiq.q.row(0)[14..], &[0, 0]);

        // Zero amplitude decodes to zero chroma instead of dividing by zero
        let mut yiq = gradient_row(16);
        chroma_from_luma(&mut yiq, Field::Even, 0, 0, phase);
        assert!(yiq.i.data().iter().all(|&v| v == 0));

        // Two-pixel rows survive
        let mut tiny = YiqPlanes::new(2, 2);
        chroma_from_luma(&mut tiny, Field::Odd, 2, 50, phase);
        assert_eq!(tiny, YiqPlanes::new(2, 2));
    }

    #[test]
    fn test_other_field_untouched() {
        let mut yiq = YiqPlanes {
            y: Plane::from_vec(8, 2, vec![1000; 16]),
            i: Plane::from_vec(8, 2, vec![200; 16]),
            q: Plane::from_vec(8, 2, vec![-200; 16]),
        };
        let phase = ScanlinePhase::new(PhaseShiftMode::Deg90, 2);
        chroma_into_luma(&mut yiq, Field::Odd, 0, 50, phase);
        chroma_from_luma(&mut yiq, Field::Odd, 0, 50, phase);

        assert_eq!(yiq.y.row(0), &[1000; 8]);
        assert_eq!(yiq.i.row(0), &[200; 8]);
        assert_eq!(yiq.q.row(0), &[-200; 8]);
    }
}
