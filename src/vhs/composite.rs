//! Composite channel stages: chroma band limiting, luma preemphasis and
//! color bleed.

use rayon::prelude::*;

use super::filters::{LowpassCascade, LowpassFilter, VHS_RATE};
use super::yiq::{Field, Plane, YiqPlanes};

/// I channel bandwidth and group delay of the composite encoder
const I_CUTOFF_HZ: f64 = 1_300_000.0;
const I_DELAY: usize = 2;
/// Q channel bandwidth and group delay
const Q_CUTOFF_HZ: f64 = 600_000.0;
const Q_DELAY: usize = 4;
/// Single bandwidth of the lighter decoder filter found in TV sets
const LITE_CUTOFF_HZ: f64 = 2_600_000.0;
const LITE_DELAY: usize = 1;

fn lowpass_field(plane: &mut Plane, field: Field, cutoff_hz: f64, delay: usize) {
    let cascade = LowpassCascade::new(cutoff_hz, 0.0);
    plane
        .par_field_rows_mut(field)
        .for_each(|row| cascade.filter_row_delayed(row, delay));
}

/// Band-limit I and Q the way a composite encoder does
pub fn composite_lowpass(yiq: &mut YiqPlanes, field: Field) {
    lowpass_field(&mut yiq.i, field, I_CUTOFF_HZ, I_DELAY);
    lowpass_field(&mut yiq.q, field, Q_CUTOFF_HZ, Q_DELAY);
}

/// Lighter chroma lowpass used on the decode side
pub fn composite_lowpass_lite(yiq: &mut YiqPlanes, field: Field) {
    lowpass_field(&mut yiq.i, field, LITE_CUTOFF_HZ, LITE_DELAY);
    lowpass_field(&mut yiq.q, field, LITE_CUTOFF_HZ, LITE_DELAY);
}

/// Boost luma high frequencies: `Y + highpass(Y) · amount`.
///
/// The highpass is a single pole at `cutoff_hz`, reset to 16 at the start of
/// every row.
pub fn composite_preemphasis(y: &mut Plane, field: Field, amount: f64, cutoff_hz: f64) {
    let pre = LowpassFilter::new(VHS_RATE, cutoff_hz, 16.0);

    y.par_field_rows_mut(field).for_each(|row| {
        let samples: Vec<f64> = row.iter().map(|&v| v as f64).collect();
        let high = pre.highpass_array(&samples);
        for ((dst, &s), h) in row.iter_mut().zip(&samples).zip(high) {
            *dst = (s + h * amount) as i32;
        }
    });
}

/// Shift the chroma of one field right by `horiz` samples and down by
/// `vert` field rows, filling the gap with zeros.
pub fn color_bleed(yiq: &mut YiqPlanes, field: Field, horiz: usize, vert: usize) {
    if horiz == 0 && vert == 0 {
        return;
    }
    for plane in [&mut yiq.i, &mut yiq.q] {
        let width = plane.width();
        let src = plane.extract_field(field);
        let rows = field.rows_in(plane.height());

        let mut shifted = vec![0; src.len()];
        for r in vert..rows {
            let from = &src[(r - vert) * width..(r - vert + 1) * width];
            let to = &mut shifted[r * width..(r + 1) * width];
            if horiz < width {
                to[horiz..].copy_from_slice(&from[..width - horiz]);
            }
        }
        plane.store_field(field, &shifted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(width: usize, height: usize, v: i32) -> YiqPlanes {
        YiqPlanes {
            y: Plane::from_vec(width, height, vec![v; width * height]),
            i: Plane::from_vec(width, height, vec![v; width * height]),
            q: Plane::from_vec(width, height, vec![v; width * height]),
        }
    }

    #[test]
    fn test_composite_lowpass_delays_differ_per_channel() {
        let mut yiq = flat(32, 2, 0);
        yiq.i.row_mut(0)[10] = 10000;
        yiq.q.row_mut(0)[10] = 10000;
        composite_lowpass(&mut yiq, Field::Even);

        // Impulse response starts `delay` samples early
        assert!(yiq.i.row(0)[8] > 0);
        assert_eq!(yiq.i.row(0)[7], 0);
        assert!(yiq.q.row(0)[6] > 0);
        assert_eq!(yiq.q.row(0)[5], 0);
        // Luma and the odd field are untouched
        assert_eq!(yiq.y.row(0)[10], 0);
        assert!(yiq.i.row(1).iter().all(|&v| v == 0));
    }

    #[test]
    fn test_lite_lowpass_is_gentler() {
        let mut full = flat(32, 1, 0);
        full.i.row_mut(0)[10] = 10000;
        let mut lite = full.clone();

        composite_lowpass(&mut full, Field::Even);
        composite_lowpass_lite(&mut lite, Field::Even);

        let peak = |p: &Plane| *p.row(0).iter().max().unwrap();
        assert!(peak(&lite.i) > peak(&full.i));
    }

    #[test]
    fn test_preemphasis_sharpens_edges_only() {
        let mut y = Plane::from_vec(16, 1, [vec![16; 8], vec![5000; 8]].concat());
        composite_preemphasis(&mut y, Field::Even, 4.0, 1_000_000.0);

        let row = y.row(0);
        assert!((row[0] - 16).abs() <= 1);
        assert!(row[8] > 5000);
    }

    #[test]
    fn test_color_bleed_shifts_chroma() {
        let mut yiq = YiqPlanes::new(6, 6);
        for (k, v) in yiq.i.row_mut(0).iter_mut().enumerate() {
            *v = k as i32 + 1;
        }
        color_bleed(&mut yiq, Field::Even, 2, 1);

        assert!(yiq.i.row(0).iter().all(|&v| v == 0));
        assert_eq!(yiq.i.row(2), &[0, 0, 1, 2, 3, 4]);
        assert_eq!(yiq.i.row(1), &[0; 6]);
    }

    #[test]
    fn test_color_bleed_wider_than_frame() {
        let mut yiq = flat(4, 4, 7);
        color_bleed(&mut yiq, Field::Odd, 10, 0);
        assert_eq!(yiq.i.row(1), &[0; 4]);
        assert_eq!(yiq.i.row(0), &[7; 4]);
        assert_eq!(yiq.y.row(1), &[7; 4]);
    }
}
