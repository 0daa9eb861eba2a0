//! Separable Lanczos resampling used for chroma subsampling.

use std::f32::consts::PI;

use rayon::prelude::*;

use super::yiq::{Field, Plane};

/// Lanczos window radius; eight taps per output sample
const LANCZOS_A: isize = 4;

#[inline]
fn lanczos_weight(x: f32) -> f32 {
    let ax = x.abs();
    if ax < 1e-8 {
        1.0
    } else if ax < LANCZOS_A as f32 {
        let pi_x = PI * ax;
        let pi_x_a = pi_x / LANCZOS_A as f32;
        (pi_x.sin() / pi_x) * (pi_x_a.sin() / pi_x_a)
    } else {
        0.0
    }
}

/// Source taps and normalised weights for each output index along one axis.
///
/// Sample centres follow the half-pixel convention; taps past either edge
/// repeat the border sample.
fn axis_taps(src_len: usize, dst_len: usize) -> Vec<[(usize, f32); 8]> {
    let scale = src_len as f32 / dst_len as f32;
    let last = src_len as isize - 1;

    (0..dst_len)
        .map(|d| {
            let center = (d as f32 + 0.5) * scale - 0.5;
            let base = center.floor() as isize;
            let frac = center - base as f32;

            let mut taps = [(0usize, 0.0f32); 8];
            let mut total = 0.0;
            for (k, tap) in taps.iter_mut().enumerate() {
                let offset = k as isize - (LANCZOS_A - 1);
                let w = lanczos_weight(offset as f32 - frac);
                *tap = ((base + offset).clamp(0, last) as usize, w);
                total += w;
            }
            if total != 0.0 {
                for tap in taps.iter_mut() {
                    tap.1 /= total;
                }
            }
            taps
        })
        .collect()
}

/// Resize a row-major `width × height` matrix with an 8-tap Lanczos kernel.
///
/// Empty source or destination shapes give an empty result.
pub fn resize_lanczos4(
    src: &[f32],
    width: usize,
    height: usize,
    dst_width: usize,
    dst_height: usize,
) -> Vec<f32> {
    if width == 0 || height == 0 || dst_width == 0 || dst_height == 0 {
        return Vec::new();
    }

    // Horizontal pass
    let htaps = axis_taps(width, dst_width);
    let mut temp = vec![0.0f32; dst_width * height];
    temp.par_chunks_mut(dst_width)
        .zip(src.par_chunks(width))
        .for_each(|(out, row)| {
            for (o, taps) in out.iter_mut().zip(&htaps) {
                *o = taps.iter().map(|&(sx, w)| row[sx] * w).sum();
            }
        });

    // Vertical pass
    let vtaps = axis_taps(height, dst_height);
    let mut dst = vec![0.0f32; dst_width * dst_height];
    dst.par_chunks_mut(dst_width)
        .zip(vtaps.par_iter())
        .for_each(|(out, taps)| {
            for (x, o) in out.iter_mut().enumerate() {
                *o = taps.iter().map(|&(sy, w)| temp[sy * dst_width + x] * w).sum();
            }
        });

    dst
}

/// Halve then restore the resolution of one field of a chroma plane.
///
/// Emulates the reduced chroma bandwidth of 4:2:0 style storage. Halved
/// dimensions never drop below one sample.
pub fn blur_chroma(plane: &mut Plane, field: Field) {
    let rows = field.rows_in(plane.height());
    let cols = plane.width();
    if rows == 0 || cols == 0 {
        return;
    }

    let values: Vec<f32> = plane.extract_field(field).iter().map(|&v| v as f32).collect();
    let (half_cols, half_rows) = ((cols / 2).max(1), (rows / 2).max(1));

    let down = resize_lanczos4(&values, cols, rows, half_cols, half_rows);
    let up = resize_lanczos4(&down, half_cols, half_rows, cols, rows);

    let blurred: Vec<i32> = up.into_iter().map(|v| v as i32).collect();
    plane.store_field(field, &blurred);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_are_normalised() {
        for taps in axis_taps(10, 23).iter().chain(axis_taps(64, 32).iter()) {
            let total: f32 = taps.iter().map(|t| t.1).sum();
            assert!((total - 1.0).abs() < 1e-5);
            assert!(taps.iter().all(|t| t.0 < 64));
        }
    }

    #[test]
    fn test_identity_size_is_lossless() {
        let src: Vec<f32> = (0..48).map(|v| (v * 7 % 13) as f32).collect();
        let out = resize_lanczos4(&src, 8, 6, 8, 6);
        for (a, b) in out.iter().zip(&src) {
            assert!((a - b).abs() < 1e-4);
        }
    }

    #[test]
    fn test_blur_keeps_flat_chroma() {
        let mut plane = Plane::from_vec(16, 8, vec![-4000; 128]);
        blur_chroma(&mut plane, Field::Even);
        assert!(plane.data().iter().all(|&v| (v + 4000).abs() <= 1));
    }

    #[test]
    fn test_blur_spreads_a_spike() {
        let mut plane = Plane::new(32, 8);
        for row in plane.field_rows_mut(Field::Odd) {
            row[16] = 10000;
        }
        blur_chroma(&mut plane, Field::Odd);

        let row = plane.row(1);
        assert!(row[16] < 10000);
        assert!(row[15] > 0 || row[17] > 0);
        // Even field untouched
        assert!(plane.row(0).iter().all(|&v| v == 0));
    }

    #[test]
    fn test_blur_tiny_plane() {
        let mut plane = Plane::from_vec(2, 2, vec![100, 200, 300, 400]);
        blur_chroma(&mut plane, Field::Even);
        assert_eq!(plane.row(1), &[300, 400]);
        assert_eq!(resize_lanczos4(&[1.0], 1, 1, 0, 1), Vec::<f32>::new());
    }
}
