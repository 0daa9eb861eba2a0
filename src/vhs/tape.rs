//! VHS tape path: speed-dependent band limiting, chroma vertical blend,
//! sharpening, edge wave and head switching.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::filters::{LowpassCascade, LowpassFilter, VHS_RATE};
use super::random::RandomStream;
use super::yiq::{Field, Plane, YiqPlanes};
use crate::error::ConfigError;

/// Tape speed, which sets the recorded luma/chroma bandwidth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TapeSpeed {
    /// Standard play
    #[default]
    Sp,
    /// Long play
    Lp,
    /// Extended play
    Ep,
}

impl TapeSpeed {
    pub const ALL: [TapeSpeed; 3] = [TapeSpeed::Sp, TapeSpeed::Lp, TapeSpeed::Ep];

    pub fn luma_cut(self) -> f64 {
        match self {
            TapeSpeed::Sp => 2_400_000.0,
            TapeSpeed::Lp => 1_900_000.0,
            TapeSpeed::Ep => 1_400_000.0,
        }
    }

    pub fn chroma_cut(self) -> f64 {
        match self {
            TapeSpeed::Sp => 320_000.0,
            TapeSpeed::Lp => 300_000.0,
            TapeSpeed::Ep => 280_000.0,
        }
    }

    /// Chroma group delay in samples
    pub fn chroma_delay(self) -> usize {
        match self {
            TapeSpeed::Sp => 9,
            TapeSpeed::Lp => 12,
            TapeSpeed::Ep => 14,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            TapeSpeed::Sp => "SP",
            TapeSpeed::Lp => "LP",
            TapeSpeed::Ep => "EP",
        }
    }
}

impl fmt::Display for TapeSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for TapeSpeed {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TapeSpeed::ALL
            .into_iter()
            .find(|speed| speed.token().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "_output_vhs_tape_speed".to_string(),
                value: s.to_string(),
            })
    }
}

/// Tape luma bandwidth with the recorder's high-frequency boost.
pub fn luma_lowpass(y: &mut Plane, field: Field, luma_cut: f64) {
    let cascade = LowpassCascade::new(luma_cut, 16.0);
    let pre = LowpassFilter::new(VHS_RATE, luma_cut, 16.0);

    y.par_field_rows_mut(field).for_each(|row| {
        let band = cascade.filter_row(row);
        let boost = pre.highpass_array(&band);
        for ((dst, b), h) in row.iter_mut().zip(&band).zip(boost) {
            *dst = (b + h * 1.6) as i32;
        }
    });
}

/// Tape chroma bandwidth and delay, for both I and Q
pub fn chroma_lowpass(yiq: &mut YiqPlanes, field: Field, chroma_cut: f64, delay: usize) {
    let cascade = LowpassCascade::new(chroma_cut, 0.0);
    for plane in [&mut yiq.i, &mut yiq.q] {
        plane
            .par_field_rows_mut(field)
            .for_each(|row| cascade.filter_row_delayed(row, delay));
    }
}

/// Average each chroma row with the field row above it.
///
/// Starts two rows into the field; the first blended row is averaged
/// against zero, as the recorder's delay line starts empty.
pub fn chroma_vert_blend(yiq: &mut YiqPlanes, field: Field) {
    for plane in [&mut yiq.i, &mut yiq.q] {
        let mut above = vec![0; plane.width()];
        for row in plane.field_rows_mut(field).skip(1) {
            for (v, prev) in row.iter_mut().zip(above.iter_mut()) {
                let old = *v;
                *v = (*prev + old + 1) >> 1;
                *prev = old;
            }
        }
    }
}

/// Unsharp mask against a lowpass at four times the tape luma cutoff:
/// `Y + (Y − lowpass(Y)) · 2 · amount`.
pub fn sharpen(y: &mut Plane, field: Field, luma_cut: f64, amount: f64) {
    let cascade = LowpassCascade::new(luma_cut * 4.0, 0.0);

    y.par_field_rows_mut(field).for_each(|row| {
        let smooth = cascade.filter_row(row);
        for (dst, ts) in row.iter_mut().zip(smooth) {
            let s = *dst as f64;
            *dst = (s + (s - ts) * amount * 2.0) as i32;
        }
    });
}

/// Shift each field row right by a smoothed random amount in `0..amplitude`.
///
/// One offset is drawn per row and applied to Y, I and Q alike.
pub fn edge_wave(
    yiq: &mut YiqPlanes,
    field: Field,
    amplitude: i32,
    luma_cut: f64,
    rng: &mut dyn RandomStream,
) {
    let rows = field.rows_in(yiq.height());
    let rnds = rng.next_int_array(rows, 0, amplitude);
    let shifts: Vec<usize> = LowpassFilter::new(VHS_RATE, luma_cut, 0.0)
        .lowpass_array(&rnds)
        .into_iter()
        .map(|v| v.max(0.0) as usize)
        .collect();

    for plane in [&mut yiq.y, &mut yiq.i, &mut yiq.q] {
        for (row, &shift) in plane.field_rows_mut(field).zip(&shifts) {
            shift_right(row, shift);
        }
    }
}

fn shift_right(row: &mut [i32], shift: usize) {
    if shift == 0 {
        return;
    }
    let width = row.len();
    if shift >= width {
        row.fill(0);
        return;
    }
    row.copy_within(..width - shift, shift);
    row[..shift].fill(0);
}

/// Where the head switch happens, as fractions of a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadSwitch {
    /// Vertical position of the switch, including any accumulated drift
    pub point: f64,
    /// Horizontal position of the switch
    pub phase: f64,
    /// Random jitter added to both positions
    pub phase_noise: f64,
    /// 262.5-line timing when set, 312.5-line otherwise
    pub ntsc: bool,
}

/// Displace luma near the bottom of the field to imitate the head switch.
///
/// Positions are measured on a virtual scanline 10% wider than the frame,
/// so part of each line falls into blanking. The row at the switch point
/// keeps its samples; the next row is displaced by the full horizontal
/// offset and every following row by 7/8 of the previous one. Only luma
/// rows of `field` are touched.
pub fn head_switching(y: &mut Plane, field: Field, hs: &HeadSwitch, rng: &mut dyn RandomStream) {
    let width = y.width() as i64;
    let height = y.height() as i64;
    if width == 0 {
        return;
    }
    let twidth = width + width / 10;

    let noise = if hs.phase_noise != 0.0 {
        let x = rng.next_int(1, 2_000_000_001) as f64;
        (x / 1_000_000_000.0 - 1.0) * hs.phase_noise
    } else {
        0.0
    };

    let (lines, blanking) = if hs.ntsc { (262.5, 44) } else { (312.5, 48) };
    let t = twidth as f64 * lines;

    let p = ((hs.point + noise).rem_euclid(1.0) * t) as i64;
    let mut row = (p / twidth) * 2 + field.index() as i64 - blanking;

    let p = ((hs.phase + noise).rem_euclid(1.0) * t) as i64;
    let x = p % twidth;
    let mut tx = x;
    let initial_shift = if x >= twidth / 2 { x - twidth } else { x };

    let mut shift = 0i64;
    let mut first = true;
    let mut padded = vec![0; twidth as usize];

    while row < height {
        if row >= 0 && shift != 0 {
            let line = y.row_mut(row as usize);
            padded[..line.len()].copy_from_slice(line);
            padded[line.len()..].fill(0);

            let mut x2 = (tx + twidth + shift).rem_euclid(twidth) as usize;
            for dst in line.iter_mut().skip(tx as usize) {
                *dst = padded[x2];
                x2 = (x2 + 1) % twidth as usize;
            }
        }

        shift = if first {
            initial_shift
        } else {
            (shift as f64 * 7.0 / 8.0) as i64
        };
        first = false;
        tx = 0;
        row += 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vhs::random::XorWowRandom;

    fn default_switch() -> HeadSwitch {
        HeadSwitch {
            point: 1.0 - (4.5 + 0.01) / 262.5,
            phase: (1.0 - 0.01) / 262.5,
            phase_noise: 0.0,
            ntsc: true,
        }
    }

    #[test]
    fn test_tape_speed_tokens() {
        assert_eq!("lp".parse::<TapeSpeed>().unwrap(), TapeSpeed::Lp);
        assert_eq!(TapeSpeed::Ep.to_string(), "EP");
        assert!("VP".parse::<TapeSpeed>().is_err());
        assert_eq!(TapeSpeed::Sp.chroma_delay(), 9);
        assert_eq!(serde_json::to_string(&TapeSpeed::Lp).unwrap(), "\"LP\"");
    }

    #[test]
    fn test_head_switching_displaces_switch_row() {
        let mut y = Plane::new(64, 480);
        for r in 0..480 {
            for (x, v) in y.row_mut(r).iter_mut().enumerate() {
                *v = x as i32 * 100 + 1;
            }
        }
        let before = y.clone();
        let mut rng = XorWowRandom::default();
        head_switching(&mut y, Field::Even, &default_switch(), &mut rng);

        // Switch lands on row 470; row 472 moves one sample right, then the
        // 7/8 decay truncates the offset to zero.
        let shifted = y.row(472);
        assert_eq!(shifted[0], 0);
        assert_eq!(&shifted[1..], &before.row(472)[..63]);
        for r in (0..480).filter(|&r| r != 472) {
            assert_eq!(y.row(r), before.row(r), "row {}", r);
        }
        assert_eq!(rng, XorWowRandom::default());
    }

    #[test]
    fn test_head_switching_phase_noise_uses_stream() {
        let mut y = Plane::new(64, 480);
        let hs = HeadSwitch {
            phase_noise: 1.0 / 500.0 / 262.5,
            ..default_switch()
        };
        let mut rng = XorWowRandom::default();
        head_switching(&mut y, Field::Odd, &hs, &mut rng);
        assert_ne!(rng, XorWowRandom::default());
    }

    #[test]
    fn test_edge_wave_shifts_all_planes_together() {
        let mut yiq = YiqPlanes::new(16, 64);
        for plane in [&mut yiq.y, &mut yiq.i, &mut yiq.q] {
            for r in 0..64 {
                plane.row_mut(r).fill(500);
            }
        }
        let mut rng = XorWowRandom::default();
        edge_wave(&mut yiq, Field::Even, 8, TapeSpeed::Sp.luma_cut(), &mut rng);

        for r in (0..64).step_by(2) {
            let lead = yiq.y.row(r).iter().take_while(|&&v| v == 0).count();
            assert_eq!(yiq.i.row(r).iter().take_while(|&&v| v == 0).count(), lead);
            assert_eq!(yiq.q.row(r).iter().take_while(|&&v| v == 0).count(), lead);
            assert!(lead < 8);
        }
        assert!(yiq.y.row(1).iter().all(|&v| v == 500));
    }

    #[test]
    fn test_vert_blend_averages_with_row_above() {
        let mut yiq = YiqPlanes::new(2, 8);
        for (r, v) in [(0, 100), (2, 200), (4, 300), (6, 400)] {
            yiq.i.row_mut(r).fill(v);
        }
        chroma_vert_blend(&mut yiq, Field::Even);

        assert_eq!(yiq.i.row(0), &[100, 100]);
        assert_eq!(yiq.i.row(2), &[100, 100]);
        assert_eq!(yiq.i.row(4), &[250, 250]);
        assert_eq!(yiq.i.row(6), &[350, 350]);
    }

    #[test]
    fn test_sharpen_overshoots_edges() {
        let mut y = Plane::from_vec(16, 1, [vec![0; 8], vec![10000; 8]].concat());
        sharpen(&mut y, Field::Even, TapeSpeed::Sp.luma_cut(), 1.5);
        assert!(y.row(0)[8] > 10000);
        assert_eq!(y.row(0)[0], 0);
    }

    #[test]
    fn test_tape_lowpass_softens_luma_edge() {
        let mut y = Plane::from_vec(32, 1, [vec![16; 16], vec![30000; 16]].concat());
        luma_lowpass(&mut y, Field::Even, TapeSpeed::Ep.luma_cut());
        assert!(y.row(0)[16] < 30000);
        assert!((y.row(0)[4] - 16).abs() <= 1);
    }
}
