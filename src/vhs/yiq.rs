//! Interleaved RGB ↔ planar fixed-point YIQ conversion.
//!
//! Samples are stored as `i32` scaled by 256 so the filter stages can work
//! in integer units the way a digital video chain would.

use rayon::prelude::*;

use crate::error::{FrameError, Result};
use crate::video::Frame;

/// One parity of scanlines in an interlaced frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Rows 0, 2, 4, ...
    Even,
    /// Rows 1, 3, 5, ...
    Odd,
}

impl Field {
    /// First row index belonging to this field
    pub fn index(self) -> usize {
        match self {
            Field::Even => 0,
            Field::Odd => 1,
        }
    }

    pub fn from_index(index: usize) -> Self {
        if index & 1 == 0 {
            Field::Even
        } else {
            Field::Odd
        }
    }

    /// Does absolute row `y` belong to this field
    pub fn contains(self, y: usize) -> bool {
        y & 1 == self.index()
    }

    /// Number of rows of this field in a frame of `height` rows
    pub fn rows_in(self, height: usize) -> usize {
        (height + 1 - self.index()) / 2
    }
}

/// A single plane of fixed-point samples, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    width: usize,
    height: usize,
    data: Vec<i32>,
}

impl Plane {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn from_vec(width: usize, height: usize, data: Vec<i32>) -> Self {
        assert_eq!(data.len(), width * height, "plane data does not match its shape");
        Self { width, height, data }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[i32] {
        &self.data
    }

    pub fn row(&self, y: usize) -> &[i32] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [i32] {
        &mut self.data[y * self.width..(y + 1) * self.width]
    }

    /// Iterate the rows of one field, in order
    pub fn field_rows(&self, field: Field) -> impl Iterator<Item = &[i32]> {
        self.data
            .chunks_exact(self.width.max(1))
            .skip(field.index())
            .step_by(2)
    }

    /// Iterate the rows of one field mutably, in order
    pub fn field_rows_mut(&mut self, field: Field) -> impl Iterator<Item = &mut [i32]> {
        self.data
            .chunks_exact_mut(self.width.max(1))
            .skip(field.index())
            .step_by(2)
    }

    /// Parallel variant of [`field_rows_mut`](Self::field_rows_mut) for
    /// stages whose rows are independent
    pub fn par_field_rows_mut(&mut self, field: Field) -> impl ParallelIterator<Item = &mut [i32]> {
        self.data
            .par_chunks_exact_mut(self.width.max(1))
            .enumerate()
            .filter(move |(y, _)| field.contains(*y))
            .map(|(_, row)| row)
    }

    /// Copy the rows of one field into a dense `(rows, width)` matrix
    pub fn extract_field(&self, field: Field) -> Vec<i32> {
        self.field_rows(field).flatten().copied().collect()
    }

    /// Write a dense field matrix back into the rows of `field`
    pub fn store_field(&mut self, field: Field, values: &[i32]) {
        let width = self.width;
        for (row, src) in self.field_rows_mut(field).zip(values.chunks_exact(width.max(1))) {
            row.copy_from_slice(src);
        }
    }
}

/// Planar Y, I, Q buffer decoded from one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YiqPlanes {
    pub y: Plane,
    pub i: Plane,
    pub q: Plane,
}

impl YiqPlanes {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            y: Plane::new(width, height),
            i: Plane::new(width, height),
            q: Plane::new(width, height),
        }
    }

    pub fn width(&self) -> usize {
        self.y.width()
    }

    pub fn height(&self) -> usize {
        self.y.height()
    }

    /// Mutable access to the two chroma planes at once
    pub fn chroma_mut(&mut self) -> (&mut Plane, &mut Plane) {
        (&mut self.i, &mut self.q)
    }
}

/// Convert an RGB frame (both fields) to planar YIQ.
pub fn decode(frame: &Frame) -> YiqPlanes {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let mut yiq = YiqPlanes::new(width, height);

    for y in 0..height {
        let src = frame.row(y as u32);
        let YiqPlanes { y: yp, i: ip, q: qp } = &mut yiq;
        let rows = yp.row_mut(y).iter_mut().zip(ip.row_mut(y)).zip(qp.row_mut(y));

        for (((ys, is), qs), px) in rows.zip(src.chunks_exact(3)) {
            (*ys, *is, *qs) = rgb_to_yiq(px[0], px[1], px[2]);
        }
    }

    yiq
}

/// Convert the rows of `field` back to RGB, writing them into `dst`.
///
/// Rows of the other field are left untouched so two passes can compose an
/// interlaced frame.
pub fn encode_into(yiq: &YiqPlanes, dst: &mut Frame, field: Field) -> Result<()> {
    let (dw, dh) = dst.dimensions();
    if dw as usize != yiq.width() || dh as usize != yiq.height() {
        return Err(FrameError::ShapeMismatch {
            dst_width: dw,
            dst_height: dh,
            src_width: yiq.width() as u32,
            src_height: yiq.height() as u32,
        }
        .into());
    }

    write_field(yiq, dst, field);
    Ok(())
}

/// Convert the rows of `field` into a fresh black frame.
pub fn encode(yiq: &YiqPlanes, field: Field) -> Frame {
    let mut dst = Frame::new_black(yiq.width() as u32, yiq.height() as u32);
    write_field(yiq, &mut dst, field);
    dst
}

/// `dst` must have the same shape as `yiq`
fn write_field(yiq: &YiqPlanes, dst: &mut Frame, field: Field) {
    for y in (field.index()..yiq.height()).step_by(2) {
        let (ys, is, qs) = (yiq.y.row(y), yiq.i.row(y), yiq.q.row(y));
        let out = dst.row_mut(y as u32);

        for (x, px) in out.chunks_exact_mut(3).enumerate() {
            let [r, g, b] = yiq_to_rgb(ys[x], is[x], qs[x]);
            px[0] = r;
            px[1] = g;
            px[2] = b;
        }
    }
}

#[inline]
fn rgb_to_yiq(r: u8, g: u8, b: u8) -> (i32, i32, i32) {
    let (r, g, b) = (r as f64, g as f64, b as f64);
    let dy = 0.30 * r + 0.59 * g + 0.11 * b;

    let y = (dy * 256.0) as i32;
    let i = (256.0 * (-0.27 * (b - dy) + 0.74 * (r - dy))) as i32;
    let q = (256.0 * (0.41 * (b - dy) + 0.48 * (r - dy))) as i32;
    (y, i, q)
}

#[inline]
fn yiq_to_rgb(y: i32, i: i32, q: i32) -> [u8; 3] {
    let (y, i, q) = (y as f64, i as f64, q as f64);

    let r = ((1.000 * y + 0.956 * i + 0.621 * q) / 256.0) as i32;
    let g = ((1.000 * y - 0.272 * i - 0.647 * q) / 256.0) as i32;
    let b = ((1.000 * y - 1.106 * i + 1.703 * q) / 256.0) as i32;

    [
        r.clamp(0, 255) as u8,
        g.clamp(0, 255) as u8,
        b.clamp(0, 255) as u8,
    ]
}
