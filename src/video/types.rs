use std::path::Path;

use image::{imageops, imageops::FilterType, ImageBuffer, Rgb, RgbImage};

use crate::error::{FrameError, RenderError, Result};

/// Represents a single video frame
///
/// This is a thin wrapper around an 8-bit RGB image buffer (row-major,
/// interleaved). The engine reads and writes it one scanline at a time.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with black
    pub fn new_black(width: u32, height: u32) -> Self {
        let buffer = ImageBuffer::new(width, height);
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_fn(width, height, |_, _| Rgb(color));
        Self { buffer }
    }

    /// Load a frame from a PNG or JPEG file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|_| RenderError::LoadFailed {
            path: path.display().to_string(),
        })?;
        Ok(Self::new(image.to_rgb8()))
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// `(width, height)` of the frame
    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.buffer.get_pixel(x, y).0
    }

    /// Set a pixel at the given coordinates
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        self.buffer.put_pixel(x, y, Rgb(color));
    }

    /// Interleaved RGB bytes of one scanline
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width() as usize * 3;
        let start = y as usize * stride;
        &self.buffer.as_raw()[start..start + stride]
    }

    /// Mutable interleaved RGB bytes of one scanline
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.width() as usize * 3;
        let start = y as usize * stride;
        let raw: &mut [u8] = &mut self.buffer;
        &mut raw[start..start + stride]
    }

    /// Save the frame as a PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.buffer
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|_| RenderError::SaveFailed {
                path: path.display().to_string(),
            })?;
        Ok(())
    }

    /// Resample to the given size with a Lanczos3 filter
    pub fn resized(&self, width: u32, height: u32) -> Frame {
        if self.dimensions() == (width, height) {
            return self.clone();
        }
        Frame::new(imageops::resize(&self.buffer, width, height, FilterType::Lanczos3))
    }

    /// Pad the right edge with black until the width is a multiple of 4.
    ///
    /// The subcarrier stages assume a width divisible by 4.
    pub fn expand_to_4width(&self) -> Frame {
        let width = self.width();
        let padded = (width + 3) / 4 * 4;
        if padded == width {
            return self.clone();
        }

        let mut out = Frame::new_black(padded, self.height());
        imageops::replace(&mut out.buffer, &self.buffer, 0, 0);
        out
    }

    /// Drop right-edge columns until the width is a multiple of 4
    pub fn trim_to_4width(&self) -> Frame {
        let width = self.width();
        let trimmed = width / 4 * 4;
        if trimmed == width {
            return self.clone();
        }
        self.cropped_width(trimmed)
    }

    /// Keep only the leftmost `width` columns
    pub fn cropped_width(&self, width: u32) -> Frame {
        let width = width.min(self.width());
        Frame::new(imageops::crop_imm(&self.buffer, 0, 0, width, self.height()).to_image())
    }

    /// Black out a vertical strip on the right edge.
    ///
    /// `border` of `None` (or zero) uses 1.7% of the frame width.
    pub fn cut_black_line_border(&mut self, border: Option<u32>) {
        let width = self.width();
        let line_width = match border {
            Some(b) if b > 0 => b,
            _ => (width as f64 * 0.017) as u32,
        }
        .min(width);

        if line_width == 0 {
            return;
        }

        for y in 0..self.height() {
            let row = self.row_mut(y);
            let start = (width - line_width) as usize * 3;
            row[start..].fill(0);
        }
    }
}

/// Output size for scaling `(width, height)` to `target_height` rows.
///
/// The width keeps the aspect ratio and is rounded down to an even number.
pub fn resize_to_height(dimensions: (u32, u32), target_height: u32) -> Result<(u32, u32)> {
    let (width, height) = dimensions;
    if height == 0 || target_height == 0 {
        return Err(FrameError::Degenerate { width, height }.into());
    }

    let k = target_height as f64 / height as f64;
    let new_width = (width as f64 * k) as u32 / 2 * 2;
    if new_width == 0 {
        return Err(FrameError::Degenerate {
            width: new_width,
            height: target_height,
        }
        .into());
    }
    Ok((new_width, target_height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VhsError;

    #[test]
    fn test_resize_to_height_keeps_aspect() {
        assert_eq!(resize_to_height((1920, 1080), 480).unwrap(), (852, 480));
        assert_eq!(resize_to_height((640, 480), 480).unwrap(), (640, 480));
    }

    #[test]
    fn test_resize_to_height_zero_height_is_error() {
        let err = resize_to_height((640, 0), 480).unwrap_err();
        assert!(matches!(err, VhsError::Frame(FrameError::Degenerate { .. })));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_expand_and_trim_to_4width() {
        let frame = Frame::new_filled(10, 3, [10, 20, 30]);

        let expanded = frame.expand_to_4width();
        assert_eq!(expanded.dimensions(), (12, 3));
        assert_eq!(expanded.get_pixel(9, 1), [10, 20, 30]);
        assert_eq!(expanded.get_pixel(11, 1), [0, 0, 0]);

        let trimmed = frame.trim_to_4width();
        assert_eq!(trimmed.dimensions(), (8, 3));
    }

    #[test]
    fn test_cut_black_line_border() {
        let mut frame = Frame::new_filled(200, 2, [255, 255, 255]);
        frame.cut_black_line_border(None);

        // 1.7% of 200 is 3 columns
        assert_eq!(frame.get_pixel(196, 0), [255, 255, 255]);
        assert_eq!(frame.get_pixel(197, 0), [0, 0, 0]);
        assert_eq!(frame.get_pixel(199, 1), [0, 0, 0]);

        let mut narrow = Frame::new_filled(8, 2, [255, 255, 255]);
        narrow.cut_black_line_border(None);
        assert_eq!(narrow.get_pixel(7, 0), [255, 255, 255]);
    }

    #[test]
    fn test_row_access() {
        let mut frame = Frame::new_filled(4, 2, [1, 2, 3]);
        frame.row_mut(1)[0] = 9;
        assert_eq!(frame.row(1)[..3], [9, 2, 3]);
        assert_eq!(frame.row(0)[..3], [1, 2, 3]);
    }

    #[test]
    fn test_image_failures_map_to_render_errors() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("not_an_image.png");
        std::fs::write(&bogus, b"plain text").unwrap();

        let err = Frame::open(&bogus).unwrap_err();
        assert!(matches!(err, VhsError::Render(RenderError::LoadFailed { .. })));
        assert!(err.is_recoverable());

        let err = Frame::new_black(2, 2)
            .save_png(dir.path().join("missing").join("out.png"))
            .unwrap_err();
        assert!(matches!(err, VhsError::Render(RenderError::SaveFailed { .. })));
    }
}
