//! Captured pixel data.

use autosquelch_common::error::{AutosquelchError, AutosquelchResult};
use serde::{Deserialize, Serialize};

/// Byte layout of one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelLayout {
    /// Blue, green, red. GDI 24bpp bitmaps.
    Bgr24,
    /// Blue, green, red, alpha. GDI 32bpp bitmaps.
    Bgra32,
    Rgb24,
    Rgba32,
}

impl PixelLayout {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelLayout::Bgr24 | PixelLayout::Rgb24 => 3,
            PixelLayout::Bgra32 | PixelLayout::Rgba32 => 4,
        }
    }

    pub fn has_alpha(&self) -> bool {
        self.bytes_per_pixel() == 4
    }

    /// Split one pixel's bytes into `(r, g, b)`, ignoring alpha.
    pub fn rgb(&self, pixel: &[u8]) -> (u8, u8, u8) {
        match self {
            PixelLayout::Bgr24 | PixelLayout::Bgra32 => (pixel[2], pixel[1], pixel[0]),
            PixelLayout::Rgb24 | PixelLayout::Rgba32 => (pixel[0], pixel[1], pixel[2]),
        }
    }
}

/// An owned, row-strided pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    stride: usize,
    layout: PixelLayout,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw bytes. Every row must fit within `data`, and `stride` must
    /// hold at least one row of pixels.
    pub fn new(
        width: u32,
        height: u32,
        stride: usize,
        layout: PixelLayout,
        data: Vec<u8>,
    ) -> AutosquelchResult<Self> {
        let row_bytes = width as usize * layout.bytes_per_pixel();
        if stride < row_bytes {
            return Err(AutosquelchError::invalid_buffer(format!(
                "stride {stride} is shorter than a {width}px row ({row_bytes} bytes)"
            )));
        }

        let required = if height == 0 {
            0
        } else {
            stride * (height as usize - 1) + row_bytes
        };
        if data.len() < required {
            return Err(AutosquelchError::invalid_buffer(format!(
                "{} bytes cannot hold {width}x{height} at stride {stride} ({required} needed)",
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            stride,
            layout,
            data,
        })
    }

    /// Tightly packed buffer (stride equals row length).
    pub fn packed(
        width: u32,
        height: u32,
        layout: PixelLayout,
        data: Vec<u8>,
    ) -> AutosquelchResult<Self> {
        let stride = width as usize * layout.bytes_per_pixel();
        Self::new(width, height, stride, layout, data)
    }

    /// Buffer with every pixel set to the same bytes.
    pub fn filled(width: u32, height: u32, layout: PixelLayout, pixel: &[u8]) -> Self {
        let bpp = layout.bytes_per_pixel();
        let mut data = Vec::with_capacity(width as usize * height as usize * bpp);
        for _ in 0..(width as usize * height as usize) {
            data.extend((0..bpp).map(|i| pixel.get(i).copied().unwrap_or(0)));
        }
        Self {
            width,
            height,
            stride: width as usize * bpp,
            layout,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.layout.bytes_per_pixel()
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The pixel bytes of row `y`, without stride padding.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.stride;
        let len = self.width as usize * self.bytes_per_pixel();
        self.data.get(start..start + len)
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.height).filter_map(move |y| self.row(y))
    }

    /// `(r, g, b)` at `(x, y)`.
    pub fn rgb_at(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        if x >= self.width {
            return None;
        }
        let bpp = self.bytes_per_pixel();
        let start = x as usize * bpp;
        let pixel = self.row(y)?.get(start..start + bpp)?;
        Some(self.layout.rgb(pixel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_stride() {
        let err = PixelBuffer::new(4, 1, 8, PixelLayout::Rgb24, vec![0; 12]).unwrap_err();
        assert!(matches!(err, AutosquelchError::InvalidBuffer { .. }));
    }

    #[test]
    fn rejects_truncated_data() {
        assert!(PixelBuffer::new(2, 2, 8, PixelLayout::Bgra32, vec![0; 15]).is_err());
        // The final row needs no trailing padding.
        assert!(PixelBuffer::new(2, 2, 12, PixelLayout::Bgra32, vec![0; 20]).is_ok());
    }

    #[test]
    fn reads_native_channel_order() {
        let bgr = PixelBuffer::packed(1, 1, PixelLayout::Bgr24, vec![10, 20, 30]).unwrap();
        assert_eq!(bgr.rgb_at(0, 0), Some((30, 20, 10)));

        let rgba = PixelBuffer::packed(1, 1, PixelLayout::Rgba32, vec![10, 20, 30, 0]).unwrap();
        assert_eq!(rgba.rgb_at(0, 0), Some((10, 20, 30)));
    }

    #[test]
    fn stride_padding_is_skipped() {
        // Two 1px rows, each padded to 4 bytes.
        let data = vec![1, 2, 3, 99, 4, 5, 6];
        let buffer = PixelBuffer::new(1, 2, 4, PixelLayout::Rgb24, data).unwrap();
        assert_eq!(buffer.row(0), Some(&[1u8, 2, 3][..]));
        assert_eq!(buffer.rgb_at(0, 1), Some((4, 5, 6)));
        assert_eq!(buffer.rows().count(), 2);
    }

    #[test]
    fn out_of_bounds_access_is_none() {
        let buffer = PixelBuffer::filled(2, 2, PixelLayout::Rgb24, &[255, 255, 255]);
        assert_eq!(buffer.rgb_at(2, 0), None);
        assert_eq!(buffer.rgb_at(0, 2), None);
        assert_eq!(buffer.row(5), None);
    }

    #[test]
    fn filled_repeats_pixel() {
        let buffer = PixelBuffer::filled(3, 2, PixelLayout::Bgra32, &[1, 2, 3, 4]);
        assert_eq!(buffer.as_bytes().len(), 24);
        assert_eq!(buffer.pixel_count(), 6);
        assert_eq!(buffer.rgb_at(2, 1), Some((3, 2, 1)));
    }
}
