use std::fmt;

use crate::coords::{ColorRgba, Size2};

#[derive(Debug, Clone, PartialEq)]
pub struct ImageError(pub String);

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "image error: {}", self.0)
    }
}

impl std::error::Error for ImageError {}

/// Tightly packed RGBA8 pixels, row-major, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRgba {
    size: Size2,
    pixels: Vec<u8>,
}

impl ImageRgba {
    pub fn from_rgba(size: Size2, pixels: Vec<u8>) -> Result<Self, ImageError> {
        if size.is_empty() {
            return Err(ImageError(format!("empty size {}x{}", size.w, size.h)));
        }
        if pixels.len() != size.area() * 4 {
            return Err(ImageError(format!(
                "expected {} bytes for {}x{}, got {}",
                size.area() * 4,
                size.w,
                size.h,
                pixels.len()
            )));
        }
        Ok(Self { size, pixels })
    }

    /// Decodes PNG, JPEG or BMP bytes.
    pub fn from_encoded(bytes: &[u8]) -> Result<Self, ImageError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| ImageError(e.to_string()))?
            .to_rgba8();
        let size = Size2::new(img.width(), img.height());
        Self::from_rgba(size, img.into_raw())
    }

    pub fn solid(size: Size2, color: ColorRgba) -> Self {
        let px = to_rgba8(color);
        Self {
            size,
            pixels: px.repeat(size.area()),
        }
    }

    /// Alternating `cell`-pixel squares, `a` in the top-left.
    pub fn checkerboard(size: Size2, cell: u32, a: ColorRgba, b: ColorRgba) -> Self {
        let cell = cell.max(1);
        let (a, b) = (to_rgba8(a), to_rgba8(b));
        let mut pixels = Vec::with_capacity(size.area() * 4);
        for y in 0..size.h {
            for x in 0..size.w {
                let even = ((x / cell) + (y / cell)) % 2 == 0;
                pixels.extend_from_slice(if even { &a } else { &b });
            }
        }
        Self { size, pixels }
    }

    #[inline]
    pub fn size(&self) -> Size2 {
        self.size
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}

fn to_rgba8(c: ColorRgba) -> [u8; 4] {
    c.to_array().map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
}
