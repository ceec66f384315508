use std::fmt;

use crate::backend::GfxBackend;
use crate::coords::{ColorRgba, Size2};

use super::{FontAtlas, ImageRgba, Texture};

/// Error returned by [`bake_font_atlas`].
#[derive(Debug, Clone)]
pub struct FontBakeError(pub String);

impl fmt::Display for FontBakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font bake error: {}", self.0)
    }
}

impl std::error::Error for FontBakeError {}

/// Rasterizes `lines` of a TrueType/OpenType font into a monospace grid
/// texture and returns the matching [`FontAtlas`].
///
/// Every cell is as wide as the widest advance and as tall as the font's
/// line height at `px`. Glyphs are white; coverage goes to alpha.
pub fn bake_font_atlas<B: GfxBackend + ?Sized>(
    font_bytes: &[u8],
    px: f32,
    lines: &[&str],
    backend: &mut B,
) -> Result<FontAtlas, FontBakeError> {
    if lines.iter().all(|l| l.is_empty()) {
        return Err(FontBakeError("no characters to bake".into()));
    }
    if !(px.is_finite() && px > 0.0) {
        return Err(FontBakeError(format!("invalid pixel size {px}")));
    }

    let font = fontdue::Font::from_bytes(font_bytes, fontdue::FontSettings::default())
        .map_err(|e| FontBakeError(e.to_string()))?;

    let (ascent, line_height) = match font.horizontal_line_metrics(px) {
        Some(m) => (m.ascent, m.ascent - m.descent),
        None => (px, px),
    };

    let glyphs: Vec<Vec<(fontdue::Metrics, Vec<u8>)>> = lines
        .iter()
        .map(|line| line.chars().map(|c| font.rasterize(c, px)).collect())
        .collect();

    let cell_w = glyphs
        .iter()
        .flatten()
        .map(|(m, _)| m.advance_width.max(m.width as f32))
        .fold(1.0f32, f32::max)
        .ceil() as u32;
    let cell_h = line_height.ceil().max(1.0) as u32;
    let cols = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u32;
    let rows = lines.len() as u32;

    let size = Size2::new(cols * cell_w, rows * cell_h);
    let mut image = ImageRgba::solid(size, ColorRgba::new(1.0, 1.0, 1.0, 0.0));
    let stride = size.w as usize * 4;

    for (row, line) in glyphs.iter().enumerate() {
        for (col, (metrics, coverage)) in line.iter().enumerate() {
            let cell_x = col as i32 * cell_w as i32;
            let cell_y = row as i32 * cell_h as i32;
            let left = cell_x + metrics.xmin.max(0);
            let top = cell_y + (ascent.round() as i32 - metrics.height as i32 - metrics.ymin).max(0);

            for gy in 0..metrics.height {
                let y = top + gy as i32;
                if y >= cell_y + cell_h as i32 {
                    break;
                }
                for gx in 0..metrics.width {
                    let x = left + gx as i32;
                    if x >= cell_x + cell_w as i32 {
                        break;
                    }
                    let alpha = coverage[gy * metrics.width + gx];
                    image.pixels_mut()[y as usize * stride + x as usize * 4 + 3] = alpha;
                }
            }
        }
    }

    let texture = Texture::upload(backend, &image).map_err(|e| FontBakeError(e.to_string()))?;
    log::debug!(
        "baked font atlas: {cols}x{rows} cells of {cell_w}x{cell_h} at {px}px"
    );

    Ok(FontAtlas::builder(texture)
        .cell_size(cell_w, cell_h)
        .index_to_rune_lines(lines)
        .default_rune('?')
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;

    #[test]
    fn rejects_invalid_font_bytes() {
        let mut backend = RecordingBackend::full();
        let err = bake_font_atlas(b"definitely not a font", 16.0, &["ab"], &mut backend);
        assert!(err.is_err());
        assert_eq!(backend.live_textures(), 0);
    }

    #[test]
    fn rejects_empty_charset() {
        let mut backend = RecordingBackend::full();
        assert!(bake_font_atlas(&[], 16.0, &[""], &mut backend).is_err());
    }
}
