use crate::coords::{Size2, UvRect};

use super::{Sprite, Texture};

/// Builder for [`SpriteAtlas`]. All measurements are in texture pixels.
#[derive(Debug, Clone)]
pub struct SpriteAtlasBuilder {
    texture: Texture,
    offset: (u32, u32),
    cell_size: Size2,
    cell_padding: u32,
    grid_size: Size2,
}

impl SpriteAtlasBuilder {
    pub fn new(texture: Texture) -> Self {
        Self {
            texture,
            offset: (0, 0),
            cell_size: Size2::new(0, 0),
            cell_padding: 0,
            grid_size: Size2::new(0, 0),
        }
    }

    /// Top-left of the first cell.
    pub fn offset(mut self, x: u32, y: u32) -> Self {
        self.offset = (x, y);
        self
    }

    /// Cell pitch, padding included.
    pub fn cell_size(mut self, width: u32, height: u32) -> Self {
        self.cell_size = Size2::new(width, height);
        self
    }

    /// Pixels trimmed from each side of every cell.
    pub fn cell_padding(mut self, padding: u32) -> Self {
        self.cell_padding = padding;
        self
    }

    pub fn grid_size(mut self, cols: u32, rows: u32) -> Self {
        self.grid_size = Size2::new(cols, rows);
        self
    }

    pub(crate) fn current_grid_size(&self) -> Size2 {
        self.grid_size
    }

    pub fn build(self) -> SpriteAtlas {
        let p2 = self.cell_padding * 2;
        let cell_size = Size2::new(
            self.cell_size.w.saturating_sub(p2),
            self.cell_size.h.saturating_sub(p2),
        );
        let cols = self.grid_size.w;
        let cell_count = self.grid_size.area();

        let srcs = (0..cell_count)
            .map(|i| {
                let col = i as u32 % cols;
                let row = i as u32 / cols;
                let origin = (
                    self.offset.0 + self.cell_size.w * col,
                    self.offset.1 + self.cell_size.h * row,
                );
                Sprite::build_src(self.texture.size, origin, cell_size, self.cell_padding)
            })
            .collect();

        SpriteAtlas {
            texture: self.texture,
            cell_size,
            grid_size: self.grid_size,
            srcs,
        }
    }
}

/// A texture cut into a grid of equally sized cells.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteAtlas {
    texture: Texture,
    cell_size: Size2,
    grid_size: Size2,
    srcs: Vec<UvRect>,
}

impl SpriteAtlas {
    pub fn builder(texture: Texture) -> SpriteAtlasBuilder {
        SpriteAtlasBuilder::new(texture)
    }

    /// UVs of the cell at `index` (row-major), or `None` if out of range.
    pub fn src(&self, index: usize) -> Option<UvRect> {
        self.srcs.get(index).copied()
    }

    pub fn src_cell(&self, col: u32, row: u32) -> Option<UvRect> {
        if col >= self.grid_size.w {
            return None;
        }
        self.src(col as usize + row as usize * self.grid_size.w as usize)
    }

    #[inline]
    pub fn texture(&self) -> Texture {
        self.texture
    }

    /// Drawable cell size, padding excluded.
    #[inline]
    pub fn cell_size(&self) -> Size2 {
        self.cell_size
    }

    /// Columns and rows.
    #[inline]
    pub fn grid_size(&self) -> Size2 {
        self.grid_size
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.srcs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TextureId;

    fn atlas() -> SpriteAtlas {
        let texture = Texture {
            id: TextureId::new(1).unwrap(),
            size: Size2::new(100, 40),
        };
        SpriteAtlas::builder(texture)
            .cell_size(20, 20)
            .cell_padding(2)
            .grid_size(5, 2)
            .build()
    }

    #[test]
    fn padding_shrinks_cells() {
        let a = atlas();
        assert_eq!(a.cell_size(), Size2::new(16, 16));
        assert_eq!(a.cell_count(), 10);
    }

    #[test]
    fn cells_are_row_major() {
        let a = atlas();
        assert_eq!(a.src(0), Some(UvRect::new(0.02, 0.05, 0.18, 0.45)));
        assert_eq!(a.src_cell(1, 1), a.src(6));
        assert_eq!(a.src(6), Some(UvRect::new(0.22, 0.55, 0.38, 0.95)));
    }

    #[test]
    fn out_of_range_is_none() {
        let a = atlas();
        assert_eq!(a.src(10), None);
        assert_eq!(a.src_cell(5, 0), None);
        assert_eq!(a.src_cell(0, 2), None);
    }
}
