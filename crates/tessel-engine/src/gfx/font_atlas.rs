use std::collections::HashMap;

use crate::coords::{Size2, UvRect};

use super::{SpriteAtlas, SpriteAtlasBuilder, Texture};

/// Glyph drawn for characters missing from the atlas.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
enum Fallback {
    #[default]
    First,
    Index(usize),
    Cell(u32, u32),
    Rune(char),
}

/// Builder for [`FontAtlas`].
#[derive(Debug, Clone)]
pub struct FontAtlasBuilder {
    atlas: SpriteAtlasBuilder,
    spacing: Size2,
    fallback: Fallback,
    rune_to_index: HashMap<char, usize>,
}

impl FontAtlasBuilder {
    pub fn new(texture: Texture) -> Self {
        Self {
            atlas: SpriteAtlasBuilder::new(texture),
            spacing: Size2::new(0, 0),
            fallback: Fallback::First,
            rune_to_index: HashMap::new(),
        }
    }

    pub fn offset(mut self, x: u32, y: u32) -> Self {
        self.atlas = self.atlas.offset(x, y);
        self
    }

    pub fn cell_size(mut self, width: u32, height: u32) -> Self {
        self.atlas = self.atlas.cell_size(width, height);
        self
    }

    pub fn cell_padding(mut self, padding: u32) -> Self {
        self.atlas = self.atlas.cell_padding(padding);
        self
    }

    pub fn grid_size(mut self, cols: u32, rows: u32) -> Self {
        self.atlas = self.atlas.grid_size(cols, rows);
        self
    }

    /// Gap between runes and between lines, in pixels.
    pub fn spacing(mut self, rune: u32, line: u32) -> Self {
        self.spacing = Size2::new(rune, line);
        self
    }

    pub fn default_index(mut self, index: usize) -> Self {
        self.fallback = Fallback::Index(index);
        self
    }

    pub fn default_cell(mut self, col: u32, row: u32) -> Self {
        self.fallback = Fallback::Cell(col, row);
        self
    }

    pub fn default_rune(mut self, rune: char) -> Self {
        self.fallback = Fallback::Rune(rune);
        self
    }

    /// Maps each char of `runes` to consecutive cell indices from 0.
    pub fn index_to_rune(mut self, runes: &str) -> Self {
        for (index, rune) in runes.chars().enumerate() {
            self.rune_to_index.insert(rune, index);
        }
        self
    }

    /// Like [`index_to_rune`](Self::index_to_rune) over consecutive lines.
    ///
    /// Unset grid dimensions are filled from the longest line and the line count.
    pub fn index_to_rune_lines(mut self, lines: &[&str]) -> Self {
        let mut index = 0;
        let mut cols = 0;

        for line in lines {
            let mut len = 0;
            for rune in line.chars() {
                self.rune_to_index.insert(rune, index);
                index += 1;
                len += 1;
            }
            cols = cols.max(len);
        }

        let grid = self.atlas.current_grid_size();
        let cols = if grid.w > 0 { grid.w } else { cols };
        let rows = if grid.h > 0 { grid.h } else { lines.len() as u32 };
        self.atlas = self.atlas.grid_size(cols, rows);
        self
    }

    pub fn build(self) -> FontAtlas {
        let atlas = self.atlas.build();
        let default_index = match self.fallback {
            Fallback::First => 0,
            Fallback::Index(i) => i,
            Fallback::Cell(col, row) => col as usize + row as usize * atlas.grid_size().w as usize,
            Fallback::Rune(r) => self.rune_to_index.get(&r).copied().unwrap_or(0),
        };
        let default_index = default_index.min(self.rune_to_index.len().saturating_sub(1));

        FontAtlas {
            atlas,
            spacing: self.spacing,
            rune_to_index: self.rune_to_index,
            default_index,
        }
    }
}

/// A monospace bitmap font: a sprite atlas plus a char to cell mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct FontAtlas {
    atlas: SpriteAtlas,
    spacing: Size2,
    rune_to_index: HashMap<char, usize>,
    default_index: usize,
}

impl FontAtlas {
    pub fn builder(texture: Texture) -> FontAtlasBuilder {
        FontAtlasBuilder::new(texture)
    }

    /// Cell index of `rune`, or the default glyph's.
    pub fn rune_index(&self, rune: char) -> usize {
        self.rune_to_index.get(&rune).copied().unwrap_or(self.default_index)
    }

    pub fn rune_src(&self, rune: char) -> Option<UvRect> {
        self.atlas.src(self.rune_index(rune))
    }

    #[inline]
    pub fn default_index(&self) -> usize {
        self.default_index
    }

    #[inline]
    pub fn spacing(&self) -> Size2 {
        self.spacing
    }

    #[inline]
    pub fn atlas(&self) -> &SpriteAtlas {
        &self.atlas
    }

    #[inline]
    pub fn texture(&self) -> Texture {
        self.atlas.texture()
    }

    #[inline]
    pub fn cell_size(&self) -> Size2 {
        self.atlas.cell_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TextureId;

    fn texture() -> Texture {
        Texture {
            id: TextureId::new(1).unwrap(),
            size: Size2::new(64, 32),
        }
    }

    #[test]
    fn lines_fill_grid_and_map_runes() {
        let font = FontAtlas::builder(texture())
            .cell_size(16, 16)
            .index_to_rune_lines(&["abcd", "éf"])
            .default_rune('?')
            .build();
        assert_eq!(font.atlas().grid_size(), Size2::new(4, 2));
        assert_eq!(font.rune_index('a'), 0);
        assert_eq!(font.rune_index('é'), 4);
        assert_eq!(font.rune_index('f'), 5);
        // '?' is unmapped, so the fallback stays at 0.
        assert_eq!(font.rune_index('z'), 0);
    }

    #[test]
    fn explicit_grid_wins_over_lines() {
        let font = FontAtlas::builder(texture())
            .grid_size(8, 0)
            .index_to_rune_lines(&["ab", "cd", "ef"])
            .build();
        assert_eq!(font.atlas().grid_size(), Size2::new(8, 3));
    }

    #[test]
    fn default_index_is_clamped() {
        let font = FontAtlas::builder(texture())
            .index_to_rune("abc")
            .default_index(99)
            .build();
        assert_eq!(font.default_index(), 2);
        assert_eq!(font.rune_index('x'), 2);
    }

    #[test]
    fn default_cell_and_rune() {
        let font = FontAtlas::builder(texture())
            .grid_size(4, 2)
            .index_to_rune("abcdefgh")
            .default_cell(1, 1)
            .build();
        assert_eq!(font.default_index(), 5);

        let font = FontAtlas::builder(texture())
            .index_to_rune("ab?")
            .default_rune('?')
            .build();
        assert_eq!(font.rune_index('é'), 2);
    }
}
