use crate::backend::GfxBackend;
use crate::coords::{Vec2, Vec3};
use crate::gfx::SpriteAtlas;
use crate::render::RenderStack;

/// Draws atlas cells. Cells outside the grid draw nothing.
pub struct SpriteAtlasWrapper<'a, B: GfxBackend> {
    stack: &'a mut RenderStack<B>,
    atlas: &'a SpriteAtlas,
}

impl<'a, B: GfxBackend> SpriteAtlasWrapper<'a, B> {
    pub(crate) fn new(stack: &'a mut RenderStack<B>, atlas: &'a SpriteAtlas) -> Self {
        Self { stack, atlas }
    }

    pub fn draw_index(&mut self, index: usize, pos: Vec3) -> &mut Self {
        self.draw_index_sized(index, pos, self.atlas.cell_size().to_vec2())
    }

    pub fn draw_index_sized(&mut self, index: usize, pos: Vec3, size: Vec2) -> &mut Self {
        if let Some(src) = self.atlas.src(index) {
            self.stack.draw_src_quad(src, pos, size);
        }
        self
    }

    pub fn draw_cell(&mut self, col: u32, row: u32, pos: Vec3) -> &mut Self {
        self.draw_cell_sized(col, row, pos, self.atlas.cell_size().to_vec2())
    }

    pub fn draw_cell_sized(&mut self, col: u32, row: u32, pos: Vec3, size: Vec2) -> &mut Self {
        if let Some(src) = self.atlas.src_cell(col, row) {
            self.stack.draw_src_quad(src, pos, size);
        }
        self
    }

    pub fn stack(&mut self) -> &mut RenderStack<B> {
        &mut *self.stack
    }
}
