use crate::backend::GfxBackend;
use crate::coords::{UvRect, Vec2, Vec3};
use crate::gfx::Texture;
use crate::render::RenderStack;

pub struct TextureWrapper<'a, B: GfxBackend> {
    stack: &'a mut RenderStack<B>,
    texture: Texture,
    src: UvRect,
}

impl<'a, B: GfxBackend> TextureWrapper<'a, B> {
    pub(crate) fn new(stack: &'a mut RenderStack<B>, texture: Texture, src: UvRect) -> Self {
        Self { stack, texture, src }
    }

    /// Draws at the texture's pixel size.
    pub fn draw_quad(&mut self, pos: Vec3) -> &mut Self {
        self.draw_quad_sized(pos, self.texture.size.to_vec2())
    }

    pub fn draw_quad_sized(&mut self, pos: Vec3, size: Vec2) -> &mut Self {
        self.stack.draw_src_quad(self.src, pos, size);
        self
    }

    pub fn stack(&mut self) -> &mut RenderStack<B> {
        &mut *self.stack
    }
}
