use crate::backend::GfxBackend;
use crate::coords::{Vec2, Vec3};
use crate::gfx::Sprite;
use crate::render::RenderStack;

pub struct SpriteWrapper<'a, B: GfxBackend> {
    stack: &'a mut RenderStack<B>,
    sprite: &'a Sprite,
}

impl<'a, B: GfxBackend> SpriteWrapper<'a, B> {
    pub(crate) fn new(stack: &'a mut RenderStack<B>, sprite: &'a Sprite) -> Self {
        Self { stack, sprite }
    }

    /// Draws at the sprite's pixel size.
    pub fn draw_quad(&mut self, pos: Vec3) -> &mut Self {
        self.draw_quad_sized(pos, self.sprite.size().to_vec2())
    }

    pub fn draw_quad_sized(&mut self, pos: Vec3, size: Vec2) -> &mut Self {
        self.stack.draw_src_quad(self.sprite.src(), pos, size);
        self
    }

    pub fn stack(&mut self) -> &mut RenderStack<B> {
        &mut *self.stack
    }
}
