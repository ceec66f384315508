use tessel_engine::backend::{GfxBackend, TextureId};
use tessel_engine::coords::Vec3;
use tessel_engine::render::{QuadBufferError, QuadBufferHandle, QuadRecord, RenderStack};

use crate::contract::{MazeRenderer, MazeVertex, QuadListData};

/// Implements [`MazeRenderer`] by forwarding to a [`RenderStack`].
///
/// Holds nothing but the borrow; every call maps one-to-one onto a stack
/// operation. Invalid handles or indices are caller bugs: they are logged and
/// trip a `debug_assert!`.
pub struct MazeRenderAdapter<'a, B: GfxBackend> {
    stack: &'a mut RenderStack<B>,
}

impl<'a, B: GfxBackend> MazeRenderAdapter<'a, B> {
    pub fn new(stack: &'a mut RenderStack<B>) -> Self {
        Self { stack }
    }

    pub fn stack(&mut self) -> &mut RenderStack<B> {
        &mut *self.stack
    }
}

#[inline]
fn to_vec3(v: MazeVertex) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn to_record(data: &QuadListData) -> QuadRecord {
    QuadRecord {
        texture: TextureId::new(data.texture_id),
        normal: to_vec3(data.normal),
        vertices: data.vertices.map(to_vec3),
    }
}

fn report(op: &str, result: Result<(), QuadBufferError>) {
    if let Err(e) = result {
        log::error!("maze {op}: {e}");
        debug_assert!(false, "maze {op}: {e}");
    }
}

fn handle(op: &str, raw: u32) -> Option<QuadBufferHandle> {
    let handle = QuadBufferHandle::new(raw);
    if handle.is_none() {
        log::error!("maze {op}: null quad list handle");
        debug_assert!(false, "maze {op}: null quad list handle");
    }
    handle
}

impl<B: GfxBackend> MazeRenderer for MazeRenderAdapter<'_, B> {
    fn begin_draw(&mut self) {}

    fn end_draw(&mut self) {}

    fn translate_model_matrix(&mut self, x: f32, y: f32, z: f32) {
        self.stack.translate_model_matrix(Vec3::new(x, y, z));
    }

    fn rotate_model_matrix(&mut self, angle_deg: f32, x: f32, y: f32, z: f32) {
        self.stack.rotate_model_matrix(angle_deg, Vec3::new(x, y, z));
    }

    fn update_model_matrix(&mut self) {
        self.stack.update_model_matrix();
    }

    fn push_model_matrix(&mut self) {
        self.stack.push_model_matrix();
    }

    fn pop_model_matrix(&mut self) {
        self.stack.pop_model_matrix();
    }

    fn gen_quad_lists(&mut self, count: usize) -> u32 {
        match self.stack.gen_quad_buffers(count) {
            Ok(h) => h.get(),
            Err(e) => {
                report("generate", Err(e));
                0
            }
        }
    }

    fn delete_quad_lists(&mut self, raw: u32, count: usize) {
        if let Some(h) = handle("delete", raw) {
            report("delete", self.stack.delete_quad_buffers(h, count));
        }
    }

    fn compile_quad_list(&mut self, raw: u32, index: usize, data: &QuadListData) {
        if let Some(h) = handle("compile", raw) {
            report("compile", self.stack.compile_quad_buffer(h, index, to_record(data)));
        }
    }

    fn draw_quad_list(&mut self, raw: u32, index: usize) {
        if let Some(h) = handle("draw", raw) {
            report("draw", self.stack.draw_quad_buffer(h, index));
        }
    }
}
