/// A position or normal as the maze engine hands it over.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct MazeVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl MazeVertex {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// One wall, floor or ceiling face.
///
/// `texture_id` 0 means "draw with whatever texture is bound".
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct QuadListData {
    pub texture_id: u32,
    pub normal: MazeVertex,
    pub vertices: [MazeVertex; 4],
}

/// Renderer interface the maze engine drives.
///
/// Quad-list handles are raw ids; 0 is never a valid handle. Calls arrive on
/// the render thread between `begin_draw` and `end_draw`, except the list
/// management calls which may also happen while a map is (re)built.
pub trait MazeRenderer {
    fn begin_draw(&mut self);
    fn end_draw(&mut self);

    fn translate_model_matrix(&mut self, x: f32, y: f32, z: f32);
    fn rotate_model_matrix(&mut self, angle_deg: f32, x: f32, y: f32, z: f32);
    fn update_model_matrix(&mut self);
    fn push_model_matrix(&mut self);
    fn pop_model_matrix(&mut self);

    /// Allocates `count` quad slots and returns their handle, or 0 when none is left.
    fn gen_quad_lists(&mut self, count: usize) -> u32;
    fn delete_quad_lists(&mut self, handle: u32, count: usize);
    fn compile_quad_list(&mut self, handle: u32, index: usize, data: &QuadListData);
    fn draw_quad_list(&mut self, handle: u32, index: usize);
}
