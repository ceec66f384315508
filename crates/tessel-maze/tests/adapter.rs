use tessel_engine::backend::{BackendCmd, GfxBackend, RecordingBackend, TextureId};
use tessel_engine::coords::{Size2, Vec3};
use tessel_engine::render::{QuadBufferHandle, RenderStack, RendererConfig};
use tessel_maze::{
    MazeCamera, MazeMap, MazeRenderAdapter, MazeRenderer, MazeScene, MazeTextures, MazeVertex,
    QuadListData,
};

const MAP: &[&str] = &["#####", "#S..#", "#.#.#", "#...#", "#####"];

fn stack(backend: RecordingBackend) -> RenderStack<RecordingBackend> {
    RenderStack::new(backend, RendererConfig::default()).unwrap()
}

fn scene(wall: u32) -> MazeScene {
    let map = MazeMap::parse(MAP).unwrap();
    MazeScene::new(map, 0.4, 0.0, 0.4).with_textures(MazeTextures {
        wall,
        ..MazeTextures::default()
    })
}

fn face(texture_id: u32) -> QuadListData {
    let v = MazeVertex::new;
    QuadListData {
        texture_id,
        normal: v(0.0, 0.0, 1.0),
        vertices: [v(0.0, 1.0, 0.0), v(1.0, 1.0, 0.0), v(1.0, 0.0, 0.0), v(0.0, 0.0, 0.0)],
    }
}

// ── full backend ──────────────────────────────────────────────────────────

#[test]
fn scene_draws_every_face_under_one_model_push() {
    let mut s = stack(RecordingBackend::full());
    let wall = s.backend_mut().create_texture(Size2::new(1, 1), &[255; 4]).unwrap();
    let mut maze = scene(wall.get());

    s.begin_3d_scene();
    {
        let mut adapter = MazeRenderAdapter::new(&mut s);
        maze.build(&mut adapter);
        let camera = MazeCamera::at_cell(maze.map().start(), 90.0);
        maze.draw(&mut adapter, &camera);
    }
    s.end_scene();

    let draws: Vec<_> = s.backend().draws().collect();
    assert_eq!(draws.len(), maze.face_count());
    assert!(draws.iter().all(|d| d.transform_depth == 1));
    assert!(draws.iter().any(|d| d.texture == Some(wall)));
    assert!(draws.iter().any(|d| d.texture.is_none()));

    assert!(s.backend().commands().contains(&BackendCmd::Rotate {
        angle_deg: -90.0,
        axis: Vec3::new(0.0, 1.0, 0.0),
    }));
    assert_eq!(s.backend().transform_depth(), 0);
    assert_eq!(s.texture(), None);
    assert!(s.is_balanced());
    assert!(s.backend_mut().take_error().is_none());
}

#[test]
fn compiled_face_keeps_geometry_and_normal() {
    let mut s = stack(RecordingBackend::full());
    s.begin_3d_scene();

    let mut adapter = MazeRenderAdapter::new(&mut s);
    let handle = adapter.gen_quad_lists(2);
    assert_ne!(handle, 0);
    adapter.compile_quad_list(handle, 1, &face(0));
    adapter.draw_quad_list(handle, 1);
    adapter.stack().end_scene();

    let drawn = s.backend().draws().next().unwrap();
    assert_eq!(drawn.quad.normal, Some(Vec3::new(0.0, 0.0, 1.0)));
    assert_eq!(drawn.quad.vertices[0].pos, Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(drawn.quad.vertices[2].pos, Vec3::new(1.0, 0.0, 0.0));
}

#[test]
fn recompiling_a_slot_overwrites_it() {
    let mut s = stack(RecordingBackend::full());
    let tex = s.backend_mut().create_texture(Size2::new(1, 1), &[0; 4]).unwrap();
    s.begin_3d_scene();

    let mut adapter = MazeRenderAdapter::new(&mut s);
    let handle = adapter.gen_quad_lists(1);
    adapter.compile_quad_list(handle, 0, &face(0));
    adapter.compile_quad_list(handle, 0, &face(tex.get()));
    adapter.draw_quad_list(handle, 0);
    adapter.stack().end_scene();

    let textures: Vec<Option<TextureId>> = s.backend().draws().map(|d| d.texture).collect();
    assert_eq!(textures, vec![Some(tex)]);
}

#[test]
fn rebuild_releases_the_previous_lists() {
    let mut s = stack(RecordingBackend::full());
    let mut maze = scene(0);
    {
        let mut adapter = MazeRenderAdapter::new(&mut s);
        maze.build(&mut adapter);
        maze.build(&mut adapter);
    }
    assert_eq!(s.quad_buffers().len(), 1);
    let first = QuadBufferHandle::new(1).unwrap();
    assert_eq!(s.quad_buffers().slot_count(first), Some(maze.face_count()));

    {
        let mut adapter = MazeRenderAdapter::new(&mut s);
        maze.release(&mut adapter);
    }
    assert!(s.quad_buffers().is_empty());
    assert_eq!(maze.face_count(), 0);
}

// ── reduced backend ───────────────────────────────────────────────────────

#[test]
fn reduced_backend_still_draws_without_transform_calls() {
    let mut s = stack(RecordingBackend::reduced());
    let mut maze = scene(0);

    s.begin_3d_scene();
    {
        let mut adapter = MazeRenderAdapter::new(&mut s);
        maze.build(&mut adapter);
        maze.draw(&mut adapter, &MazeCamera::at_cell((1, 1), 0.0));
    }
    s.end_scene();

    assert_eq!(s.backend().draws().count(), maze.face_count());
    assert!(s.backend().draws().all(|d| d.transform_depth == 0));
    assert!(!s
        .backend()
        .commands()
        .iter()
        .any(|c| matches!(c, BackendCmd::PushTransform | BackendCmd::Rotate { .. })));
    assert!(s.is_balanced());
}

// ── caller errors ─────────────────────────────────────────────────────────

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "maze draw")]
fn drawing_an_uncompiled_slot_panics_in_debug() {
    let mut s = stack(RecordingBackend::full());
    s.begin_3d_scene();
    let mut adapter = MazeRenderAdapter::new(&mut s);
    let handle = adapter.gen_quad_lists(1);
    adapter.draw_quad_list(handle, 0);
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "maze delete")]
fn deleting_with_the_wrong_count_panics_in_debug() {
    let mut s = stack(RecordingBackend::full());
    let mut adapter = MazeRenderAdapter::new(&mut s);
    let handle = adapter.gen_quad_lists(4);
    adapter.delete_quad_lists(handle, 3);
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "null quad list handle")]
fn null_handle_panics_in_debug() {
    let mut s = stack(RecordingBackend::full());
    let mut adapter = MazeRenderAdapter::new(&mut s);
    adapter.compile_quad_list(0, 0, &face(0));
}
