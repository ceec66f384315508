use anyhow::{Context, Result};

use tessel_engine::backend::GfxBackend;
use tessel_engine::coords::{ColorRgba, Size2, Vec2, Vec3};
use tessel_engine::gfx::{bake_font_atlas, FontAtlas, ImageRgba, Sprite, Texture};
use tessel_engine::render::RenderStack;
use tessel_engine::time::FrameTime;
use tessel_engine::view::Anchor;
use tessel_maze::{MazeCamera, MazeMap, MazeRenderAdapter, MazeScene, MazeTextures};

const MAZE: &[&str] = &[
    "###########",
    "#S..#.....#",
    "#.#.#.###.#",
    "#.#...#...#",
    "#.#####.#.#",
    "#.......#.#",
    "###########",
];

const CHARSET: &[&str] = &[
    " !\"#$%&'()*+,-./0123456789:;<=>?",
    "@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_",
    "`abcdefghijklmnopqrstuvwxyz{|}~",
];

const FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/noto/NotoSansMono-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSansMono-Regular.ttf",
];

const TURN_DEG_PER_SEC: f32 = 20.0;

/// Everything the demo draws, built once against whichever backend runs.
pub struct Demo {
    textures: Vec<Texture>,
    badge: Sprite,
    font: FontAtlas,
    maze: MazeScene,
}

impl Demo {
    pub fn new<B: GfxBackend>(stack: &mut RenderStack<B>) -> Result<Self> {
        let backend = stack.backend_mut();

        let wall = Texture::upload(
            backend,
            &ImageRgba::checkerboard(Size2::new(64, 64), 8, ColorRgba::COPPER, ColorRgba::BROWN),
        )
        .context("failed to upload wall texture")?;
        let floor = Texture::upload(
            backend,
            &ImageRgba::checkerboard(
                Size2::new(64, 64),
                16,
                ColorRgba::rgb(0.3, 0.3, 0.3),
                ColorRgba::rgb(0.15, 0.15, 0.15),
            ),
        )
        .context("failed to upload floor texture")?;
        let ceiling = Texture::upload(
            backend,
            &ImageRgba::solid(Size2::new(4, 4), ColorRgba::rgb(0.05, 0.05, 0.2)),
        )
        .context("failed to upload ceiling texture")?;

        let font = load_font(backend)?;

        let map = MazeMap::parse(MAZE).context("invalid demo maze")?;
        let mut maze = MazeScene::new(map, 0.4, 0.0, 0.4).with_textures(MazeTextures {
            wall: wall.id.get(),
            floor: floor.id.get(),
            ceiling: ceiling.id.get(),
        });
        maze.build(&mut MazeRenderAdapter::new(stack));

        Ok(Self {
            textures: vec![wall, floor, ceiling, font.texture()],
            badge: Sprite::new(wall),
            font,
            maze,
        })
    }

    pub fn face_count(&self) -> usize {
        self.maze.face_count()
    }

    pub fn draw<B: GfxBackend>(&self, stack: &mut RenderStack<B>, time: &FrameTime) {
        stack.clear_view();

        let camera = MazeCamera::at_cell(self.maze.map().start(), time.elapsed * TURN_DEG_PER_SEC);
        stack.begin_3d_scene();
        self.maze.draw(&mut MazeRenderAdapter::new(stack), &camera);
        stack.end_scene();

        let fps = format!("{:.0}", time.fps);
        let faces = self.face_count().to_string();
        let frame = time.frame_index.to_string();

        stack.begin_2d_scene();
        stack.wrap_auto_anchor(Anchor::TOP_LEFT, |s| {
            s.wrap_font_atlas(&self.font, Vec3::new(24.0, 24.0, 0.0), |w| {
                w.set_bg_padding(Vec2::new(8.0, 8.0));
                w.draw_bg(ColorRgba::new(0.0, 0.0, 0.0, 0.6), (28, 3));
                w.puts_fmt("{yellow tessel studio }", &[]);
                w.puts_fmt("fps {0x00ff88 {} } faces {cyan {} }", &[&fps, &faces]);
                w.puts_fmt("frame {}", &[&frame]);
            });
        });
        stack.wrap_auto_anchor(Anchor::BOTTOM_RIGHT, |s| {
            let target = s.dimens().target_size();
            let pos = Vec3::new(target.x - 96.0, target.y - 96.0, 0.0);
            let angle = time.elapsed * 90.0;
            s.wrap_add_blend(|s| {
                s.wrap_rotate(Vec3::new(pos.x + 32.0, pos.y + 32.0, 0.0), angle, |s| {
                    s.wrap_sprite(&self.badge, |w| {
                        w.draw_quad_sized(pos, Vec2::new(64.0, 64.0));
                    });
                });
            });
        });
        stack.end_scene();

        stack.check_backend();
    }

    /// Deletes the compiled maze and every uploaded texture.
    pub fn release<B: GfxBackend>(mut self, stack: &mut RenderStack<B>) {
        self.maze.release(&mut MazeRenderAdapter::new(stack));
        for texture in self.textures {
            texture.destroy(stack.backend_mut());
        }
    }
}

/// Bakes a system monospace font, or falls back to a blocky placeholder atlas.
fn load_font<B: GfxBackend>(backend: &mut B) -> Result<FontAtlas> {
    if let Some((path, bytes)) = FONT_PATHS
        .iter()
        .find_map(|p| std::fs::read(p).ok().map(|b| (*p, b)))
    {
        match bake_font_atlas(&bytes, 22.0, CHARSET, backend) {
            Ok(font) => {
                log::info!("font: baked {path}");
                return Ok(font);
            }
            Err(e) => log::warn!("font: {path}: {e}"),
        }
    }

    log::info!("font: no system font, using placeholder glyphs");
    let cols = CHARSET.iter().map(|l| l.chars().count()).max().unwrap_or(1) as u32;
    let rows = CHARSET.len() as u32;
    let image = ImageRgba::checkerboard(
        Size2::new(cols * 12, rows * 20),
        2,
        ColorRgba::WHITE,
        ColorRgba::new(1.0, 1.0, 1.0, 0.0),
    );
    let texture = Texture::upload(backend, &image).context("failed to upload placeholder font")?;
    Ok(FontAtlas::builder(texture)
        .cell_size(12, 20)
        .spacing(1, 2)
        .index_to_rune_lines(CHARSET)
        .default_rune('?')
        .build())
}
