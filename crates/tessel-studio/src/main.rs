mod demo;

use anyhow::{bail, Context, Result};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowId;

use tessel_engine::backend::gpu::WgpuBackend;
use tessel_engine::backend::{BackendCmd, GfxBackend, RecordingBackend};
use tessel_engine::coords::{ColorRgba, Vec2};
use tessel_engine::core::{App, AppControl, FrameCtx};
use tessel_engine::device::GpuInit;
use tessel_engine::logging::{init_logging, LoggingConfig};
use tessel_engine::render::{RenderStack, RendererConfig};
use tessel_engine::time::FrameClock;
use tessel_engine::window::{Runtime, RuntimeConfig};

use demo::Demo;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum BackendChoice {
    Wgpu,
    /// Headless; draws go to a [`RecordingBackend`] in reduced mode.
    Record,
}

#[derive(Debug, Clone)]
struct StudioConfig {
    backend: BackendChoice,
    /// Frames rendered by the headless backend before exiting.
    headless_frames: u32,
    renderer: RendererConfig,
    window: RuntimeConfig,
}

impl StudioConfig {
    fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(value) = std::env::var("TESSEL_BACKEND") {
            config.backend = match value.trim().to_ascii_lowercase().as_str() {
                "" | "wgpu" => BackendChoice::Wgpu,
                "record" => BackendChoice::Record,
                other => bail!("TESSEL_BACKEND must be 'wgpu' or 'record', got '{other}'"),
            };
        }
        Ok(config)
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        let window = RuntimeConfig::new("tessel studio");
        let device = Vec2::new(
            window.initial_size.width as f32,
            window.initial_size.height as f32,
        );
        Self {
            backend: BackendChoice::Wgpu,
            headless_frames: 3,
            renderer: RendererConfig::new(device, Vec2::new(1600.0, 900.0))
                .with_clear_color(ColorRgba::rgb(0.02, 0.02, 0.05)),
            window,
        }
    }
}

struct Studio {
    stack: RenderStack<WgpuBackend>,
    demo: Demo,
}

impl App for Studio {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => AppControl::Exit,
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let time = ctx.time;
        let demo = &self.demo;
        ctx.render(&mut self.stack, |stack| demo.draw(stack, &time))
    }
}

fn run_windowed(config: StudioConfig) -> Result<()> {
    let mut stack = RenderStack::new(WgpuBackend::new(), config.renderer)
        .context("failed to initialize renderer")?;
    let demo = Demo::new(&mut stack)?;

    let gpu_init = GpuInit {
        present_mode: wgpu::PresentMode::AutoVsync,
        ..GpuInit::default()
    };
    Runtime::run(config.window, gpu_init, Studio { stack, demo })
}

fn run_headless(config: StudioConfig) -> Result<()> {
    let mut stack = RenderStack::new(RecordingBackend::reduced(), config.renderer)
        .context("failed to initialize renderer")?;
    let demo = Demo::new(&mut stack)?;
    let mut clock = FrameClock::new();

    for _ in 0..config.headless_frames {
        let time = clock.tick();
        demo.draw(&mut stack, &time);

        let commands = stack.backend_mut().take_commands();
        let draws = commands
            .iter()
            .filter(|c| matches!(c, BackendCmd::Draw(_)))
            .count();
        log::info!(
            "frame {}: {} backend calls, {} quads",
            time.frame_index,
            commands.len(),
            draws
        );
    }

    demo.release(&mut stack);
    log::info!(
        "headless run done ({:?} backend, {} live textures)",
        stack.backend().variant(),
        stack.backend().live_textures()
    );
    Ok(())
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = StudioConfig::from_env()?;
    log::info!("tessel studio starting with {:?} backend", config.backend);

    match config.backend {
        BackendChoice::Wgpu => run_windowed(config),
        BackendChoice::Record => run_headless(config),
    }
}
