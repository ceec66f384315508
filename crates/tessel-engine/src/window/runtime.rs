use std::collections::HashMap;

use anyhow::{Context, Result};
use ouroboros::self_referencing;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub resizable: bool,
}

impl RuntimeConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.initial_size = LogicalSize::new(width, height);
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "tessel".to_string(),
            initial_size: LogicalSize::new(1600.0, 900.0),
            resizable: true,
        }
    }
}

#[derive(Debug)]
enum Command {
    Open(RuntimeConfig),
    Close(WindowId),
    Exit,
}

/// Requests an app can make from a callback. Applied once the callback returns.
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
}

impl RuntimeCtx {
    pub fn create_window(&mut self, config: RuntimeConfig) {
        self.commands.push(Command::Open(config));
    }

    pub fn close_window(&mut self, id: WindowId) {
        self.commands.push(Command::Close(id));
    }

    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Runs an [`App`] on the winit event loop until every window is closed or
/// the app asks to exit.
pub struct Runtime;

impl Runtime {
    pub fn run<A: App + 'static>(initial: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut driver = Driver {
            initial: Some(initial),
            gpu_init,
            app,
            windows: HashMap::new(),
            exiting: false,
        };
        event_loop
            .run_app(&mut driver)
            .context("event loop terminated with error")
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,
    window: Window,
    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct Driver<A: App> {
    /// Taken when the first window opens.
    initial: Option<RuntimeConfig>,
    gpu_init: GpuInit,
    app: A,
    windows: HashMap<WindowId, WindowEntry>,
    exiting: bool,
}

impl<A: App> Driver<A> {
    fn open(&mut self, event_loop: &ActiveEventLoop, config: RuntimeConfig) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(config.title)
            .with_inner_size(config.initial_size)
            .with_resizable(config.resizable);
        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;
        let id = window.id();

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            clock: FrameClock::new(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed for window")?;

        entry.with_window(|w| w.request_redraw());
        self.windows.insert(id, entry);
        log::debug!("window {id:?} opened");
        Ok(())
    }

    fn close(&mut self, id: WindowId) {
        if self.windows.remove(&id).is_some() {
            log::debug!("window {id:?} closed");
        }
        if self.windows.is_empty() {
            self.exiting = true;
        }
    }

    fn apply(&mut self, event_loop: &ActiveEventLoop, ctx: RuntimeCtx) {
        for command in ctx.commands {
            match command {
                Command::Open(config) => {
                    if let Err(e) = self.open(event_loop, config) {
                        log::error!("failed to open window: {e:#}");
                    }
                }
                Command::Close(id) => self.close(id),
                Command::Exit => self.exiting = true,
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop, id: WindowId) {
        let Some(entry) = self.windows.get_mut(&id) else {
            return;
        };

        let app = &mut self.app;
        let mut runtime = RuntimeCtx::default();
        let control = entry.with_mut(|fields| {
            let mut ctx = FrameCtx {
                window: WindowCtx {
                    id,
                    window: fields.window,
                },
                gpu: fields.gpu,
                time: fields.clock.tick(),
                runtime: &mut runtime,
            };
            app.on_frame(&mut ctx)
        });

        if control == AppControl::Exit {
            runtime.exit();
        }
        self.apply(event_loop, runtime);
    }
}

impl<A: App> ApplicationHandler for Driver<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(config) = self.initial.take() else {
            return;
        };
        if let Err(e) = self.open(event_loop, config) {
            log::error!("failed to open initial window: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if !self.windows.contains_key(&id) {
            return;
        }

        if self.app.on_window_event(id, &event) == AppControl::Exit {
            self.exiting = true;
        }

        match event {
            WindowEvent::CloseRequested => self.close(id),
            WindowEvent::Resized(size) => {
                if let Some(entry) = self.windows.get_mut(&id) {
                    entry.with_gpu_mut(|gpu| gpu.resize(size));
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.windows.get_mut(&id) {
                    let size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(size));
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop, id),
            _ => {}
        }

        if self.exiting {
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exiting {
            event_loop.exit();
            return;
        }
        for entry in self.windows.values() {
            entry.with_window(|w| w.request_redraw());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_ctx_buffers_commands_in_order() {
        let mut ctx = RuntimeCtx::default();
        assert!(ctx.is_empty());
        ctx.create_window(RuntimeConfig::new("second").with_size(320.0, 200.0));
        ctx.exit();

        match ctx.commands.as_slice() {
            [Command::Open(config), Command::Exit] => {
                assert_eq!(config.title, "second");
                assert_eq!(config.initial_size, LogicalSize::new(320.0, 200.0));
                assert!(config.resizable);
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }
}
