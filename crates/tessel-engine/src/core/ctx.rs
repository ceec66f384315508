use winit::window::{Window, WindowId};

use crate::backend::gpu::{RenderTarget, WgpuBackend};
use crate::coords::Vec2;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::render::RenderStack;
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Drawable size in physical pixels.
    pub fn device_size(&self) -> Vec2 {
        let phys = self.window.inner_size();
        Vec2::new(phys.width as f32, phys.height as f32)
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }
}

/// Per-frame context passed to [`super::App::on_frame`].
///
/// `'a` is the callback duration, `'w` the window borrow carried by `Gpu<'w>`.
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Runs `draw` against `stack`, then flushes the recorded quads into the
    /// next surface frame and presents it.
    ///
    /// The stack is resized first when the surface size changed. A backend
    /// error raised during the frame is logged, whether or not the frame presents.
    pub fn render<F>(&mut self, stack: &mut RenderStack<WgpuBackend>, draw: F) -> AppControl
    where
        F: FnOnce(&mut RenderStack<WgpuBackend>),
    {
        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            return AppControl::Continue;
        }

        let device_size = Vec2::new(size.width as f32, size.height as f32);
        if stack.dimens().device_size() != device_size {
            stack.resize(device_size);
        }

        draw(stack);
        debug_assert!(stack.is_balanced(), "frame ended with open render state");

        let mut frame = match self.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                abandon_frame(stack);
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => AppControl::Exit,
                    _ => AppControl::Continue,
                };
            }
        };

        {
            let rctx = self.gpu.render_ctx();
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            stack.backend_mut().flush(&rctx, &mut target);
        }
        stack.check_backend();

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}

/// Reports errors raised while recording a frame that will never present,
/// then drops its draws. Returns whether an error was pending.
fn abandon_frame(stack: &mut RenderStack<WgpuBackend>) -> bool {
    let had_error = stack.check_backend();
    stack.backend_mut().discard_frame();
    had_error
}
