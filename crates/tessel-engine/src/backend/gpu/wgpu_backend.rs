use std::collections::{HashMap, HashSet};
use std::ops::Range;

use glam::{Mat4, Vec4};

use crate::backend::{
    validate_pixels, BackendError, BackendVariant, BlendFunc, GfxBackend, Projection,
    QuadPrimitive, TextureId,
};
use crate::coords::{ColorRgba, Size2, Vec3};

use super::pipeline::{
    create_pipeline, texture_bind_group_layout, GpuVertex, DEPTH_FORMAT, QUAD_TRIANGLES,
};
use super::{RenderCtx, RenderTarget};

/// Consecutive draws sharing texture and blend function.
#[derive(Debug, Clone)]
struct Batch {
    texture: Option<TextureId>,
    blend: BlendFunc,
    vertices: Range<u32>,
}

struct PendingUpload {
    id: TextureId,
    size: Size2,
    pixels: Vec<u8>,
}

struct GpuTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// Device objects created on the first flush.
struct DeviceState {
    format: wgpu::TextureFormat,
    shader: wgpu::ShaderModule,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,
    /// One pipeline per blend function seen so far.
    pipelines: HashMap<BlendFunc, wgpu::RenderPipeline>,
    /// Bound for untextured draws so one shader covers both cases.
    white: GpuTexture,
}

/// Full-variant backend on wgpu.
///
/// The fixed-function state machine (projection, model matrix stack, color,
/// blend, bound texture) lives on the CPU. Each quad is transformed to clip
/// space when drawn and appended to the frame's vertex list; draws are batched
/// by texture and blend function. Nothing reaches the GPU until [`flush`](Self::flush).
///
/// Textures can be created before a device exists. Uploads are queued and
/// realized on the next flush.
pub struct WgpuBackend {
    projection: Mat4,
    model: Mat4,
    model_stack: Vec<Mat4>,

    color: ColorRgba,
    texture: Option<TextureId>,
    blend: BlendFunc,
    clear_color: ColorRgba,
    clear_requested: bool,

    vertices: Vec<GpuVertex>,
    batches: Vec<Batch>,

    next_texture: u32,
    live_textures: HashSet<TextureId>,
    uploads: Vec<PendingUpload>,
    textures: HashMap<TextureId, GpuTexture>,

    device_state: Option<DeviceState>,
    vbo: Option<wgpu::Buffer>,
    vbo_capacity: usize,
    depth: Option<(wgpu::TextureView, (u32, u32))>,

    error: Option<BackendError>,
}

impl WgpuBackend {
    pub fn new() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            model: Mat4::IDENTITY,
            model_stack: Vec::new(),
            color: ColorRgba::white(),
            texture: None,
            blend: BlendFunc::ALPHA,
            clear_color: ColorRgba::black(),
            clear_requested: false,
            vertices: Vec::new(),
            batches: Vec::new(),
            next_texture: 1,
            live_textures: HashSet::new(),
            uploads: Vec::new(),
            textures: HashMap::new(),
            device_state: None,
            vbo: None,
            vbo_capacity: 0,
            depth: None,
            error: None,
        }
    }

    /// Number of quads recorded since the last flush.
    pub fn pending_quads(&self) -> usize {
        self.vertices.len() / QUAD_TRIANGLES.len()
    }

    /// Drops the draws recorded for a frame that could not be acquired.
    /// Queued texture uploads survive until the next flush.
    pub fn discard_frame(&mut self) {
        self.vertices.clear();
        self.batches.clear();
        self.clear_requested = false;
    }

    /// Encodes everything recorded since the last flush into one render pass.
    ///
    /// Clears color and depth first if [`GfxBackend::clear`] was called.
    pub fn flush(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        if self.vertices.is_empty() && !self.clear_requested && self.uploads.is_empty() {
            return;
        }

        // Mutating setup first; the pass below only borrows.
        self.ensure_device_state(ctx);
        self.realize_uploads(ctx);
        self.ensure_depth(ctx);
        self.ensure_pipelines(ctx);
        self.ensure_vertex_capacity(ctx);

        if self.vertices.is_empty() && !self.clear_requested {
            return;
        }

        if let Some(vbo) = self.vbo.as_ref() {
            if !self.vertices.is_empty() {
                ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(&self.vertices));
            }
        }

        let Some(state) = self.device_state.as_ref() else { return };
        let Some((depth_view, _)) = self.depth.as_ref() else { return };

        let (color_load, depth_load) = if self.clear_requested {
            let c = self.clear_color;
            (
                wgpu::LoadOp::Clear(wgpu::Color {
                    r: c.r as f64,
                    g: c.g as f64,
                    b: c.b as f64,
                    a: c.a as f64,
                }),
                wgpu::LoadOp::Clear(1.0),
            )
        } else {
            (wgpu::LoadOp::Load, wgpu::LoadOp::Load)
        };

        {
            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tessel quad pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(vbo) = self.vbo.as_ref() {
                rpass.set_vertex_buffer(0, vbo.slice(..));
            }

            for batch in &self.batches {
                let Some(pipeline) = state.pipelines.get(&batch.blend) else { continue };
                let bind_group = batch
                    .texture
                    .and_then(|id| self.textures.get(&id))
                    .map_or(&state.white.bind_group, |t| &t.bind_group);

                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, bind_group, &[]);
                rpass.draw(batch.vertices.clone(), 0..1);
            }
        }

        self.vertices.clear();
        self.batches.clear();
        self.clear_requested = false;
    }

    fn ensure_device_state(&mut self, ctx: &RenderCtx<'_>) {
        if let Some(state) = self.device_state.as_mut() {
            if state.format != ctx.surface_format {
                log::debug!("surface format changed to {:?}; dropping pipelines", ctx.surface_format);
                state.format = ctx.surface_format;
                state.pipelines.clear();
            }
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tessel quad shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/quad.wgsl").into()),
        });

        let bind_group_layout = texture_bind_group_layout(ctx.device);

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("tessel quad pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tessel quad sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let white = upload_texture(
            ctx,
            &bind_group_layout,
            &sampler,
            Size2::new(1, 1),
            &[255; 4],
        );

        log::debug!("wgpu backend device state created ({:?})", ctx.surface_format);

        self.device_state = Some(DeviceState {
            format: ctx.surface_format,
            shader,
            bind_group_layout,
            pipeline_layout,
            sampler,
            pipelines: HashMap::new(),
            white,
        });
    }

    fn realize_uploads(&mut self, ctx: &RenderCtx<'_>) {
        let Some(state) = self.device_state.as_ref() else { return };

        for upload in std::mem::take(&mut self.uploads) {
            // Destroyed before it ever reached the device.
            if !self.live_textures.contains(&upload.id) {
                continue;
            }
            let tex = upload_texture(
                ctx,
                &state.bind_group_layout,
                &state.sampler,
                upload.size,
                &upload.pixels,
            );
            self.textures.insert(upload.id, tex);
        }
    }

    fn ensure_depth(&mut self, ctx: &RenderCtx<'_>) {
        let size = (
            (ctx.viewport.width as u32).max(1),
            (ctx.viewport.height as u32).max(1),
        );
        if matches!(&self.depth, Some((_, s)) if *s == size) {
            return;
        }

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tessel depth"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        self.depth = Some((texture.create_view(&Default::default()), size));
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        let Some(state) = self.device_state.as_mut() else { return };
        let DeviceState {
            format,
            shader,
            pipeline_layout,
            pipelines,
            ..
        } = state;

        for batch in &self.batches {
            if pipelines.contains_key(&batch.blend) {
                continue;
            }
            log::debug!("creating pipeline for {:?}", batch.blend);
            let pipeline = create_pipeline(ctx.device, shader, pipeline_layout, *format, batch.blend);
            pipelines.insert(batch.blend, pipeline);
        }
    }

    fn ensure_vertex_capacity(&mut self, ctx: &RenderCtx<'_>) {
        let needed = self.vertices.len();
        if needed == 0 || (self.vbo.is_some() && needed <= self.vbo_capacity) {
            return;
        }

        let capacity = needed.next_power_of_two().max(QUAD_TRIANGLES.len() * 64);
        self.vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tessel quad vbo"),
            size: (capacity * std::mem::size_of::<GpuVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.vbo_capacity = capacity;
    }

    fn record_error(&mut self, err: BackendError) {
        log::trace!("wgpu backend: {err}");
        self.error.get_or_insert(err);
    }
}

impl Default for WgpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn projection_matrix(projection: Projection) -> Mat4 {
    match projection {
        Projection::Ortho2d { width, height } => Mat4::orthographic_rh(
            0.0,
            width,
            height,
            0.0,
            Projection::ORTHO_NEAR,
            Projection::ORTHO_FAR,
        ),
        Projection::Perspective3d { width, height } => Mat4::perspective_rh(
            Projection::FOV_Y_DEG.to_radians(),
            width / height.max(1.0),
            Projection::PERSPECTIVE_NEAR,
            Projection::PERSPECTIVE_FAR,
        ),
    }
}

fn upload_texture(
    ctx: &RenderCtx<'_>,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    size: Size2,
    pixels: &[u8],
) -> GpuTexture {
    let extent = wgpu::Extent3d {
        width: size.w,
        height: size.h,
        depth_or_array_layers: 1,
    };

    let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("tessel texture"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    ctx.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * size.w),
            rows_per_image: Some(size.h),
        },
        extent,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("tessel texture bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    GpuTexture {
        _texture: texture,
        bind_group,
    }
}

impl GfxBackend for WgpuBackend {
    fn variant(&self) -> BackendVariant {
        BackendVariant::Full
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        // The depth attachment follows the surface size at flush time.
        log::trace!("viewport {width}x{height}");
    }

    fn set_projection(&mut self, projection: Projection) {
        self.projection = projection_matrix(projection);
        self.model = Mat4::IDENTITY;
    }

    fn set_color(&mut self, color: ColorRgba) {
        self.color = color;
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) {
        if let Some(id) = texture {
            if !self.live_textures.contains(&id) {
                self.record_error(BackendError::new(
                    "bind_texture",
                    format!("texture {} does not exist", id.get()),
                ));
            }
        }
        self.texture = texture;
    }

    fn set_blend_func(&mut self, func: BlendFunc) {
        self.blend = func;
    }

    fn blend_func(&self) -> BlendFunc {
        self.blend
    }

    fn set_clear_color(&mut self, color: ColorRgba) {
        self.clear_color = color;
    }

    fn clear(&mut self) {
        // Anything recorded so far would be cleared away anyway.
        self.vertices.clear();
        self.batches.clear();
        self.clear_requested = true;
    }

    fn draw_quad(&mut self, quad: &QuadPrimitive) {
        let mvp = self.projection * self.model;
        let color = self.color.to_array();
        let corners = quad.vertices.map(|v| GpuVertex {
            clip: (mvp * Vec4::new(v.pos.x, v.pos.y, v.pos.z, 1.0)).to_array(),
            uv: [v.uv.x, v.uv.y],
            color,
        });

        let start = self.vertices.len() as u32;
        self.vertices.extend(QUAD_TRIANGLES.iter().map(|&i| corners[i]));
        let end = self.vertices.len() as u32;

        match self.batches.last_mut() {
            Some(last)
                if last.texture == self.texture
                    && last.blend == self.blend
                    && last.vertices.end == start =>
            {
                last.vertices.end = end;
            }
            _ => self.batches.push(Batch {
                texture: self.texture,
                blend: self.blend,
                vertices: start..end,
            }),
        }
    }

    fn create_texture(&mut self, size: Size2, rgba: &[u8]) -> Result<TextureId, BackendError> {
        if let Err(err) = validate_pixels(size, rgba) {
            self.record_error(err.clone());
            return Err(err);
        }

        let id = TextureId::new(self.next_texture)
            .ok_or_else(|| BackendError::new("create_texture", "texture ids exhausted"))?;
        self.next_texture = self.next_texture.wrapping_add(1);

        self.live_textures.insert(id);
        self.uploads.push(PendingUpload {
            id,
            size,
            pixels: rgba.to_vec(),
        });
        Ok(id)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        if !self.live_textures.remove(&texture) {
            self.record_error(BackendError::new(
                "destroy_texture",
                format!("texture {} does not exist", texture.get()),
            ));
            return;
        }
        self.textures.remove(&texture);
        if self.texture == Some(texture) {
            self.texture = None;
        }
    }

    fn take_error(&mut self) -> Option<BackendError> {
        self.error.take()
    }

    fn load_identity(&mut self) {
        self.model = Mat4::IDENTITY;
    }

    fn push_transform(&mut self) {
        self.model_stack.push(self.model);
    }

    fn pop_transform(&mut self) {
        match self.model_stack.pop() {
            Some(m) => self.model = m,
            None => self.record_error(BackendError::new("pop_transform", "stack underflow")),
        }
    }

    fn translate(&mut self, by: Vec3) {
        self.model *= Mat4::from_translation(glam::Vec3::new(by.x, by.y, by.z));
    }

    fn rotate(&mut self, angle_deg: f32, axis: Vec3) {
        let axis = glam::Vec3::new(axis.x, axis.y, axis.z).normalize_or_zero();
        if axis == glam::Vec3::ZERO {
            return;
        }
        self.model *= Mat4::from_axis_angle(axis, angle_deg.to_radians());
    }

    fn update_transform(&mut self) {
        // Transforms apply at draw time; nothing to upload.
    }
}
