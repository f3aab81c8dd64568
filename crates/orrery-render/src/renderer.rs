//! Frame rendering: uploads camera and per-draw uniforms, then records one
//! pass over a [`SceneFrame`].

use std::num::NonZeroU64;
use std::path::Path;
use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::buffer::{BufferAllocator, MeshBuffer};
use crate::camera::{CameraUniform, SceneCamera};
use crate::depth::DepthBuffer;
use crate::gpu::{RenderContext, SurfaceError};
use crate::mesh::{unit_quad, uv_sphere};
use crate::pipeline::{BodyPipelines, DrawUniform};
use crate::scene::{MeshKind, SceneFrame};
use crate::texture::{ManagedTexture, TextureLibrary};

const SPHERE_STACKS: u32 = 48;
const SPHERE_SLICES: u32 = 96;

/// Draw slots in the dynamic uniform buffer. Items past this are dropped.
pub const MAX_DRAWS: usize = 64;

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

pub struct SceneRenderer {
    pipelines: BodyPipelines,
    textures: TextureLibrary,
    depth: DepthBuffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_stride: u64,
    staging: Vec<u8>,
    sphere: MeshBuffer,
    quad: MeshBuffer,
    warned_overflow: bool,
}

impl SceneRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let textures = TextureLibrary::new(device, queue);
        let pipelines = BodyPipelines::new(device, color_format, textures.bind_group_layout());
        let depth = DepthBuffer::new(device, width, height);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera-uniform"),
            contents: bytemuck::bytes_of(&SceneCamera::default().to_uniform()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera-bind-group"),
            layout: &pipelines.camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let draw_stride =
            DrawUniform::stride(device.limits().min_uniform_buffer_offset_alignment);
        let draw_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draw-uniforms"),
            size: draw_stride * MAX_DRAWS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let draw_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw-bind-group"),
            layout: &pipelines.draw_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &draw_buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<DrawUniform>() as u64),
                }),
            }],
        });

        let allocator = BufferAllocator::new(device);
        let sphere = allocator.upload("sphere", &uv_sphere(SPHERE_STACKS, SPHERE_SLICES));
        let quad = allocator.upload("quad", &unit_quad());

        log::info!("Scene renderer ready ({draw_stride}-byte draw slots)");
        Self {
            pipelines,
            textures,
            depth,
            camera_buffer,
            camera_bind_group,
            draw_buffer,
            draw_bind_group,
            draw_stride,
            staging: vec![0; (draw_stride * MAX_DRAWS as u64) as usize],
            sphere,
            quad,
            warned_overflow: false,
        }
    }

    /// Build from a window's render context.
    pub fn for_context(ctx: &RenderContext) -> Self {
        let (width, height) = ctx.size();
        Self::new(&ctx.device, &ctx.queue, ctx.surface_format, width, height)
    }

    /// Load (or fetch from cache) a texture from the assets directory.
    pub fn load_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        directory: &Path,
        name: &str,
        fallback: [u8; 4],
    ) -> Arc<ManagedTexture> {
        self.textures.load(device, queue, directory, name, fallback)
    }

    pub fn textures(&self) -> &TextureLibrary {
        &self.textures
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth.resize(device, width, height);
    }

    /// Acquire the next surface texture, draw `scene` and present.
    pub fn render(
        &mut self,
        ctx: &RenderContext,
        camera: &SceneCamera,
        scene: &SceneFrame,
    ) -> Result<(), SurfaceError> {
        let frame = ctx.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });
        self.encode(&ctx.queue, &mut encoder, &view, camera, scene);
        ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Upload uniforms and record the scene pass into `encoder`, targeting
    /// `view`. The depth buffer must match the target size.
    pub fn encode(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        camera: &SceneCamera,
        scene: &SceneFrame,
    ) {
        let count = scene.len().min(MAX_DRAWS);
        if count < scene.len() && !self.warned_overflow {
            log::warn!(
                "Scene has {} draws, only the first {MAX_DRAWS} are rendered",
                scene.len()
            );
            self.warned_overflow = true;
        }

        let camera_uniform: CameraUniform = camera.to_uniform();
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera_uniform));

        let stride = self.draw_stride as usize;
        for (slot, item) in scene.items.iter().take(count).enumerate() {
            let uniform = DrawUniform::new(item.model, item.tint, item.shading);
            let start = slot * stride;
            self.staging[start..start + std::mem::size_of::<DrawUniform>()]
                .copy_from_slice(bytemuck::bytes_of(&uniform));
        }
        if count > 0 {
            queue.write_buffer(&self.draw_buffer, 0, &self.staging[..count * stride]);
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(self.depth.attachment()),
            ..Default::default()
        });

        pass.set_bind_group(0, &self.camera_bind_group, &[]);
        for (slot, item) in scene.items.iter().take(count).enumerate() {
            let mesh = match item.mesh {
                MeshKind::Sphere => &self.sphere,
                MeshKind::Quad => &self.quad,
            };
            pass.set_pipeline(self.pipelines.for_shading(item.shading));
            pass.set_bind_group(1, self.textures.bind_group(item.texture), &[]);
            pass.set_bind_group(2, &self.draw_bind_group, &[(slot * stride) as u32]);
            mesh.bind(&mut pass);
            mesh.draw(&mut pass);
        }
    }
}
