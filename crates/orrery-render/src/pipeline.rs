//! Render pipelines for textured bodies.
//!
//! Bind groups:
//! - group 0: [`CameraUniform`](crate::camera::CameraUniform)
//! - group 1: body texture and sampler
//! - group 2: [`DrawUniform`] at a dynamic offset, one slot per draw

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use crate::buffer::VertexPositionNormalUv;
use crate::depth::DepthBuffer;

pub const BODY_SHADER_SOURCE: &str = include_str!("body.wgsl");

/// How a draw is shaded. Mirrors the flag bits in `body.wgsl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shading {
    /// Diffuse light from the sun at the origin.
    Lit,
    /// Texture colour only (the sun itself, the sky).
    Unlit,
    /// Unlit, alpha-masked to a disc, drawn with blending.
    Ring,
}

impl Shading {
    pub const FLAG_UNLIT: u32 = 1;
    pub const FLAG_DISC: u32 = 2;

    #[must_use]
    pub fn flags(self) -> u32 {
        match self {
            Self::Lit => 0,
            Self::Unlit => Self::FLAG_UNLIT,
            Self::Ring => Self::FLAG_UNLIT | Self::FLAG_DISC,
        }
    }

    #[must_use]
    pub fn is_blended(self) -> bool {
        matches!(self, Self::Ring)
    }
}

/// Per-draw data.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DrawUniform {
    pub model: [[f32; 4]; 4],
    pub tint: [f32; 4],
    pub flags: [u32; 4],
}

impl DrawUniform {
    #[must_use]
    pub fn new(model: Mat4, tint: Vec4, shading: Shading) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            tint: tint.to_array(),
            flags: [shading.flags(), 0, 0, 0],
        }
    }

    /// Distance between consecutive slots in the dynamic uniform buffer.
    #[must_use]
    pub fn stride(min_uniform_alignment: u32) -> u64 {
        let size = std::mem::size_of::<Self>() as u64;
        let align = u64::from(min_uniform_alignment.max(1));
        size.div_ceil(align) * align
    }
}

/// The opaque and blended variants of the body pipeline plus their shared
/// bind group layouts.
pub struct BodyPipelines {
    pub opaque: wgpu::RenderPipeline,
    pub blended: wgpu::RenderPipeline,
    pub camera_bind_group_layout: wgpu::BindGroupLayout,
    pub draw_bind_group_layout: wgpu::BindGroupLayout,
}

impl BodyPipelines {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        texture_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("body-shader"),
            source: wgpu::ShaderSource::Wgsl(BODY_SHADER_SOURCE.into()),
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("body-camera-bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(80), // mat4x4 + vec4
                    },
                    count: None,
                }],
            });

        let draw_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("body-draw-bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(
                            std::mem::size_of::<DrawUniform>() as u64
                        ),
                    },
                    count: None,
                }],
            });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("body-pipeline-layout"),
            bind_group_layouts: &[
                &camera_bind_group_layout,
                texture_bind_group_layout,
                &draw_bind_group_layout,
            ],
            immediate_size: 0,
        });

        let opaque = create_body_pipeline(
            device,
            &layout,
            &shader,
            surface_format,
            "body-opaque-pipeline",
            None,
            true,
        );
        let blended = create_body_pipeline(
            device,
            &layout,
            &shader,
            surface_format,
            "body-blended-pipeline",
            Some(wgpu::BlendState::ALPHA_BLENDING),
            false,
        );

        Self {
            opaque,
            blended,
            camera_bind_group_layout,
            draw_bind_group_layout,
        }
    }

    #[must_use]
    pub fn for_shading(&self, shading: Shading) -> &wgpu::RenderPipeline {
        if shading.is_blended() {
            &self.blended
        } else {
            &self.opaque
        }
    }
}

fn create_body_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    label: &str,
    blend: Option<wgpu::BlendState>,
    depth_write_enabled: bool,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[VertexPositionNormalUv::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // The sky is seen from inside and rings from both sides.
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthBuffer::FORMAT,
            depth_write_enabled,
            depth_compare: DepthBuffer::COMPARE_FUNCTION,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}
