//! Body textures: decoding image files, GPU upload with mipmaps, caching by
//! file name, and solid-colour fallbacks for missing assets.
//!
//! [`TextureLibrary::load`] never fails. A texture that cannot be read or
//! decoded is logged and replaced by a 1×1 texture of the caller's fallback
//! colour, so a bare checkout still renders a recognisable system.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Colour format of every body texture. Image files are sRGB encoded.
pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// A GPU texture with its view and ready-to-bind bind group.
pub struct ManagedTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
    pub dimensions: (u32, u32),
    pub mip_level_count: u32,
    /// True when this is a solid-colour stand-in for a missing file.
    pub is_fallback: bool,
}

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    /// A single pixel of `color`.
    #[must_use]
    pub fn solid(color: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: color.to_vec(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("cannot read texture {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot decode texture {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("texture data size ({actual}) does not match expected ({expected}) for {width}x{height}")]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },
}

/// Number of mip levels down to 1×1.
#[must_use]
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Read and decode an image file to RGBA8, shrinking it to fit within
/// `max_dimension` on its longer side.
pub fn decode_image(path: &Path, max_dimension: u32) -> Result<DecodedImage, TextureError> {
    let bytes = std::fs::read(path).map_err(|source| TextureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut image = image::load_from_memory(&bytes).map_err(|source| TextureError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    if image.width() == 0 || image.height() == 0 {
        return Err(TextureError::InvalidDimensions {
            width: image.width(),
            height: image.height(),
        });
    }
    if image.width() > max_dimension || image.height() > max_dimension {
        log::warn!(
            "{} is {}x{}, downscaling to fit {max_dimension}",
            path.display(),
            image.width(),
            image.height()
        );
        image = image.resize(
            max_dimension,
            max_dimension,
            image::imageops::FilterType::Triangle,
        );
    }

    let rgba = image.to_rgba8();
    Ok(DecodedImage {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

const BLIT_SHADER_SOURCE: &str = r#"
@group(0) @binding(0) var src_texture: texture_2d<f32>;
@group(0) @binding(1) var src_sampler: sampler;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) idx: u32) -> VertexOutput {
    let uv = vec2<f32>(f32((idx << 1u) & 2u), f32(idx & 2u));
    var out: VertexOutput;
    out.position = vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(uv.x, 1.0 - uv.y);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(src_texture, src_sampler, in.uv);
}
"#;

/// Cache of body textures keyed by file name.
pub struct TextureLibrary {
    textures: HashMap<String, Arc<ManagedTexture>>,
    white: Arc<ManagedTexture>,
    sampler: wgpu::Sampler,
    bind_group_layout: wgpu::BindGroupLayout,
    blit_pipeline: wgpu::RenderPipeline,
    blit_bind_group_layout: wgpu::BindGroupLayout,
    blit_sampler: wgpu::Sampler,
}

fn texture_layout_entries() -> [wgpu::BindGroupLayoutEntry; 2] {
    [
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
    ]
}

impl TextureLibrary {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        // Repeat horizontally so the sphere seam filters across the wrap.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("body-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture-bind-group-layout"),
            entries: &texture_layout_entries(),
        });
        let blit_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("blit-bind-group-layout"),
                entries: &texture_layout_entries(),
            });

        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit-shader"),
            source: wgpu::ShaderSource::Wgsl(BLIT_SHADER_SOURCE.into()),
        });
        let blit_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit-pipeline-layout"),
            bind_group_layouts: &[&blit_bind_group_layout],
            immediate_size: 0,
        });
        let blit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mipmap-pipeline"),
            layout: Some(&blit_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &blit_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &blit_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: TEXTURE_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });
        let blit_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("blit-sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white = Arc::new(Self::upload_unchecked(
            device,
            queue,
            &bind_group_layout,
            &sampler,
            "white",
            &DecodedImage::solid([255; 4]),
            true,
        ));

        Self {
            textures: HashMap::new(),
            white,
            sampler,
            bind_group_layout,
            blit_pipeline,
            blit_bind_group_layout,
            blit_sampler,
        }
    }

    /// Load `name` from `directory`, or return the cached copy. Failures are
    /// logged and yield a solid `fallback` texture, which is cached too.
    pub fn load(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        directory: &Path,
        name: &str,
        fallback: [u8; 4],
    ) -> Arc<ManagedTexture> {
        if let Some(existing) = self.textures.get(name) {
            return Arc::clone(existing);
        }

        let max = device.limits().max_texture_dimension_2d;
        let texture = match decode_image(&directory.join(name), max)
            .and_then(|image| self.create_texture(device, queue, name, &image, true))
        {
            Ok(texture) => {
                log::info!(
                    "Loaded texture '{name}' ({}x{}, {} mips)",
                    texture.dimensions.0,
                    texture.dimensions.1,
                    texture.mip_level_count
                );
                texture
            }
            Err(e) => {
                log::warn!("{e}; using a solid colour for '{name}'");
                self.upload_solid(device, queue, name, fallback)
            }
        };

        let texture = Arc::new(texture);
        self.textures.insert(name.to_string(), Arc::clone(&texture));
        texture
    }

    /// Upload decoded pixels without touching the cache.
    pub fn create_texture(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        image: &DecodedImage,
        generate_mipmaps: bool,
    ) -> Result<ManagedTexture, TextureError> {
        validate(image)?;
        let texture = Self::upload_unchecked(
            device,
            queue,
            &self.bind_group_layout,
            &self.sampler,
            name,
            image,
            false,
        );
        if generate_mipmaps && texture.mip_level_count > 1 {
            self.generate_mipmaps(device, queue, &texture.texture, texture.mip_level_count);
        }
        Ok(texture)
    }

    fn upload_solid(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        color: [u8; 4],
    ) -> ManagedTexture {
        let mut texture = Self::upload_unchecked(
            device,
            queue,
            &self.bind_group_layout,
            &self.sampler,
            name,
            &DecodedImage::solid(color),
            false,
        );
        texture.is_fallback = true;
        texture
    }

    fn upload_unchecked(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        name: &str,
        image: &DecodedImage,
        is_fallback: bool,
    ) -> ManagedTexture {
        let (width, height) = (image.width, image.height);
        let mip_levels = mip_level_count(width, height);
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(name),
            size,
            mip_level_count: mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: None,
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{name}-bind-group")),
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

        ManagedTexture {
            texture,
            view,
            bind_group,
            dimensions: (width, height),
            mip_level_count: mip_levels,
            is_fallback,
        }
    }

    /// Cached texture by file name.
    pub fn get(&self, name: &str) -> Option<Arc<ManagedTexture>> {
        self.textures.get(name).cloned()
    }

    /// Bind group for `name`, or plain white if it was never loaded.
    pub fn bind_group(&self, name: &str) -> &wgpu::BindGroup {
        self.textures
            .get(name)
            .map_or(&self.white.bind_group, |t| &t.bind_group)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Shared layout for texture + sampler pairs (bind group 1 of the body
    /// pipelines).
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    fn generate_mipmaps(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &wgpu::Texture,
        mip_count: u32,
    ) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("mipmap-encoder"),
        });

        for level in 1..mip_count {
            let src_view = texture.create_view(&wgpu::TextureViewDescriptor {
                base_mip_level: level - 1,
                mip_level_count: Some(1),
                ..Default::default()
            });
            let dst_view = texture.create_view(&wgpu::TextureViewDescriptor {
                base_mip_level: level,
                mip_level_count: Some(1),
                ..Default::default()
            });

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("mipmap-bind-group"),
                layout: &self.blit_bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&src_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.blit_sampler),
                    },
                ],
            });

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("mipmap-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &dst_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });
            pass.set_pipeline(&self.blit_pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}

fn validate(image: &DecodedImage) -> Result<(), TextureError> {
    let (width, height) = (image.width, image.height);
    if width == 0 || height == 0 {
        return Err(TextureError::InvalidDimensions { width, height });
    }
    let expected = width as usize * height as usize * 4;
    if image.rgba.len() != expected {
        return Err(TextureError::DataSizeMismatch {
            actual: image.rgba.len(),
            expected,
            width,
            height,
        });
    }
    Ok(())
}

/// A headless device for tests, or `None` when no adapter is available.
#[cfg(test)]
pub(crate) fn create_test_device_queue() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok()?;

        adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        image.save(&path).unwrap();
        path
    }

    #[test]
    fn test_mip_level_count() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 1), 2);
        assert_eq!(mip_level_count(256, 128), 9);
        assert_eq!(mip_level_count(2048, 1024), 12);
        assert_eq!(mip_level_count(300, 200), 9);
    }

    #[test]
    fn test_decode_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "earth.png", 4, 2);

        let image = decode_image(&path, 8192).unwrap();
        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!(image.rgba.len(), 4 * 2 * 4);
        assert_eq!(&image.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_downscales_oversized_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "background.png", 64, 32);

        let image = decode_image(&path, 16).unwrap();
        assert_eq!((image.width, image.height), (16, 8));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = decode_image(&dir.path().join("nope.png"), 8192);
        assert!(matches!(result, Err(TextureError::Io { .. })));
    }

    #[test]
    fn test_garbage_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mars.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();
        assert!(matches!(
            decode_image(&path, 8192),
            Err(TextureError::Decode { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_images() {
        let empty = DecodedImage {
            width: 0,
            height: 4,
            rgba: vec![],
        };
        assert!(matches!(
            validate(&empty),
            Err(TextureError::InvalidDimensions { .. })
        ));

        let short = DecodedImage {
            width: 2,
            height: 2,
            rgba: vec![0; 8],
        };
        assert!(matches!(
            validate(&short),
            Err(TextureError::DataSizeMismatch { expected: 16, .. })
        ));

        assert!(validate(&DecodedImage::solid([1, 2, 3, 4])).is_ok());
    }

    #[test]
    fn test_load_caches_and_falls_back() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "sun.png", 8, 8);

        let mut library = TextureLibrary::new(&device, &queue);
        let sun = library.load(&device, &queue, dir.path(), "sun.png", [255, 200, 0, 255]);
        assert!(!sun.is_fallback);
        assert_eq!(sun.mip_level_count, 4);

        let again = library.load(&device, &queue, dir.path(), "sun.png", [0; 4]);
        assert!(Arc::ptr_eq(&sun, &again));

        let missing = library.load(&device, &queue, dir.path(), "pluto.png", [90; 4]);
        assert!(missing.is_fallback);
        assert_eq!(missing.dimensions, (1, 1));
        assert_eq!(library.len(), 2);
    }
}
