//! wgpu renderer for the orrery: textured spheres for the sun, planets and
//! sky, and alpha-blended ring discs.

pub mod buffer;
pub mod camera;
pub mod depth;
pub mod gpu;
pub mod mesh;
pub mod pipeline;
pub mod renderer;
pub mod scene;
pub mod texture;

pub use buffer::{BufferAllocator, MeshBuffer, VertexPositionNormalUv};
pub use camera::{CameraUniform, SceneCamera};
pub use depth::DepthBuffer;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use mesh::{MeshData, uv_sphere, unit_quad};
pub use pipeline::{BodyPipelines, DrawUniform, Shading};
pub use renderer::{MAX_DRAWS, SceneRenderer};
pub use scene::{DrawItem, MeshKind, SceneFrame};
pub use texture::{DecodedImage, ManagedTexture, TextureError, TextureLibrary, decode_image};
