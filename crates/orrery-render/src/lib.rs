//! wgpu rendering for the orrery: device and surface setup, meshes, textures,
//! the cubemap skybox, the planet pipeline, and per-frame pass encoding.

pub mod buffer;
pub mod camera;
pub mod cubemap;
pub mod depth;
pub mod gpu;
pub mod pass;
pub mod pipeline;
pub mod shader;
pub mod skybox;
pub mod surface;
pub mod texture;

pub use buffer::{BufferAllocator, MeshBuffer};
pub use camera::{Camera, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};
pub use cubemap::{CubemapFaces, CubemapTexture, load_cubemap, uniform_face_paths};
pub use depth::DepthBuffer;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pass::{FrameEncoder, RenderPassBuilder, SPACE_BLUE};
pub use pipeline::{
    CameraUniform, ModelUniform, PlanetPipeline, SELECTOR_EARTH, SELECTOR_SUN, UniformBinding,
    draw_planet,
};
pub use shader::{ShaderError, ShaderLibrary};
pub use skybox::{SkyboxRenderer, SkyboxUniform};
pub use surface::{FramebufferSize, SurfaceResizeEvent};
pub use texture::{ManagedTexture, TextureError, TextureManager};
