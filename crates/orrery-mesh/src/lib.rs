//! Procedural geometry: UV sphere generation, the skybox cube, and the vertex layouts that feed them to the GPU.

pub mod skybox_cube;
pub mod sphere;
pub mod vertex_format;

pub use skybox_cube::{SKYBOX_CUBE_POSITIONS, SKYBOX_CUBE_VERTEX_COUNT};
pub use sphere::{SphereMesh, SphereVertex, generate_uv_sphere};
pub use vertex_format::{
    SKYBOX_VERTEX_LAYOUT, SPHERE_VERTEX_ATTRIBUTES, SPHERE_VERTEX_LAYOUT,
    sphere_vertex_buffer_layout,
};
