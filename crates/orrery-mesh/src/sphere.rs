//! Latitude/longitude (UV) sphere generation.
//!
//! The lattice has `stacks + 1` rings from the north pole (+Y) to the south
//! pole and `slices + 1` columns around the Y axis. The seam column is
//! duplicated so texture coordinates run cleanly from `u = 0` to `u = 1`.

use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Interleaved sphere vertex: position followed by texture coordinate.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SphereVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Equirectangular texture coordinate, `(slice / slices, stack / stacks)`.
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(SphereVertex, [f32; 5]);

/// CPU-side sphere mesh ready for upload.
#[derive(Clone, Debug, Default)]
pub struct SphereMesh {
    /// Sphere radius the positions were generated with.
    pub radius: f32,
    /// Number of longitude subdivisions.
    pub slices: u32,
    /// Number of latitude subdivisions.
    pub stacks: u32,
    /// Lattice vertices, row-major by stack.
    pub vertices: Vec<SphereVertex>,
    /// Triangle list indices into `vertices`.
    pub indices: Vec<u32>,
}

impl SphereMesh {
    /// Number of vertices, always `(slices + 1) * (stacks + 1)`.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of indices, always `6 * slices * stacks`.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex data as raw bytes for buffer creation.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Iterator over vertex positions as [`Vec3`].
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices.iter().map(|v| Vec3::from_array(v.position))
    }
}

/// Generate a UV sphere of the given radius and tessellation.
///
/// For stack `s` in `0..=stacks` the latitude is `phi = PI * s / stacks`; for
/// slice `t` in `0..=slices` the longitude is `theta = TAU * t / slices`. The
/// vertex sits at `radius * (sin(phi) cos(theta), cos(phi), sin(phi) sin(theta))`.
///
/// Each lattice quad emits two triangles with the same winding, so the mesh
/// has `6 * slices * stacks` indices.
pub fn generate_uv_sphere(radius: f32, slices: u32, stacks: u32) -> SphereMesh {
    let row = slices + 1;
    // Keep angles finite for degenerate tessellation; index emission below
    // still produces nothing when either count is zero.
    let slice_div = slices.max(1) as f32;
    let stack_div = stacks.max(1) as f32;

    let mut vertices = Vec::with_capacity((row * (stacks + 1)) as usize);
    for stack in 0..=stacks {
        let phi = PI * stack as f32 / stack_div;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for slice in 0..=slices {
            let theta = TAU * slice as f32 / slice_div;
            let (sin_theta, cos_theta) = theta.sin_cos();

            let direction = Vec3::new(sin_phi * cos_theta, cos_phi, sin_phi * sin_theta);
            vertices.push(SphereVertex {
                position: (direction * radius).to_array(),
                uv: [slice as f32 / slice_div, stack as f32 / stack_div],
            });
        }
    }

    let mut indices = Vec::with_capacity((6 * slices * stacks) as usize);
    for stack in 0..stacks {
        for slice in 0..slices {
            let top_left = stack * row + slice;
            let bottom_left = (stack + 1) * row + slice;

            indices.extend_from_slice(&[top_left, bottom_left, top_left + 1]);
            indices.extend_from_slice(&[top_left + 1, bottom_left, bottom_left + 1]);
        }
    }

    SphereMesh {
        radius,
        slices,
        stacks,
        vertices,
        indices,
    }
}
