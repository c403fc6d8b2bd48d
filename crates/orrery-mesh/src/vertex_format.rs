//! Canonical `wgpu::VertexBufferLayout`s for sphere and skybox geometry.
//!
//! | Layout                   | Location | Offset | Format    | Field    |
//! |--------------------------|----------|--------|-----------|----------|
//! | [`SPHERE_VERTEX_LAYOUT`] | 0        | 0      | Float32x3 | position |
//! |                          | 1        | 12     | Float32x2 | uv       |
//! | [`SKYBOX_VERTEX_LAYOUT`] | 0        | 0      | Float32x3 | position |

use std::mem;

use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

use crate::sphere::SphereVertex;

/// Vertex attributes for [`SphereVertex`].
pub const SPHERE_VERTEX_ATTRIBUTES: [VertexAttribute; 2] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: mem::size_of::<[f32; 3]>() as u64,
        shader_location: 1,
    },
];

/// Vertex buffer layout used by the planet pipeline.
pub const SPHERE_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<SphereVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &SPHERE_VERTEX_ATTRIBUTES,
};

const SKYBOX_VERTEX_ATTRIBUTES: [VertexAttribute; 1] = [VertexAttribute {
    format: VertexFormat::Float32x3,
    offset: 0,
    shader_location: 0,
}];

/// Vertex buffer layout for the position-only skybox cube.
pub const SKYBOX_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<[f32; 3]>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &SKYBOX_VERTEX_ATTRIBUTES,
};

/// Return the sphere vertex buffer layout as an owned value.
pub fn sphere_vertex_buffer_layout() -> VertexBufferLayout<'static> {
    SPHERE_VERTEX_LAYOUT
}

const _: () = assert!(
    mem::size_of::<SphereVertex>() == 20,
    "SphereVertex size changed, update SPHERE_VERTEX_LAYOUT"
);
const _: () = assert!(SPHERE_VERTEX_ATTRIBUTES[1].offset == 12);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_layout_stride() {
        assert_eq!(SPHERE_VERTEX_LAYOUT.array_stride, 20);
        assert_eq!(SPHERE_VERTEX_LAYOUT.step_mode, VertexStepMode::Vertex);
    }

    #[test]
    fn test_sphere_attribute_locations() {
        let layout = sphere_vertex_buffer_layout();
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[0].shader_location, 0);
        assert_eq!(layout.attributes[0].format, VertexFormat::Float32x3);
        assert_eq!(layout.attributes[1].shader_location, 1);
        assert_eq!(layout.attributes[1].format, VertexFormat::Float32x2);
    }

    #[test]
    fn test_skybox_layout_is_position_only() {
        assert_eq!(SKYBOX_VERTEX_LAYOUT.array_stride, 12);
        assert_eq!(SKYBOX_VERTEX_LAYOUT.attributes.len(), 1);
        assert_eq!(
            SKYBOX_VERTEX_LAYOUT.attributes[0].format,
            VertexFormat::Float32x3
        );
    }
}
