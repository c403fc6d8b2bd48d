//! Vertex and index buffer creation for GPU meshes.

use orrery_mesh::SphereMesh;
use wgpu::util::DeviceExt;

/// Index format of every mesh in the scene.
pub const INDEX_FORMAT: wgpu::IndexFormat = wgpu::IndexFormat::Uint32;

/// A complete mesh buffer containing vertex and index data ready for GPU rendering.
pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshBuffer {
    /// Bind vertex and index buffers to a render pass.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), INDEX_FORMAT);
    }

    /// Draw the entire mesh using indexed rendering.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    /// Release both GPU buffers.
    pub fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

/// GPU buffer allocator for creating vertex and index buffers.
pub struct BufferAllocator<'a> {
    device: &'a wgpu::Device,
}

impl<'a> BufferAllocator<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }

    /// Create a complete mesh buffer from raw vertex bytes and `u32` indices.
    pub fn create_mesh(&self, label: &str, vertices: &[u8], indices: &[u32]) -> MeshBuffer {
        MeshBuffer {
            vertex_buffer: self.create_vertex_buffer(&format!("{label}-vertices"), vertices),
            index_buffer: self.create_index_buffer(&format!("{label}-indices"), indices),
            index_count: indices.len() as u32,
        }
    }

    /// Upload a generated sphere.
    pub fn create_sphere(&self, label: &str, sphere: &SphereMesh) -> MeshBuffer {
        log::debug!(
            "Uploading sphere '{label}': {} vertices, {} triangles",
            sphere.vertex_count(),
            sphere.triangle_count()
        );
        self.create_mesh(label, sphere.vertex_bytes(), &sphere.indices)
    }

    /// Create a vertex buffer from raw byte data.
    pub fn create_vertex_buffer(&self, label: &str, data: &[u8]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            })
    }

    pub fn create_index_buffer(&self, label: &str, data: &[u32]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;
    use orrery_mesh::generate_uv_sphere;

    #[test]
    fn test_mesh_buffer_creation() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let allocator = BufferAllocator::new(&device);

        let vertices = vec![0u8; 80];
        let indices: &[u32] = &[0, 1, 2, 2, 3, 0];
        let mesh = allocator.create_mesh("test-quad", &vertices, indices);

        assert_eq!(mesh.index_count, 6);
        assert_eq!(mesh.vertex_buffer.size(), 80);
        assert_eq!(mesh.index_buffer.size(), 24);
    }

    #[test]
    fn test_sphere_upload_sizes() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let allocator = BufferAllocator::new(&device);
        let sphere = generate_uv_sphere(5.0, 36, 18);

        let mesh = allocator.create_sphere("sun", &sphere);
        assert_eq!(mesh.index_count as usize, sphere.index_count());
        assert_eq!(mesh.vertex_buffer.size() as usize, sphere.vertex_count() * 20);
        assert_eq!(mesh.index_buffer.size() as usize, sphere.index_count() * 4);
        mesh.destroy();
    }

    #[test]
    fn test_buffers_have_expected_usage() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let allocator = BufferAllocator::new(&device);
        let mesh = allocator.create_mesh("usage", &[0u8; 20], &[0, 0, 0]);
        assert!(mesh.vertex_buffer.usage().contains(wgpu::BufferUsages::VERTEX));
        assert!(mesh.index_buffer.usage().contains(wgpu::BufferUsages::INDEX));
    }
}
