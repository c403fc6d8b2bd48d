//! Skybox renderer: draws a cubemap behind all scene geometry.
//!
//! The unit cube from [`orrery_mesh::SKYBOX_CUBE_POSITIONS`] is drawn first in
//! the pass with depth writes disabled, using a rotation-only view so it never
//! moves relative to the camera.

use bytemuck::{Pod, Zeroable};

use crate::buffer::BufferAllocator;
use crate::cubemap::CubemapTexture;
use crate::depth::DepthBuffer;
use crate::pipeline::{UniformBinding, create_uniform_binding, uniform_layout};
use crate::shader::{FRAGMENT_ENTRY, VERTEX_ENTRY};
use crate::texture::create_texture_bind_group_layout;
use orrery_mesh::{SKYBOX_CUBE_POSITIONS, SKYBOX_CUBE_VERTEX_COUNT, SKYBOX_VERTEX_LAYOUT};

/// Uniform buffer for the skybox shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SkyboxUniform {
    /// Camera view with translation removed.
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

/// GPU skybox renderer.
pub struct SkyboxRenderer {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    uniform: UniformBinding,
    cubemap_bind_group: wgpu::BindGroup,
    cubemap: CubemapTexture,
}

impl SkyboxRenderer {
    /// Create the skybox pipeline and take ownership of the uploaded cubemap.
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        cubemap: CubemapTexture,
        initial: &SkyboxUniform,
    ) -> Self {
        let uniform_bgl = uniform_layout(
            device,
            "skybox-uniform-bgl",
            wgpu::ShaderStages::VERTEX,
            std::mem::size_of::<SkyboxUniform>() as u64,
        );
        let cubemap_bgl = create_texture_bind_group_layout(
            device,
            "skybox-cubemap-bgl",
            wgpu::TextureViewDimension::Cube,
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("skybox-pipeline-layout"),
            bind_group_layouts: &[&uniform_bgl, &cubemap_bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("skybox-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some(VERTEX_ENTRY),
                buffers: &[SKYBOX_VERTEX_LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            // Shares the scene's depth attachment but never writes to it.
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthBuffer::FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some(FRAGMENT_ENTRY),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let vertex_buffer = BufferAllocator::new(device).create_vertex_buffer(
            "skybox-vertices",
            bytemuck::cast_slice(&SKYBOX_CUBE_POSITIONS),
        );

        let cubemap_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("skybox-cubemap-bg"),
            layout: &cubemap_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&cubemap.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&cubemap.sampler),
                },
            ],
        });

        let uniform = create_uniform_binding(device, "skybox-uniform", &uniform_bgl, initial);

        log::info!(
            "Skybox renderer initialized: {}x{} cubemap",
            cubemap.face_size,
            cubemap.face_size
        );

        Self {
            pipeline,
            vertex_buffer,
            uniform,
            cubemap_bind_group,
            cubemap,
        }
    }

    /// Upload new view/projection matrices.
    pub fn update(&self, queue: &wgpu::Queue, uniform: &SkyboxUniform) {
        self.uniform.write(queue, uniform);
    }

    /// Record the skybox draw. Must come before the scene geometry in the pass.
    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform.bind_group, &[]);
        pass.set_bind_group(1, &self.cubemap_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..SKYBOX_CUBE_VERTEX_COUNT, 0..1);
    }

    pub fn face_size(&self) -> u32 {
        self.cubemap.face_size
    }

    /// Release the vertex buffer, uniform buffer, and cube texture.
    pub fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.uniform.destroy();
        self.cubemap.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cubemap::CubemapFaces;
    use crate::gpu::create_test_device_queue;

    const TEST_SKYBOX_SHADER: &str = r#"
struct Sky { view: mat4x4<f32>, projection: mat4x4<f32> };
@group(0) @binding(0) var<uniform> sky: Sky;
@group(1) @binding(0) var cube: texture_cube<f32>;
@group(1) @binding(1) var samp: sampler;

struct VsOut { @builtin(position) pos: vec4<f32>, @location(0) dir: vec3<f32> };

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VsOut {
    var out: VsOut;
    let clip = sky.projection * sky.view * vec4<f32>(position, 1.0);
    out.pos = clip.xyww;
    out.dir = position;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return textureSample(cube, samp, in.dir);
}
"#;

    #[test]
    fn test_skybox_uniform_size() {
        assert_eq!(std::mem::size_of::<SkyboxUniform>(), 128);
    }

    #[test]
    fn test_renderer_creation_with_empty_cubemap() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("test-skybox"),
            source: wgpu::ShaderSource::Wgsl(TEST_SKYBOX_SHADER.into()),
        });
        let cubemap = CubemapFaces::from_images(Default::default()).upload(&device, &queue, "sky");
        let skybox = SkyboxRenderer::new(
            &device,
            &shader,
            wgpu::TextureFormat::Bgra8UnormSrgb,
            cubemap,
            &SkyboxUniform::zeroed(),
        );
        assert_eq!(skybox.face_size(), 1);
        skybox.update(&queue, &SkyboxUniform::zeroed());
        skybox.destroy();
    }
}
