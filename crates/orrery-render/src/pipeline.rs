//! Textured planet pipeline shared by the sun and the earth.
//!
//! Bind groups:
//!
//! | Group | Binding | Contents                                  |
//! |-------|---------|-------------------------------------------|
//! | 0     | 0       | [`CameraUniform`] (view, projection)       |
//! | 1     | 0       | [`ModelUniform`] (model, texture selector) |
//! | 2     | 0, 1    | 2D texture and sampler                     |

use bytemuck::{Pod, Zeroable};
use std::num::NonZeroU64;
use wgpu::util::DeviceExt;

use crate::buffer::MeshBuffer;
use crate::depth::DepthBuffer;
use crate::shader::{FRAGMENT_ENTRY, VERTEX_ENTRY};

/// Selector value for the earth: textured and lit by the sun at the origin.
pub const SELECTOR_EARTH: u32 = 1;
/// Selector value for the sun: textured and self-lit.
pub const SELECTOR_SUN: u32 = 2;

/// Camera matrices for the planet shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

/// Per-body transform and shading selector.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    pub texture_selector: u32,
    pub _padding: [u32; 3],
}

impl ModelUniform {
    pub fn new(model: glam::Mat4, texture_selector: u32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            texture_selector,
            _padding: [0; 3],
        }
    }
}

static_assertions::assert_eq_size!(CameraUniform, [u8; 128]);
static_assertions::assert_eq_size!(ModelUniform, [u8; 80]);

/// A uniform buffer together with the bind group exposing it.
pub struct UniformBinding {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl UniformBinding {
    /// Overwrite the buffer contents with `value`.
    pub fn write<T: Pod>(&self, queue: &wgpu::Queue, value: &T) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(value));
    }

    pub fn destroy(&self) {
        self.buffer.destroy();
    }
}

/// Create a uniform buffer initialised to `value` and bind it at binding 0 of `layout`.
pub fn create_uniform_binding<T: Pod>(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    value: &T,
) -> UniformBinding {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(value),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{label}-bind-group")),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    });
    UniformBinding { buffer, bind_group }
}

/// Layout with a single uniform buffer of `size` bytes at binding 0.
pub(crate) fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
    size: u64,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(size),
            },
            count: None,
        }],
    })
}

/// Render pipeline for textured spheres.
pub struct PlanetPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub camera_bind_group_layout: wgpu::BindGroupLayout,
    pub model_bind_group_layout: wgpu::BindGroupLayout,
}

impl PlanetPipeline {
    /// Build the pipeline. `texture_layout` is the texture manager's layout for group 2.
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        texture_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let camera_bind_group_layout = uniform_layout(
            device,
            "camera-bind-group-layout",
            wgpu::ShaderStages::VERTEX,
            std::mem::size_of::<CameraUniform>() as u64,
        );
        let model_bind_group_layout = uniform_layout(
            device,
            "model-bind-group-layout",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
            std::mem::size_of::<ModelUniform>() as u64,
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("planet-pipeline-layout"),
            bind_group_layouts: &[
                &camera_bind_group_layout,
                &model_bind_group_layout,
                texture_layout,
            ],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("planet-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some(VERTEX_ENTRY),
                buffers: &[orrery_mesh::sphere_vertex_buffer_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthBuffer::FORMAT,
                depth_write_enabled: true,
                depth_compare: DepthBuffer::COMPARE_FUNCTION,
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

        Self {
            pipeline,
            camera_bind_group_layout,
            model_bind_group_layout,
        }
    }

    pub fn create_camera_binding(
        &self,
        device: &wgpu::Device,
        uniform: &CameraUniform,
    ) -> UniformBinding {
        create_uniform_binding(device, "camera-uniform", &self.camera_bind_group_layout, uniform)
    }

    pub fn create_model_binding(
        &self,
        device: &wgpu::Device,
        label: &str,
        uniform: &ModelUniform,
    ) -> UniformBinding {
        create_uniform_binding(device, label, &self.model_bind_group_layout, uniform)
    }
}

/// Draw one textured body.
pub fn draw_planet<'a>(
    render_pass: &mut wgpu::RenderPass<'a>,
    pipeline: &'a PlanetPipeline,
    camera: &'a wgpu::BindGroup,
    model: &'a wgpu::BindGroup,
    texture: &'a wgpu::BindGroup,
    mesh: &'a MeshBuffer,
) {
    render_pass.set_pipeline(&pipeline.pipeline);
    render_pass.set_bind_group(0, camera, &[]);
    render_pass.set_bind_group(1, model, &[]);
    render_pass.set_bind_group(2, texture, &[]);
    mesh.bind(render_pass);
    mesh.draw(render_pass);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;
    use crate::texture::TextureManager;

    /// Mirror of `assets/shaders/planet.wgsl`'s interface, kept minimal.
    const TEST_PLANET_SHADER: &str = r#"
struct Camera { view: mat4x4<f32>, projection: mat4x4<f32> };
struct Model { model: mat4x4<f32>, texture_selector: u32 };
@group(0) @binding(0) var<uniform> camera: Camera;
@group(1) @binding(0) var<uniform> body: Model;
@group(2) @binding(0) var tex: texture_2d<f32>;
@group(2) @binding(1) var samp: sampler;

struct VsOut { @builtin(position) pos: vec4<f32>, @location(0) uv: vec2<f32> };

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) uv: vec2<f32>) -> VsOut {
    var out: VsOut;
    out.pos = camera.projection * camera.view * body.model * vec4<f32>(position, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return textureSample(tex, samp, in.uv);
}
"#;

    #[test]
    fn test_uniform_sizes() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 128);
        assert_eq!(std::mem::size_of::<ModelUniform>(), 80);
    }

    #[test]
    fn test_model_uniform_new() {
        let m = glam::Mat4::from_translation(glam::Vec3::new(10.0, 0.0, 0.0));
        let uniform = ModelUniform::new(m, SELECTOR_SUN);
        assert_eq!(uniform.texture_selector, 2);
        assert_eq!(uniform.model[3], [10.0, 0.0, 0.0, 1.0]);
        assert_eq!(uniform._padding, [0; 3]);
    }

    #[test]
    fn test_selectors_are_distinct() {
        assert_eq!(SELECTOR_EARTH, 1);
        assert_eq!(SELECTOR_SUN, 2);
    }

    #[test]
    fn test_pipeline_and_bindings_creation() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("test-planet"),
            source: wgpu::ShaderSource::Wgsl(TEST_PLANET_SHADER.into()),
        });
        let textures = TextureManager::new(&device);
        let pipeline = PlanetPipeline::new(
            &device,
            &shader,
            wgpu::TextureFormat::Bgra8UnormSrgb,
            textures.bind_group_layout(),
        );

        let camera = pipeline.create_camera_binding(&device, &CameraUniform::zeroed());
        let model = pipeline.create_model_binding(
            &device,
            "earth-model",
            &ModelUniform::new(glam::Mat4::IDENTITY, SELECTOR_EARTH),
        );
        assert_eq!(camera.buffer.size(), 128);
        assert_eq!(model.buffer.size(), 80);

        model.write(&queue, &ModelUniform::new(glam::Mat4::IDENTITY, SELECTOR_SUN));
        camera.destroy();
        model.destroy();
    }
}
