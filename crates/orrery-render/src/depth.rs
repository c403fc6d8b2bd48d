//! Depth buffer management.
//!
//! Standard depth mapping: the near plane maps to 0.0 and the far plane to
//! 1.0, matching `Mat4::perspective_rh`. The buffer is cleared to 1.0 and
//! fragments pass when strictly closer.

/// Depth attachment sized to the surface.
pub struct DepthBuffer {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl DepthBuffer {
    /// 32-bit float depth format.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Clear value: 1.0 is the far plane.
    pub const CLEAR_VALUE: f32 = 1.0;

    /// Depth comparison used by the planet pipeline.
    pub const COMPARE_FUNCTION: wgpu::CompareFunction = wgpu::CompareFunction::Less;

    /// Create a new depth buffer. Zero dimensions are clamped to 1.
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-buffer"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self { texture, view }
    }

    /// Recreate the depth texture at new dimensions. No-op when unchanged.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if (self.texture.width(), self.texture.height()) == (width.max(1), height.max(1)) {
            return;
        }
        self.texture.destroy();
        *self = Self::new(device, width, height);
    }

    /// Release the GPU texture.
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}
