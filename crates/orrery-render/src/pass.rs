//! Per-frame encoding.
//!
//! A frame is one [`FrameEncoder`] holding the acquired surface texture and
//! one render pass described by a [`RenderPassBuilder`]: clear color, depth
//! clear, label. Nothing is presented until [`FrameEncoder::submit`].

/// Deep space blue the scene is cleared to before the skybox is drawn.
pub const SPACE_BLUE: wgpu::Color = wgpu::Color {
    r: 0.0025,
    g: 0.1071,
    b: 0.2121,
    a: 1.0,
};

#[derive(Debug)]
pub struct RenderPassBuilder {
    clear_color: wgpu::Color,
    depth: Option<(wgpu::TextureView, f32)>,
    label: Option<&'static str>,
}

impl Default for RenderPassBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPassBuilder {
    /// Clears to [`SPACE_BLUE`], no depth attachment.
    pub fn new() -> Self {
        Self {
            clear_color: SPACE_BLUE,
            depth: None,
            label: None,
        }
    }

    pub fn clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Depth attachment cleared to `clear_value` when the pass begins.
    pub fn depth(mut self, view: wgpu::TextureView, clear_value: f32) -> Self {
        self.depth = Some((view, clear_value));
        self
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    fn begin<'e>(
        &'e self,
        encoder: &'e mut wgpu::CommandEncoder,
        target: &'e wgpu::TextureView,
    ) -> wgpu::RenderPass<'e> {
        let clear_and_store = |load| wgpu::Operations {
            load,
            store: wgpu::StoreOp::Store,
        };
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: self.label,
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: clear_and_store(wgpu::LoadOp::Clear(self.clear_color)),
                depth_slice: None,
            })],
            depth_stencil_attachment: self.depth.as_ref().map(|(view, clear)| {
                wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(*clear),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }
            }),
            ..Default::default()
        })
    }
}

/// Commands for one frame plus the surface texture they draw into.
///
/// Dropped without [`submit`](Self::submit), the frame is discarded.
pub struct FrameEncoder<'q> {
    queue: &'q wgpu::Queue,
    encoder: wgpu::CommandEncoder,
    frame: wgpu::SurfaceTexture,
    target: wgpu::TextureView,
}

impl<'q> FrameEncoder<'q> {
    pub fn new(device: &wgpu::Device, queue: &'q wgpu::Queue, frame: wgpu::SurfaceTexture) -> Self {
        let target = frame.texture.create_view(&Default::default());
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame-encoder"),
        });
        Self {
            queue,
            encoder,
            frame,
            target,
        }
    }

    /// Begin a pass drawing into the surface texture.
    pub fn begin_render_pass<'a>(&'a mut self, builder: &'a RenderPassBuilder) -> wgpu::RenderPass<'a> {
        builder.begin(&mut self.encoder, &self.target)
    }

    /// Submit and present.
    pub fn submit(self) {
        self.queue.submit([self.encoder.finish()]);
        self.frame.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::DepthBuffer;

    #[test]
    fn test_space_blue_components() {
        assert!((SPACE_BLUE.r - 0.0025).abs() < 1e-6);
        assert!((SPACE_BLUE.g - 0.1071).abs() < 1e-6);
        assert!((SPACE_BLUE.b - 0.2121).abs() < 1e-6);
        assert_eq!(SPACE_BLUE.a, 1.0);
    }

    #[test]
    fn test_new_builder_clears_to_space_blue_without_depth() {
        let builder = RenderPassBuilder::default();
        assert_eq!(builder.clear_color, SPACE_BLUE);
        assert!(builder.depth.is_none());
        assert!(builder.label.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let builder = RenderPassBuilder::new()
            .clear_color(wgpu::Color::RED)
            .label("scene-pass");
        assert_eq!(builder.clear_color, wgpu::Color::RED);
        assert_eq!(builder.label, Some("scene-pass"));
    }

    #[test]
    fn test_depth_attachment_keeps_clear_value() {
        let Some((device, _queue)) = crate::gpu::create_test_device_queue() else {
            return;
        };
        let depth = DepthBuffer::new(&device, 8, 8);
        let builder = RenderPassBuilder::new().depth(depth.view.clone(), DepthBuffer::CLEAR_VALUE);
        assert_eq!(builder.depth.as_ref().map(|(_, clear)| *clear), Some(1.0));
    }
}
