//! 2D texture loading: decode, upload, mipmap generation, and bind groups.
//!
//! [`TextureManager`] owns the shared sampler and bind group layout and hands
//! out [`Arc<ManagedTexture>`]s that are ready to bind at draw time. A texture
//! whose image cannot be decoded, or is too large for the device, is replaced
//! by a 1×1 placeholder so the scene keeps rendering.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Format every decoded color image is uploaded as.
pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Opaque magenta, the conventional "missing texture" color.
pub const PLACEHOLDER_TEXEL: [u8; 4] = [255, 0, 255, 255];

/// An uploaded 2D texture, bound and ready to draw with.
pub struct ManagedTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    /// Texture and sampler for bind group 2 of the planet pipeline.
    pub bind_group: wgpu::BindGroup,
    /// Width and height in texels.
    pub dimensions: (u32, u32),
    pub mip_level_count: u32,
}

/// Why an image could not become a texture.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// The image file could not be opened or decoded.
    #[error("failed to decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Empty, or larger than the device allows in either direction.
    #[error(
        "image {} is {width}x{height}; textures must be between 1 and {max} texels per side",
        path.display()
    )]
    UnsupportedDimensions {
        path: PathBuf,
        width: u32,
        height: u32,
        max: u32,
    },
}

/// Decode an image file into tightly packed RGBA8 pixels.
pub fn decode_rgba(path: &Path) -> Result<image::RgbaImage, TextureError> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Calculates the number of mip levels for the given dimensions.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    width.max(height).max(1).ilog2() + 1
}

/// Reject images the device cannot hold as a single 2D texture.
pub fn check_dimensions(path: &Path, width: u32, height: u32, max: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 || width > max || height > max {
        return Err(TextureError::UnsupportedDimensions {
            path: path.to_path_buf(),
            width,
            height,
            max,
        });
    }
    Ok(())
}

/// Loads images as mipmapped sRGB textures sharing one repeat-wrapping
/// linear sampler, and keeps them until [`destroy_all`](TextureManager::destroy_all).
pub struct TextureManager {
    textures: HashMap<String, Arc<ManagedTexture>>,
    sampler: wgpu::Sampler,
    bind_group_layout: wgpu::BindGroupLayout,
    mip_pipeline: wgpu::RenderPipeline,
    mip_bind_group_layout: wgpu::BindGroupLayout,
    mip_sampler: wgpu::Sampler,
}

/// Fullscreen-triangle downsample used to fill each mip level from the one above.
const MIP_SHADER_SOURCE: &str = r#"
@group(0) @binding(0) var src_texture: texture_2d<f32>;
@group(0) @binding(1) var src_sampler: sampler;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) idx: u32) -> VertexOutput {
    let uv = vec2<f32>(f32((idx << 1u) & 2u), f32(idx & 2u));
    var out: VertexOutput;
    out.position = vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(uv.x, 1.0 - uv.y);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(src_texture, src_sampler, in.uv);
}
"#;

/// Bind group layout for a texture view at binding 0 and its sampler at binding 1.
pub(crate) fn create_texture_bind_group_layout(
    device: &wgpu::Device,
    label: &str,
    view_dimension: wgpu::TextureViewDimension,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

fn texture_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

impl TextureManager {
    pub fn new(device: &wgpu::Device) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("planet-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });
        let bind_group_layout = create_texture_bind_group_layout(
            device,
            "planet-texture-bgl",
            wgpu::TextureViewDimension::D2,
        );

        let mip_bind_group_layout =
            create_texture_bind_group_layout(device, "mip-bgl", wgpu::TextureViewDimension::D2);
        let mip_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mip-shader"),
            source: wgpu::ShaderSource::Wgsl(MIP_SHADER_SOURCE.into()),
        });
        let mip_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mip-pipeline-layout"),
            bind_group_layouts: &[&mip_bind_group_layout],
            immediate_size: 0,
        });
        // Every loaded texture shares COLOR_FORMAT, so one pipeline serves all.
        let mip_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mip-pipeline"),
            layout: Some(&mip_layout),
            vertex: wgpu::VertexState {
                module: &mip_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &mip_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(COLOR_FORMAT.into())],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });
        let mip_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("mip-sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            textures: HashMap::new(),
            sampler,
            bind_group_layout,
            mip_pipeline,
            mip_bind_group_layout,
            mip_sampler,
        }
    }

    /// Decode `path` and upload it with a full mip chain. A name that was
    /// already loaded returns the cached texture.
    pub fn load_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        path: &Path,
    ) -> Result<Arc<ManagedTexture>, TextureError> {
        if let Some(existing) = self.textures.get(name) {
            return Ok(Arc::clone(existing));
        }

        let image = decode_rgba(path)?;
        let (width, height) = image.dimensions();
        check_dimensions(path, width, height, device.limits().max_texture_dimension_2d)?;

        let mip_levels = mip_level_count(width, height);
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(name),
            size,
            mip_level_count: mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        queue.write_texture(
            texture.as_image_copy(),
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: None,
            },
            size,
        );
        self.fill_mip_chain(device, queue, &texture, mip_levels);

        log::info!("Loaded texture '{name}' from {} ({width}x{height}, {mip_levels} mips)", path.display());
        Ok(self.insert(device, name, texture, (width, height), mip_levels))
    }

    /// Like [`load_texture`](Self::load_texture), but a failed load is logged
    /// and replaced by a 1×1 [`PLACEHOLDER_TEXEL`] texture.
    pub fn load_texture_or_placeholder(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        path: &Path,
    ) -> Arc<ManagedTexture> {
        match self.load_texture(device, queue, name, path) {
            Ok(texture) => texture,
            Err(err) => {
                log::warn!("Texture '{name}' unavailable, using placeholder: {err}");
                self.placeholder(device, queue, name)
            }
        }
    }

    /// The shared bind group layout for texture + sampler pairs.
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Destroy every loaded GPU texture and forget it.
    pub fn destroy_all(&mut self) {
        for (name, texture) in self.textures.drain() {
            log::debug!("Destroying texture '{name}'");
            texture.texture.destroy();
        }
    }

    fn placeholder(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
    ) -> Arc<ManagedTexture> {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(name),
            size: wgpu::Extent3d::default(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            texture.as_image_copy(),
            &PLACEHOLDER_TEXEL,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: None,
            },
            wgpu::Extent3d::default(),
        );
        self.insert(device, name, texture, (1, 1), 1)
    }

    fn insert(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        texture: wgpu::Texture,
        dimensions: (u32, u32),
        mip_level_count: u32,
    ) -> Arc<ManagedTexture> {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = texture_bind_group(
            device,
            &format!("{name}-bind-group"),
            &self.bind_group_layout,
            &view,
            &self.sampler,
        );
        let managed = Arc::new(ManagedTexture {
            texture,
            view,
            bind_group,
            dimensions,
            mip_level_count,
        });
        self.textures.insert(name.to_string(), Arc::clone(&managed));
        managed
    }

    /// Render each level from the one above it.
    fn fill_mip_chain(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &wgpu::Texture,
        mip_levels: u32,
    ) {
        if mip_levels < 2 {
            return;
        }
        let level_view = |level: u32| {
            texture.create_view(&wgpu::TextureViewDescriptor {
                base_mip_level: level,
                mip_level_count: Some(1),
                ..Default::default()
            })
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("mip-encoder"),
        });
        for level in 1..mip_levels {
            let source = level_view(level - 1);
            let target = level_view(level);
            let bind_group = texture_bind_group(
                device,
                "mip-bind-group",
                &self.mip_bind_group_layout,
                &source,
                &self.mip_sampler,
            );

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("mip-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                ..Default::default()
            });
            pass.set_pipeline(&self.mip_pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        queue.submit([encoder.finish()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_mipmap_level_count_calculation() {
        assert_eq!(mip_level_count(0, 0), 1);
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(4, 4), 3);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(512, 256), 10);
        assert_eq!(mip_level_count(2048, 1024), 12);
    }

    #[test]
    fn test_decode_rgba_reads_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "earth.png", 8, 4);
        let image = decode_rgba(&path).unwrap();
        assert_eq!(image.dimensions(), (8, 4));
        assert_eq!(image.as_raw().len(), 8 * 4 * 4);
        assert_eq!(image.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_missing_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sun.jpg");
        match decode_rgba(&path) {
            Err(TextureError::Decode { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected Decode error, got {:?}", other.map(|i| i.dimensions())),
        }
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(matches!(
            decode_rgba(&path),
            Err(TextureError::Decode { .. })
        ));
    }

    #[test]
    fn test_check_dimensions_bounds() {
        let path = Path::new("earth.png");
        assert!(check_dimensions(path, 1, 1, 8192).is_ok());
        assert!(check_dimensions(path, 8192, 4096, 8192).is_ok());
        for (w, h) in [(0, 4), (4, 0), (8193, 1), (1, 8193)] {
            match check_dimensions(path, w, h, 8192) {
                Err(TextureError::UnsupportedDimensions {
                    width, height, max, ..
                }) => assert_eq!((width, height, max), (w, h, 8192)),
                other => panic!("{w}x{h} accepted: {other:?}"),
            }
        }
    }

    #[test]
    fn test_load_texture_generates_mipmaps() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "earth.png", 64, 32);
        let mut manager = TextureManager::new(&device);

        let tex = manager.load_texture(&device, &queue, "earth", &path).unwrap();
        assert_eq!(tex.dimensions, (64, 32));
        assert_eq!(tex.mip_level_count, 7);
        assert_eq!(tex.texture.format(), COLOR_FORMAT);
    }

    #[test]
    fn test_texture_cache_deduplicates() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "sun.png", 2, 2);
        let mut manager = TextureManager::new(&device);

        let first = manager.load_texture(&device, &queue, "sun", &path).unwrap();
        let second = manager.load_texture(&device, &queue, "sun", &path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_missing_image_falls_back_to_placeholder() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let mut manager = TextureManager::new(&device);

        let tex = manager.load_texture_or_placeholder(
            &device,
            &queue,
            "sun",
            &dir.path().join("sun.jpg"),
        );
        assert_eq!(tex.dimensions, (1, 1));
        assert_eq!(tex.mip_level_count, 1);
    }

    #[test]
    fn test_image_wider_than_device_limit_falls_back_to_placeholder() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let max = device.limits().max_texture_dimension_2d;
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "wide.png", max + 1, 1);
        let mut manager = TextureManager::new(&device);

        assert!(matches!(
            manager.load_texture(&device, &queue, "wide", &path),
            Err(TextureError::UnsupportedDimensions { .. })
        ));
        let tex = manager.load_texture_or_placeholder(&device, &queue, "wide", &path);
        assert_eq!(tex.dimensions, (1, 1));
    }

    #[test]
    fn test_destroy_all_forgets_textures() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "earth.png", 4, 4);
        let mut manager = TextureManager::new(&device);

        let before = manager.load_texture(&device, &queue, "earth", &path).unwrap();
        manager.destroy_all();
        let after = manager.load_texture(&device, &queue, "earth", &path).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
    }
}
