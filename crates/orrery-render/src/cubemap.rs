//! Six-face cubemap loading.
//!
//! Faces are decoded on the CPU by [`CubemapFaces::decode`] and uploaded as
//! one 6-layer texture by [`CubemapFaces::upload`]. Layer order is
//! +X, −X, +Y, −Y, +Z, −Z. A face that fails to decode is logged and left
//! unset; the texture is still created and the other faces are uploaded.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::texture::decode_rgba;

/// Number of faces in a cube texture.
pub const CUBE_FACE_COUNT: usize = 6;

/// Face labels in layer order, for diagnostics.
pub const CUBE_FACE_LABELS: [&str; CUBE_FACE_COUNT] = ["+X", "-X", "+Y", "-Y", "+Z", "-Z"];

/// Cube texture format. Sky images are authored in sRGB.
pub const CUBEMAP_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Decoded cube faces awaiting upload.
#[derive(Debug)]
pub struct CubemapFaces {
    /// Edge length of every populated face, in texels. Never zero.
    pub face_size: u32,
    /// Square RGBA8 faces of `face_size`; `None` where decoding failed.
    pub faces: [Option<RgbaImage>; CUBE_FACE_COUNT],
}

impl CubemapFaces {
    /// Decode the six face images.
    ///
    /// The face size is the width of the first face that decodes; faces of any
    /// other size are resampled to it. With no decodable face the size is 1.
    pub fn decode<P: AsRef<Path>>(paths: &[P; CUBE_FACE_COUNT]) -> Self {
        let mut decoded: [Option<RgbaImage>; CUBE_FACE_COUNT] = Default::default();
        for (slot, (path, label)) in decoded
            .iter_mut()
            .zip(paths.iter().zip(CUBE_FACE_LABELS))
        {
            match decode_rgba(path.as_ref()) {
                Ok(image) => *slot = Some(image),
                Err(err) => log::warn!("Cubemap face {label} not loaded: {err}"),
            }
        }
        Self::from_images(decoded)
    }

    /// Normalize already-decoded faces to a common square size.
    pub fn from_images(images: [Option<RgbaImage>; CUBE_FACE_COUNT]) -> Self {
        let face_size = images
            .iter()
            .flatten()
            .map(|image| image.width())
            .next()
            .unwrap_or(1)
            .max(1);

        let faces = images.map(|face| {
            face.map(|image| {
                if image.dimensions() == (face_size, face_size) {
                    image
                } else {
                    log::debug!(
                        "Resampling cubemap face {}x{} to {face_size}x{face_size}",
                        image.width(),
                        image.height()
                    );
                    imageops::resize(&image, face_size, face_size, FilterType::Triangle)
                }
            })
        });

        Self { face_size, faces }
    }

    /// Number of faces that decoded successfully.
    pub fn populated_count(&self) -> usize {
        self.faces.iter().filter(|face| face.is_some()).count()
    }

    /// Shrink every face to at most `max_size` texels per side.
    pub fn fit_within(self, max_size: u32) -> Self {
        let max_size = max_size.max(1);
        if self.face_size <= max_size {
            return self;
        }
        log::warn!(
            "Cubemap faces are {0}x{0}, device limit is {max_size}; downscaling",
            self.face_size
        );
        let faces = self.faces.map(|face| {
            face.map(|image| imageops::resize(&image, max_size, max_size, FilterType::Triangle))
        });
        Self {
            face_size: max_size,
            faces,
        }
    }

    /// Upload the faces into a cube texture, downscaled to fit the device.
    /// Unset faces stay zeroed.
    pub fn upload(self, device: &wgpu::Device, queue: &wgpu::Queue, label: &str) -> CubemapTexture {
        let faces = self.fit_within(device.limits().max_texture_dimension_2d);
        let size = faces.face_size;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: CUBE_FACE_COUNT as u32,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: CUBEMAP_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (layer, face) in faces.faces.iter().enumerate() {
            let Some(face) = face else { continue };
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                face.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(size * 4),
                    rows_per_image: Some(size),
                },
                wgpu::Extent3d {
                    width: size,
                    height: size,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("cubemap-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        log::info!(
            "Uploaded cubemap '{label}' ({size}x{size}, {}/{CUBE_FACE_COUNT} faces)",
            faces.populated_count()
        );

        CubemapTexture {
            texture,
            view,
            sampler,
            face_size: size,
        }
    }
}

/// Paths for a cubemap that uses the same image on every face.
pub fn uniform_face_paths(path: &Path) -> [PathBuf; CUBE_FACE_COUNT] {
    std::array::from_fn(|_| path.to_path_buf())
}

/// Decode and upload in one step.
pub fn load_cubemap<P: AsRef<Path>>(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    paths: &[P; CUBE_FACE_COUNT],
) -> CubemapTexture {
    CubemapFaces::decode(paths).upload(device, queue, label)
}

/// Uploaded cube texture with its cube view and clamp-to-edge sampler.
pub struct CubemapTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub face_size: u32,
}

impl CubemapTexture {
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}
