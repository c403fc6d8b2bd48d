//! Device, queue and window surface.
//!
//! [`RenderContext::new`] picks an adapter that can present to the window,
//! opens a device with default limits and configures the surface for vsync
//! in an sRGB format. [`RenderContext::get_current_texture`] hides the
//! reconfigure-and-retry dance behind the small [`SurfaceError`] enum.

use std::sync::Arc;
use winit::window::Window;

/// Why the GPU could not be brought up.
#[derive(Debug, thiserror::Error)]
pub enum RenderContextError {
    #[error("no GPU adapter can present to this window")]
    NoAdapter,

    #[error("GPU device request failed: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("window surface creation failed: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
}

/// Frame acquisition outcome the frame loop has to act on.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// Still lost after one reconfigure; reconfigure again next frame.
    #[error("surface lost")]
    Lost,

    /// Fatal.
    #[error("out of memory")]
    OutOfMemory,

    /// Skip this frame.
    #[error("timeout")]
    Timeout,
}

pub struct RenderContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
}

fn create_instance() -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    })
}

impl RenderContext {
    pub async fn new(window: Arc<Window>) -> Result<Self, RenderContextError> {
        let instance = create_instance();
        let size = window.inner_size();
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderContextError::NoAdapter)?;
        let info = adapter.get_info();
        log::info!("Using {} via {:?} ({:?})", info.name, info.backend, info.device_type);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("orrery-device"),
                ..Default::default()
            })
            .await?;

        let config = surface_config(&surface.get_capabilities(&adapter), size.width, size.height);
        log::debug!(
            "Surface {:?} {:?} {}x{}",
            config.format,
            config.present_mode,
            config.width,
            config.height
        );
        surface.configure(&device, &config);

        Ok(Self {
            device,
            queue,
            surface,
            config,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Configured surface size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigure at a new size; zero is raised to 1.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
    }

    /// Acquire the next frame. A lost or outdated surface is reconfigured and
    /// acquisition retried once.
    pub fn get_current_texture(&self) -> Result<wgpu::SurfaceTexture, SurfaceError> {
        let err = match self.surface.get_current_texture() {
            Ok(frame) => return Ok(frame),
            Err(err) => err,
        };
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                log::warn!("Surface {err:?}, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                self.surface
                    .get_current_texture()
                    .map_err(|_| SurfaceError::Lost)
            }
            wgpu::SurfaceError::OutOfMemory => Err(SurfaceError::OutOfMemory),
            wgpu::SurfaceError::Timeout => Err(SurfaceError::Timeout),
            wgpu::SurfaceError::Other => {
                log::error!("Surface acquisition failed: {err}");
                Err(SurfaceError::Lost)
            }
        }
    }
}

/// Blocking wrapper around [`RenderContext::new`].
pub fn init_render_context_blocking(
    window: Arc<Window>,
) -> Result<RenderContext, RenderContextError> {
    pollster::block_on(RenderContext::new(window))
}

/// Surface settings for the given capabilities: an sRGB format, Fifo when
/// offered, the first alpha mode, and a size of at least 1×1.
fn surface_config(
    caps: &wgpu::SurfaceCapabilities,
    width: u32,
    height: u32,
) -> wgpu::SurfaceConfiguration {
    let present_mode = if caps.present_modes.is_empty()
        || caps.present_modes.contains(&wgpu::PresentMode::Fifo)
    {
        wgpu::PresentMode::Fifo
    } else {
        caps.present_modes[0]
    };
    wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: pick_srgb_format(&caps.formats),
        width: width.max(1),
        height: height.max(1),
        present_mode,
        alpha_mode: caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto),
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    }
}

const PREFERRED_FORMATS: [wgpu::TextureFormat; 2] = [
    wgpu::TextureFormat::Bgra8UnormSrgb,
    wgpu::TextureFormat::Rgba8UnormSrgb,
];

fn pick_srgb_format(formats: &[wgpu::TextureFormat]) -> wgpu::TextureFormat {
    PREFERRED_FORMATS
        .into_iter()
        .find(|f| formats.contains(f))
        .or_else(|| formats.iter().copied().find(|f| f.is_srgb()))
        .or_else(|| formats.first().copied())
        .unwrap_or(PREFERRED_FORMATS[0])
}

/// Headless device for GPU-backed unit tests. `None` when no adapter exists.
#[cfg(test)]
pub(crate) fn create_test_device_queue() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let adapter = create_instance()
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .ok()?;
        adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .ok()
    })
}
