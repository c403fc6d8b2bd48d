//! Every GPU resource the scene needs, created once and destroyed once.

use std::sync::Arc;

use orrery_config::AssetConfig;
use orrery_mesh::generate_uv_sphere;
use orrery_render::{
    BufferAllocator, Camera, DepthBuffer, FrameEncoder, FramebufferSize, ManagedTexture,
    MeshBuffer, ModelUniform, PlanetPipeline, RenderContext, RenderPassBuilder, SELECTOR_EARTH,
    SELECTOR_SUN, SPACE_BLUE, ShaderLibrary, SkyboxRenderer, SurfaceError, SurfaceResizeEvent,
    TextureManager, UniformBinding, draw_planet, init_render_context_blocking, load_cubemap,
    uniform_face_paths,
};
use tracing::{debug, info};
use winit::window::Window;

use crate::error::AppError;
use crate::scene::{EARTH_RADIUS, SPHERE_SLICES, SPHERE_STACKS, SUN_RADIUS, SceneState};

pub const PLANET_SHADER_FILE: &str = "planet.wgsl";
pub const SKYBOX_SHADER_FILE: &str = "skybox.wgsl";

/// GPU side of the orrery.
pub struct SceneRenderer {
    gpu: RenderContext,
    framebuffer: FramebufferSize,
    depth: DepthBuffer,
    textures: TextureManager,
    planet_pipeline: PlanetPipeline,
    skybox: SkyboxRenderer,
    camera_uniform: UniformBinding,
    sun_uniform: UniformBinding,
    earth_uniform: UniformBinding,
    sun_texture: Arc<ManagedTexture>,
    earth_texture: Arc<ManagedTexture>,
    sun_mesh: MeshBuffer,
    earth_mesh: MeshBuffer,
}

impl SceneRenderer {
    /// Initialize the GPU against `window` and build all scene resources.
    ///
    /// Missing shader files are fatal. Missing or undecodable images are not:
    /// they fall back to placeholders with a warning.
    pub fn new(
        window: Arc<Window>,
        assets: &AssetConfig,
        camera: &Camera,
    ) -> Result<Self, AppError> {
        let inner_size = window.inner_size();
        let gpu = init_render_context_blocking(window)?;
        let device = &gpu.device;
        let queue = &gpu.queue;

        let mut shaders = ShaderLibrary::new().with_shader_dir(assets.shader_dir());
        let planet_shader = shaders.load_from_file(device, "planet", PLANET_SHADER_FILE)?;
        let skybox_shader = shaders.load_from_file(device, "skybox", SKYBOX_SHADER_FILE)?;

        let mut textures = TextureManager::new(device);
        let sun_texture =
            textures.load_texture_or_placeholder(device, queue, "sun", &assets.sun_path());
        let earth_texture =
            textures.load_texture_or_placeholder(device, queue, "earth", &assets.earth_path());

        let cubemap = load_cubemap(
            device,
            queue,
            "skybox-cubemap",
            &uniform_face_paths(&assets.sky_path()),
        );
        let skybox = SkyboxRenderer::new(
            device,
            &skybox_shader,
            gpu.surface_format(),
            cubemap,
            &camera.to_skybox_uniform(),
        );

        let planet_pipeline = PlanetPipeline::new(
            device,
            &planet_shader,
            gpu.surface_format(),
            textures.bind_group_layout(),
        );
        let camera_uniform = planet_pipeline.create_camera_binding(device, &camera.to_uniform());
        let initial_scene = SceneState::new();
        let sun_uniform = planet_pipeline.create_model_binding(
            device,
            "sun-model",
            &ModelUniform::new(initial_scene.sun_model(), SELECTOR_SUN),
        );
        let earth_uniform = planet_pipeline.create_model_binding(
            device,
            "earth-model",
            &ModelUniform::new(initial_scene.earth_model(), SELECTOR_EARTH),
        );

        let allocator = BufferAllocator::new(device);
        let sun_mesh = allocator.create_sphere(
            "sun",
            &generate_uv_sphere(SUN_RADIUS, SPHERE_SLICES, SPHERE_STACKS),
        );
        let earth_mesh = allocator.create_sphere(
            "earth",
            &generate_uv_sphere(EARTH_RADIUS, SPHERE_SLICES, SPHERE_STACKS),
        );

        let (width, height) = gpu.size();
        let depth = DepthBuffer::new(device, width, height);
        let framebuffer = FramebufferSize::new(inner_size.width, inner_size.height);

        info!(
            "Scene ready: {}x{} surface, sun {:?}, earth {:?}, skybox faces {}px",
            width,
            height,
            sun_texture.dimensions,
            earth_texture.dimensions,
            skybox.face_size()
        );

        Ok(Self {
            gpu,
            framebuffer,
            depth,
            textures,
            planet_pipeline,
            skybox,
            camera_uniform,
            sun_uniform,
            earth_uniform,
            sun_texture,
            earth_texture,
            sun_mesh,
            earth_mesh,
        })
    }

    /// Compare the window's current framebuffer size against the configured
    /// one; on change, reconfigure the surface and resize the depth buffer.
    pub fn poll_resize(&mut self, width: u32, height: u32) -> Option<SurfaceResizeEvent> {
        let resize = self.framebuffer.poll(width, height)?;
        self.gpu.resize(resize.width, resize.height);
        self.depth
            .resize(&self.gpu.device, resize.width, resize.height);
        debug!("Framebuffer resized to {}x{}", resize.width, resize.height);
        Some(resize)
    }

    /// Upload the camera's matrices to both the planet and skybox uniforms.
    pub fn update_camera(&self, camera: &Camera) {
        self.camera_uniform.write(&self.gpu.queue, &camera.to_uniform());
        self.skybox.update(&self.gpu.queue, &camera.to_skybox_uniform());
    }

    /// Reconfigure the surface at the last polled size.
    pub fn reconfigure_surface(&mut self) {
        self.gpu
            .resize(self.framebuffer.width(), self.framebuffer.height());
    }

    /// Draw one frame: clear, skybox, sun, earth, present.
    pub fn render_frame(&self, scene: &SceneState) -> Result<(), SurfaceError> {
        let queue = &self.gpu.queue;
        self.sun_uniform
            .write(queue, &ModelUniform::new(scene.sun_model(), SELECTOR_SUN));
        self.earth_uniform
            .write(queue, &ModelUniform::new(scene.earth_model(), SELECTOR_EARTH));

        let surface_texture = self.gpu.get_current_texture()?;
        let mut frame = FrameEncoder::new(&self.gpu.device, queue, surface_texture);
        let pass_builder = RenderPassBuilder::new()
            .clear_color(SPACE_BLUE)
            .depth(self.depth.view.clone(), DepthBuffer::CLEAR_VALUE)
            .label("scene-pass");

        {
            let mut pass = frame.begin_render_pass(&pass_builder);
            self.skybox.render(&mut pass);
            draw_planet(
                &mut pass,
                &self.planet_pipeline,
                &self.camera_uniform.bind_group,
                &self.sun_uniform.bind_group,
                &self.sun_texture.bind_group,
                &self.sun_mesh,
            );
            draw_planet(
                &mut pass,
                &self.planet_pipeline,
                &self.camera_uniform.bind_group,
                &self.earth_uniform.bind_group,
                &self.earth_texture.bind_group,
                &self.earth_mesh,
            );
        }

        frame.submit();
        Ok(())
    }

    /// Release every buffer and texture, then drop the render context.
    pub fn destroy(mut self) {
        self.sun_mesh.destroy();
        self.earth_mesh.destroy();
        self.skybox.destroy();
        self.camera_uniform.destroy();
        self.sun_uniform.destroy();
        self.earth_uniform.destroy();
        self.textures.destroy_all();
        self.depth.destroy();
        info!("GPU resources released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn repo_assets() -> AssetConfig {
        AssetConfig {
            root: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets"),
            ..AssetConfig::default()
        }
    }

    #[test]
    fn test_bundled_shaders_declare_entry_points() {
        let shaders = ShaderLibrary::new().with_shader_dir(repo_assets().shader_dir());
        for file in [PLANET_SHADER_FILE, SKYBOX_SHADER_FILE] {
            let source = shaders
                .read_source(file)
                .unwrap_or_else(|e| panic!("{file}: {e}"));
            assert!(source.contains("fn vs_main"), "{file} lacks vs_main");
            assert!(source.contains("fn fs_main"), "{file} lacks fs_main");
        }
    }

    #[test]
    fn test_planet_shader_outputs_texel_without_lighting() {
        let shaders = ShaderLibrary::new().with_shader_dir(repo_assets().shader_dir());
        let source = shaders.read_source(PLANET_SHADER_FILE).unwrap();
        let fragment = source
            .split("fn fs_main")
            .nth(1)
            .expect("planet.wgsl has a fragment entry point");
        assert!(fragment.contains("textureSample(body_texture, body_sampler, in.uv)"));
        for lighting in ["normal", "dot(", "AMBIENT", "texture_selector"] {
            assert!(!fragment.contains(lighting), "fragment stage uses {lighting}");
        }
        assert!(source.contains("texture_selector: u32"));
    }
}
