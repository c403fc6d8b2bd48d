//! Window creation and event handling via winit.
//!
//! Provides [`AppState`] which implements winit's [`ApplicationHandler`] trait,
//! and a [`run`] function to start the event loop.

use std::sync::Arc;

use orrery_config::{Config, WindowConfig};
use orrery_render::{Camera, SurfaceError};
use tracing::{debug, error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::error::AppError;
use crate::frame_loop::{FrameLoop, LoopPhase};
use crate::input::scroll_lines;
use crate::renderer::SceneRenderer;
use crate::scene::SceneState;

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &WindowConfig) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.width as f64,
            config.height as f64,
        ))
}

/// Application state driven by the winit event loop.
///
/// Everything lives here: scene angles, camera, and (once the window exists)
/// the GPU resources. Event handlers receive it by `&mut self`.
pub struct AppState {
    config: Config,
    frame_loop: FrameLoop,
    scene: SceneState,
    camera: Camera,
    window: Option<Arc<Window>>,
    renderer: Option<SceneRenderer>,
    setup_error: Option<AppError>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let camera = Camera::new(config.window.width, config.window.height);
        Self {
            config,
            frame_loop: FrameLoop::new(),
            scene: SceneState::new(),
            camera,
            window: None,
            renderer: None,
            setup_error: None,
        }
    }

    pub fn phase(&self) -> LoopPhase {
        self.frame_loop.phase()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Take the error that aborted setup, if any.
    pub fn take_setup_error(&mut self) -> Option<AppError> {
        self.setup_error.take()
    }

    fn setup(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window = Arc::new(
            event_loop.create_window(window_attributes_from_config(&self.config.window))?,
        );
        let size = window.inner_size();
        self.camera.set_viewport(size.width, size.height);
        info!(
            "Window created: {}x{} (scale: {:.2})",
            size.width,
            size.height,
            window.scale_factor()
        );

        let renderer = SceneRenderer::new(window.clone(), &self.config.assets, &self.camera)?;
        self.renderer = Some(renderer);
        self.window = Some(window);
        Ok(())
    }

    /// Scroll zooms the camera; the new projection is uploaded right away.
    fn handle_scroll(&mut self, lines: f32) {
        let zoom = self.camera.on_scroll(lines);
        debug!("Zoom {zoom:.1}");
        if let Some(renderer) = &self.renderer {
            renderer.update_camera(&self.camera);
        }
    }

    /// One frame: advance, poll the framebuffer, draw, present.
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if !self.frame_loop.is_running() {
            return;
        }
        let (Some(window), Some(renderer)) = (&self.window, &mut self.renderer) else {
            return;
        };

        self.scene.advance();

        let size = window.inner_size();
        if let Some(resize) = renderer.poll_resize(size.width, size.height) {
            self.camera.set_viewport(resize.width, resize.height);
            renderer.update_camera(&self.camera);
        }

        match renderer.render_frame(&self.scene) {
            Ok(()) => self.frame_loop.record_frame(),
            Err(SurfaceError::Lost) => {
                warn!("Surface lost, reconfiguring");
                renderer.reconfigure_surface();
            }
            Err(SurfaceError::Timeout) => {
                warn!("Surface timeout, skipping frame");
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                self.shutdown();
                event_loop.exit();
                return;
            }
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    /// Release GPU resources. Safe to call more than once.
    fn shutdown(&mut self) {
        if !self.frame_loop.transition(LoopPhase::ShuttingDown) {
            return;
        }
        if let Some(fps) = self.frame_loop.average_fps() {
            info!(
                "Presented {} frames ({fps:.1} fps average)",
                self.frame_loop.frame_count()
            );
        }
        if let Some(renderer) = self.renderer.take() {
            renderer.destroy();
        }
        self.window = None;
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.frame_loop.phase() != LoopPhase::Setup {
            return;
        }

        match self.setup(event_loop) {
            Ok(()) => {
                self.frame_loop.transition(LoopPhase::Running);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            Err(err) => {
                error!("Setup failed: {err}");
                self.setup_error = Some(err);
                self.shutdown();
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                // Applied on the next redraw by framebuffer polling.
                debug!("Window resized to {}x{}", new_size.width, new_size.height);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.handle_scroll(scroll_lines(delta));
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

/// Creates an event loop and runs the orrery with the given config.
///
/// Blocks until the window is closed. Returns the first fatal error, which
/// includes any failure during window or GPU setup.
#[instrument(skip_all)]
pub fn run(config: Config) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(config);
    event_loop.run_app(&mut app)?;
    match app.take_setup_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
