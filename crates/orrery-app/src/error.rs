//! Fatal application errors.

use orrery_render::{RenderContextError, ShaderError};

/// Any failure that stops the orrery before the first frame.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The winit event loop could not be created or exited abnormally.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// The OS refused to create the window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    /// GPU adapter, device or surface setup failed.
    #[error("GPU initialization failed: {0}")]
    RenderContext(#[from] RenderContextError),

    /// A shader program could not be read or compiled.
    #[error("shader setup failed: {0}")]
    Shader(#[from] ShaderError),

    /// Platform directories could not be resolved or created.
    #[error(transparent)]
    Platform(#[from] crate::platform::PlatformError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_shader_error_message() {
        let err: AppError = ShaderError::FileNotFound {
            path: PathBuf::from("assets/shaders/planet.wgsl"),
        }
        .into();
        let message = err.to_string();
        assert!(message.starts_with("shader setup failed"));
        assert!(message.contains("planet.wgsl"));
    }

    #[test]
    fn test_render_context_error_message() {
        let err = AppError::from(RenderContextError::NoAdapter);
        assert_eq!(
            err.to_string(),
            "GPU initialization failed: no compatible GPU adapter found"
        );
    }
}
