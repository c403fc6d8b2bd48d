//! WGSL shader loading and caching.
//!
//! Every program is one `.wgsl` file exposing a [`VERTEX_ENTRY`] and a
//! [`FRAGMENT_ENTRY`] function. Missing files and missing entry points are
//! reported as [`ShaderError`]; WGSL validation errors are raised by wgpu
//! when the module is created.

use log::{debug, info};
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use thiserror::Error;
use wgpu::{ShaderModuleDescriptor, ShaderSource};

/// Vertex stage entry point every program must define.
pub const VERTEX_ENTRY: &str = "vs_main";

/// Fragment stage entry point every program must define.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Error types for shader loading operations.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("shader '{name}' failed to compile: {message}")]
    CompilationFailed { name: String, message: String },

    #[error("shader file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read shader file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("no shader directory configured for file-based loading")]
    NoShaderDir,
}

/// Registry of compiled shader modules keyed by program name.
pub struct ShaderLibrary {
    modules: HashMap<String, Arc<wgpu::ShaderModule>>,
    shader_dir: Option<PathBuf>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
            shader_dir: None,
        }
    }

    /// Set the directory `.wgsl` files are read from.
    pub fn with_shader_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shader_dir = Some(dir.into());
        self
    }

    /// Compile a program from WGSL source and cache it under `name`. A name
    /// that is already cached returns the cached module.
    pub fn load_from_source(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        source: &str,
    ) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        if let Some(module) = self.modules.get(name) {
            debug!("Shader '{}' already loaded", name);
            return Ok(Arc::clone(module));
        }

        let missing = missing_entry_points(source);
        if !missing.is_empty() {
            return Err(ShaderError::CompilationFailed {
                name: name.to_string(),
                message: format!("missing entry point(s): {}", missing.join(", ")),
            });
        }

        let module = Arc::new(device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        }));

        self.modules.insert(name.to_string(), Arc::clone(&module));
        info!("Loaded shader '{}'", name);
        Ok(module)
    }

    /// Compile `<shader_dir>/<filename>` and cache it under `name`.
    pub fn load_from_file(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        filename: &str,
    ) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        let source = self.read_source(filename)?;
        self.load_from_source(device, name, &source)
    }

    /// Read a shader file from the shader directory without compiling it.
    pub fn read_source(&self, filename: &str) -> Result<String, ShaderError> {
        let shader_dir = self.shader_dir.as_ref().ok_or(ShaderError::NoShaderDir)?;
        let path = shader_dir.join(filename);

        debug!("Reading shader file: {:?}", path);

        if !path.is_file() {
            return Err(ShaderError::FileNotFound { path });
        }
        Ok(std::fs::read_to_string(&path)?)
    }

}

impl Default for ShaderLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry points from [`VERTEX_ENTRY`] / [`FRAGMENT_ENTRY`] not declared in `source`.
fn missing_entry_points(source: &str) -> Vec<&'static str> {
    [VERTEX_ENTRY, FRAGMENT_ENTRY]
        .into_iter()
        .filter(|entry| !declares_function(source, entry))
        .collect()
}

fn declares_function(source: &str, name: &str) -> bool {
    source
        .lines()
        .map(|line| line.split("//").next().unwrap_or_default())
        .any(|code| {
            code.split_whitespace()
                .collect::<Vec<_>>()
                .windows(2)
                .any(|w| {
                    w[0] == "fn"
                        && w[1]
                            .strip_prefix(name)
                            .is_some_and(|rest| rest.is_empty() || rest.starts_with('('))
                })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;

    const VALID_SHADER: &str = r#"
        @vertex
        fn vs_main(@builtin(vertex_index) idx: u32) -> @builtin(position) vec4<f32> {
            return vec4<f32>(0.0, 0.0, 0.0, 1.0);
        }

        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return vec4<f32>(1.0, 0.0, 0.0, 1.0);
        }
    "#;

    const VERTEX_ONLY_SHADER: &str = r#"
        @vertex
        fn vs_main() -> @builtin(position) vec4<f32> {
            return vec4<f32>(0.0);
        }
        // fn fs_main() is not here
    "#;

    #[test]
    fn test_entry_point_detection() {
        assert!(missing_entry_points(VALID_SHADER).is_empty());
        assert_eq!(missing_entry_points(VERTEX_ONLY_SHADER), vec![FRAGMENT_ENTRY]);
        assert_eq!(
            missing_entry_points("fn vs_main_helper() {}"),
            vec![VERTEX_ENTRY, FRAGMENT_ENTRY]
        );
        assert!(declares_function("fn fs_main (x: f32)", "fs_main"));
    }

    #[test]
    fn test_missing_entry_point_is_compilation_failure() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        let result = library.load_from_source(&device, "half", VERTEX_ONLY_SHADER);
        match result {
            Err(ShaderError::CompilationFailed { name, message }) => {
                assert_eq!(name, "half");
                assert!(message.contains("fs_main"));
            }
            other => panic!("expected CompilationFailed, got {other:?}"),
        }
        assert!(library.load_from_source(&device, "half", VALID_SHADER).is_ok());
    }

    #[test]
    fn test_cache_returns_same_module_for_same_name() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        let a = library
            .load_from_source(&device, "shared", VALID_SHADER)
            .unwrap();
        let b = library
            .load_from_source(&device, "shared", VALID_SHADER)
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_read_without_shader_dir_returns_error() {
        let library = ShaderLibrary::new();
        assert!(matches!(
            library.read_source("planet.wgsl"),
            Err(ShaderError::NoShaderDir)
        ));
    }

    #[test]
    fn test_read_missing_file_returns_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let library = ShaderLibrary::new().with_shader_dir(dir.path());
        match library.read_source("planet.wgsl") {
            Err(ShaderError::FileNotFound { path }) => {
                assert_eq!(path, dir.path().join("planet.wgsl"));
            }
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_read_source_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("skybox.wgsl"), VALID_SHADER).unwrap();
        let library = ShaderLibrary::new().with_shader_dir(dir.path());
        let source = library.read_source("skybox.wgsl").unwrap();
        assert!(source.contains("fn fs_main"));
    }
}
