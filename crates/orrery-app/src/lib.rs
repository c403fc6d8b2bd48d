//! The orrery application: a textured sun, an earth that spins and orbits
//! it, and a cubemap sky, drawn in a winit window until it is closed.

pub mod error;
pub mod frame_loop;
pub mod input;
pub mod platform;
pub mod renderer;
pub mod scene;
pub mod window;

pub use error::AppError;
pub use frame_loop::{FrameLoop, LoopPhase};
pub use platform::{PlatformDirs, PlatformError};
pub use scene::SceneState;
pub use window::{AppState, run};
