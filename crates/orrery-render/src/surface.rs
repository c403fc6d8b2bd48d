//! Framebuffer size polling.
//!
//! The frame loop reads the window's physical size every iteration and hands
//! it to [`FramebufferSize::poll`], which reports a [`SurfaceResizeEvent`]
//! only when the size actually changed. Zero sizes (minimized windows,
//! Wayland before the first configure) are clamped to 1×1.

/// Minimum surface dimension (prevents zero-size panics).
pub const MIN_SURFACE_DIMENSION: u32 = 1;

/// New physical dimensions after a change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceResizeEvent {
    pub width: u32,
    pub height: u32,
}

/// Last framebuffer size the GPU resources were configured for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FramebufferSize {
    width: u32,
    height: u32,
}

impl FramebufferSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(MIN_SURFACE_DIMENSION),
            height: height.max(MIN_SURFACE_DIMENSION),
        }
    }

    /// Compare against the window's current size and record it.
    pub fn poll(&mut self, width: u32, height: u32) -> Option<SurfaceResizeEvent> {
        let width = width.max(MIN_SURFACE_DIMENSION);
        let height = height.max(MIN_SURFACE_DIMENSION);

        if (width, height) == (self.width, self.height) {
            return None;
        }

        self.width = width;
        self.height = height;
        Some(SurfaceResizeEvent { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}
