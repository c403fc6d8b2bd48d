//! Mouse wheel normalization.

use winit::event::MouseScrollDelta;

/// Trackpad pixels per wheel line.
pub const PIXELS_PER_LINE: f64 = 40.0;

/// Vertical scroll amount in wheel lines. Positive scrolls away from the user.
pub fn scroll_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_x, y) => y,
        MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn test_line_delta_uses_vertical_axis() {
        assert_eq!(scroll_lines(MouseScrollDelta::LineDelta(3.0, 1.5)), 1.5);
        assert_eq!(scroll_lines(MouseScrollDelta::LineDelta(0.0, -2.0)), -2.0);
    }

    #[test]
    fn test_pixel_delta_is_normalized() {
        let delta = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 80.0));
        assert!((scroll_lines(delta) - 2.0).abs() < f32::EPSILON);

        let delta = MouseScrollDelta::PixelDelta(PhysicalPosition::new(15.0, -20.0));
        assert!((scroll_lines(delta) + 0.5).abs() < f32::EPSILON);
    }
}
