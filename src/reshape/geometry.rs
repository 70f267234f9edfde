//! Uniform scale and centering offsets for the vertical canvas.

/// Output canvas width
pub const CANVAS_WIDTH: u32 = 1080;
/// Output canvas height
pub const CANVAS_HEIGHT: u32 = 1920;

/// Where a scaled source frame lands on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: f64,
    pub width: u32,
    pub height: u32,
    pub x_offset: u32,
    pub y_offset: u32,
}

/// Fit a `frame_width` x `frame_height` frame inside the canvas without
/// cropping.
///
/// Scaled dimensions are truncated, never rounded up, so they can not exceed
/// the canvas; each is at least one pixel. A side that fits exactly fills
/// the canvas even when the scale is not representable.
pub fn fit(frame_width: u32, frame_height: u32) -> Placement {
    let scale = f64::min(
        CANVAS_WIDTH as f64 / frame_width as f64,
        CANVAS_HEIGHT as f64 / frame_height as f64,
    );

    let width = scaled(frame_width, scale).clamp(1, CANVAS_WIDTH);
    let height = scaled(frame_height, scale).clamp(1, CANVAS_HEIGHT);

    Placement {
        scale,
        width,
        height,
        x_offset: (CANVAS_WIDTH - width) / 2,
        y_offset: (CANVAS_HEIGHT - height) / 2,
    }
}

/// Absorbs float error in `side * scale` before truncation
const SCALE_EPSILON: f64 = 1e-9;

fn scaled(side: u32, scale: f64) -> u32 {
    (side as f64 * scale + SCALE_EPSILON) as u32
}
