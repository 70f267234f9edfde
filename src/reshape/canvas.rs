//! Black 1080x1920 canvas compositing.

use image::{imageops, RgbImage};

use super::geometry::{Placement, CANVAS_HEIGHT, CANVAS_WIDTH};

/// Place an already scaled frame on a fresh black canvas.
pub fn compose(scaled: &RgbImage, placement: &Placement) -> RgbImage {
    let mut canvas = RgbImage::new(CANVAS_WIDTH, CANVAS_HEIGHT);
    imageops::replace(
        &mut canvas,
        scaled,
        placement.x_offset as i64,
        placement.y_offset as i64,
    );
    canvas
}

/// Copy a packed RGB24 plane with row padding into an image.
pub fn from_strided(width: u32, height: u32, stride: usize, data: &[u8]) -> Option<RgbImage> {
    let row_bytes = width as usize * 3;
    if width == 0 || height == 0 {
        return None;
    }
    if stride < row_bytes || data.len() < stride * (height as usize - 1) + row_bytes {
        return None;
    }

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in data.chunks(stride).take(height as usize) {
        pixels.extend_from_slice(&row[..row_bytes]);
    }
    RgbImage::from_raw(width, height, pixels)
}

/// Copy an image into a packed RGB24 plane with row padding.
pub fn to_strided(image: &RgbImage, stride: usize, data: &mut [u8]) {
    let row_bytes = image.width() as usize * 3;
    for (src, dst) in image
        .as_raw()
        .chunks_exact(row_bytes)
        .zip(data.chunks_mut(stride))
    {
        dst[..row_bytes].copy_from_slice(src);
    }
}
