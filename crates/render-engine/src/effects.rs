//! Drop shadow: a blurred, tinted copy of the device layer's alpha.
//!
//! The Gaussian blur is approximated by three successive box blurs per axis.
//! Pixels outside the layer count as transparent.

use tiny_skia::Pixmap;

use ollim_common::error::{OllimError, OllimResult};

/// A rendered shadow, larger than its source by `pad` on every side.
#[derive(Debug)]
pub struct ShadowImage {
    pub pixmap: Pixmap,
    pub pad: u32,
}

/// Blur `layer`'s alpha with the given CSS blur radius (in device pixels)
/// and tint it black at `opacity`.
pub fn drop_shadow(layer: &Pixmap, blur_radius: f64, opacity: f64) -> OllimResult<ShadowImage> {
    let sigma = (blur_radius / 2.0).max(0.0);
    let pad = (sigma * 3.0).ceil() as u32;
    let width = layer.width() as usize + 2 * pad as usize;
    let height = layer.height() as usize + 2 * pad as usize;

    let mut alpha = vec![0f32; width * height];
    for (y, row) in layer
        .data()
        .chunks_exact(layer.width() as usize * 4)
        .enumerate()
    {
        let base = (y + pad as usize) * width + pad as usize;
        for (x, pixel) in row.chunks_exact(4).enumerate() {
            alpha[base + x] = pixel[3] as f32;
        }
    }

    if sigma > 0.0 {
        for size in box_sizes(sigma) {
            let radius = (size - 1) / 2;
            box_blur_rows(&mut alpha, width, height, radius);
            let mut transposed = transpose(&alpha, width, height);
            box_blur_rows(&mut transposed, height, width, radius);
            alpha = transpose(&transposed, height, width);
        }
    }

    let mut pixmap = Pixmap::new(width as u32, height as u32)
        .ok_or_else(|| OllimError::render("failed to allocate shadow pixmap"))?;
    let opacity = opacity.clamp(0.0, 1.0) as f32;
    for (pixel, a) in pixmap.data_mut().chunks_exact_mut(4).zip(&alpha) {
        // premultiplied black: color channels stay zero
        pixel[3] = (a * opacity).round().clamp(0.0, 255.0) as u8;
    }

    Ok(ShadowImage { pixmap, pad })
}

/// Box widths whose three-pass convolution approximates a Gaussian.
fn box_sizes(sigma: f64) -> [usize; 3] {
    const PASSES: f64 = 3.0;
    let ideal = (12.0 * sigma * sigma / PASSES + 1.0).sqrt();
    let mut lower = ideal.floor() as usize;
    if lower % 2 == 0 {
        lower = lower.saturating_sub(1).max(1);
    }
    let upper = lower + 2;
    let l = lower as f64;
    let m = ((12.0 * sigma * sigma - PASSES * l * l - 4.0 * PASSES * l - 3.0 * PASSES)
        / (-4.0 * l - 4.0))
        .round()
        .max(0.0) as usize;
    let mut sizes = [upper; 3];
    for size in sizes.iter_mut().take(m.min(3)) {
        *size = lower;
    }
    sizes
}

fn box_blur_rows(buf: &mut [f32], width: usize, height: usize, radius: usize) {
    if radius == 0 {
        return;
    }
    let size = (2 * radius + 1) as f32;
    let mut prefix = vec![0f32; width + 1];
    for row in buf.chunks_exact_mut(width).take(height) {
        for (i, value) in row.iter().enumerate() {
            prefix[i + 1] = prefix[i] + value;
        }
        for (i, value) in row.iter_mut().enumerate() {
            let start = i.saturating_sub(radius);
            let end = (i + radius + 1).min(width);
            *value = (prefix[end] - prefix[start]) / size;
        }
    }
}

fn transpose(buf: &[f32], width: usize, height: usize) -> Vec<f32> {
    let mut out = vec![0f32; buf.len()];
    for y in 0..height {
        for x in 0..width {
            out[x * height + y] = buf[y * width + x];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::{Color, Paint, Rect, Transform};

    fn square_layer(size: u32) -> Pixmap {
        let mut pixmap = Pixmap::new(size, size).unwrap();
        let mut paint = Paint::default();
        paint.set_color(Color::WHITE);
        pixmap.fill_rect(
            Rect::from_xywh(0.0, 0.0, size as f32, size as f32).unwrap(),
            &paint,
            Transform::identity(),
            None,
        );
        pixmap
    }

    #[test]
    fn test_box_sizes_are_odd_and_grow_with_sigma() {
        let small = box_sizes(2.0);
        let large = box_sizes(20.0);
        for size in small.iter().chain(large.iter()) {
            assert_eq!(size % 2, 1);
        }
        assert!(large[0] > small[0]);
    }

    #[test]
    fn test_shadow_pads_and_spreads() {
        let layer = square_layer(20);
        let shadow = drop_shadow(&layer, 10.0, 1.0).unwrap();
        assert_eq!(shadow.pad, 15);
        assert_eq!(shadow.pixmap.width(), 50);

        let alpha_at = |x: u32, y: u32| shadow.pixmap.pixel(x, y).unwrap().alpha();
        let center = alpha_at(25, 25);
        let edge = alpha_at(15, 25);
        let outside = alpha_at(10, 25);
        assert!(center > edge);
        assert!(edge > outside);
        assert!(outside > 0);
        assert_eq!(alpha_at(0, 0), 0);
    }

    #[test]
    fn test_shadow_opacity_scales_alpha() {
        let layer = square_layer(10);
        let shadow = drop_shadow(&layer, 0.0, 0.5).unwrap();
        assert_eq!(shadow.pad, 0);
        let pixel = shadow.pixmap.pixel(5, 5).unwrap();
        assert_eq!(pixel.alpha(), 128);
        assert_eq!(pixel.red(), 0);
    }
}
