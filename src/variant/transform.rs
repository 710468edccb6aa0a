//! Geometric transforms that produce fragment variants.

use crate::image::ColorImage;
use crate::util::math::{saturate_u8, sin_cos_deg};
use crate::util::{FragMatchError, FragMatchResult};

/// Provider of scaled and rotated fragment copies.
pub trait Transform {
    /// Resizes `image` uniformly by `factor`.
    fn scale(&self, image: &ColorImage, factor: f32) -> FragMatchResult<ColorImage>;

    /// Rotates `image` by `angle_deg` about its center, keeping the canvas size.
    fn rotate(&self, image: &ColorImage, angle_deg: f32) -> FragMatchResult<ColorImage>;
}

/// Bilinear resize and rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BilinearTransform {
    /// Color written where a rotated pixel has no source sample.
    pub fill: [u8; 3],
}

impl BilinearTransform {
    /// Creates a transform with the given fill color.
    pub fn new(fill: [u8; 3]) -> Self {
        Self { fill }
    }
}

/// Samples all channels at a clamped fractional source position.
fn sample_bilinear(src: &ColorImage, src_x: f32, src_y: f32) -> [u8; 3] {
    let width = src.width();
    let height = src.height();
    let src_x = src_x.clamp(0.0, (width - 1) as f32);
    let src_y = src_y.clamp(0.0, (height - 1) as f32);
    let x0 = src_x.floor() as usize;
    let y0 = src_y.floor() as usize;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);
    let fx = src_x - x0 as f32;
    let fy = src_y - y0 as f32;

    let data = src.data();
    let at =
        |x: usize, y: usize, c: usize| f32::from(data[(y * width + x) * ColorImage::CHANNELS + c]);

    let w00 = (1.0 - fx) * (1.0 - fy);
    let w10 = fx * (1.0 - fy);
    let w01 = (1.0 - fx) * fy;
    let w11 = fx * fy;
    let mut out = [0u8; 3];
    for (c, slot) in out.iter_mut().enumerate() {
        let value =
            at(x0, y0, c) * w00 + at(x1, y0, c) * w10 + at(x0, y1, c) * w01 + at(x1, y1, c) * w11;
        *slot = saturate_u8(value);
    }
    out
}

impl Transform for BilinearTransform {
    /// The output is `floor(w * factor) x floor(h * factor)`; destination pixel
    /// centers map to `(x + 0.5) / factor - 0.5` in the source.
    fn scale(&self, image: &ColorImage, factor: f32) -> FragMatchResult<ColorImage> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(FragMatchError::InvalidConfig {
                reason: "scale factor must be finite and positive",
            });
        }
        let width = (image.width() as f32 * factor) as usize;
        let height = (image.height() as f32 * factor) as usize;
        if width == 0 || height == 0 {
            return Err(FragMatchError::InvalidImage { width, height });
        }
        let inv_x = image.width() as f32 / width as f32;
        let inv_y = image.height() as f32 / height as f32;

        let mut out = Vec::with_capacity(width * height * ColorImage::CHANNELS);
        for y in 0..height {
            let src_y = (y as f32 + 0.5) * inv_y - 0.5;
            for x in 0..width {
                let src_x = (x as f32 + 0.5) * inv_x - 0.5;
                out.extend_from_slice(&sample_bilinear(image, src_x, src_y));
            }
        }
        ColorImage::new(out, width, height)
    }

    /// Rotation is about `cx = (w - 1) / 2`, `cy = (h - 1) / 2`; positive
    /// angles turn the content counter-clockwise as displayed (y axis down).
    /// Each destination pixel is mapped back with the inverse rotation; pixels
    /// whose source falls outside the image are filled with `fill`.
    fn rotate(&self, image: &ColorImage, angle_deg: f32) -> FragMatchResult<ColorImage> {
        if !angle_deg.is_finite() {
            return Err(FragMatchError::InvalidConfig {
                reason: "rotation angle must be finite",
            });
        }
        let width = image.width();
        let height = image.height();
        let (sin_a, cos_a) = sin_cos_deg(angle_deg);
        let cx = (width as f32 - 1.0) * 0.5;
        let cy = (height as f32 - 1.0) * 0.5;
        let max_x = width as f32 - 1.0;
        let max_y = height as f32 - 1.0;
        let epsilon = 1e-4;

        let mut out = Vec::with_capacity(width * height * ColorImage::CHANNELS);
        for y in 0..height {
            for x in 0..width {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                let src_x = cos_a * dx - sin_a * dy + cx;
                let src_y = sin_a * dx + cos_a * dy + cy;

                if src_x < -epsilon
                    || src_y < -epsilon
                    || src_x > max_x + epsilon
                    || src_y > max_y + epsilon
                {
                    out.extend_from_slice(&self.fill);
                    continue;
                }
                out.extend_from_slice(&sample_bilinear(image, src_x, src_y));
            }
        }
        ColorImage::new(out, width, height)
    }
}
