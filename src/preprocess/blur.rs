//! Separable Gaussian blur on 8-bit planes.

use crate::image::{GrayImage, ImageView};
use crate::util::math::{gaussian_sigma, reflect_101, saturate_u8};
use crate::util::{FragMatchError, FragMatchResult};

/// Builds a normalized 1D Gaussian kernel of odd length `ksize`.
///
/// Sigma is derived from the kernel size; a size of 1 yields the identity kernel.
pub fn gaussian_kernel(ksize: usize) -> FragMatchResult<Vec<f32>> {
    if ksize == 0 || ksize % 2 == 0 {
        return Err(FragMatchError::InvalidConfig {
            reason: "blur kernel size must be odd and positive",
        });
    }
    let sigma = gaussian_sigma(ksize);
    let half = (ksize / 2) as f64;
    let weights: Vec<f64> = (0..ksize)
        .map(|i| {
            let d = i as f64 - half;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    Ok(weights.into_iter().map(|w| (w / sum) as f32).collect())
}

/// Blurs a grayscale plane with a `ksize x ksize` Gaussian.
///
/// The kernel is applied horizontally then vertically with reflect-101
/// borders; the result is rounded back to 8 bits.
pub fn gaussian_blur_u8(src: ImageView<'_, u8>, ksize: usize) -> FragMatchResult<GrayImage> {
    let kernel = gaussian_kernel(ksize)?;
    let width = src.width();
    let height = src.height();
    let half = (ksize / 2) as isize;

    let mut horizontal = vec![0.0f32; width * height];
    for (y, row) in src.rows().enumerate() {
        let out = &mut horizontal[y * width..(y + 1) * width];
        for (x, cell) in out.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (i, &w) in kernel.iter().enumerate() {
                let sx = reflect_101(x as isize + i as isize - half, width);
                acc += w * f32::from(row[sx]);
            }
            *cell = acc;
        }
    }

    let mut out = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0f32;
            for (i, &w) in kernel.iter().enumerate() {
                let sy = reflect_101(y as isize + i as isize - half, height);
                acc += w * horizontal[sy * width + x];
            }
            out[y * width + x] = saturate_u8(acc);
        }
    }

    GrayImage::new(out, width, height)
}
