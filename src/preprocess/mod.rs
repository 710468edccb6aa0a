//! Brightness-domain preprocessing.
//!
//! Both the reference image and every fragment variant go through the same
//! three steps before correlation:
//!
//! 1. unsharp mask: `original_weight * img + blurred_weight * gaussian(img)`,
//!    per channel, rounded and clamped to `[0, 255]`;
//! 2. luma conversion `0.299 R + 0.587 G + 0.114 B`;
//! 3. mean centering, leaving a float buffer whose samples sum to ~0.

mod blur;

pub use blur::{gaussian_blur_u8, gaussian_kernel};

use crate::image::{BrightnessBuffer, ColorImage, GrayImage, ImageView};
use crate::trace::trace_span;
use crate::util::math::saturate_u8;
use crate::util::{FragMatchError, FragMatchResult};

/// Preprocessing parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct PreprocessConfig {
    /// Apply the unsharp mask before grayscale conversion.
    pub sharpen: bool,
    /// Gaussian kernel size (odd).
    pub blur_kernel: usize,
    /// Weight of the original image in the unsharp mask.
    pub original_weight: f32,
    /// Weight of the blurred image in the unsharp mask.
    pub blurred_weight: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            sharpen: true,
            blur_kernel: 9,
            original_weight: 4.0,
            blurred_weight: -3.0,
        }
    }
}

impl PreprocessConfig {
    /// Checks that the parameters describe a usable filter.
    pub fn validate(&self) -> FragMatchResult<()> {
        if self.blur_kernel == 0 || self.blur_kernel % 2 == 0 {
            return Err(FragMatchError::InvalidConfig {
                reason: "blur kernel size must be odd and positive",
            });
        }
        if !self.original_weight.is_finite() || !self.blurred_weight.is_finite() {
            return Err(FragMatchError::InvalidConfig {
                reason: "unsharp weights must be finite",
            });
        }
        Ok(())
    }
}

/// Sharpens one 8-bit plane with an unsharp mask.
pub fn unsharp_mask(src: ImageView<'_, u8>, cfg: &PreprocessConfig) -> FragMatchResult<GrayImage> {
    cfg.validate()?;
    let blurred = gaussian_blur_u8(src, cfg.blur_kernel)?;
    let mut out = Vec::with_capacity(src.width() * src.height());
    for (row, blurred_row) in src.rows().zip(blurred.view().rows()) {
        for (&v, &b) in row.iter().zip(blurred_row) {
            let value = cfg.original_weight * f32::from(v) + cfg.blurred_weight * f32::from(b);
            out.push(saturate_u8(value));
        }
    }
    GrayImage::new(out, src.width(), src.height())
}

/// Sharpens every channel of a color image independently.
pub fn sharpen_color(img: &ColorImage, cfg: &PreprocessConfig) -> FragMatchResult<ColorImage> {
    let r = unsharp_mask(img.plane(0)?.view(), cfg)?;
    let g = unsharp_mask(img.plane(1)?.view(), cfg)?;
    let b = unsharp_mask(img.plane(2)?.view(), cfg)?;
    ColorImage::from_planes([&r, &g, &b])
}

/// Converts RGB to 8-bit luma with the standard weights.
pub fn to_grayscale(img: &ColorImage) -> FragMatchResult<GrayImage> {
    let data = img
        .data()
        .chunks_exact(ColorImage::CHANNELS)
        .map(|px| {
            let luma =
                0.299 * f32::from(px[0]) + 0.587 * f32::from(px[1]) + 0.114 * f32::from(px[2]);
            saturate_u8(luma)
        })
        .collect();
    GrayImage::new(data, img.width(), img.height())
}

/// Subtracts the buffer's own mean from every sample and returns that mean.
///
/// The mean is accumulated in `f64`; samples are not clamped afterwards.
pub fn center_brightness(buffer: &mut BrightnessBuffer) -> f32 {
    let data = buffer.data_mut();
    let sum: f64 = data.iter().map(|&v| f64::from(v)).sum();
    let mean = (sum / data.len() as f64) as f32;
    for v in data.iter_mut() {
        *v -= mean;
    }
    mean
}

/// Runs the full pipeline on a color image.
pub fn preprocess(img: &ColorImage, cfg: &PreprocessConfig) -> FragMatchResult<BrightnessBuffer> {
    let _span = trace_span!("preprocess", width = img.width(), height = img.height()).entered();
    let gray = if cfg.sharpen {
        to_grayscale(&sharpen_color(img, cfg)?)?
    } else {
        cfg.validate()?;
        to_grayscale(img)?
    };
    let mut buffer = gray.to_brightness();
    center_brightness(&mut buffer);
    Ok(buffer)
}

/// Runs the pipeline on an image that is already single-channel.
///
/// Equivalent to [`preprocess`] on a color image whose three channels are
/// all equal to `view`.
pub fn preprocess_gray(
    view: ImageView<'_, u8>,
    cfg: &PreprocessConfig,
) -> FragMatchResult<BrightnessBuffer> {
    let _span = trace_span!("preprocess", width = view.width(), height = view.height()).entered();
    cfg.validate()?;
    let gray = if cfg.sharpen {
        unsharp_mask(view, cfg)?
    } else {
        GrayImage::from_view(view)?
    };
    let mut buffer = gray.to_brightness();
    center_brightness(&mut buffer);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::{center_brightness, to_grayscale, unsharp_mask, PreprocessConfig};
    use crate::image::{BrightnessBuffer, ColorImage, GrayImage};

    #[test]
    fn luma_uses_standard_weights() {
        let img = ColorImage::new(vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 10, 10, 10], 4, 1).unwrap();
        let gray = to_grayscale(&img).unwrap();
        assert_eq!(gray.data(), &[76, 150, 29, 10]);
    }

    #[test]
    fn centering_yields_zero_mean() {
        let mut buffer = BrightnessBuffer::new(vec![1.0, 2.0, 3.0, 6.0], 2, 2).unwrap();
        let mean = center_brightness(&mut buffer);
        assert!((mean - 3.0).abs() < 1e-6);
        assert_eq!(buffer.data(), &[-2.0, -1.0, 0.0, 3.0]);
    }

    #[test]
    fn unsharp_mask_keeps_flat_regions() {
        let img = GrayImage::new(vec![120u8; 16 * 16], 16, 16).unwrap();
        let sharpened = unsharp_mask(img.view(), &PreprocessConfig::default()).unwrap();
        assert!(sharpened.data().iter().all(|&v| v == 120));
    }

    #[test]
    fn unsharp_mask_overshoots_edges() {
        let img = GrayImage::from_fn(20, 8, |x, _| if x < 10 { 60 } else { 180 }).unwrap();
        let sharpened = unsharp_mask(img.view(), &PreprocessConfig::default()).unwrap();
        let row = &sharpened.data()[3 * 20..4 * 20];
        assert!(row[9] < 60);
        assert!(row[10] > 180);
        assert_eq!(row[0], 60);
        assert_eq!(row[19], 180);
    }

    #[test]
    fn config_rejects_even_kernel() {
        let cfg = PreprocessConfig {
            blur_kernel: 8,
            ..PreprocessConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
