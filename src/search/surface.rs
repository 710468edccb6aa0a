//! Correlation surface storage and display normalization.

use crate::image::GrayImage;
use crate::util::{FragMatchError, FragMatchResult};

/// Grid of raw correlation scores, one per fragment placement.
///
/// Cell `(x, y)` holds the score of the fragment placed with its top-left
/// corner at `(x, y)` in the reference.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationSurface {
    scores: Vec<f32>,
    width: usize,
    height: usize,
}

impl CorrelationSurface {
    /// Wraps row-major scores holding exactly `width * height` cells.
    ///
    /// Zero-sized surfaces are representable; locating a peak on them fails.
    pub fn new(scores: Vec<f32>, width: usize, height: usize) -> FragMatchResult<Self> {
        let expected = width
            .checked_mul(height)
            .ok_or(FragMatchError::InvalidImage { width, height })?;
        if scores.len() != expected {
            return Err(FragMatchError::BufferSizeMismatch {
                expected,
                got: scores.len(),
            });
        }
        Ok(Self {
            scores,
            width,
            height,
        })
    }

    /// Returns the number of placement columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of placement rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of cells.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Returns true if the surface has no cells.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Returns the row-major scores.
    pub fn scores(&self) -> &[f32] {
        &self.scores
    }

    /// Returns the score at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.scores.get(y * self.width + x).copied()
    }

    /// Returns the scores of placement row `y`.
    pub fn row(&self, y: usize) -> Option<&[f32]> {
        if y >= self.height {
            return None;
        }
        self.scores.get(y * self.width..(y + 1) * self.width)
    }

    /// Returns the smallest and largest finite scores.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.scores
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Rescales the scores linearly to `[0, 255]` for visualization.
    ///
    /// The minimum maps to 0 and the maximum to 255; a constant surface maps
    /// to all zeros. Rescaling is monotonic, so the brightest pixel is the
    /// located match.
    pub fn normalize_to_u8(&self) -> FragMatchResult<GrayImage> {
        let (lo, hi) = self.min_max().ok_or(FragMatchError::EmptySurface)?;
        let range = hi - lo;
        let scale = if range > 0.0 { 255.0 / range } else { 0.0 };
        let data = self
            .scores
            .iter()
            .map(|&v| {
                if v.is_finite() {
                    ((v - lo) * scale).round().clamp(0.0, 255.0) as u8
                } else {
                    0
                }
            })
            .collect();
        GrayImage::new(data, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::CorrelationSurface;
    use crate::util::FragMatchError;

    #[test]
    fn rejects_mismatched_length() {
        let err = CorrelationSurface::new(vec![0.0; 5], 2, 3).err().unwrap();
        assert_eq!(
            err,
            FragMatchError::BufferSizeMismatch {
                expected: 6,
                got: 5
            }
        );
    }

    #[test]
    fn normalization_spans_full_range() {
        let surface = CorrelationSurface::new(vec![-10.0, 0.0, 10.0, 30.0], 2, 2).unwrap();
        let img = surface.normalize_to_u8().unwrap();
        assert_eq!(img.data(), &[0, 64, 128, 255]);
    }

    #[test]
    fn constant_surface_normalizes_to_zero() {
        let surface = CorrelationSurface::new(vec![3.5; 6], 3, 2).unwrap();
        let img = surface.normalize_to_u8().unwrap();
        assert!(img.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn row_access_is_row_major() {
        let surface = CorrelationSurface::new((0..6).map(|v| v as f32).collect(), 3, 2).unwrap();
        assert_eq!(surface.row(1).unwrap(), &[3.0, 4.0, 5.0]);
        assert_eq!(surface.get(2, 0), Some(2.0));
        assert!(surface.get(3, 0).is_none());
    }
}
