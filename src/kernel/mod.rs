//! Correlation kernel implementations.
//!
//! A kernel scores a fragment placement as the raw inner product of the two
//! mean-centered brightness patches:
//!
//! ```text
//! score(x, y) = sum_l sum_k reference[y + l][x + k] * fragment[l][k]
//! ```
//!
//! Sums are accumulated in `f64` in row-major fragment order and stored as
//! `f32`, so every kernel produces bit-identical surfaces.

use crate::search::surface::CorrelationSurface;
use crate::util::{CancelToken, FragMatchError, FragMatchResult};
use crate::ImageView;

/// Kernel trait for full-surface scans.
pub trait Kernel {
    /// Scores every valid placement and returns the full surface.
    fn scan_full(
        reference: ImageView<'_, f32>,
        fragment: ImageView<'_, f32>,
        cancel: &CancelToken,
    ) -> FragMatchResult<CorrelationSurface>;
}

/// Returns the surface dimensions `(W - w + 1, H - h + 1)`.
///
/// Fails with `FragmentTooLarge` if the fragment exceeds the reference in
/// either axis.
pub fn surface_size(
    reference: ImageView<'_, f32>,
    fragment: ImageView<'_, f32>,
) -> FragMatchResult<(usize, usize)> {
    if fragment.width() > reference.width() || fragment.height() > reference.height() {
        return Err(FragMatchError::FragmentTooLarge {
            fragment_width: fragment.width(),
            fragment_height: fragment.height(),
            image_width: reference.width(),
            image_height: reference.height(),
        });
    }
    Ok((
        reference.width() - fragment.width() + 1,
        reference.height() - fragment.height() + 1,
    ))
}

/// Scores placement `(x, y)`; the caller guarantees the fragment fits there.
#[inline]
pub(crate) fn dot_at(
    reference: ImageView<'_, f32>,
    fragment: ImageView<'_, f32>,
    x: usize,
    y: usize,
) -> f32 {
    let ref_data = reference.as_slice();
    let frag_data = fragment.as_slice();
    let width = fragment.width();
    let mut acc = 0.0f64;
    for l in 0..fragment.height() {
        let ref_start = (y + l) * reference.stride() + x;
        let frag_start = l * fragment.stride();
        let ref_row = &ref_data[ref_start..ref_start + width];
        let frag_row = &frag_data[frag_start..frag_start + width];
        for (&r, &f) in ref_row.iter().zip(frag_row) {
            acc += f64::from(r) * f64::from(f);
        }
    }
    acc as f32
}

/// Fills one surface row (placement row `y`).
#[inline]
pub(crate) fn correlate_row(
    reference: ImageView<'_, f32>,
    fragment: ImageView<'_, f32>,
    y: usize,
    out: &mut [f32],
) {
    for (x, cell) in out.iter_mut().enumerate() {
        *cell = dot_at(reference, fragment, x, y);
    }
}

pub mod scalar;

#[cfg(feature = "rayon")]
pub mod rayon;
