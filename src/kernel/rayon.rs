//! Rayon-parallel kernel (feature-gated).
//!
//! Parallelizes over placement rows: each task owns one row of the output
//! surface and reads both input buffers immutably. Every cell is computed with
//! the same summation order as the scalar kernel, so surfaces are identical.

use crate::kernel::{correlate_row, surface_size, Kernel};
use crate::search::surface::CorrelationSurface;
use crate::trace::{trace_progress, trace_span};
use crate::util::{CancelToken, FragMatchError, FragMatchResult};
use crate::ImageView;
use rayon::prelude::*;

/// Row-parallel raw-correlation kernel.
pub struct CorrelationRayon;

impl Kernel for CorrelationRayon {
    fn scan_full(
        reference: ImageView<'_, f32>,
        fragment: ImageView<'_, f32>,
        cancel: &CancelToken,
    ) -> FragMatchResult<CorrelationSurface> {
        let (width, height) = surface_size(reference, fragment)?;
        let _span = trace_span!("correlate", width = width, height = height, parallel = true)
            .entered();

        let mut scores = vec![0.0f32; width * height];
        scores
            .par_chunks_mut(width)
            .enumerate()
            .try_for_each(|(y, row)| {
                if cancel.is_cancelled() {
                    return Err(FragMatchError::Cancelled { row: y });
                }
                correlate_row(reference, fragment, y, row);
                trace_progress!("correlate_row", row = y, rows = height);
                Ok(())
            })?;

        CorrelationSurface::new(scores, width, height)
    }
}
