//! Scalar reference kernel.

use crate::kernel::{correlate_row, surface_size, Kernel};
use crate::search::surface::CorrelationSurface;
use crate::trace::{trace_progress, trace_span};
use crate::util::{CancelToken, FragMatchError, FragMatchResult};
use crate::ImageView;

/// Sequential raw-correlation kernel, one placement row at a time.
pub struct CorrelationScalar;

impl Kernel for CorrelationScalar {
    fn scan_full(
        reference: ImageView<'_, f32>,
        fragment: ImageView<'_, f32>,
        cancel: &CancelToken,
    ) -> FragMatchResult<CorrelationSurface> {
        let (width, height) = surface_size(reference, fragment)?;
        let _span = trace_span!("correlate", width = width, height = height).entered();

        let mut scores = vec![0.0f32; width * height];
        for (y, row) in scores.chunks_mut(width).enumerate() {
            if cancel.is_cancelled() {
                return Err(FragMatchError::Cancelled { row: y });
            }
            correlate_row(reference, fragment, y, row);
            trace_progress!("correlate_row", row = y, rows = height);
        }

        CorrelationSurface::new(scores, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::CorrelationScalar;
    use crate::image::BrightnessBuffer;
    use crate::kernel::Kernel;
    use crate::util::{CancelToken, FragMatchError};

    fn buffer(width: usize, height: usize, f: impl Fn(usize, usize) -> f32) -> BrightnessBuffer {
        BrightnessBuffer::from_fn(width, height, f).unwrap()
    }

    #[test]
    fn scan_matches_bruteforce() {
        let reference = buffer(6, 5, |x, y| ((x * 17 + y * 9 + x * y) % 23) as f32 - 11.0);
        let fragment = buffer(3, 2, |x, y| ((x * 5 + y * 11 + x * y) % 7) as f32 - 3.0);

        let surface =
            CorrelationScalar::scan_full(reference.view(), fragment.view(), &CancelToken::new())
                .unwrap();
        assert_eq!((surface.width(), surface.height()), (4, 4));

        for y in 0..4 {
            for x in 0..4 {
                let mut expected = 0.0f64;
                for l in 0..2 {
                    for k in 0..3 {
                        let r = reference.data()[(y + l) * 6 + x + k] as f64;
                        let f = fragment.data()[l * 3 + k] as f64;
                        expected += r * f;
                    }
                }
                assert_eq!(surface.get(x, y).unwrap(), expected as f32);
            }
        }
    }

    #[test]
    fn cancelled_scan_stops_before_first_row() {
        let reference = buffer(8, 8, |x, _| x as f32);
        let fragment = buffer(2, 2, |_, y| y as f32);
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = CorrelationScalar::scan_full(reference.view(), fragment.view(), &cancel)
            .err()
            .unwrap();
        assert_eq!(err, FragMatchError::Cancelled { row: 0 });
    }
}
