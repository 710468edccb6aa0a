//! Global-maximum search over a correlation surface.

use crate::search::surface::CorrelationSurface;
use crate::util::{FragMatchError, FragMatchResult};

/// Best placement of a fragment within a reference image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchResult {
    /// X coordinate (column) of the fragment's top-left corner.
    pub x: usize,
    /// Y coordinate (row) of the fragment's top-left corner.
    pub y: usize,
    /// Raw correlation score at the placement.
    pub score: f32,
}

/// Returns the location and value of the surface maximum.
///
/// Cells are scanned top-to-bottom, left-to-right and only a strictly greater
/// score replaces the current best, so the first maximum in row-major order
/// wins ties. NaN cells are never selected. Fails with `EmptySurface` if no
/// cell can be compared.
pub fn locate(surface: &CorrelationSurface) -> FragMatchResult<MatchResult> {
    let mut best: Option<MatchResult> = None;
    for y in 0..surface.height() {
        let Some(row) = surface.row(y) else {
            break;
        };
        for (x, &score) in row.iter().enumerate() {
            if score.is_nan() {
                continue;
            }
            if best.map_or(true, |b| score > b.score) {
                best = Some(MatchResult { x, y, score });
            }
        }
    }
    best.ok_or(FragMatchError::EmptySurface)
}
