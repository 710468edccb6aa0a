//! Mathematical helpers for filtering and geometric transforms.

/// Computes sine and cosine for an angle in degrees.
pub(crate) fn sin_cos_deg(angle_deg: f32) -> (f32, f32) {
    angle_deg.to_radians().sin_cos()
}

/// Gaussian sigma implied by a kernel size when no sigma is given.
///
/// Follows the usual convention `0.3 * ((k - 1) * 0.5 - 1) + 0.8`.
pub(crate) fn gaussian_sigma(ksize: usize) -> f64 {
    0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Maps an out-of-range index into `[0, len)` by reflection without
/// repeating the edge sample (`gfedcb|abcdefgh|gfedcba`).
pub(crate) fn reflect_101(idx: isize, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let len = len as isize;
    let period = 2 * (len - 1);
    let mut wrapped = idx.rem_euclid(period);
    if wrapped >= len {
        wrapped = period - wrapped;
    }
    wrapped as usize
}

/// Rounds and clamps a sample to the 8-bit range.
pub(crate) fn saturate_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::{gaussian_sigma, reflect_101, saturate_u8, sin_cos_deg};

    #[test]
    fn reflect_101_skips_edge_sample() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(2, 5), 2);
        assert_eq!(reflect_101(-3, 1), 0);
    }

    #[test]
    fn sigma_for_nine_tap_kernel() {
        assert!((gaussian_sigma(9) - 1.7).abs() < 1e-12);
    }

    #[test]
    fn saturate_clamps_both_ends() {
        assert_eq!(saturate_u8(-12.0), 0);
        assert_eq!(saturate_u8(300.0), 255);
        assert_eq!(saturate_u8(127.5), 128);
    }

    #[test]
    fn sin_cos_deg_matches_quadrants() {
        let (sin, cos) = sin_cos_deg(90.0);
        assert!(sin > 0.999);
        assert!(cos.abs() < 1e-6);
    }
}
