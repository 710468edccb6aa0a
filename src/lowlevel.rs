//! Low-level building blocks for custom matching pipelines.
//!
//! These expose the individual filters and kernels behind `Matcher`. Most
//! users should prefer the top-level `Matcher` and `VariantDriver` types.

pub use crate::kernel::scalar::CorrelationScalar;
pub use crate::kernel::{surface_size, Kernel};
pub use crate::preprocess::{
    gaussian_blur_u8, gaussian_kernel, sharpen_color, to_grayscale, unsharp_mask,
};

#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::CorrelationRayon;
