//! FragMatch locates an image fragment inside a larger reference image by
//! brute-force correlation.
//!
//! Both images are sharpened with an unsharp mask, reduced to luma and
//! mean-centered; every placement of the fragment is then scored with the raw
//! inner product of the two centered patches and the global maximum is
//! reported. A [`VariantDriver`] repeats this for scaled and rotated copies of
//! the fragment to find the variant and placement that match best.
//!
//! Optional features: `rayon` (row-parallel scans), `image-io` (file loading
//! and the precomputed-variant directory layout) and `tracing`.

mod trace;

mod candidate;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod preprocess;
pub mod search;
pub mod util;
pub mod variant;

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use crate::candidate::locate::{locate, MatchResult};
pub use crate::image::{BrightnessBuffer, ColorImage, GrayImage, ImageView, OwnedImage};
pub use crate::kernel::Kernel;
pub use crate::preprocess::{center_brightness, preprocess, preprocess_gray, PreprocessConfig};
pub use crate::search::surface::CorrelationSurface;
pub use crate::search::{correlate, correlate_with, FailurePolicy, FragmentMatch, MatchConfig, Matcher};
pub use crate::util::{CancelToken, FragMatchError, FragMatchResult};
pub use crate::variant::{
    BatchSummary, BilinearTransform, FragmentSource, FragmentVariant, NullSink, ReportSink, Sweep,
    Transform, TransformSource, VariantDriver, VariantKind, VariantPlan, VariantRecord,
    VariantReport,
};
