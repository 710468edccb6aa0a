//! Sources that hand the driver a fragment image per variant.

use crate::image::ColorImage;
use crate::util::FragMatchResult;
use crate::variant::transform::Transform;
use crate::variant::VariantKind;

/// Supplies the fragment image for a variant.
///
/// Implementations may generate variants in memory or read precomputed files;
/// a failure only affects the requested variant.
pub trait FragmentSource {
    /// Returns the fragment image for `kind`.
    fn fragment(&mut self, kind: VariantKind) -> FragMatchResult<ColorImage>;
}

/// Generates variants from a canonical fragment with a [`Transform`].
#[derive(Clone, Debug)]
pub struct TransformSource<T> {
    canonical: ColorImage,
    transform: T,
}

impl<T: Transform> TransformSource<T> {
    /// Creates a source for `canonical` using `transform`.
    pub fn new(canonical: ColorImage, transform: T) -> Self {
        Self {
            canonical,
            transform,
        }
    }

    /// Returns the untransformed fragment.
    pub fn canonical(&self) -> &ColorImage {
        &self.canonical
    }
}

impl<T: Transform> FragmentSource for TransformSource<T> {
    fn fragment(&mut self, kind: VariantKind) -> FragMatchResult<ColorImage> {
        match kind {
            VariantKind::Identity => Ok(self.canonical.clone()),
            VariantKind::Scale(factor) => self.transform.scale(&self.canonical, factor),
            VariantKind::Rotation(angle) => self.transform.rotate(&self.canonical, angle),
        }
    }
}
