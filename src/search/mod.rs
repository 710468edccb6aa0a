//! Exhaustive correlation search for a fragment in a reference image.
//!
//! `correlate` produces the full surface for two preprocessed buffers;
//! `Matcher` keeps a preprocessed reference and evaluates fragments against it.

pub mod surface;

use crate::candidate::locate::{locate, MatchResult};
use crate::image::{BrightnessBuffer, ColorImage, ImageView};
use crate::kernel::scalar::CorrelationScalar;
use crate::kernel::Kernel;
use crate::preprocess::{preprocess, preprocess_gray, PreprocessConfig};
use crate::trace::trace_warn;
use crate::util::{CancelToken, FragMatchResult};
use surface::CorrelationSurface;

/// What the variant driver does when one variant fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Report the failure and continue with the remaining variants.
    #[default]
    Skip,
    /// Stop the batch at the first failure.
    Abort,
}

/// Configuration for matching.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchConfig {
    /// Use row-parallel correlation when the `rayon` feature is enabled.
    pub parallel: bool,
    /// Preprocessing applied to the reference and every fragment.
    pub preprocess: PreprocessConfig,
    /// Batch behavior when a variant fails.
    pub on_failure: FailurePolicy,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            parallel: cfg!(feature = "rayon"),
            preprocess: PreprocessConfig::default(),
            on_failure: FailurePolicy::Skip,
        }
    }
}

/// Computes the raw correlation surface of two preprocessed buffers.
///
/// Fails with `FragmentTooLarge` before scanning if the fragment does not fit.
pub fn correlate(
    reference: &BrightnessBuffer,
    fragment: &BrightnessBuffer,
) -> FragMatchResult<CorrelationSurface> {
    correlate_with(
        reference.view(),
        fragment.view(),
        false,
        &CancelToken::new(),
    )
}

/// Computes the correlation surface, optionally in parallel and cancellable.
///
/// Without the `rayon` feature `parallel` is ignored.
pub fn correlate_with(
    reference: ImageView<'_, f32>,
    fragment: ImageView<'_, f32>,
    parallel: bool,
    cancel: &CancelToken,
) -> FragMatchResult<CorrelationSurface> {
    #[cfg(feature = "rayon")]
    if parallel {
        return <crate::kernel::rayon::CorrelationRayon as Kernel>::scan_full(
            reference, fragment, cancel,
        );
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;
    <CorrelationScalar as Kernel>::scan_full(reference, fragment, cancel)
}

/// Located match together with the surface it was found on.
#[derive(Clone, Debug, PartialEq)]
pub struct FragmentMatch {
    /// Best placement.
    pub result: MatchResult,
    /// Full correlation surface.
    pub surface: CorrelationSurface,
    /// Fragment width in pixels.
    pub fragment_width: usize,
    /// Fragment height in pixels.
    pub fragment_height: usize,
}

/// Matcher holding a preprocessed reference image.
pub struct Matcher {
    reference: BrightnessBuffer,
    cfg: MatchConfig,
    cancel: CancelToken,
}

impl Matcher {
    /// Preprocesses `reference` with `cfg.preprocess` and builds a matcher.
    pub fn new(reference: &ColorImage, cfg: MatchConfig) -> FragMatchResult<Self> {
        let reference = preprocess(reference, &cfg.preprocess)?;
        Ok(Self::from_preprocessed(reference, cfg))
    }

    /// Builds a matcher from a single-channel reference.
    pub fn from_gray(reference: ImageView<'_, u8>, cfg: MatchConfig) -> FragMatchResult<Self> {
        let reference = preprocess_gray(reference, &cfg.preprocess)?;
        Ok(Self::from_preprocessed(reference, cfg))
    }

    /// Builds a matcher from an already preprocessed reference buffer.
    pub fn from_preprocessed(reference: BrightnessBuffer, cfg: MatchConfig) -> Self {
        Self {
            reference,
            cfg,
            cancel: CancelToken::new(),
        }
    }

    /// Uses `cancel` to abort long scans between rows.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Returns the preprocessed reference buffer.
    pub fn reference(&self) -> &BrightnessBuffer {
        &self.reference
    }

    /// Returns the cancellation token checked during scans.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Preprocesses a color fragment and locates it in the reference.
    pub fn match_fragment(&self, fragment: &ColorImage) -> FragMatchResult<FragmentMatch> {
        let fragment = preprocess(fragment, &self.cfg.preprocess)?;
        self.match_preprocessed(&fragment)
    }

    /// Preprocesses a single-channel fragment and locates it in the reference.
    pub fn match_gray(&self, fragment: ImageView<'_, u8>) -> FragMatchResult<FragmentMatch> {
        let fragment = preprocess_gray(fragment, &self.cfg.preprocess)?;
        self.match_preprocessed(&fragment)
    }

    /// Locates an already preprocessed fragment in the reference.
    pub fn match_preprocessed(
        &self,
        fragment: &BrightnessBuffer,
    ) -> FragMatchResult<FragmentMatch> {
        if fragment.data().iter().all(|&v| v == 0.0) {
            trace_warn!(
                "degenerate_fragment",
                width = fragment.width(),
                height = fragment.height()
            );
        }
        let surface = correlate_with(
            self.reference.view(),
            fragment.view(),
            self.cfg.parallel,
            &self.cancel,
        )?;
        let result = locate(&surface)?;
        Ok(FragmentMatch {
            result,
            surface,
            fragment_width: fragment.width(),
            fragment_height: fragment.height(),
        })
    }
}
