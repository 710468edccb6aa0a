//! Fragment variants and the batch driver that evaluates them.
//!
//! The driver asks a [`FragmentSource`] for each variant image, runs
//! preprocessing, correlation and peak location through a [`Matcher`], and
//! forwards every outcome to a [`ReportSink`]. A failing variant is reported
//! with its identifier; whether the batch continues depends on
//! [`FailurePolicy`](crate::search::FailurePolicy).

mod source;
mod sweep;
mod transform;

pub use source::{FragmentSource, TransformSource};
pub use sweep::{Sweep, MAX_SWEEP_VALUES};
pub use transform::{BilinearTransform, Transform};

use crate::candidate::locate::MatchResult;
use crate::image::ColorImage;
use crate::search::surface::CorrelationSurface;
use crate::search::{FailurePolicy, Matcher};
use crate::trace::{trace_event, trace_span};
use crate::util::{FragMatchError, FragMatchResult};
use std::fmt;
use std::time::{Duration, Instant};

/// Identifier of a geometric fragment variant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VariantKind {
    /// The canonical fragment, untransformed.
    Identity,
    /// Uniform scale by the given factor.
    Scale(f32),
    /// Rotation about the center by the given angle in degrees.
    Rotation(f32),
}

impl VariantKind {
    /// Returns a human-readable label such as `scale 0.925`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantKind::Identity => write!(f, "identity"),
            VariantKind::Scale(factor) => write!(f, "scale {factor:.3}"),
            VariantKind::Rotation(angle) => write!(f, "rotation {angle:.1}"),
        }
    }
}

/// A variant identifier with its transformed fragment image.
#[derive(Clone, Debug, PartialEq)]
pub struct FragmentVariant {
    /// Variant identifier.
    pub kind: VariantKind,
    /// Transformed fragment.
    pub image: ColorImage,
}

/// Which variants a batch evaluates.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantPlan {
    /// Evaluate the untransformed fragment.
    pub identity: bool,
    /// Scale factors to evaluate.
    pub scale: Option<Sweep>,
    /// Rotation angles to evaluate.
    pub rotation: Option<Sweep>,
}

impl Default for VariantPlan {
    fn default() -> Self {
        Self {
            identity: true,
            scale: None,
            rotation: None,
        }
    }
}

impl VariantPlan {
    /// Enumerates variants: identity, then scale factors, then angles.
    ///
    /// A scale factor of 1.0 is skipped when identity is already included.
    pub fn kinds(&self) -> Vec<VariantKind> {
        let mut kinds = Vec::new();
        if self.identity {
            kinds.push(VariantKind::Identity);
        }
        if let Some(scale) = &self.scale {
            for factor in scale.iter() {
                if self.identity && (factor - 1.0).abs() < scale.step() * 1e-3 {
                    continue;
                }
                kinds.push(VariantKind::Scale(factor));
            }
        }
        if let Some(rotation) = &self.rotation {
            kinds.extend(rotation.iter().map(VariantKind::Rotation));
        }
        kinds
    }
}

/// Outcome of one successfully evaluated variant, as seen by the sink.
#[derive(Clone, Debug)]
pub struct VariantReport {
    /// Variant identifier.
    pub kind: VariantKind,
    /// Best placement for this variant.
    pub result: MatchResult,
    /// Fragment width after the transform.
    pub fragment_width: usize,
    /// Fragment height after the transform.
    pub fragment_height: usize,
    /// Wall time spent on this variant, loading included.
    pub elapsed: Duration,
    /// Correlation surface the result was located on.
    pub surface: CorrelationSurface,
}

/// Consumer of per-variant outcomes (display, logging, persistence).
pub trait ReportSink {
    /// Called after a variant was evaluated.
    fn on_result(&mut self, report: &VariantReport);

    /// Called when a variant could not be evaluated.
    fn on_failure(&mut self, kind: VariantKind, error: &FragMatchError);
}

/// Sink that discards every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn on_result(&mut self, _report: &VariantReport) {}

    fn on_failure(&mut self, _kind: VariantKind, _error: &FragMatchError) {}
}

/// Compact per-variant record kept in the batch summary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VariantRecord {
    /// Variant identifier.
    pub kind: VariantKind,
    /// Best placement for this variant.
    pub result: MatchResult,
    /// Fragment width after the transform.
    pub fragment_width: usize,
    /// Fragment height after the transform.
    pub fragment_height: usize,
    /// Wall time spent on this variant.
    pub elapsed: Duration,
}

/// Results of a batch run in evaluation order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchSummary {
    /// Successfully evaluated variants.
    pub records: Vec<VariantRecord>,
    /// Variants that failed, with their errors.
    pub failures: Vec<(VariantKind, FragMatchError)>,
}

impl BatchSummary {
    /// Returns the record with the highest score; the earliest wins ties.
    pub fn best(&self) -> Option<&VariantRecord> {
        self.records.iter().fold(None, |best, record| match best {
            Some(b) if b.result.score >= record.result.score => Some(b),
            _ => Some(record),
        })
    }

    /// Returns the record for `kind`, if it was evaluated successfully.
    pub fn record(&self, kind: VariantKind) -> Option<&VariantRecord> {
        self.records.iter().find(|r| r.kind == kind)
    }
}

/// Evaluates a sequence of fragment variants against one reference.
pub struct VariantDriver<'m> {
    matcher: &'m Matcher,
}

impl<'m> VariantDriver<'m> {
    /// Creates a driver on top of a prepared matcher.
    pub fn new(matcher: &'m Matcher) -> Self {
        Self { matcher }
    }

    /// Evaluates a single in-memory variant.
    pub fn evaluate(&self, variant: &FragmentVariant) -> FragMatchResult<VariantReport> {
        let start = Instant::now();
        let found = self.matcher.match_fragment(&variant.image)?;
        Ok(VariantReport {
            kind: variant.kind,
            result: found.result,
            fragment_width: found.fragment_width,
            fragment_height: found.fragment_height,
            elapsed: start.elapsed(),
            surface: found.surface,
        })
    }

    /// Evaluates every variant in `kinds`, pulling images from `source`.
    ///
    /// Failures are forwarded to `sink` with their variant identifier. With
    /// [`FailurePolicy::Skip`] the batch continues; with
    /// [`FailurePolicy::Abort`] the first failure is returned. Cancellation
    /// always aborts the batch.
    pub fn run<S, R>(
        &self,
        source: &mut S,
        kinds: &[VariantKind],
        sink: &mut R,
    ) -> FragMatchResult<BatchSummary>
    where
        S: FragmentSource + ?Sized,
        R: ReportSink + ?Sized,
    {
        let _span = trace_span!("variant_batch", variants = kinds.len()).entered();
        let policy = self.matcher.config().on_failure;
        let mut summary = BatchSummary::default();

        for &kind in kinds {
            let start = Instant::now();
            let outcome = source.fragment(kind).and_then(|image| {
                self.evaluate(&FragmentVariant { kind, image })
                    .map(|report| VariantReport {
                        elapsed: start.elapsed(),
                        ..report
                    })
            });
            let label = kind.label();

            match outcome {
                Ok(report) => {
                    trace_event!(
                        "variant_done",
                        label = label.as_str(),
                        x = report.result.x,
                        y = report.result.y,
                        score = report.result.score,
                        elapsed_ms = report.elapsed.as_millis() as u64
                    );
                    sink.on_result(&report);
                    summary.records.push(VariantRecord {
                        kind,
                        result: report.result,
                        fragment_width: report.fragment_width,
                        fragment_height: report.fragment_height,
                        elapsed: report.elapsed,
                    });
                }
                Err(err) => {
                    let reason = err.to_string();
                    trace_event!(
                        "variant_failed",
                        label = label.as_str(),
                        error = reason.as_str()
                    );
                    sink.on_failure(kind, &err);
                    let cancelled = matches!(err, FragMatchError::Cancelled { .. });
                    if cancelled || policy == FailurePolicy::Abort {
                        return Err(err);
                    }
                    summary.failures.push((kind, err));
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::{BatchSummary, Sweep, VariantKind, VariantPlan, VariantRecord};
    use crate::candidate::locate::MatchResult;
    use std::time::Duration;

    #[test]
    fn plan_skips_unit_scale_when_identity_is_present() {
        let plan = VariantPlan {
            identity: true,
            scale: Some(Sweep::scale(1.05).unwrap()),
            rotation: Some(Sweep::rotation(4.0).unwrap()),
        };
        let kinds = plan.kinds();
        assert_eq!(kinds.len(), 1 + 6 + 2);
        assert_eq!(kinds[0], VariantKind::Identity);
        assert!(!kinds
            .iter()
            .any(|k| matches!(k, VariantKind::Scale(f) if (f - 1.0).abs() < 1e-6)));
        assert_eq!(kinds[7], VariantKind::Rotation(2.0));
    }

    #[test]
    fn plan_keeps_unit_scale_without_identity() {
        let plan = VariantPlan {
            identity: false,
            scale: Some(Sweep::scale(1.0).unwrap()),
            rotation: None,
        };
        assert_eq!(plan.kinds().len(), 5);
    }

    #[test]
    fn labels_use_fixed_precision() {
        assert_eq!(VariantKind::Identity.label(), "identity");
        assert_eq!(VariantKind::Scale(0.925).label(), "scale 0.925");
        assert_eq!(VariantKind::Rotation(4.0).label(), "rotation 4.0");
    }

    #[test]
    fn best_prefers_earliest_on_ties() {
        let record = |kind, score| VariantRecord {
            kind,
            result: MatchResult { x: 0, y: 0, score },
            fragment_width: 1,
            fragment_height: 1,
            elapsed: Duration::ZERO,
        };
        let summary = BatchSummary {
            records: vec![
                record(VariantKind::Scale(0.9), 5.0),
                record(VariantKind::Identity, 7.0),
                record(VariantKind::Rotation(2.0), 7.0),
            ],
            failures: Vec::new(),
        };
        assert_eq!(summary.best().unwrap().kind, VariantKind::Identity);
        assert!(BatchSummary::default().best().is_none());
    }
}
