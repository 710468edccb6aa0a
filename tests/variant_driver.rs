use fragmatch::{
    BilinearTransform, CancelToken, ColorImage, FailurePolicy, FragMatchError, FragMatchResult,
    FragmentSource, GrayImage, MatchConfig, Matcher, ReportSink, Sweep, TransformSource,
    VariantDriver, VariantKind, VariantPlan, VariantReport,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Low-amplitude noise so the unsharp mask rarely saturates.
fn textured(width: usize, height: usize, seed: u64) -> ColorImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let gray = GrayImage::from_fn(width, height, |_, _| rng.random_range(100..=156u8)).unwrap();
    ColorImage::from_gray(gray.view())
}

#[derive(Default)]
struct RecordingSink {
    results: Vec<(VariantKind, usize, usize)>,
    failures: Vec<(VariantKind, FragMatchError)>,
}

impl ReportSink for RecordingSink {
    fn on_result(&mut self, report: &VariantReport) {
        assert_eq!(
            report.surface.width(),
            96 - report.fragment_width + 1,
            "surface width follows fragment size"
        );
        self.results
            .push((report.kind, report.result.x, report.result.y));
    }

    fn on_failure(&mut self, kind: VariantKind, error: &FragMatchError) {
        self.failures.push((kind, error.clone()));
    }
}

/// Fails for one variant as if its precomputed file were missing.
struct MissingFile<S> {
    inner: S,
    missing: VariantKind,
}

impl<S: FragmentSource> FragmentSource for MissingFile<S> {
    fn fragment(&mut self, kind: VariantKind) -> FragMatchResult<ColorImage> {
        if kind == self.missing {
            return Err(FragMatchError::ImageIo {
                reason: "no such file".to_string(),
            });
        }
        self.inner.fragment(kind)
    }
}

#[test]
fn unit_scale_outscores_scale_mismatches() {
    let reference = textured(96, 96, 3);
    let (x0, y0) = (30, 28);
    let canonical = reference.crop(x0, y0, 32, 32).unwrap();

    let matcher = Matcher::new(&reference, MatchConfig::default()).unwrap();
    let plan = VariantPlan {
        identity: true,
        scale: Some(Sweep::scale(1.1).unwrap()),
        rotation: None,
    };
    let kinds = plan.kinds();
    assert_eq!(kinds.len(), 9);

    let mut source = TransformSource::new(canonical, BilinearTransform::default());
    let mut sink = RecordingSink::default();
    let summary = VariantDriver::new(&matcher)
        .run(&mut source, &kinds, &mut sink)
        .unwrap();

    assert!(summary.failures.is_empty());
    assert_eq!(summary.records.len(), 9);
    assert_eq!(sink.results.len(), 9);

    let identity = summary.record(VariantKind::Identity).unwrap();
    assert_eq!((identity.result.x, identity.result.y), (x0, y0));
    for record in &summary.records {
        assert!(
            identity.result.score >= record.result.score,
            "{} scored above identity",
            record.kind
        );
    }
    assert_eq!(summary.best().unwrap().kind, VariantKind::Identity);

    let larger = summary
        .records
        .iter()
        .find(|r| matches!(r.kind, VariantKind::Scale(f) if (f - 1.1).abs() < 1e-4))
        .unwrap();
    assert_eq!((larger.fragment_width, larger.fragment_height), (35, 35));
}

#[test]
fn unrotated_fragment_outscores_rotations() {
    let reference = textured(96, 96, 8);
    let canonical = reference.crop(40, 20, 30, 30).unwrap();

    let matcher = Matcher::new(&reference, MatchConfig::default()).unwrap();
    let plan = VariantPlan {
        identity: true,
        scale: None,
        rotation: Some(Sweep::rotation(10.0).unwrap()),
    };
    let mut source = TransformSource::new(canonical, BilinearTransform::default());
    let summary = VariantDriver::new(&matcher)
        .run(&mut source, &plan.kinds(), &mut RecordingSink::default())
        .unwrap();

    assert_eq!(summary.records.len(), 6);
    let best = summary.best().unwrap();
    assert_eq!(best.kind, VariantKind::Identity);
    assert_eq!((best.result.x, best.result.y), (40, 20));
    for record in &summary.records {
        assert_eq!((record.fragment_width, record.fragment_height), (30, 30));
    }
}

#[test]
fn failing_variants_are_skipped_and_reported() {
    let reference = textured(96, 96, 4);
    let canonical = reference.crop(10, 50, 24, 24).unwrap();
    let matcher = Matcher::new(&reference, MatchConfig::default()).unwrap();

    let kinds = [
        VariantKind::Identity,
        VariantKind::Scale(4.5),
        VariantKind::Scale(0.95),
        VariantKind::Rotation(2.0),
    ];
    let mut source = MissingFile {
        inner: TransformSource::new(canonical, BilinearTransform::default()),
        missing: VariantKind::Scale(0.95),
    };
    let mut sink = RecordingSink::default();
    let summary = VariantDriver::new(&matcher)
        .run(&mut source, &kinds, &mut sink)
        .unwrap();

    let evaluated: Vec<_> = summary.records.iter().map(|r| r.kind).collect();
    assert_eq!(evaluated, vec![VariantKind::Identity, VariantKind::Rotation(2.0)]);

    assert_eq!(summary.failures.len(), 2);
    assert_eq!(summary.failures[0].0, VariantKind::Scale(4.5));
    assert_eq!(
        summary.failures[0].1,
        FragMatchError::FragmentTooLarge {
            fragment_width: 108,
            fragment_height: 108,
            image_width: 96,
            image_height: 96,
        }
    );
    assert_eq!(summary.failures[1].0, VariantKind::Scale(0.95));
    assert!(matches!(
        summary.failures[1].1,
        FragMatchError::ImageIo { .. }
    ));
    assert_eq!(sink.failures, summary.failures);
}

#[test]
fn abort_policy_stops_at_first_failure() {
    let reference = textured(96, 96, 6);
    let canonical = reference.crop(0, 0, 24, 24).unwrap();
    let matcher = Matcher::new(
        &reference,
        MatchConfig {
            on_failure: FailurePolicy::Abort,
            ..MatchConfig::default()
        },
    )
    .unwrap();

    let kinds = [
        VariantKind::Identity,
        VariantKind::Scale(5.0),
        VariantKind::Rotation(4.0),
    ];
    let mut source = TransformSource::new(canonical, BilinearTransform::default());
    let mut sink = RecordingSink::default();
    let err = VariantDriver::new(&matcher)
        .run(&mut source, &kinds, &mut sink)
        .err()
        .unwrap();

    assert!(matches!(err, FragMatchError::FragmentTooLarge { .. }));
    assert_eq!(sink.results.len(), 1);
    assert_eq!(sink.failures.len(), 1);
}

#[test]
fn cancellation_aborts_even_when_skipping() {
    let reference = textured(96, 96, 12);
    let canonical = reference.crop(5, 5, 20, 20).unwrap();
    let cancel = CancelToken::new();
    let matcher = Matcher::new(&reference, MatchConfig::default())
        .unwrap()
        .with_cancel(cancel.clone());
    cancel.cancel();

    let mut source = TransformSource::new(canonical, BilinearTransform::default());
    let mut sink = RecordingSink::default();
    let err = VariantDriver::new(&matcher)
        .run(
            &mut source,
            &[VariantKind::Identity, VariantKind::Rotation(2.0)],
            &mut sink,
        )
        .err()
        .unwrap();

    assert!(matches!(err, FragMatchError::Cancelled { .. }));
    assert!(sink.results.is_empty());
    assert_eq!(sink.failures.len(), 1);
}
