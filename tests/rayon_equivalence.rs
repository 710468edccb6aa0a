#![cfg(feature = "rayon")]

use fragmatch::{
    correlate_with, preprocess_gray, CancelToken, FragMatchError, GrayImage, MatchConfig, Matcher,
    PreprocessConfig,
};

fn make_image(width: usize, height: usize) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| (((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF) as u8)
        .unwrap()
}

#[test]
fn parallel_surface_is_bit_identical_to_sequential() {
    let cfg = PreprocessConfig::default();
    let image = make_image(120, 90);
    let reference = preprocess_gray(image.view(), &cfg).unwrap();
    let fragment = preprocess_gray(image.crop(40, 30, 28, 21).unwrap().view(), &cfg).unwrap();

    let cancel = CancelToken::new();
    let seq = correlate_with(reference.view(), fragment.view(), false, &cancel).unwrap();
    let par = correlate_with(reference.view(), fragment.view(), true, &cancel).unwrap();

    assert_eq!(seq.width(), par.width());
    assert_eq!(seq.height(), par.height());
    for (a, b) in seq.scores().iter().zip(par.scores()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
}

#[test]
fn parallel_matcher_agrees_with_sequential_matcher() {
    let image = make_image(100, 80);
    let fragment = image.crop(51, 33, 24, 24).unwrap();

    let seq = Matcher::from_gray(
        image.view(),
        MatchConfig {
            parallel: false,
            ..MatchConfig::default()
        },
    )
    .unwrap()
    .match_gray(fragment.view())
    .unwrap();
    let par = Matcher::from_gray(
        image.view(),
        MatchConfig {
            parallel: true,
            ..MatchConfig::default()
        },
    )
    .unwrap()
    .match_gray(fragment.view())
    .unwrap();

    assert_eq!(seq.result, par.result);
    assert_eq!(seq.surface, par.surface);
}

#[test]
fn parallel_scan_honors_cancellation() {
    let cfg = PreprocessConfig::default();
    let image = make_image(64, 64);
    let reference = preprocess_gray(image.view(), &cfg).unwrap();
    let fragment = reference.crop(0, 0, 16, 16).unwrap();

    let cancel = CancelToken::new();
    cancel.cancel();
    let err = correlate_with(reference.view(), fragment.view(), true, &cancel)
        .err()
        .unwrap();
    assert!(matches!(err, FragMatchError::Cancelled { .. }));
}
