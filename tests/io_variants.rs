#![cfg(feature = "image-io")]

use fragmatch::io::{
    load_color_image, save_gray_image, variant_path, write_variants, DirectorySource,
};
use fragmatch::{
    BilinearTransform, ColorImage, FragMatchError, FragmentSource, GrayImage, Transform,
    VariantKind,
};
use std::fs;
use std::path::PathBuf;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("fragmatch-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn gradient(width: usize, height: usize) -> ColorImage {
    let gray = GrayImage::from_fn(width, height, |x, y| (x * 7 + y * 5) as u8).unwrap();
    ColorImage::from_gray(gray.view())
}

#[test]
fn variant_paths_follow_directory_convention() {
    let root = PathBuf::from("res");
    assert_eq!(
        variant_path(&root, "2", VariantKind::Identity),
        root.join("fragment").join("2.png")
    );
    assert_eq!(
        variant_path(&root, "2", VariantKind::Scale(0.925)),
        root.join("zoomed_images").join("2").join("0.925.png")
    );
    assert_eq!(
        variant_path(&root, "2", VariantKind::Rotation(4.0)),
        root.join("rotated_images").join("2").join("4.0.png")
    );
}

#[test]
fn written_variants_load_back_unchanged() {
    let root = scratch_dir("variants");
    let canonical = gradient(20, 16);
    let transform = BilinearTransform::default();
    let kinds = [
        VariantKind::Identity,
        VariantKind::Scale(0.95),
        VariantKind::Rotation(2.0),
    ];

    let written = write_variants(&root, "7", &canonical, &kinds, &transform).unwrap();
    assert_eq!(written.len(), 3);
    assert!(written.iter().all(|p| p.exists()));

    let mut source = DirectorySource::new(&root, "7");
    assert_eq!(source.fragment(VariantKind::Identity).unwrap(), canonical);
    assert_eq!(
        source.fragment(VariantKind::Scale(0.95)).unwrap(),
        transform.scale(&canonical, 0.95).unwrap()
    );
    assert_eq!(
        source.fragment(VariantKind::Rotation(2.0)).unwrap(),
        transform.rotate(&canonical, 2.0).unwrap()
    );

    let missing = source.fragment(VariantKind::Rotation(8.0)).err().unwrap();
    assert!(matches!(missing, FragMatchError::ImageIo { .. }));

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn gray_images_round_trip_through_png() {
    let root = scratch_dir("gray");
    let img = GrayImage::from_fn(9, 4, |x, y| (x * 20 + y) as u8).unwrap();
    let path = root.join("surface.png");
    save_gray_image(&img, &path).unwrap();

    let loaded = load_color_image(&path).unwrap();
    assert_eq!(loaded, ColorImage::from_gray(img.view()));

    fs::remove_dir_all(&root).unwrap();
}
