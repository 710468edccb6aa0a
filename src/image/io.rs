//! Convenience helpers for loading and saving images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. The precomputed variant
//! layout used by [`DirectorySource`] and [`write_variants`] is:
//!
//! ```text
//! <root>/fragment/<id>.png
//! <root>/zoomed_images/<id>/<factor:.3>.png
//! <root>/rotated_images/<id>/<angle:.1>.png
//! ```

use crate::image::{ColorImage, GrayImage};
use crate::trace::trace_event;
use crate::util::{FragMatchError, FragMatchResult};
use crate::variant::{FragmentSource, Transform, VariantKind};
use std::fs;
use std::path::{Path, PathBuf};

fn io_error(path: &Path, err: impl std::fmt::Display) -> FragMatchError {
    FragMatchError::ImageIo {
        reason: format!("{}: {err}", path.display()),
    }
}

/// Creates an owned color image from a dynamic image.
pub fn color_from_dynamic_image(img: &image::DynamicImage) -> FragMatchResult<ColorImage> {
    let rgb = img.to_rgb8();
    let width = rgb.width() as usize;
    let height = rgb.height() as usize;
    ColorImage::new(rgb.into_raw(), width, height)
}

/// Loads an image from disk and converts it to RGB.
pub fn load_color_image<P: AsRef<Path>>(path: P) -> FragMatchResult<ColorImage> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|err| io_error(path, err))?;
    color_from_dynamic_image(&img)
}

/// Saves an RGB image; the format is inferred from the extension.
pub fn save_color_image<P: AsRef<Path>>(img: &ColorImage, path: P) -> FragMatchResult<()> {
    let path = path.as_ref();
    let buffer =
        image::RgbImage::from_raw(img.width() as u32, img.height() as u32, img.data().to_vec())
            .ok_or_else(|| io_error(path, "rgb buffer does not match its dimensions"))?;
    buffer.save(path).map_err(|err| io_error(path, err))
}

/// Saves a grayscale image; the format is inferred from the extension.
pub fn save_gray_image<P: AsRef<Path>>(img: &GrayImage, path: P) -> FragMatchResult<()> {
    let path = path.as_ref();
    let buffer =
        image::GrayImage::from_raw(img.width() as u32, img.height() as u32, img.data().to_vec())
            .ok_or_else(|| io_error(path, "gray buffer does not match its dimensions"))?;
    buffer.save(path).map_err(|err| io_error(path, err))
}

/// Returns the path of the precomputed image for a variant.
pub fn variant_path(root: &Path, fragment_id: &str, kind: VariantKind) -> PathBuf {
    match kind {
        VariantKind::Identity => root.join("fragment").join(format!("{fragment_id}.png")),
        VariantKind::Scale(factor) => root
            .join("zoomed_images")
            .join(fragment_id)
            .join(format!("{factor:.3}.png")),
        VariantKind::Rotation(angle) => root
            .join("rotated_images")
            .join(fragment_id)
            .join(format!("{angle:.1}.png")),
    }
}

/// Loads precomputed fragment variants from a directory tree.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
    fragment_id: String,
}

impl DirectorySource {
    /// Creates a source rooted at `root` for the fragment named `fragment_id`.
    pub fn new(root: impl Into<PathBuf>, fragment_id: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            fragment_id: fragment_id.into(),
        }
    }
}

impl FragmentSource for DirectorySource {
    fn fragment(&mut self, kind: VariantKind) -> FragMatchResult<ColorImage> {
        load_color_image(variant_path(&self.root, &self.fragment_id, kind))
    }
}

/// Generates and persists fragment variants under `root`.
///
/// The identity variant is written to `fragment/<id>.png` as well, so the
/// resulting tree can be read back by [`DirectorySource`]. Returns the written
/// paths in the order of `kinds`.
pub fn write_variants<T: Transform>(
    root: &Path,
    fragment_id: &str,
    canonical: &ColorImage,
    kinds: &[VariantKind],
    transform: &T,
) -> FragMatchResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        let image = match kind {
            VariantKind::Identity => canonical.clone(),
            VariantKind::Scale(factor) => transform.scale(canonical, factor)?,
            VariantKind::Rotation(angle) => transform.rotate(canonical, angle)?,
        };
        let path = variant_path(root, fragment_id, kind);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| io_error(parent, err))?;
        }
        save_color_image(&image, &path)?;
        let label = kind.label();
        trace_event!("variant_written", label = label.as_str());
        written.push(path);
    }
    Ok(written)
}
