//! Error types for fragmatch.

use thiserror::Error;

/// Result alias for fragmatch operations.
pub type FragMatchResult<T> = std::result::Result<T, FragMatchError>;

/// Errors that can occur while preprocessing, correlating or driving variants.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FragMatchError {
    /// The image has a zero dimension.
    #[error("invalid image: dimensions {width}x{height}")]
    InvalidImage { width: usize, height: usize },
    /// The image could not be read, decoded or written.
    #[error("image i/o failed: {reason}")]
    ImageIo { reason: String },
    /// The backing buffer is shorter than the view requires.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// An owned buffer does not hold exactly `width * height` samples.
    #[error("buffer size mismatch: expected {expected}, got {got}")]
    BufferSizeMismatch { expected: usize, got: usize },
    /// The stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// The requested region does not fit inside the image.
    #[error("roi {width}x{height} at ({x}, {y}) exceeds image {img_width}x{img_height}")]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// The fragment does not fit inside the reference image.
    #[error(
        "fragment {fragment_width}x{fragment_height} does not fit reference {image_width}x{image_height}"
    )]
    FragmentTooLarge {
        fragment_width: usize,
        fragment_height: usize,
        image_width: usize,
        image_height: usize,
    },
    /// The correlation surface holds no comparable cells.
    #[error("correlation surface is empty")]
    EmptySurface,
    /// The sweep parameters do not describe a usable grid.
    #[error("invalid sweep: {reason}")]
    InvalidSweep { reason: &'static str },
    /// A configuration value is out of range.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },
    /// The scan was cancelled before `row` was computed.
    #[error("cancelled at row {row}")]
    Cancelled { row: usize },
}
