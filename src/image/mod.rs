//! Image views and owned buffers.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. ROI slices are zero-copy
//! views into the same backing slice and retain the original stride.
//!
//! `OwnedImage` is a contiguous single-channel buffer; `BrightnessBuffer` is the
//! floating-point variant produced by preprocessing. `ColorImage` stores
//! interleaved RGB samples.

use crate::util::{FragMatchError, FragMatchResult};

#[cfg(feature = "image-io")]
pub mod io;

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> FragMatchResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> FragMatchResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(FragMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }

    /// Iterates over all rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &'a [T]> + '_ {
        (0..self.height).filter_map(move |y| self.row(y))
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> FragMatchResult<ImageView<'a, T>> {
        if width == 0 || height == 0 {
            return Err(FragMatchError::InvalidImage { width, height });
        }

        let out_of_bounds = FragMatchError::RoiOutOfBounds {
            x,
            y,
            width,
            height,
            img_width: self.width,
            img_height: self.height,
        };
        let end_x = x.checked_add(width).ok_or_else(|| out_of_bounds.clone())?;
        let end_y = y.checked_add(height).ok_or_else(|| out_of_bounds.clone())?;
        if end_x > self.width || end_y > self.height {
            return Err(out_of_bounds);
        }

        let start = y * self.stride + x;
        let data = self
            .data
            .get(start..)
            .ok_or(FragMatchError::BufferTooSmall {
                needed: start.saturating_add(1),
                got: self.data.len(),
            })?;

        ImageView::new(data, width, height, self.stride)
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> FragMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(FragMatchError::InvalidImage { width, height });
    }
    if stride < width {
        return Err(FragMatchError::InvalidStride { width, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(FragMatchError::InvalidImage { width, height })
}

fn checked_area(width: usize, height: usize, channels: usize) -> FragMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(FragMatchError::InvalidImage { width, height });
    }
    width
        .checked_mul(height)
        .and_then(|v| v.checked_mul(channels))
        .ok_or(FragMatchError::InvalidImage { width, height })
}

/// Owned contiguous single-channel image.
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedImage<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

/// 8-bit grayscale image.
pub type GrayImage = OwnedImage<u8>;

/// Floating-point brightness samples; may be negative after centering.
pub type BrightnessBuffer = OwnedImage<f32>;

impl<T: Copy> OwnedImage<T> {
    /// Wraps a row-major buffer holding exactly `width * height` samples.
    pub fn new(data: Vec<T>, width: usize, height: usize) -> FragMatchResult<Self> {
        let expected = checked_area(width, height, 1)?;
        if data.len() != expected {
            return Err(FragMatchError::BufferSizeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Builds an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> T,
    ) -> FragMatchResult<Self> {
        let len = checked_area(width, height, 1)?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::new(data, width, height)
    }

    /// Copies a (possibly strided) view into a contiguous buffer.
    pub fn from_view(view: ImageView<'_, T>) -> FragMatchResult<Self> {
        let mut data = Vec::with_capacity(view.width() * view.height());
        for row in view.rows() {
            data.extend_from_slice(row);
        }
        Self::new(data, view.width(), view.height())
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, T> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }

    /// Copies a rectangular region into a new image.
    pub fn crop(&self, x: usize, y: usize, width: usize, height: usize) -> FragMatchResult<Self> {
        Self::from_view(self.view().roi(x, y, width, height)?)
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the row-major samples.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Returns the row-major samples for in-place edits.
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl GrayImage {
    /// Converts 8-bit samples to a floating-point brightness buffer.
    pub fn to_brightness(&self) -> BrightnessBuffer {
        BrightnessBuffer {
            data: self.data.iter().map(|&v| f32::from(v)).collect(),
            width: self.width,
            height: self.height,
        }
    }
}

/// Owned RGB image with interleaved 8-bit channels.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl ColorImage {
    /// Number of interleaved channels per pixel.
    pub const CHANNELS: usize = 3;

    /// Wraps an interleaved RGB buffer of `width * height * 3` bytes.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> FragMatchResult<Self> {
        let expected = checked_area(width, height, Self::CHANNELS)?;
        if data.len() != expected {
            return Err(FragMatchError::BufferSizeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Builds a color image from a grayscale view by replicating each sample.
    pub fn from_gray(view: ImageView<'_, u8>) -> Self {
        let mut data = Vec::with_capacity(view.width() * view.height() * Self::CHANNELS);
        for row in view.rows() {
            for &v in row {
                data.extend_from_slice(&[v, v, v]);
            }
        }
        Self {
            data,
            width: view.width(),
            height: view.height(),
        }
    }

    /// Interleaves three equally sized planes (R, G, B).
    pub fn from_planes(planes: [&GrayImage; 3]) -> FragMatchResult<Self> {
        let [r, g, b] = planes;
        let (width, height) = (r.width(), r.height());
        for plane in [g, b] {
            if plane.width() != width || plane.height() != height {
                return Err(FragMatchError::BufferSizeMismatch {
                    expected: width * height,
                    got: plane.width() * plane.height(),
                });
            }
        }
        let mut data = Vec::with_capacity(width * height * Self::CHANNELS);
        for ((&rv, &gv), &bv) in r.data().iter().zip(g.data()).zip(b.data()) {
            data.extend_from_slice(&[rv, gv, bv]);
        }
        Self::new(data, width, height)
    }

    /// Extracts channel `channel` (0 = R, 1 = G, 2 = B) as a grayscale plane.
    pub fn plane(&self, channel: usize) -> FragMatchResult<GrayImage> {
        if channel >= Self::CHANNELS {
            return Err(FragMatchError::InvalidConfig {
                reason: "channel index must be 0, 1 or 2",
            });
        }
        let data = self
            .data
            .chunks_exact(Self::CHANNELS)
            .map(|px| px[channel])
            .collect();
        GrayImage::new(data, self.width, self.height)
    }

    /// Returns the RGB triple at `(x, y)` if it is within bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * Self::CHANNELS;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Copies a rectangular region into a new image.
    pub fn crop(&self, x: usize, y: usize, width: usize, height: usize) -> FragMatchResult<Self> {
        let row_len = self.width * Self::CHANNELS;
        let view = ImageView::from_slice(&self.data, row_len, self.height)?;
        let roi = view.roi(x * Self::CHANNELS, y, width * Self::CHANNELS, height)?;
        let mut data = Vec::with_capacity(width * height * Self::CHANNELS);
        for row in roi.rows() {
            data.extend_from_slice(row);
        }
        Self::new(data, width, height)
    }

    /// Draws an axis-aligned rectangle outline clipped to the image.
    ///
    /// `thickness` grows the outline inwards from the rectangle border.
    pub fn draw_rect(
        &mut self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        color: [u8; 3],
        thickness: usize,
    ) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        for py in y..y_end {
            for px in x..x_end {
                let on_border = px < x + thickness
                    || py < y + thickness
                    || px + thickness >= x + width
                    || py + thickness >= y + height;
                if on_border {
                    let idx = (py * self.width + px) * Self::CHANNELS;
                    self.data[idx..idx + Self::CHANNELS].copy_from_slice(&color);
                }
            }
        }
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the interleaved RGB bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
