//! Turns a drawing into the input column of a [`Network`](crate::neural::Network).
//!
//! The bitmap is binarised into ink and blank pixels, cropped to a square
//! around the drawing, reduced to a `side x side` grid in which a cell is
//! set when its block holds any ink, nudged downwards, and flattened
//! column by column.

use image::{GenericImageView, Pixel};
use tracing::debug;

use crate::{
    matrix::Matrix,
    neural::{sample::Sample, stats::truncate},
    prelude::*,
};

/// Pixels with a normalised gray value below this count as ink.
pub const INK_THRESHOLD: f64 = 0.97;

/// 1.0 for ink, 0.0 for blank.
///
/// The gray value is the mean of the colour channels scaled to [0, 1] and
/// truncated to three decimals. Anything noticeably darker than white is ink.
pub fn grayscale<P: Pixel<Subpixel = u8>>(pixel: &P) -> f64 {
    let channels = pixel.to_rgb().0;
    let mean = channels.iter().map(|&c| c as f64).sum::<f64>() / 3.0;
    let gray = truncate(mean / 255.0, 3);

    if gray < INK_THRESHOLD {
        1.0
    } else {
        0.0
    }
}

/// Ink mask of an image, one row per pixel row.
pub fn binarize<I>(image: &I) -> Matrix
where
    I: GenericImageView,
    I::Pixel: Pixel<Subpixel = u8>,
{
    let (width, height) = image.dimensions();
    let mut ink = Matrix::new(height as usize, width as usize);

    for (x, y, pixel) in image.pixels() {
        ink[(y as usize, x as usize)] = grayscale(&pixel);
    }
    ink
}

/// Inclusive bounds of the inked area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl BoundingBox {
    pub fn width(&self) -> usize {
        self.right.saturating_sub(self.left) + 1
    }

    pub fn height(&self) -> usize {
        self.bottom.saturating_sub(self.top) + 1
    }
}

/// Finds the first and last inked row and column.
///
/// Each edge is scanned on its own and falls back to 0, so a blank mask
/// yields the single point (0, 0).
pub fn bounding_box(ink: &Matrix) -> BoundingBox {
    let inked_row = |row: usize| !ink.is_zero_row(row);
    let inked_col = |col: usize| (0..ink.rows()).any(|row| ink[(row, col)] != 0.0);

    BoundingBox {
        top: (0..ink.rows()).find(|&r| inked_row(r)).unwrap_or(0),
        bottom: (0..ink.rows()).rev().find(|&r| inked_row(r)).unwrap_or(0),
        left: (0..ink.cols()).find(|&c| inked_col(c)).unwrap_or(0),
        right: (0..ink.cols()).rev().find(|&c| inked_col(c)).unwrap_or(0),
    }
}

/// Square crop of one image, recomputed for every translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropGeometry {
    pub x: usize,
    pub y: usize,
    pub side: usize,
    /// Side of one grid block in pixels.
    pub cluster_side: usize,
    pub cluster_pixels: usize,
}

/// Shifts a `side` long window that is centered on `[start, start + extent)`
/// back inside `[0, limit)`.
fn window_origin(start: usize, extent: usize, side: usize, limit: usize) -> usize {
    let centered = start as i64 - (side as i64 - extent as i64) / 2;
    centered.clamp(0, (limit - side) as i64) as usize
}

/// Resamples drawings into a fixed `side_length x side_length` grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translator {
    side_length: usize,
}

impl Translator {
    pub fn new(side_length: usize) -> Result<Self> {
        if side_length == 0 {
            return Err(Error::InvalidArgument(
                "translator grid needs a side length above zero".to_string(),
            ));
        }
        Ok(Self { side_length })
    }

    pub fn side_length(&self) -> usize {
        self.side_length
    }

    /// Square around `bbox`, its side the larger box extent rounded up to a
    /// multiple of the grid size, never reaching past the image.
    pub fn crop(&self, bbox: &BoundingBox, width: usize, height: usize) -> CropGeometry {
        let n = self.side_length;
        let extent = bbox.width().max(bbox.height());
        let side = ((extent + n - 1) / n * n).min(width).min(height);

        let x = window_origin(bbox.left, bbox.width(), side, width);
        let y = window_origin(bbox.top, bbox.height(), side, height);

        let cluster_side = side / n;
        CropGeometry {
            x,
            y,
            side,
            cluster_side,
            cluster_pixels: cluster_side * cluster_side,
        }
    }

    /// One cell per block of the crop, set when the block holds any ink.
    pub fn cluster(&self, ink: &Matrix, crop: &CropGeometry) -> Matrix {
        let n = self.side_length;
        let bounds = |i: usize| (i * crop.side / n, (i + 1) * crop.side / n);
        let mut grid = Matrix::new(n, n);

        for i in 0..n {
            let (y0, y1) = bounds(i);
            for j in 0..n {
                let (x0, x1) = bounds(j);
                let inked = (crop.y + y0..crop.y + y1)
                    .any(|y| (crop.x + x0..crop.x + x1).any(|x| ink[(y, x)] != 0.0));
                if inked {
                    grid[(i, j)] = 1.0;
                }
            }
        }
        grid
    }

    /// Moves the content down by half the number of blank rows at the bottom.
    pub fn center(grid: &Matrix) -> Matrix {
        let rows = grid.rows();
        let blank = (0..rows)
            .rev()
            .take_while(|&row| grid.is_zero_row(row))
            .count();
        let offset = blank / 2;

        let mut out = Matrix::new(rows, grid.cols());
        for row in 0..rows - offset {
            for col in 0..grid.cols() {
                out[(row + offset, col)] = grid[(row, col)];
            }
        }
        out
    }

    /// Grid of the drawing before flattening.
    pub fn translate_grid<I>(&self, image: &I) -> Matrix
    where
        I: GenericImageView,
        I::Pixel: Pixel<Subpixel = u8>,
    {
        let ink = binarize(image);
        let bbox = bounding_box(&ink);
        let crop = self.crop(&bbox, ink.cols(), ink.rows());
        debug!(?bbox, ?crop, "translating drawing");

        Self::center(&self.cluster(&ink, &crop))
    }

    /// Network input column of `side_length^2` rows.
    pub fn translate<I>(&self, image: &I) -> Matrix
    where
        I: GenericImageView,
        I::Pixel: Pixel<Subpixel = u8>,
    {
        self.translate_grid(image).to_single_column()
    }

    /// [`Translator::translate`] wrapped as an inference-only sample.
    pub fn translate_sample<I>(&self, image: &I) -> Sample
    where
        I: GenericImageView,
        I::Pixel: Pixel<Subpixel = u8>,
    {
        Sample::input(self.translate(image))
    }
}
