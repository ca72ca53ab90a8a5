//! Image sizing and row packing.
//!
//! All lengths are centimetres. The same algorithm is emitted as a Typst
//! script when the natural sizes are only known at render time, so the
//! constants here must match the ones written into that script.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;

/// Maximum width and height of a single image, and the width of a row.
pub const MAX_SIZE_CM: f64 = 13.4;
/// Rows are split before their height would drop under this.
pub const MIN_ROW_HEIGHT_CM: f64 = 6.0;
/// Horizontal gap between images of a row.
pub const GAP_CM: f64 = 0.3;

/// Natural (or laid out) size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    /// Width in centimetres.
    pub width: f64,
    /// Height in centimetres.
    pub height: f64,
}

impl ImageSize {
    /// Creates a size from centimetres.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width over height.
    pub fn ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Both sides finite and positive.
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// An image referenced from a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Path as written in the document.
    pub path: String,
    /// Alt text, possibly empty.
    pub alt: String,
    /// File name without extension.
    pub caption: String,
}

impl ImageRef {
    /// Builds a reference, deriving the caption from the path.
    pub fn new(path: impl Into<String>, alt: impl Into<String>) -> Self {
        let path = path.into();
        let caption = Path::new(&path)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            alt: alt.into(),
            caption,
        }
    }
}

/// How the images of one paragraph are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageGroup {
    /// One image: its own figure.
    Single,
    /// Several images, no alt text: packed rows of separate figures.
    Flow,
    /// Several images, some alt text: one figure with lettered parts.
    Subfigure,
}

impl ImageGroup {
    /// Classifies a paragraph's images; `None` when there are none.
    pub fn classify(images: &[ImageRef]) -> Option<Self> {
        match images {
            [] => None,
            [_] => Some(ImageGroup::Single),
            _ if images.iter().any(|img| !img.alt.is_empty()) => Some(ImageGroup::Subfigure),
            _ => Some(ImageGroup::Flow),
        }
    }
}

/// A contiguous run of images sharing one height.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRow {
    /// Indices into the paragraph's images.
    pub images: Range<usize>,
    /// Row height in centimetres.
    pub height: f64,
}

impl ImageRow {
    /// Width of an image with the given ratio in this row.
    pub fn width_for(&self, ratio: f64) -> f64 {
        self.height * ratio
    }
}

/// Scales a single image down so neither side exceeds [`MAX_SIZE_CM`].
///
/// Width is fitted first; the height is then checked on the already scaled
/// size. Small images are left at their natural size.
pub fn fit_single(size: ImageSize) -> ImageSize {
    let mut width = size.width;
    let mut height = size.height;

    if width > MAX_SIZE_CM {
        let scale = MAX_SIZE_CM / width;
        width = MAX_SIZE_CM;
        height *= scale;
    }

    if height > MAX_SIZE_CM {
        let scale = MAX_SIZE_CM / height;
        width *= scale;
        height = MAX_SIZE_CM;
    }

    ImageSize::new(width, height)
}

/// Height at which images with these ratios exactly fill a row.
pub fn row_height(ratios: &[f64]) -> f64 {
    let gaps = ratios.len().saturating_sub(1) as f64 * GAP_CM;
    (MAX_SIZE_CM - gaps) / ratios.iter().sum::<f64>()
}

/// Greedy row packing.
///
/// From the remaining images, the smallest `n > 1` whose row would be shorter
/// than [`MIN_ROW_HEIGHT_CM`] ends the row at `n - 1` images. When no prefix
/// triggers that, everything left becomes the final row. There is no
/// lookahead: a row is never rebalanced against the next one.
pub fn pack_rows(ratios: &[f64]) -> Vec<Range<usize>> {
    let mut rows = Vec::new();
    let mut start = 0;

    while start < ratios.len() {
        let remaining = &ratios[start..];
        let end = (2..=remaining.len())
            .find(|&n| row_height(&remaining[..n]) < MIN_ROW_HEIGHT_CM)
            .map_or(ratios.len(), |n| start + n - 1);
        rows.push(start..end);
        start = end;
    }

    rows
}

/// Packs rows (or keeps one row for a subfigure group) and clamps each row
/// height to [`MAX_SIZE_CM`].
pub fn layout_rows(ratios: &[f64], single_row: bool) -> Vec<ImageRow> {
    let ranges = if single_row {
        vec![0..ratios.len()]
    } else {
        pack_rows(ratios)
    };

    ranges
        .into_iter()
        .filter(|range| !range.is_empty())
        .map(|range| {
            let height = row_height(&ratios[range.clone()]).min(MAX_SIZE_CM);
            ImageRow {
                images: range,
                height,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn single_image_scales_by_width_then_height() {
        let wide = fit_single(ImageSize::new(26.8, 10.0));
        assert!(approx(wide.width, 13.4));
        assert!(approx(wide.height, 5.0));

        let tall = fit_single(ImageSize::new(20.0, 40.0));
        assert!(approx(tall.width, 6.7));
        assert!(approx(tall.height, 13.4));

        let small = fit_single(ImageSize::new(4.0, 3.0));
        assert_eq!(small, ImageSize::new(4.0, 3.0));
    }

    #[test]
    fn fitted_image_never_exceeds_cap() {
        for (w, h) in [(100.0, 1.0), (1.0, 100.0), (13.5, 13.5), (50.0, 49.0)] {
            let fitted = fit_single(ImageSize::new(w, h));
            assert!(fitted.width <= MAX_SIZE_CM + 1e-9, "{w}x{h} -> {fitted:?}");
            assert!(fitted.height <= MAX_SIZE_CM + 1e-9, "{w}x{h} -> {fitted:?}");
        }
    }

    #[test]
    fn row_height_accounts_for_gaps() {
        assert!(approx(row_height(&[1.0]), 13.4));
        assert!(approx(row_height(&[1.0, 1.0]), 6.55));
    }

    #[test]
    fn two_wide_images_split_into_two_rows() {
        // 13.1 / 4 = 3.275 < 6
        assert_eq!(pack_rows(&[2.0, 2.0]), vec![0..1, 1..2]);
    }

    #[test]
    fn two_square_images_share_a_row() {
        let rows = layout_rows(&[1.0, 1.0], false);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].images, 0..2);
        assert!(approx(rows[0].height, 6.55));
    }

    #[test]
    fn three_square_images_break_after_two() {
        // three across: 12.8 / 3 < 6
        assert_eq!(pack_rows(&[1.0, 1.0, 1.0]), vec![0..2, 2..3]);
    }

    #[test]
    fn rows_cover_every_image_in_order() {
        let ratios = [0.5, 1.5, 3.0, 0.7, 0.7, 0.7, 2.2, 1.0];
        let rows = pack_rows(&ratios);
        let mut next = 0;
        for row in &rows {
            assert_eq!(row.start, next);
            assert!(!row.is_empty());
            next = row.end;
        }
        assert_eq!(next, ratios.len());
    }

    #[test]
    fn tall_single_row_is_clamped() {
        let rows = layout_rows(&[0.2], false);
        assert!(approx(rows[0].height, MAX_SIZE_CM));
    }

    #[test]
    fn grouped_images_stay_in_one_row() {
        let rows = layout_rows(&[2.0, 2.0, 2.0], true);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].images, 0..3);
        assert!(rows[0].height < MIN_ROW_HEIGHT_CM);
    }

    #[test]
    fn classifies_groups() {
        let plain = ImageRef::new("a.png", "");
        let labelled = ImageRef::new("b.png", "示意");
        assert_eq!(ImageGroup::classify(&[]), None);
        assert_eq!(
            ImageGroup::classify(&[labelled.clone()]),
            Some(ImageGroup::Single)
        );
        assert_eq!(
            ImageGroup::classify(&[plain.clone(), plain.clone()]),
            Some(ImageGroup::Flow)
        );
        assert_eq!(
            ImageGroup::classify(&[plain, labelled]),
            Some(ImageGroup::Subfigure)
        );
    }

    #[test]
    fn caption_is_file_stem() {
        assert_eq!(ImageRef::new("img/总体架构.png", "").caption, "总体架构");
        assert_eq!(ImageRef::new("a.b.jpg", "").caption, "a.b");
        assert_eq!(ImageRef::new("noext", "").caption, "noext");
    }
}
