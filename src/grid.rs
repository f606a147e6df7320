use std::num::NonZeroU32;

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use tracing::*;

use super::*;

/// How many logos go in each row.
///
/// # Example
/// ```
/// use logogrid::Cols;
///
/// assert_eq!(Cols::from(0), Cols::Auto);
/// assert_eq!(Cols::from(4), Cols::Fixed(std::num::NonZeroU32::new(4).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Cols {
    /// Balance the grid's aspect ratio against the canvas.
    #[default]
    Auto,
    Fixed(NonZeroU32),
}

impl From<u32> for Cols {
    fn from(cols: u32) -> Self {
        NonZeroU32::new(cols).map_or(Cols::Auto, Cols::Fixed)
    }
}

impl Cols {
    /// Resolves the column count for `count` logos on `canvas`.
    ///
    /// `Auto` uses `round(sqrt(count * width / height))`, rounding halves to even, and never
    /// goes below one column.
    ///
    /// # Example
    /// ```
    /// use logogrid::{Canvas, Cols};
    ///
    /// assert_eq!(Cols::Auto.resolve(12, &Canvas::STANDARD), 4);
    /// assert_eq!(Cols::from(5).resolve(12, &Canvas::STANDARD), 5);
    /// ```
    pub fn resolve(self, count: usize, canvas: &Canvas) -> u32 {
        match self {
            Cols::Fixed(cols) => cols.get(),
            Cols::Auto => {
                let balanced = (count as f64 * canvas.width_in() / canvas.height_in())
                    .sqrt()
                    .round_ties_even();
                (balanced as u32).max(1)
            }
        }
    }
}

/// The grid derived for one layout: column and row counts and real-valued cell sizes.
///
/// Cells are not rounded so that error does not accumulate across columns.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GridSpec {
    pub cols: u32,
    pub rows: u32,
    pub cell_width_px: f64,
    pub cell_height_px: f64,
}

impl GridSpec {
    /// Derives the grid for `count` logos on `canvas`.
    ///
    /// # Example
    /// ```
    /// use logogrid::{Canvas, Cols, GridSpec};
    ///
    /// let grid = GridSpec::new(6, &Canvas::STANDARD, Cols::from(3));
    /// assert_eq!((grid.cols, grid.rows), (3, 2));
    /// assert_eq!((grid.cell_width_px, grid.cell_height_px), (320.0, 360.0));
    /// ```
    pub fn new(count: usize, canvas: &Canvas, cols: Cols) -> Self {
        let cols = cols.resolve(count, canvas);
        let rows = (count as u32).div_ceil(cols);
        GridSpec {
            cols,
            rows,
            cell_width_px: canvas.width_px() as f64 / cols as f64,
            cell_height_px: canvas.height_px() as f64 / rows.max(1) as f64,
        }
    }

    /// Row and column of the logo at `index`; rows fill left to right.
    pub fn cell_of(&self, index: usize) -> (u32, u32) {
        let index = index as u32;
        (index / self.cols, index % self.cols)
    }

    /// Top-left corner of a cell relative to the canvas.
    pub fn cell_origin(&self, row: u32, col: u32) -> (f64, f64) {
        (
            col as f64 * self.cell_width_px,
            row as f64 * self.cell_height_px,
        )
    }

    /// The fit box shared by every cell of this grid.
    pub fn fit_box(&self, config: &LayoutConfig) -> FitBox {
        FitBox::inscribed(
            self.cell_width_px,
            self.cell_height_px,
            config.buffer_ratio,
            config.box_ratio,
        )
    }

    /// Places a logo of `size` at `index`.
    ///
    /// `origin` is the canvas offset on the slide, see [`Canvas::origin_within`].
    pub fn place(
        &self,
        index: usize,
        size: (u32, u32),
        origin: (f64, f64),
        config: &LayoutConfig,
    ) -> Placement {
        let (row, col) = self.cell_of(index);
        let fit_box = self.fit_box(config);
        let (width, height) = fit_inside(size.0, size.1, &fit_box);

        // Box centered in the cell, logo centered in the box
        let x_offset = (self.cell_width_px - fit_box.width as f64) / 2.0
            + (fit_box.width as f64 - width as f64) / 2.0;
        let y_offset = (self.cell_height_px - fit_box.height as f64) / 2.0
            + (fit_box.height as f64 - height as f64) / 2.0;
        let (cell_x, cell_y) = self.cell_origin(row, col);

        Placement {
            index,
            row,
            col,
            fit_box,
            width,
            height,
            x: origin.0 + cell_x + x_offset,
            y: origin.1 + cell_y + y_offset,
        }
    }
}

/// The largest rectangle of a fixed aspect ratio (5:2 by default) that fits inside a cell
/// shrunk by the buffer ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FitBox {
    pub width: u32,
    pub height: u32,
}

impl FitBox {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Inscribes a `ratio` box in a `cell_width` x `cell_height` cell.
    ///
    /// # Example
    /// ```
    /// use logogrid::FitBox;
    ///
    /// // Width limited
    /// assert_eq!(FitBox::inscribed(960.0, 720.0, 0.9, 2.5), FitBox::new(864, 345));
    /// // Height limited
    /// assert_eq!(FitBox::inscribed(960.0, 100.0, 0.9, 2.5), FitBox::new(225, 90));
    /// ```
    pub fn inscribed(cell_width: f64, cell_height: f64, buffer_ratio: f64, ratio: f64) -> Self {
        let max_width = (cell_width * buffer_ratio).floor();
        let max_height = (cell_height * buffer_ratio).floor();

        let (width, height) = if max_width / ratio <= max_height {
            (max_width, (max_width / ratio).floor())
        } else {
            ((max_height * ratio).floor(), max_height)
        };
        FitBox::new(width as u32, height as u32)
    }

    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Scales a `width` x `height` image to fit `fit_box` while keeping its aspect ratio.
///
/// Relatively wider images take the full box width, the rest take the full box height.
/// Neither side drops below one pixel.
///
/// # Example
/// ```
/// use logogrid::{fit_inside, FitBox};
///
/// let fit_box = FitBox::new(288, 115);
/// assert_eq!(fit_inside(200, 50, &fit_box), (288, 72));
/// assert_eq!(fit_inside(50, 50, &fit_box), (115, 115));
/// ```
pub fn fit_inside(width: u32, height: u32, fit_box: &FitBox) -> (u32, u32) {
    let ratio = width as f64 / height as f64;
    let (w, h) = if ratio > fit_box.ratio() {
        (fit_box.width as f64, (fit_box.width as f64 / ratio).floor())
    } else {
        ((fit_box.height as f64 * ratio).floor(), fit_box.height as f64)
    };
    ((w as u32).max(1), (h as u32).max(1))
}

/// Final size and slide position of one logo, in pixels.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Placement {
    /// Position in the input sequence.
    pub index: usize,
    pub row: u32,
    pub col: u32,
    pub fit_box: FitBox,
    pub width: u32,
    pub height: u32,
    /// Left edge, relative to the slide.
    pub x: f64,
    /// Top edge, relative to the slide.
    pub y: f64,
}

impl Placement {
    /// Top-left corner of the fit box, relative to the slide.
    pub fn fit_box_origin(&self) -> (f64, f64) {
        (
            self.x - (self.fit_box.width as f64 - self.width as f64) / 2.0,
            self.y - (self.fit_box.height as f64 - self.height as f64) / 2.0,
        )
    }
}

/// Placements in input order.
pub type Placements = SmallVecLogo<Placement>;

/// Computes one placement per image, in input order.
///
/// Images are expected to be trimmed already. An empty slice yields no placements.
///
/// # Example
/// ```
/// use logogrid::{layout, Canvas, Cols, LayoutConfig};
/// use image::{DynamicImage, RgbaImage};
///
/// let images = vec![DynamicImage::ImageRgba8(RgbaImage::new(200, 50)); 6];
/// let placements = layout(&images, &Canvas::STANDARD, Cols::from(3), &LayoutConfig::default());
/// assert_eq!(placements.len(), 6);
/// assert_eq!((placements[4].x, placements[4].y), (336.0, 504.0));
/// ```
pub fn layout(
    images: &[DynamicImage],
    canvas: &Canvas,
    cols: Cols,
    config: &LayoutConfig,
) -> Placements {
    let grid = GridSpec::new(images.len(), canvas, cols);
    let origin = canvas.origin_within(&canvas.slide_within(&config.frame));
    trace!(
        "Laying out {} images on a {}x{} grid at origin {:?}",
        images.len(),
        grid.cols,
        grid.rows,
        origin
    );
    images
        .iter()
        .enumerate()
        .map(|(index, image)| grid.place(index, image.dimensions(), origin, config))
        .collect()
}

/// Resamples `image` to the size chosen by `placement` with a Lanczos filter.
pub fn resize_to(image: &DynamicImage, placement: &Placement) -> DynamicImage {
    image.resize_exact(placement.width, placement.height, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use insta::assert_debug_snapshot;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    fn logos(count: usize, width: u32, height: u32) -> Vec<DynamicImage> {
        (0..count)
            .map(|_| {
                DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([1, 2, 3, 255])))
            })
            .collect()
    }

    #[test_case(1, 10.0, 7.5, 1 ; "single logo")]
    #[test_case(2, 10.0, 7.5, 2 ; "two logos")]
    #[test_case(4, 10.0, 7.5, 2 ; "four logos round down")]
    #[test_case(12, 10.0, 7.5, 4 ; "twelve logos exact square")]
    #[test_case(9, 4.0, 16.0, 2 ; "tie rounds to even")]
    #[test_case(5, 1.0, 20.0, 1 ; "clamped to one column")]
    #[test_case(10, 20.0, 1.0, 14 ; "wide strip")]
    fn test_auto_columns(count: usize, width: f64, height: f64, expected: u32) {
        let canvas = Canvas::new(width, height).unwrap();
        assert_eq!(Cols::Auto.resolve(count, &canvas), expected);
    }

    #[test]
    fn test_single_logo_fills_canvas() {
        let images = logos(1, 100, 40);
        let placements = layout(&images, &Canvas::STANDARD, Cols::Auto, &LayoutConfig::default());

        assert_debug_snapshot!(placements[0], @r###"
        Placement {
            index: 0,
            row: 0,
            col: 0,
            fit_box: FitBox {
                width: 864,
                height: 345,
            },
            width: 862,
            height: 345,
            x: 49.0,
            y: 187.5,
        }
        "###);
    }

    #[test]
    fn test_six_logos_three_columns() {
        let images = logos(6, 200, 50);
        let grid = GridSpec::new(images.len(), &Canvas::STANDARD, Cols::from(3));
        assert_eq!((grid.cols, grid.rows), (3, 2));

        let placements = layout(&images, &Canvas::STANDARD, Cols::from(3), &LayoutConfig::default());
        let cells: Vec<(u32, u32)> = placements.iter().map(|p| (p.row, p.col)).collect();
        assert_eq!(
            cells,
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
        );
    }

    #[test]
    fn test_wide_logo_is_width_constrained_and_vertically_centered() {
        let images = logos(6, 200, 50);
        let placements = layout(&images, &Canvas::STANDARD, Cols::from(3), &LayoutConfig::default());
        let p = &placements[4];

        assert_eq!(p.fit_box, FitBox::new(288, 115));
        assert_eq!((p.width, p.height), (288, 72));
        assert!(p.height < p.fit_box.height);
        // 122.5px between cell and box, 21.5px between box and logo
        assert_eq!(p.y - 360.0, 122.5 + 21.5);
        assert_eq!((p.x, p.y), (336.0, 504.0));
    }

    #[test]
    fn test_short_last_row_is_left_aligned() {
        let images = logos(5, 30, 30);
        let placements = layout(&images, &Canvas::STANDARD, Cols::from(3), &LayoutConfig::default());
        assert_eq!(placements[3].x, placements[0].x);
        assert_eq!(placements[4].x, placements[1].x);
        assert_eq!(placements[4].row, 1);
    }

    #[test]
    fn test_more_columns_than_logos() {
        let grid = GridSpec::new(2, &Canvas::STANDARD, Cols::from(5));
        assert_eq!((grid.cols, grid.rows), (5, 1));
        assert_eq!(grid.cell_width_px, 192.0);
        assert_eq!(grid.cell_height_px, 720.0);
    }

    #[test]
    fn test_small_canvas_is_offset_by_margins() {
        let canvas = Canvas::new(5.0, 2.5).unwrap();
        let images = logos(1, 100, 40);
        let placements = layout(&images, &canvas, Cols::Auto, &LayoutConfig::default());
        let bare = GridSpec::new(1, &canvas, Cols::Auto).place(
            0,
            (100, 40),
            (0.0, 0.0),
            &LayoutConfig::default(),
        );
        assert_eq!(placements[0].x - bare.x, 240.0);
        assert_eq!(placements[0].y - bare.y, 240.0);
    }

    #[test]
    fn test_empty_layout() {
        let placements = layout(&[], &Canvas::STANDARD, Cols::Auto, &LayoutConfig::default());
        assert!(placements.is_empty());
    }

    #[test]
    fn test_resize_to_placement() {
        let images = logos(1, 200, 50);
        let placements = layout(&images, &Canvas::STANDARD, Cols::Auto, &LayoutConfig::default());
        let resized = resize_to(&images[0], &placements[0]);
        assert_eq!(
            (resized.width(), resized.height()),
            (placements[0].width, placements[0].height)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_fit_box_snapshot() {
        let grid = GridSpec::new(6, &Canvas::STANDARD, Cols::from(3));
        insta::assert_yaml_snapshot!(grid.fit_box(&LayoutConfig::default()), @r###"
        width: 288
        height: 115
        "###);
    }

    proptest! {
        #[test]
        fn test_rows_cover_all_logos(count in 1..200usize, cols in 1..60u32) {
            let grid = GridSpec::new(count, &Canvas::STANDARD, Cols::from(cols));
            prop_assert_eq!(grid.rows, (count as u32 + cols - 1) / cols);
            prop_assert!(grid.rows * grid.cols >= count as u32);
            prop_assert!((grid.rows - 1) * grid.cols < count as u32);
        }

        #[test]
        fn test_cells_span_canvas(count in 1..100usize, width in 1.0..20.0f64, height in 1.0..20.0f64) {
            let canvas = Canvas::new(width, height).unwrap();
            let grid = GridSpec::new(count, &canvas, Cols::Auto);
            let span = grid.cell_width_px * grid.cols as f64;
            prop_assert!((span - canvas.width_px() as f64).abs() < 1e-6);
            let span = grid.cell_height_px * grid.rows as f64;
            prop_assert!((span - canvas.height_px() as f64).abs() < 1e-6);
        }

        #[test]
        fn test_placement_invariants(
            sizes in prop::collection::vec((10..400u32, 10..400u32), 1..12),
            cols in 0..6u32,
            width in 4.0..20.0f64,
            height in 4.0..20.0f64,
        ) {
            let canvas = Canvas::new(width, height).unwrap();
            let config = LayoutConfig::default();
            let grid = GridSpec::new(sizes.len(), &canvas, Cols::from(cols));
            let origin = canvas.origin_within(&canvas.slide_within(&config.frame));

            for (index, &(w, h)) in sizes.iter().enumerate() {
                let p = grid.place(index, (w, h), origin, &config);
                let b = p.fit_box;

                // Containment
                prop_assert!(p.width <= b.width && p.height <= b.height);
                prop_assert!(b.width as f64 <= (grid.cell_width_px * config.buffer_ratio).floor());
                prop_assert!(b.height as f64 <= (grid.cell_height_px * config.buffer_ratio).floor());

                // Aspect ratio within a pixel
                let ratio = w as f64 / h as f64;
                let by_width = (p.height as f64 - p.width as f64 / ratio).abs();
                let by_height = (p.width as f64 - p.height as f64 * ratio).abs();
                prop_assert!(by_width <= 1.0 || by_height <= 1.0);

                // Nested centering
                let (cell_x, cell_y) = grid.cell_origin(p.row, p.col);
                let box_margin_x = (grid.cell_width_px - b.width as f64) / 2.0;
                let box_margin_y = (grid.cell_height_px - b.height as f64) / 2.0;
                let logo_margin_x = (b.width as f64 - p.width as f64) / 2.0;
                let logo_margin_y = (b.height as f64 - p.height as f64) / 2.0;
                prop_assert!((p.x - (origin.0 + cell_x + box_margin_x + logo_margin_x)).abs() < 1e-9);
                prop_assert!((p.y - (origin.1 + cell_y + box_margin_y + logo_margin_y)).abs() < 1e-9);
            }
        }
    }
}
