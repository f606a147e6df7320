//! This crate arranges logo images into a grid and exports the result as a single-slide
//! presentation. It uses the `image` crate for pixel work, `rayon` for per-logo parallelism
//! and `zip` for writing the PresentationML package.
//!
//! The pipeline is: [`trim`] every logo, lay the trimmed logos out with [`layout`] (or
//! [`GridSpec`] directly), resize each logo to its [`Placement`], then hand the result to
//! [`export::SlideDeck`].
//!
//! # Example
//! ```
//! use logogrid::{Canvas, Cols, LayoutConfig, LogoGrid};
//! use image::{DynamicImage, Rgba, RgbaImage};
//!
//! let logo = DynamicImage::ImageRgba8(RgbaImage::from_pixel(200, 50, Rgba([0, 0, 0, 255])));
//! let canvas = Canvas::new(10.0, 7.5).unwrap();
//! let grid = LogoGrid::try_from_images_with_config(
//!     &[logo.clone(), logo],
//!     canvas,
//!     Cols::Auto,
//!     LayoutConfig::default(),
//! )
//! .unwrap();
//! assert_eq!(grid.logos.len(), 2);
//! ```

/// Layout tuning knobs: fit-box buffer, box ratio, reference frame and parallelism.
pub mod config;
/// Debug helpers for writing a rendered preview of a grid to disk.
#[cfg(feature = "drawing")]
pub mod debug;
/// Rasterized previews of a computed grid, feature-gated under `drawing`.
#[cfg(feature = "drawing")]
pub mod drawing;
/// PresentationML (`.pptx`) export of a laid-out grid.
pub mod export;
/// Grid dimensions, fit boxes and per-logo placements.
pub mod grid;
/// Loading logos from a directory on disk.
pub mod library;
/// Cropping blank and transparent borders off logos.
pub mod trim;

pub use config::LayoutConfig;
pub use grid::{fit_inside, layout, resize_to, Cols, FitBox, GridSpec, Placement, Placements};
pub use trim::{bounding_box, trim, TrimConfig, Trimmer};

use std::path::PathBuf;

use image::DynamicImage;
use rayon::prelude::*;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::*;

/// Logical pixel density used for every inch/pixel conversion.
pub const PIXELS_PER_INCH: f64 = 96.0;
/// English Metric Units per inch, the PresentationML length unit.
pub const EMU_PER_INCH: f64 = 914_400.0;

// Logo rosters rarely exceed a few dozen entries
const DEFAULT_SMALLVEC_SIZE: usize = 32;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Invalid canvas dimensions: width={width_in}in, height={height_in}in")]
    InvalidCanvas { width_in: f64, height_in: f64 },

    #[error("No logos were supplied")]
    NoImages,

    #[error("Failed to load image {path:?}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Logo not found in library: {0}")]
    UnknownLogo(String),

    #[error("Failed to encode image: {0}")]
    ImageEncode(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write archive: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// A type alias for SmallVec with a stack buffer sized for typical logo rosters.
pub type SmallVecLogo<T> = SmallVec<[T; DEFAULT_SMALLVEC_SIZE]>;

/// Converts a length in inches to logical pixels.
pub fn inches_to_px(inches: f64) -> f64 {
    inches * PIXELS_PER_INCH
}

/// Converts logical pixels to English Metric Units, rounded to the nearest unit.
///
/// # Example
/// ```
/// assert_eq!(logogrid::px_to_emu(96.0), 914_400);
/// assert_eq!(logogrid::px_to_emu(1.0), 9_525);
/// ```
pub fn px_to_emu(px: f64) -> i64 {
    (px / PIXELS_PER_INCH * EMU_PER_INCH).round() as i64
}

/// A physical drawing surface measured in inches.
///
/// The same type describes both the requested grid area and the slide that hosts it.
///
/// # Example
/// ```
/// use logogrid::Canvas;
///
/// let canvas = Canvas::new(10.0, 7.5).unwrap();
/// assert_eq!(canvas.width_px(), 960);
/// assert_eq!(canvas.height_px(), 720);
/// assert!(Canvas::new(0.0, 7.5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Canvas {
    width_in: f64,
    height_in: f64,
}

/// The slide hosting a canvas. Always at least as large as the canvas.
pub type SlideSize = Canvas;

impl Canvas {
    /// The 10 x 7.5 inch (4:3) slide used as the default reference frame.
    pub const STANDARD: Canvas = Canvas {
        width_in: 10.0,
        height_in: 7.5,
    };

    /// Creates a canvas, rejecting non-positive or non-finite dimensions.
    pub fn new(width_in: f64, height_in: f64) -> Result<Self, GridError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width_in) || !valid(height_in) {
            error!(
                "Invalid canvas dimensions: width={}, height={}",
                width_in, height_in
            );
            return Err(GridError::InvalidCanvas {
                width_in,
                height_in,
            });
        }
        Ok(Self {
            width_in,
            height_in,
        })
    }

    pub fn width_in(&self) -> f64 {
        self.width_in
    }

    pub fn height_in(&self) -> f64 {
        self.height_in
    }

    /// Canvas width in whole pixels.
    pub fn width_px(&self) -> u32 {
        inches_to_px(self.width_in).round() as u32
    }

    /// Canvas height in whole pixels.
    pub fn height_px(&self) -> u32 {
        inches_to_px(self.height_in).round() as u32
    }

    /// The smallest slide that contains both `frame` and this canvas.
    ///
    /// # Example
    /// ```
    /// use logogrid::Canvas;
    ///
    /// let canvas = Canvas::new(12.0, 5.0).unwrap();
    /// let slide = canvas.slide_within(&Canvas::STANDARD);
    /// assert_eq!(slide, Canvas::new(12.0, 7.5).unwrap());
    /// ```
    pub fn slide_within(&self, frame: &Canvas) -> SlideSize {
        Canvas {
            width_in: self.width_in.max(frame.width_in),
            height_in: self.height_in.max(frame.height_in),
        }
    }

    /// Pixel offset of this canvas when centered on `slide`.
    pub fn origin_within(&self, slide: &SlideSize) -> (f64, f64) {
        (
            inches_to_px(slide.width_in - self.width_in) / 2.0,
            inches_to_px(slide.height_in - self.height_in) / 2.0,
        )
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Canvas::STANDARD
    }
}

/// A trimmed and resized logo together with where it goes on the slide.
#[derive(Debug, Clone)]
pub struct PlacedLogo {
    pub image: DynamicImage,
    pub placement: Placement,
}

/// A complete logo grid: the grid geometry, the canvas and slide it sits on, and every placed
/// logo in input order.
///
/// # Example
/// ```
/// use logogrid::{Canvas, Cols, LayoutConfig, LogoGrid};
/// use image::{DynamicImage, Rgba, RgbaImage};
///
/// let logos: Vec<DynamicImage> = (0..6)
///     .map(|_| DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 16, Rgba([9, 9, 9, 255]))))
///     .collect();
/// let grid = LogoGrid::try_from_images_with_config(
///     &logos,
///     Canvas::STANDARD,
///     Cols::from(3),
///     LayoutConfig::default(),
/// )
/// .unwrap();
/// assert_eq!((grid.grid.cols, grid.grid.rows), (3, 2));
/// assert_eq!(grid.logos[4].placement.row, 1);
/// ```
#[derive(Debug, Clone)]
pub struct LogoGrid {
    pub grid: GridSpec,
    pub canvas: Canvas,
    pub slide: SlideSize,
    pub logos: Vec<PlacedLogo>,
}

impl LogoGrid {
    /// Trims, lays out and resizes `images` onto `canvas`.
    ///
    /// # Errors
    /// Returns [`GridError::NoImages`] when `images` is empty.
    pub fn try_from_images_with_config(
        images: &[DynamicImage],
        canvas: Canvas,
        cols: Cols,
        config: LayoutConfig,
    ) -> Result<Self, GridError> {
        trace!("Building logo grid with config: {:?}", config);
        if images.is_empty() {
            warn!("Refusing to lay out an empty logo list");
            return Err(GridError::NoImages);
        }

        let trimmer = Trimmer::new(config.trim.clone());
        let trimmed: Vec<DynamicImage> = if config.enable_parallel {
            images.par_iter().map(|img| trimmer.trim(img)).collect()
        } else {
            images.iter().map(|img| trimmer.trim(img)).collect()
        };

        let slide = canvas.slide_within(&config.frame);
        let grid = GridSpec::new(trimmed.len(), &canvas, cols);
        debug!(
            "Grid has {} columns and {} rows of {:.2}x{:.2}px cells",
            grid.cols, grid.rows, grid.cell_width_px, grid.cell_height_px
        );
        let placements = layout(&trimmed, &canvas, cols, &config);

        let logos = if config.enable_parallel {
            trimmed
                .into_par_iter()
                .zip(placements.into_vec().into_par_iter())
                .map(Self::place)
                .collect()
        } else {
            trimmed
                .into_iter()
                .zip(placements)
                .map(Self::place)
                .collect()
        };

        Ok(LogoGrid {
            grid,
            canvas,
            slide,
            logos,
        })
    }

    fn place((image, placement): (DynamicImage, Placement)) -> PlacedLogo {
        PlacedLogo {
            image: resize_to(&image, &placement),
            placement,
        }
    }

    /// Returns an iterator over the placements, in input order.
    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.logos.iter().map(|logo| &logo.placement)
    }

    /// Pixel offset of the canvas on the slide.
    pub fn origin(&self) -> (f64, f64) {
        self.canvas.origin_within(&self.slide)
    }

    /// Returns the placed logos in row `row`, left to right.
    pub fn row(&self, row: u32) -> impl Iterator<Item = &PlacedLogo> {
        self.logos
            .iter()
            .filter(move |logo| logo.placement.row == row)
    }
}

impl TryFrom<&[DynamicImage]> for LogoGrid {
    type Error = GridError;

    fn try_from(images: &[DynamicImage]) -> Result<Self, Self::Error> {
        LogoGrid::try_from_images_with_config(
            images,
            Canvas::default(),
            Cols::Auto,
            LayoutConfig::default(),
        )
    }
}
