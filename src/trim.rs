use std::borrow::Cow;

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::rect::Rect;
use tracing::*;

/// Describes which pixels count as blank border.
///
/// A pixel is background when its difference from `background` is zero. With `alpha_only`
/// set only the alpha channel of that difference is inspected, so fully transparent pixels of
/// any color are background while opaque white is content.
///
/// Images without an alpha channel are compared against the opaque `background` color instead,
/// so an RGB or grayscale logo sheds its white border.
///
/// # Example
/// ```
/// use logogrid::TrimConfig;
/// use image::Rgba;
///
/// let config = TrimConfig::default();
/// assert_eq!(config.background, Rgba([255, 255, 255, 0]));
/// assert!(config.alpha_only);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TrimConfig {
    pub background: Rgba<u8>,
    pub alpha_only: bool,
}

impl Default for TrimConfig {
    fn default() -> Self {
        TrimConfig {
            background: Rgba([255, 255, 255, 0]),
            alpha_only: true,
        }
    }
}

/// Crops images to the tightest rectangle holding non-background pixels.
#[derive(Debug, Clone, Default)]
pub struct Trimmer {
    config: TrimConfig,
}

impl Trimmer {
    pub fn new(config: TrimConfig) -> Self {
        Self { config }
    }

    /// The trimmer matching the color type of `image`.
    ///
    /// Alpha-less images carry an implicit alpha of 255, so they are matched exactly against the
    /// opaque background color.
    fn for_image(&self, image: &DynamicImage) -> Cow<'_, Trimmer> {
        if image.color().has_alpha() {
            return Cow::Borrowed(self);
        }
        let Rgba([r, g, b, _]) = self.config.background;
        Cow::Owned(Trimmer::new(TrimConfig {
            background: Rgba([r, g, b, u8::MAX]),
            alpha_only: false,
        }))
    }

    /// Finds the content rectangle of `image`, honoring its color type.
    pub fn content_rect(&self, image: &DynamicImage) -> Option<Rect> {
        self.for_image(image).bounding_box(&image.to_rgba8())
    }

    /// Returns a copy of `image` cropped to its visible content.
    ///
    /// A uniformly blank image is returned unchanged. The crop keeps the source color type.
    pub fn trim(&self, image: &DynamicImage) -> DynamicImage {
        match self.content_rect(image) {
            Some(rect) => {
                trace!(
                    "Trimming {}x{} image to {}x{} at ({}, {})",
                    image.width(),
                    image.height(),
                    rect.width(),
                    rect.height(),
                    rect.left(),
                    rect.top()
                );
                image.crop_imm(
                    rect.left() as u32,
                    rect.top() as u32,
                    rect.width(),
                    rect.height(),
                )
            }
            None => {
                trace!("Image is blank, leaving it untouched");
                image.clone()
            }
        }
    }

    /// Finds the minimal rectangle enclosing every non-background pixel.
    ///
    /// Returns `None` when the image has no visible content.
    pub fn bounding_box(&self, img: &RgbaImage) -> Option<Rect> {
        let (width, height) = img.dimensions();
        let top = (0..height).find(|&y| !self.is_row_empty(img, y))?;
        let bottom = (top..height).rev().find(|&y| !self.is_row_empty(img, y))?;
        let left = (0..width).find(|&x| !self.is_column_empty(img, x, top, bottom))?;
        let right = (left..width)
            .rev()
            .find(|&x| !self.is_column_empty(img, x, top, bottom))?;

        Some(Rect::at(left as i32, top as i32).of_size(right - left + 1, bottom - top + 1))
    }

    /// Checks if a pixel matches the reference background.
    pub fn is_background(&self, pixel: &Rgba<u8>) -> bool {
        if self.config.alpha_only {
            pixel[3] == self.config.background[3]
        } else {
            *pixel == self.config.background
        }
    }

    /// Checks if every pixel of row `y` is background.
    pub fn is_row_empty(&self, img: &RgbaImage, y: u32) -> bool {
        (0..img.width()).all(|x| self.is_background(img.get_pixel(x, y)))
    }

    /// Checks if every pixel of column `x` between rows `top` and `bottom` (inclusive) is
    /// background.
    pub fn is_column_empty(&self, img: &RgbaImage, x: u32, top: u32, bottom: u32) -> bool {
        (top..=bottom).all(|y| self.is_background(img.get_pixel(x, y)))
    }
}

/// Crops `image` to its visible content using the default transparent background.
///
/// # Example
/// ```
/// use std::borrow::Cow;
///
/// use image::{DynamicImage, Rgba, RgbaImage};
///
/// let mut img = RgbaImage::new(50, 50);
/// img.put_pixel(10, 20, Rgba([0, 0, 0, 255]));
/// img.put_pixel(14, 22, Rgba([0, 0, 0, 255]));
/// let trimmed = logogrid::trim(&DynamicImage::ImageRgba8(img));
/// assert_eq!((trimmed.width(), trimmed.height()), (5, 3));
/// ```
pub fn trim(image: &DynamicImage) -> DynamicImage {
    Trimmer::default().trim(image)
}

/// Bounding rectangle of the visible content of `image`, if any.
pub fn bounding_box(image: &DynamicImage) -> Option<Rect> {
    Trimmer::default().content_rect(image)
}
