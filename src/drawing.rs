//! This module renders a computed logo grid into a raster preview: cell outlines, fit boxes
//! and the resized logos themselves. It is feature-gated under the `drawing` feature and
//! requires the `image` and `imageproc` crates.
//!
//! # Examples
//!
//! ```rust
//! use logogrid::{drawing::*, LogoGrid};
//! use image::{DynamicImage, Rgba, RgbaImage};
//!
//! let logo = DynamicImage::ImageRgba8(RgbaImage::from_pixel(80, 30, Rgba([0, 0, 0, 255])));
//! let grid = LogoGrid::try_from(&[logo.clone(), logo][..]).unwrap();
//!
//! let preview_config = PreviewConfig {
//!     background: Rgba([255, 255, 255, 255]),
//!     cell_color: Rgba([200, 200, 200, 255]), // Light gray for cells
//!     box_color: Rgba([255, 0, 0, 255]),      // Red for fit boxes
//!     box_color_provider: None,               // Use uniform box color
//!     line_thickness: 1,
//! };
//! let preview = render_preview(&grid, &preview_config).unwrap();
//! assert_eq!(preview.dimensions(), (960, 720));
//! ```

use std::fmt;

use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::*;

/// Configuration for drawing previews.
///
/// Users can specify a uniform fit box color or provide a color provider function keyed by
/// logo index.
pub struct PreviewConfig {
    /// Fill color of the slide.
    pub background: Rgba<u8>,
    /// Color of cell outlines.
    pub cell_color: Rgba<u8>,
    /// Default color of fit box outlines.
    pub box_color: Rgba<u8>,
    /// Optional function to provide custom fit box colors based on the logo index.
    pub box_color_provider: Option<Box<dyn Fn(usize) -> Rgba<u8>>>,
    /// Thickness of outlines in pixels.
    pub line_thickness: u32,
}

// Manually implement Debug for PreviewConfig
impl fmt::Debug for PreviewConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewConfig")
            .field("background", &self.background)
            .field("cell_color", &self.cell_color)
            .field("box_color", &self.box_color)
            .field("box_color_provider", &"<function>")
            .field("line_thickness", &self.line_thickness)
            .finish()
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        PreviewConfig {
            background: Rgba([255, 255, 255, 255]),
            cell_color: Rgba([200, 200, 200, 255]), // Light gray
            box_color: Rgba([255, 0, 0, 255]),      // Red
            box_color_provider: None,
            line_thickness: 1,
        }
    }
}

impl PreviewConfig {
    fn box_color(&self, index: usize) -> Rgba<u8> {
        match self.box_color_provider {
            Some(ref provider) => provider(index),
            None => self.box_color,
        }
    }
}

/// Trait for types that can be drawn on a preview.
pub trait Drawable {
    /// Draws the object on `image`.
    ///
    /// # Errors
    /// Returns [`GridError`] if drawing fails.
    fn draw(&self, image: &mut RgbaImage, config: &PreviewConfig) -> Result<(), GridError>;
}

/// Draws an outline `thickness` pixels wide, growing inwards. Degenerate rectangles are
/// skipped.
fn draw_outline(image: &mut RgbaImage, x: f64, y: f64, w: f64, h: f64, thickness: u32, color: Rgba<u8>) {
    let (x, y) = (x.round() as i32, y.round() as i32);
    let (w, h) = (w.round() as i64, h.round() as i64);
    for inset in 0..thickness as i64 {
        let (iw, ih) = (w - 2 * inset, h - 2 * inset);
        if iw <= 0 || ih <= 0 {
            break;
        }
        let rect = Rect::at(x + inset as i32, y + inset as i32).of_size(iw as u32, ih as u32);
        draw_hollow_rect_mut(image, rect, color);
    }
}

impl Drawable for PlacedLogo {
    fn draw(&self, image: &mut RgbaImage, config: &PreviewConfig) -> Result<(), GridError> {
        let p = &self.placement;
        let (box_x, box_y) = p.fit_box_origin();
        draw_outline(
            image,
            box_x,
            box_y,
            p.fit_box.width as f64,
            p.fit_box.height as f64,
            config.line_thickness,
            config.box_color(p.index),
        );
        imageops::overlay(
            image,
            &self.image.to_rgba8(),
            p.x.round() as i64,
            p.y.round() as i64,
        );
        Ok(())
    }
}

impl Drawable for LogoGrid {
    fn draw(&self, image: &mut RgbaImage, config: &PreviewConfig) -> Result<(), GridError> {
        let (origin_x, origin_y) = self.origin();

        // Draw every cell, including empty ones in a short last row
        for row in 0..self.grid.rows {
            for col in 0..self.grid.cols {
                let (cell_x, cell_y) = self.grid.cell_origin(row, col);
                draw_outline(
                    image,
                    origin_x + cell_x,
                    origin_y + cell_y,
                    self.grid.cell_width_px,
                    self.grid.cell_height_px,
                    config.line_thickness,
                    config.cell_color,
                );
            }
        }

        for logo in &self.logos {
            logo.draw(image, config)?;
        }
        Ok(())
    }
}

/// Renders `grid` on a slide-sized canvas.
pub fn render_preview(grid: &LogoGrid, config: &PreviewConfig) -> Result<RgbaImage, GridError> {
    let mut image = RgbaImage::from_pixel(
        grid.slide.width_px(),
        grid.slide.height_px(),
        config.background,
    );
    grid.draw(&mut image, config)?;
    Ok(image)
}
