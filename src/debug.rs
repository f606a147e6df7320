use std::path::Path;

use crate::drawing::*;

use super::*;
/// Renders the grid preview and saves it to `output_path`.
///
/// The file format is picked from the extension, PNG being the usual choice.
///
/// # Errors
/// Returns [`GridError`] if drawing or saving fails.
///
/// # Examples
///
/// ```rust,no_run
/// use logogrid::{drawing::PreviewConfig, LogoGrid};
/// use image::{DynamicImage, Rgba, RgbaImage};
///
/// let logo = DynamicImage::ImageRgba8(RgbaImage::from_pixel(80, 30, Rgba([0, 0, 0, 255])));
/// let grid = LogoGrid::try_from(&[logo][..]).unwrap();
/// logogrid::debug::save_preview(&grid, "preview.png", &PreviewConfig::default()).unwrap();
/// ```
pub fn save_preview(
    grid: &LogoGrid,
    output_path: impl AsRef<Path>,
    config: &PreviewConfig,
) -> Result<(), GridError> {
    let output_path = output_path.as_ref();
    let preview = render_preview(grid, config)?;
    preview.save(output_path)?;
    info!("Saved preview to {}", output_path.display());
    Ok(())
}
