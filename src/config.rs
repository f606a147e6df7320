use super::*;

const DEFAULT_BUFFER_RATIO: f64 = 0.9;
const DEFAULT_BOX_RATIO: f64 = 5.0 / 2.0;

/// Configuration for laying out logos.
///
/// # Example
/// ```
/// use logogrid::{Canvas, LayoutConfig};
///
/// let config = LayoutConfig::default();
/// assert_eq!(config.buffer_ratio, 0.9);
/// assert_eq!(config.box_ratio, 2.5);
/// assert_eq!(config.frame, Canvas::STANDARD);
/// assert_eq!(config.enable_parallel, true);
/// ```
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Share of the cell the fit box may occupy on each axis (default: 0.9)
    pub buffer_ratio: f64,
    /// Width / height of the fit box (default: 2.5)
    pub box_ratio: f64,
    /// Reference slide the canvas is centered on (default: 10 x 7.5 in)
    pub frame: Canvas,
    /// How logos are trimmed before fitting
    pub trim: TrimConfig,
    /// Trim and resize logos in parallel (default: true)
    pub enable_parallel: bool,
}

impl LayoutConfig {
    /// Creates a new `LayoutConfig` with the specified parameters.
    ///
    /// `buffer_ratio` is capped at 1. Non-positive ratios fall back to the defaults (0.9 and 5:2).
    ///
    /// # Example
    /// ```
    /// use logogrid::{Canvas, LayoutConfig};
    ///
    /// let config = LayoutConfig::new(1.5, -1.0, Canvas::STANDARD, false);
    /// assert_eq!(config.buffer_ratio, 1.0);
    /// assert_eq!(config.box_ratio, 2.5);
    /// assert_eq!(config.enable_parallel, false);
    /// ```
    pub fn new(buffer_ratio: f64, box_ratio: f64, frame: Canvas, enable_parallel: bool) -> Self {
        let buffer_ratio = if buffer_ratio.is_finite() && buffer_ratio > 0.0 {
            buffer_ratio.min(1.0)
        } else {
            DEFAULT_BUFFER_RATIO
        };
        let box_ratio = if box_ratio.is_finite() && box_ratio > 0.0 {
            box_ratio
        } else {
            DEFAULT_BOX_RATIO
        };
        Self {
            buffer_ratio,
            box_ratio,
            frame,
            trim: TrimConfig::default(),
            enable_parallel,
        }
    }

    pub fn with_trim(mut self, trim: TrimConfig) -> Self {
        self.trim = trim;
        self
    }

    pub fn with_parallel(mut self, enable_parallel: bool) -> Self {
        self.enable_parallel = enable_parallel;
        self
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig::new(
            DEFAULT_BUFFER_RATIO,
            DEFAULT_BOX_RATIO,
            Canvas::STANDARD,
            true,
        )
    }
}
