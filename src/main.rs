use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use logogrid::{
    export::{SlideDeck, DEFAULT_FILE_NAME},
    library, Canvas, Cols, LayoutConfig, LogoGrid,
};
use tracing::*;
use tracing_subscriber::EnvFilter;

const MIN_INCHES: f64 = 1.0;
const MAX_INCHES: f64 = 20.0;

/// Arrange logos into a grid and export it as a one-slide PowerPoint deck.
#[derive(Parser, Debug)]
#[command(name = "logogrid", version)]
struct Cli {
    /// Logo files, placed first and in the given order.
    files: Vec<PathBuf>,

    /// Directory holding preloaded logos.
    #[arg(long, default_value = "preloaded_logos")]
    library: PathBuf,

    /// Preloaded logo to include, by file name without extension. Repeatable; added after
    /// FILES in name order.
    #[arg(long = "select", value_name = "NAME")]
    select: Vec<String>,

    /// List the preloaded logos and exit.
    #[arg(long)]
    list: bool,

    /// Grid width in inches (1-20).
    #[arg(long, default_value_t = 10.0, value_parser = parse_inches)]
    width: f64,

    /// Grid height in inches (1-20).
    #[arg(long, default_value_t = 7.5, value_parser = parse_inches)]
    height: f64,

    /// Logos per row (0-50), 0 balances the grid against the canvas.
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=50))]
    per_row: u32,

    /// Output deck path.
    #[arg(long, default_value = DEFAULT_FILE_NAME)]
    out: PathBuf,

    /// Also write a PNG preview of the grid (needs the `drawing` feature).
    #[arg(long, value_name = "PNG")]
    preview: Option<PathBuf>,

    /// Trim and resize logos on a single thread.
    #[arg(long)]
    sequential: bool,
}

fn parse_inches(s: &str) -> Result<f64, String> {
    let inches: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if !(MIN_INCHES..=MAX_INCHES).contains(&inches) {
        return Err(format!(
            "{inches} is outside {MIN_INCHES}-{MAX_INCHES} inches"
        ));
    }
    Ok(inches)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();
    debug!("{:?}", cli);

    let library = if cli.list || !cli.select.is_empty() {
        library::load_logo_dir(&cli.library)
            .with_context(|| format!("Failed to load logos from {}", cli.library.display()))?
    } else {
        library::LogoLibrary::new()
    };
    if cli.list {
        for name in library.keys() {
            println!("{name}");
        }
        return Ok(());
    }

    let mut images = cli
        .files
        .iter()
        .map(|path| {
            library::load_logo(path).with_context(|| format!("Failed to open {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    images.extend(library::select(&library, &cli.select)?);
    if images.is_empty() {
        warn!("Please upload or select logos.");
        bail!("no logos supplied");
    }

    let canvas = Canvas::new(cli.width, cli.height)?;
    let config = LayoutConfig::default().with_parallel(!cli.sequential);
    let grid =
        LogoGrid::try_from_images_with_config(&images, canvas, Cols::from(cli.per_row), config)?;

    if let Some(path) = &cli.preview {
        #[cfg(feature = "drawing")]
        logogrid::debug::save_preview(&grid, path, &logogrid::drawing::PreviewConfig::default())
            .with_context(|| format!("Failed to write preview {}", path.display()))?;
        #[cfg(not(feature = "drawing"))]
        warn!(
            "Ignoring --preview {}: built without the drawing feature",
            path.display()
        );
    }

    SlideDeck::from_grid(&grid)?
        .save(&cli.out)
        .with_context(|| format!("Failed to write {}", cli.out.display()))?;
    info!(
        "PowerPoint created with {} logos in {} columns: {}",
        grid.logos.len(),
        grid.grid.cols,
        cli.out.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["logogrid", "a.png", "b.png"]).unwrap();
        assert_eq!(cli.files, vec![PathBuf::from("a.png"), PathBuf::from("b.png")]);
        assert_eq!(cli.width, 10.0);
        assert_eq!(cli.height, 7.5);
        assert_eq!(cli.per_row, 0);
        assert_eq!(cli.out, PathBuf::from("logo_grid.pptx"));
        assert_eq!(cli.library, PathBuf::from("preloaded_logos"));
    }

    #[test]
    fn test_repeated_select() {
        let cli =
            Cli::try_parse_from(["logogrid", "--select", "acme", "--select", "globex"]).unwrap();
        assert_eq!(cli.select, vec!["acme".to_owned(), "globex".to_owned()]);
    }

    #[test_case("--per-row", "51" ; "too many per row")]
    #[test_case("--width", "0.5" ; "too narrow")]
    #[test_case("--height", "21" ; "too tall")]
    #[test_case("--width", "wide" ; "not a number")]
    fn test_out_of_range_arguments(flag: &str, value: &str) {
        assert!(Cli::try_parse_from(["logogrid", flag, value]).is_err());
    }

    #[test]
    fn test_parse_inches() {
        assert_eq!(parse_inches("1"), Ok(1.0));
        assert_eq!(parse_inches("20"), Ok(20.0));
        assert!(parse_inches("20.01").is_err());
    }
}
