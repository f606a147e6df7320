use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use image::DynamicImage;
use tracing::*;

use super::*;

/// File extensions recognized as logos, compared case-insensitively.
pub const LOGO_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Logos keyed by file stem, iterated in name order.
pub type LogoLibrary = BTreeMap<String, DynamicImage>;

/// Checks if `path` has one of the [`LOGO_EXTENSIONS`].
pub fn is_logo_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            LOGO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Opens a single logo and converts it to RGBA8.
pub fn load_logo(path: &Path) -> Result<DynamicImage, GridError> {
    let image = image::open(path).map_err(|source| GridError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(DynamicImage::ImageRgba8(image.to_rgba8()))
}

/// Loads every logo in `dir`, keyed by file stem.
///
/// A missing directory is created and yields an empty library. Files that are not logos are
/// skipped.
///
/// # Errors
/// Returns [`GridError::Io`] if the directory cannot be created or read, and
/// [`GridError::ImageLoad`] if a logo cannot be decoded.
pub fn load_logo_dir(dir: &Path) -> Result<LogoLibrary, GridError> {
    if !dir.exists() {
        info!("Creating logo library at {}", dir.display());
        fs::create_dir_all(dir)?;
    }

    let mut logos = LogoLibrary::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || !is_logo_file(&path) {
            trace!("Skipping {}", path.display());
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            warn!("Skipping logo with non UTF-8 name: {}", path.display());
            continue;
        };
        debug!("Loading logo {:?} from {}", name, path.display());
        logos.insert(name.to_owned(), load_logo(&path)?);
    }
    info!("Loaded {} logos from {}", logos.len(), dir.display());
    Ok(logos)
}

/// Picks the named logos out of `library`, sorted by name.
///
/// # Errors
/// Returns [`GridError::UnknownLogo`] for the first name not present in the library.
pub fn select(library: &LogoLibrary, names: &[String]) -> Result<Vec<DynamicImage>, GridError> {
    let mut names: Vec<&String> = names.iter().collect();
    names.sort();
    names
        .into_iter()
        .map(|name| {
            library
                .get(name)
                .cloned()
                .ok_or_else(|| GridError::UnknownLogo(name.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn write_png(dir: &Path, file: &str, width: u32, height: u32) {
        RgbImage::from_pixel(width, height, Rgb([10, 200, 30]))
            .save(dir.join(file))
            .unwrap();
    }

    #[test_case("acme.png", true)]
    #[test_case("acme.PNG", true)]
    #[test_case("acme.Jpeg", true)]
    #[test_case("acme.webp", true)]
    #[test_case("acme.gif", false)]
    #[test_case("README", false)]
    fn test_is_logo_file(file: &str, expected: bool) {
        assert_eq!(is_logo_file(Path::new(file)), expected);
    }

    #[test]
    fn test_missing_directory_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("preloaded_logos");
        let logos = load_logo_dir(&dir).unwrap();
        assert!(logos.is_empty());
        assert!(dir.is_dir());
    }

    #[test]
    fn test_load_logo_dir() {
        let tmp = tempfile::tempdir().unwrap();
        write_png(tmp.path(), "zeta.png", 4, 2);
        write_png(tmp.path(), "alpha.PNG", 3, 3);
        fs::write(tmp.path().join("notes.txt"), "not a logo").unwrap();

        let logos = load_logo_dir(tmp.path()).unwrap();
        let names: Vec<&str> = logos.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(logos["zeta"].color(), image::ColorType::Rgba8);
        assert_eq!((logos["zeta"].width(), logos["zeta"].height()), (4, 2));
    }

    #[test]
    fn test_undecodable_logo_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("broken.png"), b"definitely not a png").unwrap();
        let err = load_logo_dir(tmp.path()).unwrap_err();
        assert!(matches!(err, GridError::ImageLoad { .. }));
    }

    #[test]
    fn test_select_sorts_and_rejects_unknown() {
        let mut library = LogoLibrary::new();
        library.insert("b".into(), DynamicImage::new_rgba8(2, 1));
        library.insert("a".into(), DynamicImage::new_rgba8(1, 1));

        let picked = select(&library, &["b".into(), "a".into()]).unwrap();
        let widths: Vec<u32> = picked.iter().map(|img| img.width()).collect();
        assert_eq!(widths, vec![1, 2]);

        let err = select(&library, &["missing".into()]).unwrap_err();
        assert!(matches!(err, GridError::UnknownLogo(name) if name == "missing"));
    }
}
