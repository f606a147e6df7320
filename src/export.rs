//! Writes a laid-out logo grid as a single-slide PresentationML package.
//!
//! The package holds the bare minimum PowerPoint needs to open a deck: content types, package
//! relationships, the presentation part, one slide master with one blank layout, a theme, the
//! slide itself and one PNG per logo.
//!
//! # Examples
//!
//! ```rust
//! use logogrid::{export::SlideDeck, LogoGrid};
//! use image::{DynamicImage, Rgba, RgbaImage};
//!
//! let logo = DynamicImage::ImageRgba8(RgbaImage::from_pixel(60, 20, Rgba([0, 90, 200, 255])));
//! let grid = LogoGrid::try_from(&[logo][..]).unwrap();
//!
//! let deck = SlideDeck::from_grid(&grid).unwrap();
//! let bytes = deck.to_bytes().unwrap();
//! assert_eq!(&bytes[..2], b"PK");
//! ```

use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;

use image::{DynamicImage, ImageFormat};
use tracing::*;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::*;

/// File name used when the caller does not pick one.
pub const DEFAULT_FILE_NAME: &str = "logo_grid.pptx";

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

// Empty group shape properties required at the root of every shape tree
const SP_TREE_ROOT: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
);

/// A picture on the slide: encoded PNG bytes plus its frame in EMUs.
#[derive(Debug, Clone)]
struct Picture {
    png: Vec<u8>,
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
}

/// A one-slide deck of pictures.
#[derive(Debug, Clone)]
pub struct SlideDeck {
    slide: SlideSize,
    pictures: Vec<Picture>,
}

impl SlideDeck {
    pub fn new(slide: SlideSize) -> Self {
        Self {
            slide,
            pictures: Vec::new(),
        }
    }

    /// Builds a deck holding every logo of `grid`, in placement order.
    pub fn from_grid(grid: &LogoGrid) -> Result<Self, GridError> {
        let mut deck = SlideDeck::new(grid.slide);
        for logo in &grid.logos {
            deck.add_picture(&logo.image, &logo.placement)?;
        }
        Ok(deck)
    }

    /// Encodes `image` as PNG and frames it where `placement` says.
    ///
    /// The image is embedded as is; callers resize it beforehand (see [`resize_to`]).
    pub fn add_picture(
        &mut self,
        image: &DynamicImage,
        placement: &Placement,
    ) -> Result<(), GridError> {
        let mut png = Vec::new();
        DynamicImage::ImageRgba8(image.to_rgba8())
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        trace!(
            "Encoded picture {} as {} PNG bytes",
            self.pictures.len() + 1,
            png.len()
        );
        self.pictures.push(Picture {
            png,
            x: px_to_emu(placement.x),
            y: px_to_emu(placement.y),
            cx: px_to_emu(placement.width as f64),
            cy: px_to_emu(placement.height as f64),
        });
        Ok(())
    }

    pub fn picture_count(&self) -> usize {
        self.pictures.len()
    }

    /// Writes the package to `writer` and hands the writer back.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W, GridError> {
        debug!(
            "Writing deck with {} pictures on a {}x{}in slide",
            self.pictures.len(),
            self.slide.width_in(),
            self.slide.height_in()
        );
        let mut zip = ZipWriter::new(writer);

        let parts = [
            ("[Content_Types].xml", content_types_xml()),
            ("_rels/.rels", package_rels_xml()),
            ("docProps/core.xml", core_props_xml()),
            ("docProps/app.xml", app_props_xml()),
            ("ppt/presentation.xml", self.presentation_xml()),
            ("ppt/_rels/presentation.xml.rels", presentation_rels_xml()),
            ("ppt/slideMasters/slideMaster1.xml", slide_master_xml()),
            (
                "ppt/slideMasters/_rels/slideMaster1.xml.rels",
                slide_master_rels_xml(),
            ),
            ("ppt/slideLayouts/slideLayout1.xml", slide_layout_xml()),
            (
                "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
                slide_layout_rels_xml(),
            ),
            ("ppt/theme/theme1.xml", theme_xml()),
            ("ppt/slides/slide1.xml", self.slide_xml()),
            ("ppt/slides/_rels/slide1.xml.rels", self.slide_rels_xml()),
        ];
        for (name, body) in parts {
            zip.start_file(name, part_options(false))?;
            zip.write_all(body.as_bytes())?;
        }
        for (i, picture) in self.pictures.iter().enumerate() {
            // PNG data is already compressed
            zip.start_file(format!("ppt/media/image{}.png", i + 1), part_options(true))?;
            zip.write_all(&picture.png)?;
        }

        Ok(zip.finish()?)
    }

    /// Writes the package into memory.
    pub fn to_bytes(&self) -> Result<Vec<u8>, GridError> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }

    /// Writes the package to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), GridError> {
        let file = BufWriter::new(File::create(path)?);
        self.write_to(file)?.flush()?;
        info!("Saved {}", path.display());
        Ok(())
    }

    /// The `ppt/presentation.xml` part, carrying the slide size.
    pub fn presentation_xml(&self) -> String {
        format!(
            concat!(
                "{decl}",
                r#"<p:presentation xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}" saveSubsetFonts="1">"#,
                r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
                r#"<p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst>"#,
                r#"<p:sldSz cx="{cx}" cy="{cy}"/>"#,
                r#"<p:notesSz cx="6858000" cy="9144000"/>"#,
                "</p:presentation>"
            ),
            decl = XML_DECL,
            a = NS_A,
            r = NS_R,
            p = NS_P,
            cx = px_to_emu(inches_to_px(self.slide.width_in())),
            cy = px_to_emu(inches_to_px(self.slide.height_in())),
        )
    }

    /// The `ppt/slides/slide1.xml` part with one `p:pic` per picture.
    pub fn slide_xml(&self) -> String {
        let mut xml = String::with_capacity(512 + 640 * self.pictures.len());
        xml.push_str(XML_DECL);
        xml.push_str(&format!(
            r#"<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}">"#
        ));
        xml.push_str("<p:cSld><p:spTree>");
        xml.push_str(SP_TREE_ROOT);
        for (i, picture) in self.pictures.iter().enumerate() {
            // Shape id 1 is the tree root, rId1 is the layout
            let shape_id = i + 2;
            let rel_id = i + 2;
            xml.push_str("<p:pic><p:nvPicPr>");
            xml.push_str(&format!(
                r#"<p:cNvPr id="{shape_id}" name="Picture {shape_id}" descr="Logo {}"/>"#,
                i + 1
            ));
            xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/>"#);
            xml.push_str("</p:nvPicPr><p:blipFill>");
            xml.push_str(&format!(r#"<a:blip r:embed="rId{rel_id}"/>"#));
            xml.push_str("<a:stretch><a:fillRect/></a:stretch></p:blipFill>");
            xml.push_str("<p:spPr><a:xfrm>");
            xml.push_str(&format!(
                r#"<a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/>"#,
                picture.x, picture.y, picture.cx, picture.cy
            ));
            xml.push_str(r#"</a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#);
            xml.push_str("</p:pic>");
        }
        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
        xml
    }

    fn slide_rels_xml(&self) -> String {
        let mut rels = vec![(
            "rId1".to_owned(),
            "slideLayout",
            "../slideLayouts/slideLayout1.xml".to_owned(),
        )];
        rels.extend((0..self.pictures.len()).map(|i| {
            (
                format!("rId{}", i + 2),
                "image",
                format!("../media/image{}.png", i + 1),
            )
        }));
        relationships_xml(
            rels.iter()
                .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str())),
        )
    }
}

fn part_options(stored: bool) -> SimpleFileOptions {
    let method = if stored {
        CompressionMethod::Stored
    } else {
        CompressionMethod::Deflated
    };
    SimpleFileOptions::default().compression_method(method)
}

/// Serializes `(id, officeDocument relationship kind, target)` triples.
fn relationships_xml<'a>(rels: impl Iterator<Item = (&'a str, &'a str, &'a str)>) -> String {
    let mut xml = format!(r#"{XML_DECL}<Relationships xmlns="{NS_RELS}">"#);
    for (id, kind, target) in rels {
        xml.push_str(&format!(
            r#"<Relationship Id="{id}" Type="{REL}/{kind}" Target="{target}"/>"#
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn content_types_xml() -> String {
    const MAIN: &str = "application/vnd.openxmlformats-officedocument";
    let overrides = [
        ("/ppt/presentation.xml", "presentationml.presentation.main+xml"),
        ("/ppt/slideMasters/slideMaster1.xml", "presentationml.slideMaster+xml"),
        ("/ppt/slideLayouts/slideLayout1.xml", "presentationml.slideLayout+xml"),
        ("/ppt/slides/slide1.xml", "presentationml.slide+xml"),
        ("/ppt/theme/theme1.xml", "theme+xml"),
        ("/docProps/app.xml", "extended-properties+xml"),
    ];
    let mut xml = format!(
        r#"{XML_DECL}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#
    );
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(r#"<Default Extension="png" ContentType="image/png"/>"#);
    for (part, kind) in overrides {
        xml.push_str(&format!(
            r#"<Override PartName="{part}" ContentType="{MAIN}.{kind}"/>"#
        ));
    }
    xml.push_str(r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#);
    xml.push_str("</Types>");
    xml
}

fn package_rels_xml() -> String {
    let mut xml = format!(r#"{XML_DECL}<Relationships xmlns="{NS_RELS}">"#);
    xml.push_str(&format!(
        r#"<Relationship Id="rId1" Type="{REL}/officeDocument" Target="ppt/presentation.xml"/>"#
    ));
    xml.push_str(r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#);
    xml.push_str(&format!(
        r#"<Relationship Id="rId3" Type="{REL}/extended-properties" Target="docProps/app.xml"/>"#
    ));
    xml.push_str("</Relationships>");
    xml
}

fn core_props_xml() -> String {
    format!(
        concat!(
            "{}",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/">"#,
            "<dc:title>Logo Grid</dc:title><dc:creator>logogrid</dc:creator>",
            "</cp:coreProperties>"
        ),
        XML_DECL
    )
}

fn app_props_xml() -> String {
    format!(
        concat!(
            "{}",
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#,
            "<Application>logogrid</Application><Slides>1</Slides></Properties>"
        ),
        XML_DECL
    )
}

fn presentation_rels_xml() -> String {
    relationships_xml(
        [
            ("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
            ("rId2", "slide", "slides/slide1.xml"),
            ("rId3", "theme", "theme/theme1.xml"),
        ]
        .into_iter(),
    )
}

fn slide_master_xml() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<p:sldMaster xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}">"#,
            r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#,
            "<p:spTree>{root}</p:spTree></p:cSld>",
            r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
            r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" "#,
            r#"hlink="hlink" folHlink="folHlink"/>"#,
            r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
            "</p:sldMaster>"
        ),
        decl = XML_DECL,
        a = NS_A,
        r = NS_R,
        p = NS_P,
        root = SP_TREE_ROOT,
    )
}

fn slide_master_rels_xml() -> String {
    relationships_xml(
        [
            ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
            ("rId2", "theme", "../theme/theme1.xml"),
        ]
        .into_iter(),
    )
}

fn slide_layout_xml() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<p:sldLayout xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}" type="blank" preserve="1">"#,
            r#"<p:cSld name="Blank"><p:spTree>{root}</p:spTree></p:cSld>"#,
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"
        ),
        decl = XML_DECL,
        a = NS_A,
        r = NS_R,
        p = NS_P,
        root = SP_TREE_ROOT,
    )
}

fn slide_layout_rels_xml() -> String {
    relationships_xml(
        [("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")].into_iter(),
    )
}

fn theme_xml() -> String {
    let colors = [
        ("accent1", "4F81BD"),
        ("accent2", "C0504D"),
        ("accent3", "9BBB59"),
        ("accent4", "8064A2"),
        ("accent5", "4BACC6"),
        ("accent6", "F79646"),
        ("hlink", "0000FF"),
        ("folHlink", "800080"),
    ];
    let font = r#"<a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/>"#;
    let fill = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let line = format!(r#"<a:ln w="9525">{fill}</a:ln>"#);
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";

    let mut xml = format!(r#"{XML_DECL}<a:theme xmlns:a="{NS_A}" name="Office Theme">"#);
    xml.push_str(r#"<a:themeElements><a:clrScheme name="Office">"#);
    xml.push_str(r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#);
    xml.push_str(r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#);
    xml.push_str(r#"<a:dk2><a:srgbClr val="1F497D"/></a:dk2>"#);
    xml.push_str(r#"<a:lt2><a:srgbClr val="EEECE1"/></a:lt2>"#);
    for (name, rgb) in colors {
        xml.push_str(&format!(r#"<a:{name}><a:srgbClr val="{rgb}"/></a:{name}>"#));
    }
    xml.push_str("</a:clrScheme>");
    xml.push_str(&format!(
        r#"<a:fontScheme name="Office"><a:majorFont>{font}</a:majorFont><a:minorFont>{font}</a:minorFont></a:fontScheme>"#
    ));
    xml.push_str(r#"<a:fmtScheme name="Office">"#);
    xml.push_str(&format!("<a:fillStyleLst>{}</a:fillStyleLst>", fill.repeat(3)));
    xml.push_str(&format!("<a:lnStyleLst>{}</a:lnStyleLst>", line.repeat(3)));
    xml.push_str(&format!("<a:effectStyleLst>{}</a:effectStyleLst>", effect.repeat(3)));
    xml.push_str(&format!("<a:bgFillStyleLst>{}</a:bgFillStyleLst>", fill.repeat(3)));
    xml.push_str("</a:fmtScheme></a:themeElements>");
    xml.push_str("<a:objectDefaults/><a:extraClrSchemeLst/></a:theme>");
    xml
}
