//! Background artwork for the macOS disk image window.
//!
//! A light vertical gradient with a brand line at the top, an instruction
//! line near the bottom and an arrow from the app slot towards the
//! Applications slot. Text and arrow are drawn as SVG through resvg, so the
//! lettering uses whatever sans-serif face the system provides.

use crate::error::ExportError;
use crate::source::pixmap_to_image;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use resvg::{tiny_skia, usvg};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Finder window size the artwork is laid out for.
pub const DMG_WIDTH: u32 = 640;
pub const DMG_HEIGHT: u32 = 400;

/// Scale of the Retina variant.
pub const HIDPI_SCALE: u32 = 2;

pub const DEFAULT_OUT_DIR: &str = "deployment/macos";
pub const BACKGROUND_FILE: &str = "dmg_background.png";
pub const HIDPI_BACKGROUND_FILE: &str = "dmg_background@2x.png";

pub const DEFAULT_INSTRUCTION: &str = "Drag MouseCross to the Applications folder";
pub const DEFAULT_BRAND: &str = "MouseCross - Visual Mouse Locator";

// Gradient runs from TOP_COLOR down by at most GRADIENT_SPAN per channel.
const TOP_COLOR: [u32; 3] = [240, 244, 248];
const GRADIENT_SPAN: [u32; 3] = [15, 11, 7];

// Baselines, with a one pixel offset for the shadow.
const BRAND_BASELINE: u32 = 43;
const BRAND_FONT_SIZE: u32 = 16;
const INSTRUCTION_BASELINE: u32 = 339;
const INSTRUCTION_FONT_SIZE: u32 = 24;

// Arrow between the app icon (~160,200) and the Applications link (~480,200).
const ARROW_START_X: u32 = 300;
const ARROW_TIP_X: u32 = 440;
const ARROW_Y: u32 = 200;
const ARROW_HEAD_LENGTH: u32 = 20;
const ARROW_HEAD_HALF_WIDTH: u32 = 10;
const ARROW_COLOR: &str = "#4a90e2";

/// Text content of the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DmgBackground {
    pub instruction: String,
    pub brand: String,
}

impl Default for DmgBackground {
    fn default() -> Self {
        DmgBackground {
            instruction: DEFAULT_INSTRUCTION.to_string(),
            brand: DEFAULT_BRAND.to_string(),
        }
    }
}

/// Paths written by [`DmgBackground::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DmgBackgroundFiles {
    pub standard: PathBuf,
    pub hidpi: PathBuf,
}

impl DmgBackground {
    /// Draw the background at window size.
    pub fn render(&self) -> Result<RgbImage, ExportError> {
        let mut canvas = RgbaImage::from_fn(DMG_WIDTH, DMG_HEIGHT, |_, y| {
            let Rgb([r, g, b]) = gradient_color(y, DMG_HEIGHT);
            Rgba([r, g, b, 255])
        });
        let overlay = self.render_overlay()?;
        imageops::overlay(&mut canvas, &overlay, 0, 0);
        Ok(DynamicImage::ImageRgba8(canvas).to_rgb8())
    }

    /// Write the standard and `@2x` images into `dir`.
    pub fn write(&self, dir: &Path) -> Result<DmgBackgroundFiles, ExportError> {
        fs::create_dir_all(dir).map_err(|e| ExportError::OutputDirCreationFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let standard = self.render()?;
        let hidpi = upscale(&standard, HIDPI_SCALE);

        let files = DmgBackgroundFiles {
            standard: dir.join(BACKGROUND_FILE),
            hidpi: dir.join(HIDPI_BACKGROUND_FILE),
        };
        save_png(&standard, &files.standard)?;
        save_png(&hidpi, &files.hidpi)?;
        Ok(files)
    }

    fn overlay_svg(&self) -> String {
        let center = DMG_WIDTH / 2;
        let shaft_end = ARROW_TIP_X - ARROW_HEAD_LENGTH;
        format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
  <g font-family="Helvetica, Arial, sans-serif" text-anchor="middle">
    <text x="{cs}" y="{bs}" font-size="{bf}" fill="#cccccc">{brand}</text>
    <text x="{c}" y="{b}" font-size="{bf}" fill="#666666">{brand}</text>
    <text x="{cs}" y="{is}" font-size="{inf}" fill="#888888">{instruction}</text>
    <text x="{c}" y="{i}" font-size="{inf}" fill="#333333">{instruction}</text>
  </g>
  <line x1="{ax}" y1="{ay}" x2="{se}" y2="{ay}" stroke="{color}" stroke-width="3"/>
  <polygon points="{tip},{ay} {se},{top} {se},{bottom}" fill="{color}"/>
</svg>"##,
            w = DMG_WIDTH,
            h = DMG_HEIGHT,
            c = center,
            cs = center + 1,
            b = BRAND_BASELINE,
            bs = BRAND_BASELINE + 1,
            bf = BRAND_FONT_SIZE,
            i = INSTRUCTION_BASELINE,
            is = INSTRUCTION_BASELINE + 1,
            inf = INSTRUCTION_FONT_SIZE,
            brand = escape_xml(&self.brand),
            instruction = escape_xml(&self.instruction),
            ax = ARROW_START_X,
            ay = ARROW_Y,
            se = shaft_end,
            tip = ARROW_TIP_X,
            top = ARROW_Y - ARROW_HEAD_HALF_WIDTH,
            bottom = ARROW_Y + ARROW_HEAD_HALF_WIDTH,
            color = ARROW_COLOR,
        )
    }

    fn render_overlay(&self) -> Result<RgbaImage, ExportError> {
        let mut options = usvg::Options::default();
        Arc::make_mut(&mut options.fontdb).load_system_fonts();
        if options.fontdb.is_empty() {
            log::warn!("no system fonts found, DMG background will have no text");
        }

        let tree = usvg::Tree::from_str(&self.overlay_svg(), &options).map_err(|e| {
            ExportError::ArtworkFailed {
                reason: e.to_string(),
            }
        })?;
        let mut pixmap = tiny_skia::Pixmap::new(DMG_WIDTH, DMG_HEIGHT).ok_or_else(|| {
            ExportError::ArtworkFailed {
                reason: "could not allocate pixmap".to_string(),
            }
        })?;
        resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
        Ok(pixmap_to_image(&pixmap))
    }
}

/// Colour of row `y` in a gradient `height` rows tall.
pub fn gradient_color(y: u32, height: u32) -> Rgb<u8> {
    let height = height.max(1);
    let y = y.min(height - 1);
    let channel = |i: usize| (TOP_COLOR[i] + GRADIENT_SPAN[i] * y / height) as u8;
    Rgb([channel(0), channel(1), channel(2)])
}

/// Resample by an integer factor with Lanczos3.
pub fn upscale(image: &RgbImage, factor: u32) -> RgbImage {
    imageops::resize(
        image,
        image.width() * factor,
        image.height() * factor,
        FilterType::Lanczos3,
    )
}

fn save_png(image: &RgbImage, path: &Path) -> Result<(), ExportError> {
    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| ExportError::EncodeFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    log::debug!("wrote {}", path.display());
    Ok(())
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
