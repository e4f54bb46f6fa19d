use crate::render::{self, GlyphStyle, RenderError};
use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};
use resvg::{tiny_skia, usvg};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Error type for loading a source image.
#[derive(Debug)]
pub enum SourceError {
    ReadFailed { path: PathBuf, source: std::io::Error },
    InvalidSvg { reason: String },
    DecodeFailed { path: PathBuf, source: image::ImageError },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::ReadFailed { path, source } => {
                write!(f, "failed to read source '{}': {}", path.display(), source)
            }
            SourceError::InvalidSvg { reason } => write!(f, "invalid SVG source: {}", reason),
            SourceError::DecodeFailed { path, source } => {
                write!(f, "failed to decode '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::ReadFailed { source, .. } => Some(source),
            SourceError::DecodeFailed { source, .. } => Some(source),
            SourceError::InvalidSvg { .. } => None,
        }
    }
}

/// The master image every icon size is derived from.
pub enum SourceImage {
    /// The built-in crosshair, drawn geometrically at each size
    Glyph(GlyphStyle),
    /// Vector markup, rasterized at each size
    Svg(usvg::Tree),
    /// Fixed pixels, resampled to each size
    Raster(DynamicImage),
}

impl SourceImage {
    /// Load a source from disk. `.svg` files are parsed as vector markup,
    /// anything else is decoded as a raster image.
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let is_svg = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));

        if is_svg {
            let data = fs::read(path).map_err(|e| SourceError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
            return Self::from_svg_data(&data);
        }

        let img = image::open(path).map_err(|e| SourceError::DecodeFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        if img.width() != img.height() {
            log::warn!(
                "source {} is {}x{}, icons will be stretched to square",
                path.display(),
                img.width(),
                img.height()
            );
        }
        Ok(SourceImage::Raster(img))
    }

    pub fn from_svg_data(data: &[u8]) -> Result<Self, SourceError> {
        let mut options = usvg::Options::default();
        Arc::make_mut(&mut options.fontdb).load_system_fonts();

        let tree = usvg::Tree::from_data(data, &options).map_err(|e| SourceError::InvalidSvg {
            reason: e.to_string(),
        })?;
        Ok(SourceImage::Svg(tree))
    }

    /// Short label for progress output.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceImage::Glyph(_) => "glyph",
            SourceImage::Svg(_) => "svg",
            SourceImage::Raster(_) => "raster",
        }
    }

    /// Produce a `size`×`size` RGBA image.
    pub fn render(&self, size: u32) -> Result<RgbaImage, RenderError> {
        render::validate_size(size)?;
        match self {
            SourceImage::Glyph(style) => render::render_glyph(size, style),
            SourceImage::Svg(tree) => rasterize_svg(tree, size),
            SourceImage::Raster(img) => Ok(resample(img, size)),
        }
    }
}

impl Default for SourceImage {
    fn default() -> Self {
        SourceImage::Glyph(GlyphStyle::default())
    }
}

impl fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceImage::Glyph(style) => f.debug_tuple("Glyph").field(style).finish(),
            SourceImage::Svg(tree) => {
                let size = tree.size();
                write!(f, "Svg({}x{})", size.width(), size.height())
            }
            SourceImage::Raster(img) => write!(f, "Raster({}x{})", img.width(), img.height()),
        }
    }
}

fn rasterize_svg(tree: &usvg::Tree, size: u32) -> Result<RgbaImage, RenderError> {
    let mut pixmap = tiny_skia::Pixmap::new(size, size).ok_or_else(|| {
        RenderError::RasterizeFailed {
            size,
            reason: "could not allocate pixmap".to_string(),
        }
    })?;

    let view = tree.size();
    let transform = tiny_skia::Transform::from_scale(
        size as f32 / view.width(),
        size as f32 / view.height(),
    );
    resvg::render(tree, transform, &mut pixmap.as_mut());
    Ok(pixmap_to_image(&pixmap))
}

/// Copy a pixmap into an `image` buffer.
pub(crate) fn pixmap_to_image(pixmap: &tiny_skia::Pixmap) -> RgbaImage {
    // tiny-skia stores premultiplied alpha; image expects straight alpha.
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    img
}

fn resample(img: &DynamicImage, size: u32) -> RgbaImage {
    if img.width() == size && img.height() == size {
        return img.to_rgba8();
    }
    img.resize_exact(size, size, FilterType::Lanczos3).to_rgba8()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const TARGET_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="64" viewBox="0 0 64 64">
  <circle cx="32" cy="32" r="30" fill="#202d40" stroke="#ffffff" stroke-width="2"/>
  <rect x="28" y="8" width="8" height="48" fill="#e62828"/>
  <rect x="8" y="28" width="48" height="8" fill="#e62828"/>
</svg>"##;

    #[test]
    fn glyph_source_matches_direct_render() {
        let source = SourceImage::default();
        let via_source = source.render(48).unwrap();
        let direct = render::render_glyph(48, &GlyphStyle::default()).unwrap();
        assert_eq!(via_source.as_raw(), direct.as_raw());
    }

    #[test]
    fn svg_source_rasterizes_at_each_size() {
        let source = SourceImage::from_svg_data(TARGET_SVG.as_bytes()).unwrap();
        assert_eq!(source.kind(), "svg");

        for size in [16, 32, 256] {
            let img = source.render(size).unwrap();
            assert_eq!(img.dimensions(), (size, size));
            let center = img.get_pixel(size / 2, size / 2);
            assert_eq!(center[3], 255);
            assert!(center[0] > 200, "crosshair missing at {}", size);
        }
    }

    #[test]
    fn svg_transparent_corners_stay_transparent() {
        let source = SourceImage::from_svg_data(TARGET_SVG.as_bytes()).unwrap();
        let img = source.render(64).unwrap();
        assert_eq!(img.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn invalid_svg_is_rejected() {
        let result = SourceImage::from_svg_data(b"<not svg");
        assert!(matches!(result, Err(SourceError::InvalidSvg { .. })));
    }

    #[test]
    fn load_dispatches_on_extension() {
        let dir = tempdir().unwrap();

        let svg_path = dir.path().join("icon.SVG");
        fs::write(&svg_path, TARGET_SVG).unwrap();
        assert_eq!(SourceImage::load(&svg_path).unwrap().kind(), "svg");

        let png_path = dir.path().join("icon.png");
        render::render_glyph(128, &GlyphStyle::default())
            .unwrap()
            .save(&png_path)
            .unwrap();
        let raster = SourceImage::load(&png_path).unwrap();
        assert_eq!(raster.kind(), "raster");
        assert_eq!(raster.render(32).unwrap().dimensions(), (32, 32));
        assert_eq!(raster.render(128).unwrap().dimensions(), (128, 128));
    }

    #[test]
    fn load_missing_file_errors() {
        let result = SourceImage::load(Path::new("/nonexistent/icon.png"));
        assert!(matches!(result, Err(SourceError::DecodeFailed { .. })));

        let result = SourceImage::load(Path::new("/nonexistent/icon.svg"));
        assert!(matches!(result, Err(SourceError::ReadFailed { .. })));
    }

    #[test]
    fn render_rejects_zero_for_every_source() {
        let source = SourceImage::from_svg_data(TARGET_SVG.as_bytes()).unwrap();
        assert_eq!(source.render(0).unwrap_err(), RenderError::InvalidSize(0));
    }
}
