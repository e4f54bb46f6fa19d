//! Crosshair glyph renderer.
//!
//! Every linear dimension of the glyph is a [`Metric`]: a fraction of the
//! requested size, floored, then clamped to a minimum so small renders keep
//! visible lines while large renders scale proportionally.

use image::{Rgba, RgbaImage};
use std::fmt;

/// Largest square size any source will render.
pub const MAX_RENDER_SIZE: u32 = 4096;

/// Error type for a single render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    InvalidSize(u32),
    UnsupportedSize { size: u32, max: u32 },
    RasterizeFailed { size: u32, reason: String },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InvalidSize(size) => {
                write!(f, "invalid icon size {}: size must be at least 1", size)
            }
            RenderError::UnsupportedSize { size, max } => {
                write!(f, "unsupported icon size {}: maximum is {}", size, max)
            }
            RenderError::RasterizeFailed { size, reason } => {
                write!(f, "failed to rasterize {}x{}: {}", size, size, reason)
            }
        }
    }
}

impl std::error::Error for RenderError {}

/// Check that `size` is renderable.
pub fn validate_size(size: u32) -> Result<(), RenderError> {
    if size == 0 {
        return Err(RenderError::InvalidSize(size));
    }
    if size > MAX_RENDER_SIZE {
        return Err(RenderError::UnsupportedSize {
            size,
            max: MAX_RENDER_SIZE,
        });
    }
    Ok(())
}

/// A length expressed as `size / divisor`, never smaller than `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metric {
    pub divisor: u32,
    pub min: u32,
}

impl Metric {
    pub const fn new(divisor: u32, min: u32) -> Self {
        Metric { divisor, min }
    }

    /// Resolve to pixels for a given icon size.
    pub fn resolve(&self, size: u32) -> u32 {
        size.checked_div(self.divisor).unwrap_or(0).max(self.min)
    }

    /// True when `size` is large enough that the minimum no longer applies.
    pub fn is_proportional_at(&self, size: u32) -> bool {
        size.checked_div(self.divisor).unwrap_or(0) >= self.min
    }
}

/// Named proportions of the glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proportions {
    /// Gap between the canvas edge and the backdrop
    pub inset: Metric,
    /// Width of the backdrop's border ring
    pub border: Metric,
    /// Thickness of the crosshair arms and corner ticks
    pub line: Metric,
    /// Half-width of the open gap in the middle of the crosshair
    pub clearance: Metric,
    /// Space left between arm ends and the border
    pub arm_margin: Metric,
    /// Radius of the center marker
    pub marker: Metric,
    /// Corner radius of the rounded-square backdrop
    pub corner_radius: Metric,
    /// Length of each corner tick leg
    pub tick_length: Metric,
}

pub const DEFAULT_PROPORTIONS: Proportions = Proportions {
    inset: Metric::new(32, 1),
    border: Metric::new(32, 1),
    line: Metric::new(16, 2),
    clearance: Metric::new(10, 2),
    arm_margin: Metric::new(16, 1),
    marker: Metric::new(24, 1),
    corner_radius: Metric::new(8, 2),
    tick_length: Metric::new(8, 2),
};

/// Shape drawn behind the crosshair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backdrop {
    Circle,
    RoundedSquare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub canvas: Rgba<u8>,
    pub fill: Rgba<u8>,
    pub border: Rgba<u8>,
    pub crosshair: Rgba<u8>,
}

/// Complete description of how the glyph looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphStyle {
    pub backdrop: Backdrop,
    pub palette: Palette,
    pub proportions: Proportions,
    pub center_marker: bool,
    pub corner_ticks: bool,
}

impl GlyphStyle {
    /// Transparent canvas, dark disc, white ring, red crosshair with a center dot.
    pub const fn canonical() -> Self {
        GlyphStyle {
            backdrop: Backdrop::Circle,
            palette: Palette {
                canvas: Rgba([0, 0, 0, 0]),
                fill: Rgba([32, 45, 64, 255]),
                border: Rgba([255, 255, 255, 255]),
                crosshair: Rgba([230, 40, 40, 255]),
            },
            proportions: DEFAULT_PROPORTIONS,
            center_marker: true,
            corner_ticks: false,
        }
    }

    /// Opaque rounded square with white crosshair and corner ticks.
    pub const fn framed() -> Self {
        GlyphStyle {
            backdrop: Backdrop::RoundedSquare,
            palette: Palette {
                canvas: Rgba([0, 0, 0, 0]),
                fill: Rgba([32, 45, 64, 255]),
                border: Rgba([255, 255, 255, 255]),
                crosshair: Rgba([255, 255, 255, 255]),
            },
            proportions: DEFAULT_PROPORTIONS,
            center_marker: true,
            corner_ticks: true,
        }
    }
}

impl Default for GlyphStyle {
    fn default() -> Self {
        Self::canonical()
    }
}

/// Pixel dimensions of every glyph part at one size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub size: u32,
    pub inset: u32,
    pub border: u32,
    pub line: u32,
    pub clearance: u32,
    pub arm_margin: u32,
    pub marker: u32,
    pub corner_radius: u32,
    pub tick_length: u32,
}

impl Geometry {
    pub fn for_size(size: u32, proportions: &Proportions) -> Self {
        Geometry {
            size,
            inset: proportions.inset.resolve(size),
            border: proportions.border.resolve(size),
            line: proportions.line.resolve(size),
            clearance: proportions.clearance.resolve(size),
            arm_margin: proportions.arm_margin.resolve(size),
            marker: proportions.marker.resolve(size),
            corner_radius: proportions.corner_radius.resolve(size),
            tick_length: proportions.tick_length.resolve(size),
        }
    }

    /// Distance from the center to the outer end of each arm.
    fn arm_reach(&self) -> u32 {
        (self.size / 2).saturating_sub(self.inset + self.border + self.arm_margin)
    }

    /// First row/column of the centered band of `line` pixels.
    fn band_start(&self) -> u32 {
        self.size.saturating_sub(self.line) / 2
    }
}

/// Render the glyph at `size`×`size`.
pub fn render_glyph(size: u32, style: &GlyphStyle) -> Result<RgbaImage, RenderError> {
    validate_size(size)?;
    let geometry = Geometry::for_size(size, &style.proportions);
    let mut img = RgbaImage::from_pixel(size, size, style.palette.canvas);

    paint_backdrop(&mut img, &geometry, style);
    paint_crosshair(&mut img, &geometry, style.palette.crosshair);

    if style.center_marker {
        paint_marker(&mut img, &geometry, style.palette.crosshair);
    }
    if style.corner_ticks {
        paint_corner_ticks(&mut img, &geometry, style.palette.border);
    }

    Ok(img)
}

fn paint_backdrop(img: &mut RgbaImage, g: &Geometry, style: &GlyphStyle) {
    let size = g.size as f32;
    let center = size / 2.0;
    let outer_lo = g.inset as f32;
    let outer_hi = size - g.inset as f32;
    let inner_lo = outer_lo + g.border as f32;
    let inner_hi = outer_hi - g.border as f32;
    let radius = g.corner_radius as f32;

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let px = x as f32 + 0.5;
        let py = y as f32 + 0.5;

        let (inside_outer, inside_inner) = match style.backdrop {
            Backdrop::Circle => {
                let dist = ((px - center).powi(2) + (py - center).powi(2)).sqrt();
                let outer = center - g.inset as f32;
                (dist <= outer, dist <= outer - g.border as f32)
            }
            Backdrop::RoundedSquare => (
                in_rounded_square(px, py, outer_lo, outer_hi, radius),
                in_rounded_square(px, py, inner_lo, inner_hi, (radius - g.border as f32).max(0.0)),
            ),
        };

        if inside_inner {
            *pixel = style.palette.fill;
        } else if inside_outer {
            *pixel = style.palette.border;
        }
    }
}

fn in_rounded_square(px: f32, py: f32, lo: f32, hi: f32, radius: f32) -> bool {
    if hi <= lo || px < lo || px > hi || py < lo || py > hi {
        return false;
    }
    let radius = radius.min((hi - lo) / 2.0);
    let qx = px.clamp(lo + radius, hi - radius);
    let qy = py.clamp(lo + radius, hi - radius);
    (px - qx).powi(2) + (py - qy).powi(2) <= radius * radius
}

fn paint_crosshair(img: &mut RgbaImage, g: &Geometry, color: Rgba<u8>) {
    let half = g.size / 2;
    let reach = g.arm_reach();
    if reach <= g.clearance {
        return;
    }

    // Arm toward the low edge; the other three are mirrors of it.
    let near_start = half - reach;
    let near_end = half - g.clearance;
    let far_start = g.size - near_end;
    let far_end = g.size - near_start;

    let band_start = g.band_start();
    let band_end = band_start + g.line;

    fill_rect(img, near_start, band_start, near_end, band_end, color);
    fill_rect(img, far_start, band_start, far_end, band_end, color);
    fill_rect(img, band_start, near_start, band_end, near_end, color);
    fill_rect(img, band_start, far_start, band_end, far_end, color);
}

fn paint_marker(img: &mut RgbaImage, g: &Geometry, color: Rgba<u8>) {
    let center = g.size as f32 / 2.0;
    let radius = g.marker as f32;
    let lo = (center - radius).floor().max(0.0) as u32;
    let hi = ((center + radius).ceil() as u32).min(g.size);

    for y in lo..hi {
        for x in lo..hi {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            if dx * dx + dy * dy <= radius * radius {
                img.put_pixel(x, y, color);
            }
        }
    }
}

fn paint_corner_ticks(img: &mut RgbaImage, g: &Geometry, color: Rgba<u8>) {
    let size = g.size;
    let start = g.inset;
    let leg = g.tick_length;
    let line = g.line;
    if start + leg > size / 2 {
        return;
    }

    // Top-left L, mirrored into the other corners.
    let legs = [
        (start, start, start + leg, start + line),
        (start, start, start + line, start + leg),
    ];
    for (x0, y0, x1, y1) in legs {
        fill_rect(img, x0, y0, x1, y1, color);
        fill_rect(img, size - x1, y0, size - x0, y1, color);
        fill_rect(img, x0, size - y1, x1, size - y0, color);
        fill_rect(img, size - x1, size - y1, size - x0, size - y0, color);
    }
}

/// Fill the half-open rectangle `[x0, x1) × [y0, y1)`, clipped to the image.
fn fill_rect(img: &mut RgbaImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgba<u8>) {
    let x1 = x1.min(img.width());
    let y1 = y1.min(img.height());
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, color);
        }
    }
}
