//! Icon asset generation for MouseCross.
//!
//! A [`SourceImage`] (the built-in crosshair glyph, SVG markup or a raster
//! file) is rendered once per size into an [`IconBundle`], which is then
//! written out as flat PNGs, a Windows ICO and a macOS ICNS.
//! [`DmgBackground`] draws the artwork for the macOS disk image window.

pub mod bundle;
pub mod dmg_background;
mod error;
pub mod icns_export;
pub mod ico_export;
pub mod packager;
pub mod pipeline;
pub mod render;
pub mod source;

pub use bundle::{BundleError, IconBundle, RenderedIcon};
pub use dmg_background::DmgBackground;
pub use error::ExportError;
pub use packager::{IconsetPackager, PackagerChoice, PackagerError};
pub use pipeline::{export, ArtifactStatus, ExportEvent, ExportPlan, ExportReport};
pub use render::{GlyphStyle, RenderError};
pub use source::{SourceError, SourceImage};
