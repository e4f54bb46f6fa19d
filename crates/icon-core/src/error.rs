use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors raised while writing icon artifacts.
#[derive(Debug)]
pub enum ExportError {
    /// Output directory could not be created
    OutputDirCreationFailed { path: PathBuf, source: io::Error },
    /// Scratch directory for the iconset could not be created
    TempDirFailed(io::Error),
    /// A file could not be written
    WriteFailed { path: PathBuf, source: io::Error },
    /// A PNG could not be encoded
    EncodeFailed { path: PathBuf, source: image::ImageError },
    /// ICO frames are limited to 256x256
    IcoSizeTooLarge(u32),
    /// Nothing to put in the container
    EmptyBundle,
    /// Generated artwork could not be drawn
    ArtworkFailed { reason: String },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::OutputDirCreationFailed { path, source } => {
                write!(f, "failed to create output directory '{}': {}", path.display(), source)
            }
            ExportError::TempDirFailed(e) => {
                write!(f, "failed to create temporary directory: {}", e)
            }
            ExportError::WriteFailed { path, source } => {
                write!(f, "failed to write '{}': {}", path.display(), source)
            }
            ExportError::EncodeFailed { path, source } => {
                write!(f, "failed to encode '{}': {}", path.display(), source)
            }
            ExportError::IcoSizeTooLarge(size) => {
                write!(f, "ICO frames cannot exceed 256x256, got {}x{}", size, size)
            }
            ExportError::EmptyBundle => write!(f, "no rendered icons to package"),
            ExportError::ArtworkFailed { reason } => {
                write!(f, "failed to draw artwork: {}", reason)
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::OutputDirCreationFailed { source, .. } => Some(source),
            ExportError::TempDirFailed(e) => Some(e),
            ExportError::WriteFailed { source, .. } => Some(source),
            ExportError::EncodeFailed { source, .. } => Some(source),
            ExportError::IcoSizeTooLarge(_)
            | ExportError::EmptyBundle
            | ExportError::ArtworkFailed { .. } => None,
        }
    }
}
