//! Windows ICO container.

use crate::bundle::RenderedIcon;
use crate::error::ExportError;
use ico::{IconDir, IconDirEntry, IconImage, ResourceType};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Largest frame an ICO entry can hold.
pub const ICO_MAX_SIZE: u32 = 256;

/// Sizes packed into `app_icon.ico`.
pub const ICO_SIZES: &[u32] = &[16, 32, 48, 64, 128, 256];

/// Encode icons into an ICO stream, ordered smallest-first.
///
/// Returns the number of frames written.
pub fn encode_ico<W: Write>(icons: &[&RenderedIcon], writer: W) -> Result<usize, ExportError> {
    if icons.is_empty() {
        return Err(ExportError::EmptyBundle);
    }

    let mut ordered = icons.to_vec();
    ordered.sort_by_key(|icon| icon.size());

    if let Some(too_large) = ordered.iter().find(|icon| icon.size() > ICO_MAX_SIZE) {
        return Err(ExportError::IcoSizeTooLarge(too_large.size()));
    }

    let mut icon_dir = IconDir::new(ResourceType::Icon);
    for icon in &ordered {
        let size = icon.size();
        let image = IconImage::from_rgba_data(size, size, icon.image().as_raw().clone());
        let entry = IconDirEntry::encode(&image).map_err(|e| ExportError::WriteFailed {
            path: format!("<ico frame {}x{}>", size, size).into(),
            source: e,
        })?;
        icon_dir.add_entry(entry);
    }

    icon_dir.write(writer).map_err(|e| ExportError::WriteFailed {
        path: "<ico stream>".into(),
        source: e,
    })?;

    Ok(ordered.len())
}

/// Write an ICO file to `path`.
///
/// The container is encoded in memory first, so a rejected bundle leaves
/// `path` untouched.
pub fn write_ico(icons: &[&RenderedIcon], path: &Path) -> Result<usize, ExportError> {
    let mut buffer = Vec::new();
    let frames = encode_ico(icons, &mut buffer)?;
    fs::write(path, &buffer).map_err(|e| ExportError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    log::debug!("wrote {} ICO frames to {}", frames, path.display());
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{render_glyph, GlyphStyle};
    use std::fs::File;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn rendered(sizes: &[u32]) -> Vec<RenderedIcon> {
        sizes
            .iter()
            .map(|&size| {
                RenderedIcon::new(render_glyph(size, &GlyphStyle::canonical()).unwrap()).unwrap()
            })
            .collect()
    }

    #[test]
    fn six_frames_in_ascending_order() {
        // Deliberately shuffled input
        let icons = rendered(&[256, 16, 64, 32, 128, 48]);
        let refs: Vec<&RenderedIcon> = icons.iter().collect();

        let mut buffer = Vec::new();
        let frames = encode_ico(&refs, &mut buffer).unwrap();
        assert_eq!(frames, 6);

        let icon_dir = IconDir::read(Cursor::new(buffer)).unwrap();
        let sizes: Vec<(u32, u32)> = icon_dir
            .entries()
            .iter()
            .map(|e| (e.width(), e.height()))
            .collect();
        assert_eq!(
            sizes,
            vec![(16, 16), (32, 32), (48, 48), (64, 64), (128, 128), (256, 256)]
        );
    }

    #[test]
    fn frames_decode_to_source_pixels() {
        // 256px frames are stored as PNG, so the round trip is exact
        let icons = rendered(&[256]);
        let refs: Vec<&RenderedIcon> = icons.iter().collect();

        let mut buffer = Vec::new();
        encode_ico(&refs, &mut buffer).unwrap();

        let icon_dir = IconDir::read(Cursor::new(buffer)).unwrap();
        let decoded = icon_dir.entries()[0].decode().unwrap();
        assert_eq!(decoded.rgba_data(), icons[0].image().as_raw().as_slice());
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let icons = rendered(&[16, 512]);
        let refs: Vec<&RenderedIcon> = icons.iter().collect();
        let result = encode_ico(&refs, Vec::new());
        assert!(matches!(result, Err(ExportError::IcoSizeTooLarge(512))));
    }

    #[test]
    fn empty_input_is_rejected() {
        let result = encode_ico(&[], Vec::new());
        assert!(matches!(result, Err(ExportError::EmptyBundle)));
    }

    #[test]
    fn write_ico_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app_icon.ico");
        let icons = rendered(ICO_SIZES);
        let refs: Vec<&RenderedIcon> = icons.iter().collect();

        assert_eq!(write_ico(&refs, &path).unwrap(), 6);
        let icon_dir = IconDir::read(File::open(&path).unwrap()).unwrap();
        assert_eq!(icon_dir.entries().len(), 6);
    }

    #[test]
    fn rejected_write_leaves_no_file_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app_icon.ico");
        let icons = rendered(&[16, 512]);
        let refs: Vec<&RenderedIcon> = icons.iter().collect();

        let result = write_ico(&refs, &path);
        assert!(matches!(result, Err(ExportError::IcoSizeTooLarge(512))));
        assert!(!path.exists());
    }

    #[test]
    fn rejected_write_keeps_previous_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app_icon.ico");
        let good = rendered(&[16, 32]);
        let good_refs: Vec<&RenderedIcon> = good.iter().collect();
        write_ico(&good_refs, &path).unwrap();
        let before = fs::read(&path).unwrap();

        assert!(write_ico(&[], &path).is_err());
        assert_eq!(fs::read(&path).unwrap(), before);
    }
}
