//! macOS iconset slot table and iconset directory writer.

use crate::bundle::IconBundle;
use crate::error::ExportError;
use icns::IconType;
use std::fs;
use std::path::Path;

/// One named entry of an `.iconset` directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcnsSlot {
    /// Iconset file stem (e.g., "icon_16x16@2x")
    pub name: &'static str,
    /// Nominal size in points
    pub points: u32,
    /// Scale factor (1 or 2)
    pub scale: u32,
    /// Matching ICNS element type
    pub icon_type: IconType,
}

impl IcnsSlot {
    /// Pixel size of the render this slot holds.
    pub const fn pixels(&self) -> u32 {
        self.points * self.scale
    }

    pub fn file_name(&self) -> String {
        format!("{}.png", self.name)
    }
}

/// Every iconset slot, in the order `iconutil` lists them.
///
/// Several slots share a pixel size: a 32px render is both the 16pt@2x and
/// the 32pt@1x entry.
pub const ICNS_SLOTS: &[IcnsSlot] = &[
    IcnsSlot {
        name: "icon_16x16",
        points: 16,
        scale: 1,
        icon_type: IconType::RGBA32_16x16,
    },
    IcnsSlot {
        name: "icon_16x16@2x",
        points: 16,
        scale: 2,
        icon_type: IconType::RGBA32_16x16_2x,
    },
    IcnsSlot {
        name: "icon_32x32",
        points: 32,
        scale: 1,
        icon_type: IconType::RGBA32_32x32,
    },
    IcnsSlot {
        name: "icon_32x32@2x",
        points: 32,
        scale: 2,
        icon_type: IconType::RGBA32_32x32_2x,
    },
    IcnsSlot {
        name: "icon_128x128",
        points: 128,
        scale: 1,
        icon_type: IconType::RGBA32_128x128,
    },
    IcnsSlot {
        name: "icon_128x128@2x",
        points: 128,
        scale: 2,
        icon_type: IconType::RGBA32_128x128_2x,
    },
    IcnsSlot {
        name: "icon_256x256",
        points: 256,
        scale: 1,
        icon_type: IconType::RGBA32_256x256,
    },
    IcnsSlot {
        name: "icon_256x256@2x",
        points: 256,
        scale: 2,
        icon_type: IconType::RGBA32_256x256_2x,
    },
    IcnsSlot {
        name: "icon_512x512",
        points: 512,
        scale: 1,
        icon_type: IconType::RGBA32_512x512,
    },
    IcnsSlot {
        name: "icon_512x512@2x",
        points: 512,
        scale: 2,
        icon_type: IconType::RGBA32_512x512_2x,
    },
];

/// All slots a render of `pixels` fills.
pub fn slots_for(pixels: u32) -> impl Iterator<Item = &'static IcnsSlot> {
    ICNS_SLOTS.iter().filter(move |slot| slot.pixels() == pixels)
}

/// Look up a slot by its iconset name.
pub fn slot_named(name: &str) -> Option<&'static IcnsSlot> {
    ICNS_SLOTS.iter().find(|slot| slot.name == name)
}

/// Distinct pixel sizes needed to fill every slot, ascending.
pub fn required_sizes() -> Vec<u32> {
    let mut sizes: Vec<u32> = ICNS_SLOTS.iter().map(IcnsSlot::pixels).collect();
    sizes.sort_unstable();
    sizes.dedup();
    sizes
}

/// Outcome of populating an iconset directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconsetContents {
    pub written: Vec<&'static str>,
    pub missing: Vec<&'static str>,
}

impl IconsetContents {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Pixel sizes behind the missing slots, ascending and deduplicated.
    pub fn missing_sizes(&self) -> Vec<u32> {
        let mut sizes: Vec<u32> = self
            .missing
            .iter()
            .filter_map(|name| slot_named(name))
            .map(IcnsSlot::pixels)
            .collect();
        sizes.sort_unstable();
        sizes.dedup();
        sizes
    }
}

/// Write one PNG per slot into `dir`, creating it if needed.
pub fn write_iconset(bundle: &IconBundle, dir: &Path) -> Result<IconsetContents, ExportError> {
    fs::create_dir_all(dir).map_err(|e| ExportError::WriteFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut contents = IconsetContents::default();
    for slot in ICNS_SLOTS {
        let Some(icon) = bundle.get(slot.pixels()) else {
            log::warn!("no {}px render for iconset slot {}", slot.pixels(), slot.name);
            contents.missing.push(slot.name);
            continue;
        };

        let path = dir.join(slot.file_name());
        icon.image()
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|e| ExportError::EncodeFailed {
                path: path.clone(),
                source: e,
            })?;
        contents.written.push(slot.name);
    }

    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::RenderedIcon;
    use image::RgbaImage;
    use tempfile::tempdir;

    fn names_for(pixels: u32) -> Vec<&'static str> {
        slots_for(pixels).map(|slot| slot.name).collect()
    }

    #[test]
    fn table_matches_iconset_convention() {
        assert_eq!(names_for(16), vec!["icon_16x16"]);
        assert_eq!(names_for(32), vec!["icon_16x16@2x", "icon_32x32"]);
        assert_eq!(names_for(64), vec!["icon_32x32@2x"]);
        assert_eq!(names_for(128), vec!["icon_128x128"]);
        assert_eq!(names_for(256), vec!["icon_128x128@2x", "icon_256x256"]);
        assert_eq!(names_for(512), vec!["icon_256x256@2x", "icon_512x512"]);
        assert_eq!(names_for(1024), vec!["icon_512x512@2x"]);
    }

    #[test]
    fn unmapped_sizes_fill_no_slot() {
        assert!(names_for(48).is_empty());
        assert!(names_for(24).is_empty());
    }

    #[test]
    fn required_sizes_are_distinct_and_sorted() {
        assert_eq!(required_sizes(), vec![16, 32, 64, 128, 256, 512, 1024]);
    }

    #[test]
    fn slot_types_agree_with_pixel_sizes() {
        for slot in ICNS_SLOTS {
            assert_eq!(slot.icon_type.pixel_width(), slot.pixels(), "{}", slot.name);
        }
    }

    #[test]
    fn write_iconset_fills_shared_slots_from_one_render() {
        let dir = tempdir().unwrap();
        let iconset = dir.path().join("app_icon.iconset");

        let mut bundle = IconBundle::new();
        for size in [32, 256] {
            bundle
                .insert(RenderedIcon::new(RgbaImage::new(size, size)).unwrap())
                .unwrap();
        }

        let contents = write_iconset(&bundle, &iconset).unwrap();
        assert_eq!(
            contents.written,
            vec!["icon_16x16@2x", "icon_32x32", "icon_128x128@2x", "icon_256x256"]
        );
        assert!(!contents.is_complete());
        assert_eq!(contents.missing_sizes(), vec![16, 64, 128, 512, 1024]);

        for name in &contents.written {
            assert!(iconset.join(format!("{}.png", name)).exists());
        }
        let doubled = image::open(iconset.join("icon_16x16@2x.png")).unwrap();
        assert_eq!((doubled.width(), doubled.height()), (32, 32));
    }
}
