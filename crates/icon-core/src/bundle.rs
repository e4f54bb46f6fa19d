use image::RgbaImage;
use std::collections::BTreeMap;
use std::fmt;

/// Error type for assembling a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleError {
    NotSquare { width: u32, height: u32 },
    DuplicateSize(u32),
}

impl fmt::Display for BundleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleError::NotSquare { width, height } => {
                write!(f, "icon renders must be square, got {}x{}", width, height)
            }
            BundleError::DuplicateSize(size) => {
                write!(f, "bundle already holds a {}x{} icon", size, size)
            }
        }
    }
}

impl std::error::Error for BundleError {}

/// A square raster at one fixed size.
#[derive(Debug, Clone)]
pub struct RenderedIcon {
    size: u32,
    image: RgbaImage,
}

impl RenderedIcon {
    pub fn new(image: RgbaImage) -> Result<Self, BundleError> {
        let (width, height) = image.dimensions();
        if width != height {
            return Err(BundleError::NotSquare { width, height });
        }
        Ok(RenderedIcon {
            size: width,
            image,
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Rendered icons keyed by size, iterated smallest-first.
#[derive(Debug, Clone, Default)]
pub struct IconBundle {
    icons: BTreeMap<u32, RenderedIcon>,
}

impl IconBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an icon. Each size may appear only once.
    pub fn insert(&mut self, icon: RenderedIcon) -> Result<(), BundleError> {
        let size = icon.size();
        if self.icons.contains_key(&size) {
            return Err(BundleError::DuplicateSize(size));
        }
        self.icons.insert(size, icon);
        Ok(())
    }

    pub fn get(&self, size: u32) -> Option<&RenderedIcon> {
        self.icons.get(&size)
    }

    pub fn contains(&self, size: u32) -> bool {
        self.icons.contains_key(&size)
    }

    pub fn sizes(&self) -> Vec<u32> {
        self.icons.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderedIcon> {
        self.icons.values()
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    /// Icons for the requested sizes, smallest-first, plus the sizes that are absent.
    pub fn select(&self, sizes: &[u32]) -> (Vec<&RenderedIcon>, Vec<u32>) {
        let mut wanted = sizes.to_vec();
        wanted.sort_unstable();
        wanted.dedup();

        let mut present = Vec::new();
        let mut missing = Vec::new();
        for size in wanted {
            match self.icons.get(&size) {
                Some(icon) => present.push(icon),
                None => missing.push(size),
            }
        }
        (present, missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icon(size: u32) -> RenderedIcon {
        RenderedIcon::new(RgbaImage::new(size, size)).unwrap()
    }

    #[test]
    fn rejects_non_square_images() {
        let result = RenderedIcon::new(RgbaImage::new(16, 32));
        assert_eq!(
            result.unwrap_err(),
            BundleError::NotSquare {
                width: 16,
                height: 32
            }
        );
    }

    #[test]
    fn rejects_duplicate_sizes() {
        let mut bundle = IconBundle::new();
        bundle.insert(icon(32)).unwrap();
        assert_eq!(
            bundle.insert(icon(32)).unwrap_err(),
            BundleError::DuplicateSize(32)
        );
        assert_eq!(bundle.len(), 1);
    }

    #[test]
    fn iterates_smallest_first() {
        let mut bundle = IconBundle::new();
        for size in [256, 16, 64, 32] {
            bundle.insert(icon(size)).unwrap();
        }
        let sizes: Vec<u32> = bundle.iter().map(|i| i.size()).collect();
        assert_eq!(sizes, vec![16, 32, 64, 256]);
        assert_eq!(bundle.sizes(), sizes);
    }

    #[test]
    fn select_reports_missing_sizes() {
        let mut bundle = IconBundle::new();
        for size in [16, 32, 128] {
            bundle.insert(icon(size)).unwrap();
        }

        let (present, missing) = bundle.select(&[128, 48, 16, 16]);
        let present: Vec<u32> = present.iter().map(|i| i.size()).collect();
        assert_eq!(present, vec![16, 128]);
        assert_eq!(missing, vec![48]);
    }
}
