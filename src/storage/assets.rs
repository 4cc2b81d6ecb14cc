//! Themed assets: where border fragments, sliders, cursors and icons live,
//! and how image files become rasters.

use crate::error::{ButtonError, Result};
use crate::lock;
use crate::types::Direction;
use crate::ui::raster::Raster;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Image file with an optional separate alpha mask file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskedAsset {
    pub base: String,
    pub alpha: Option<String>,
}

impl MaskedAsset {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.to_string(),
            alpha: None,
        }
    }

    pub fn with_alpha(base: &str, alpha: &str) -> Self {
        Self {
            base: base.to_string(),
            alpha: Some(alpha.to_string()),
        }
    }
}

/// The eight pieces of a themed border
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BorderFragments {
    pub top_left: MaskedAsset,
    pub top: MaskedAsset,
    pub top_right: MaskedAsset,
    pub right: MaskedAsset,
    pub bottom_right: MaskedAsset,
    pub bottom: MaskedAsset,
    pub bottom_left: MaskedAsset,
    pub left: MaskedAsset,
}

impl BorderFragments {
    /// Fragments named `<prefix>_tl.png`, `<prefix>_t.png`, ... `<prefix>_l.png`
    pub fn with_prefix(prefix: &str) -> Self {
        let part = |p: &str| MaskedAsset::new(&format!("{}_{}.png", prefix, p));
        Self {
            top_left: part("tl"),
            top: part("t"),
            top_right: part("tr"),
            right: part("r"),
            bottom_right: part("br"),
            bottom: part("b"),
            bottom_left: part("bl"),
            left: part("l"),
        }
    }
}

/// Border variant: released (off) or pressed/active (on)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LineState {
    Off,
    On,
}

impl LineState {
    /// Instance 0 draws the off border, every other instance the on border
    pub fn for_instance(index: usize) -> Self {
        if index == 0 {
            LineState::Off
        } else {
            LineState::On
        }
    }
}

pub trait AssetCatalogue: Send + Sync {
    fn border(&self, name: &str, state: LineState) -> Option<BorderFragments>;
    fn slider(&self, name: &str, direction: Direction) -> Option<MaskedAsset>;
    fn cursor(&self, name: &str) -> Option<MaskedAsset>;
    fn icon(&self, index: u32) -> Option<String>;
}

pub trait ImageLoader: Send + Sync {
    fn load(&self, name: &str) -> Result<Raster>;
}

/// Decode PNG/JPEG/WebP/TIFF bytes
pub fn decode_image(bytes: &[u8]) -> Result<Raster> {
    let img = image::load_from_memory(bytes)?;
    let rgba = img.to_rgba8();
    Raster::from_rgba8(rgba.width() as usize, rgba.height() as usize, rgba.as_raw())
}

/// Loads image files relative to a root directory
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageLoader for FsImageLoader {
    fn load(&self, name: &str) -> Result<Raster> {
        let path = self.root.join(name);
        let bytes = std::fs::read(&path)
            .map_err(|e| ButtonError::AssetMissing(format!("{}: {}", path.display(), e)))?;
        decode_image(&bytes)
    }
}

/// Rasters registered in memory, for hosts that ship assets inside the binary
#[derive(Default)]
pub struct MemoryImages {
    images: Mutex<HashMap<String, Arc<Raster>>>,
}

impl MemoryImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: &str, raster: Raster) {
        lock(&self.images).insert(name.to_string(), Arc::new(raster));
    }
}

impl ImageLoader for MemoryImages {
    fn load(&self, name: &str) -> Result<Raster> {
        lock(&self.images)
            .get(name)
            .map(|r| Raster::clone(r))
            .ok_or_else(|| ButtonError::AssetMissing(name.to_string()))
    }
}

/// Catalogue filled in code
#[derive(Default)]
pub struct StaticCatalogue {
    borders: HashMap<(String, LineState), BorderFragments>,
    sliders: HashMap<(String, bool), MaskedAsset>,
    cursors: HashMap<String, MaskedAsset>,
    icons: HashMap<u32, String>,
}

fn catalogue_key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl StaticCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_border(mut self, name: &str, state: LineState, fragments: BorderFragments) -> Self {
        self.borders.insert((catalogue_key(name), state), fragments);
        self
    }

    pub fn with_slider(mut self, name: &str, direction: Direction, asset: MaskedAsset) -> Self {
        self.sliders.insert(
            (catalogue_key(name), direction == Direction::Horizontal),
            asset,
        );
        self
    }

    pub fn with_cursor(mut self, name: &str, asset: MaskedAsset) -> Self {
        self.cursors.insert(catalogue_key(name), asset);
        self
    }

    pub fn with_icon(mut self, index: u32, file: &str) -> Self {
        self.icons.insert(index, file.to_string());
        self
    }
}

impl AssetCatalogue for StaticCatalogue {
    fn border(&self, name: &str, state: LineState) -> Option<BorderFragments> {
        let key = catalogue_key(name);
        // A border without a distinct pressed variant reuses the released one
        self.borders
            .get(&(key.clone(), state))
            .or_else(|| self.borders.get(&(key, LineState::Off)))
            .cloned()
    }

    fn slider(&self, name: &str, direction: Direction) -> Option<MaskedAsset> {
        self.sliders
            .get(&(catalogue_key(name), direction == Direction::Horizontal))
            .cloned()
    }

    fn cursor(&self, name: &str) -> Option<MaskedAsset> {
        self.cursors.get(&catalogue_key(name)).cloned()
    }

    fn icon(&self, index: u32) -> Option<String> {
        self.icons.get(&index).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_names() {
        let f = BorderFragments::with_prefix("__system/bevel");
        assert_eq!(f.top_left.base, "__system/bevel_tl.png");
        assert_eq!(f.bottom.base, "__system/bevel_b.png");
        assert_eq!(f.left.alpha, None);
    }

    #[test]
    fn test_catalogue_falls_back_to_off_border() {
        let catalogue =
            StaticCatalogue::new().with_border("Fancy", LineState::Off, BorderFragments::with_prefix("f"));
        assert!(catalogue.border("fancy", LineState::On).is_some());
        assert!(catalogue.border("plain", LineState::Off).is_none());
    }

    #[test]
    fn test_memory_images() {
        let images = MemoryImages::new();
        images.insert("dot.png", Raster::filled(1, 1, 0xFFFFFFFF).unwrap());
        assert_eq!(images.load("dot.png").unwrap().get(0, 0), 0xFFFFFFFF);
        assert!(matches!(
            images.load("none.png"),
            Err(ButtonError::AssetMissing(_))
        ));
    }

    #[test]
    fn test_decode_png() {
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 0, 255, 128]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let raster = decode_image(&bytes).unwrap();
        assert_eq!(raster.get(0, 0), 0xFFFF0000);
        assert_eq!(raster.get(1, 0), 0x800000FF);
        assert!(decode_image(b"not an image").is_err());
    }
}
