//! Border frames and tinted theme assets.
//!
//! A themed border is assembled from eight fragments coloured with the
//! border colour; names the catalogue doesn't know fall back to the built-in
//! system borders in `theme`.

use super::drawing::{bevel_edges, stroke_rect, stroke_rounded_rect};
use super::raster::Raster;
use super::theme::{system_border, SystemBorder};
use crate::error::{ButtonError, Result};
use crate::storage::{
    AssetCatalogue, BorderFragments, CacheKind, ImageCache, ImageLoader, LineState, MaskedAsset,
};
use crate::types::{format_colour, shade, Rect};
use std::sync::Arc;

/// Borrowed view of the asset services a render needs
#[derive(Clone, Copy)]
pub struct AssetAccess<'a> {
    pub catalogue: &'a dyn AssetCatalogue,
    pub loader: &'a dyn ImageLoader,
    pub cache: &'a ImageCache,
}

impl<'a> AssetAccess<'a> {
    /// Load an image file through the cache
    pub fn image(&self, name: &str, kind: CacheKind) -> Result<Arc<Raster>> {
        if let Some(raster) = self.cache.get(name, kind) {
            return Ok(raster);
        }
        let raster = Arc::new(self.loader.load(name)?);
        self.cache.add(name, Arc::clone(&raster), kind);
        Ok(raster)
    }

    /// Load `asset` coloured with `colour`, through the cache.
    ///
    /// With a separate alpha file the alpha is tinted and the base image is
    /// drawn over it; otherwise the base itself is tinted.
    pub fn tinted(&self, asset: &MaskedAsset, colour: u32, kind: CacheKind) -> Result<Arc<Raster>> {
        let key = format!(
            "{}|{}|{}",
            asset.base,
            asset.alpha.as_deref().unwrap_or(""),
            format_colour(colour)
        );
        if let Some(raster) = self.cache.get(&key, kind) {
            return Ok(raster);
        }

        let base = self.loader.load(&asset.base)?;
        let raster = match &asset.alpha {
            Some(alpha) => {
                let mut tinted = self.loader.load(alpha)?.colourized(colour)?;
                tinted.draw_over(&base, 0, 0);
                tinted
            }
            None => base.colourized(colour)?,
        };
        let raster = Arc::new(raster);
        self.cache.add(&key, Arc::clone(&raster), kind);
        Ok(raster)
    }
}

/// Pixel thickness of each side of a border
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BorderInsets {
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
}

impl BorderInsets {
    pub fn uniform(width: usize) -> Self {
        Self {
            left: width,
            top: width,
            right: width,
            bottom: width,
        }
    }

    /// Largest side, used as the single inset for placing content
    pub fn max(&self) -> usize {
        self.left.max(self.top).max(self.right).max(self.bottom)
    }

    /// Area left inside the border
    pub fn interior(&self, width: usize, height: usize) -> Rect {
        Rect::new(
            self.left as i32,
            self.top as i32,
            width.saturating_sub(self.left + self.right),
            height.saturating_sub(self.top + self.bottom),
        )
    }
}

/// Tinted fragments of one border
struct Fragments {
    top_left: Arc<Raster>,
    top: Arc<Raster>,
    top_right: Arc<Raster>,
    right: Arc<Raster>,
    bottom_right: Arc<Raster>,
    bottom: Arc<Raster>,
    bottom_left: Arc<Raster>,
    left: Arc<Raster>,
}

impl Fragments {
    fn load(assets: &AssetAccess, names: &BorderFragments, colour: u32) -> Result<Self> {
        let part = |a: &MaskedAsset| assets.tinted(a, colour, CacheKind::Border);
        Ok(Self {
            top_left: part(&names.top_left)?,
            top: part(&names.top)?,
            top_right: part(&names.top_right)?,
            right: part(&names.right)?,
            bottom_right: part(&names.bottom_right)?,
            bottom: part(&names.bottom)?,
            bottom_left: part(&names.bottom_left)?,
            left: part(&names.left)?,
        })
    }

    fn insets(&self) -> BorderInsets {
        BorderInsets {
            left: self.left.width(),
            top: self.top.height(),
            right: self.right.width(),
            bottom: self.bottom.height(),
        }
    }

    /// Compose the frame: corners verbatim, edges stretched between them
    fn assemble(&self, width: usize, height: usize) -> Result<Raster> {
        let mut frame = Raster::new(width, height)?;
        let (w, h) = (width as i32, height as i32);

        frame.draw_over(&self.top_left, 0, 0);
        frame.draw_over(&self.top_right, w - self.top_right.width() as i32, 0);
        frame.draw_over(&self.bottom_left, 0, h - self.bottom_left.height() as i32);
        frame.draw_over(
            &self.bottom_right,
            w - self.bottom_right.width() as i32,
            h - self.bottom_right.height() as i32,
        );

        let top_len = width.saturating_sub(self.top_left.width() + self.top_right.width());
        if top_len > 0 {
            let edge = self.top.stretched(top_len, self.top.height())?;
            frame.draw_over(&edge, self.top_left.width() as i32, 0);
        }
        let bottom_len = width.saturating_sub(self.bottom_left.width() + self.bottom_right.width());
        if bottom_len > 0 {
            let edge = self.bottom.stretched(bottom_len, self.bottom.height())?;
            frame.draw_over(
                &edge,
                self.bottom_left.width() as i32,
                h - self.bottom.height() as i32,
            );
        }
        let left_len = height.saturating_sub(self.top_left.height() + self.bottom_left.height());
        if left_len > 0 {
            let edge = self.left.stretched(self.left.width(), left_len)?;
            frame.draw_over(&edge, 0, self.top_left.height() as i32);
        }
        let right_len = height.saturating_sub(self.top_right.height() + self.bottom_right.height());
        if right_len > 0 {
            let edge = self.right.stretched(self.right.width(), right_len)?;
            frame.draw_over(
                &edge,
                w - self.right.width() as i32,
                self.top_right.height() as i32,
            );
        }

        frame.erase_rect(self.insets().interior(width, height));
        Ok(frame)
    }
}

fn state_name(state: LineState) -> &'static str {
    match state {
        LineState::Off => "off",
        LineState::On => "on",
    }
}

/// Thickness of border `style`; zero when there is none or it can't be resolved
pub fn border_insets(assets: &AssetAccess, style: &str, colour: u32, state: LineState) -> BorderInsets {
    if style.is_empty() {
        return BorderInsets::default();
    }
    if let Some(names) = assets.catalogue.border(style, state) {
        return match Fragments::load(assets, &names, colour) {
            Ok(fragments) => fragments.insets(),
            Err(e) => {
                log::warn!("Border '{}' fragments unavailable: {}", style, e);
                BorderInsets::default()
            }
        };
    }
    system_border(style)
        .map(|b| BorderInsets::uniform(b.thickness()))
        .unwrap_or_default()
}

/// Assembled, coloured frame for a themed border, from the cache when possible
pub fn themed_frame(
    assets: &AssetAccess,
    style: &str,
    names: &BorderFragments,
    size: (usize, usize),
    colour: u32,
    state: LineState,
) -> Result<Arc<Raster>> {
    let (width, height) = size;
    let key = format!(
        "{}:{}x{}:{}:{}",
        style.to_ascii_lowercase(),
        width,
        height,
        format_colour(colour),
        state_name(state)
    );
    if let Some(frame) = assets.cache.get(&key, CacheKind::Border) {
        return Ok(frame);
    }

    let frame = Arc::new(Fragments::load(assets, names, colour)?.assemble(width, height)?);
    assets.cache.add(&key, Arc::clone(&frame), CacheKind::Border);
    Ok(frame)
}

/// Draw a built-in border straight onto the button
pub fn draw_system_border(raster: &mut Raster, border: SystemBorder, colour: u32) -> Result<()> {
    let bounds = raster.bounds();
    match border {
        SystemBorder::Frame(pen) => stroke_rect(raster, bounds, pen, colour)?,
        SystemBorder::PictureFrame => {
            stroke_rect(raster, bounds, 2, colour)?;
            let inner = Rect::new(
                4,
                4,
                bounds.width.saturating_sub(8),
                bounds.height.saturating_sub(8),
            );
            stroke_rect(raster, inner, 2, colour)?;
        }
        SystemBorder::Circle(radius) => {
            stroke_rounded_rect(raster, bounds, radius, border.thickness(), colour)
        }
        SystemBorder::Bevel(light, dark) => {
            stroke_rect(raster, bounds, 1, colour)?;
            bevel_edges(
                raster,
                border.thickness(),
                shade(colour, light),
                shade(colour, dark),
            );
        }
    }
    Ok(())
}

/// Draw border `style` onto `raster`
///
/// # Arguments
/// * `assets` - Catalogue, loader and cache
/// * `style` - Border name; themed names win over built-in ones
/// * `colour` - Border colour of the instance
/// * `state` - Released or pressed variant
pub fn draw_border(
    assets: &AssetAccess,
    raster: &mut Raster,
    style: &str,
    colour: u32,
    state: LineState,
) -> Result<()> {
    if let Some(names) = assets.catalogue.border(style, state) {
        let frame = themed_frame(
            assets,
            style,
            &names,
            (raster.width(), raster.height()),
            colour,
            state,
        )?;
        raster.draw_over(&frame, 0, 0);
        return Ok(());
    }
    match system_border(style) {
        Some(border) => draw_system_border(raster, border, colour),
        None => Err(ButtonError::AssetMissing(format!("border '{}'", style))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryImages, StaticCatalogue};

    /// 4x4 corners and 4 px thick edges, each drawn in white
    fn themed() -> (StaticCatalogue, MemoryImages) {
        let images = MemoryImages::new();
        for part in ["tl", "tr", "bl", "br"] {
            images.insert(&format!("frame_{}.png", part), Raster::filled(4, 4, 0xFFFFFFFF).unwrap());
        }
        for part in ["t", "b"] {
            images.insert(&format!("frame_{}.png", part), Raster::filled(2, 4, 0xFFFFFFFF).unwrap());
        }
        for part in ["l", "r"] {
            images.insert(&format!("frame_{}.png", part), Raster::filled(4, 2, 0xFFFFFFFF).unwrap());
        }
        let catalogue = StaticCatalogue::new().with_border(
            "Frame",
            LineState::Off,
            BorderFragments::with_prefix("frame"),
        );
        (catalogue, images)
    }

    #[test]
    fn test_assembled_frame_is_button_sized() {
        let (catalogue, images) = themed();
        let cache = ImageCache::new(1 << 20);
        let assets = AssetAccess {
            catalogue: &catalogue,
            loader: &images,
            cache: &cache,
        };
        let names = catalogue.border("frame", LineState::Off).unwrap();
        let frame = themed_frame(&assets, "Frame", &names, (30, 20), 0xFFFF0000, LineState::Off).unwrap();

        assert_eq!((frame.width(), frame.height()), (30, 20));
        assert_eq!(frame.get(0, 0), 0xFFFF0000);
        // Stretched edges may round by one step
        assert!(frame.get(15, 2) >> 24 >= 0xFE);
        assert!((frame.get(15, 2) >> 16) & 0xFF >= 0xFE);
        assert!(frame.get(29, 10) >> 24 >= 0xFE);
        assert_eq!(frame.get(15, 10), 0);

        // Second request comes from the cache
        let again = themed_frame(&assets, "Frame", &names, (30, 20), 0xFFFF0000, LineState::Off).unwrap();
        assert!(Arc::ptr_eq(&frame, &again));
    }

    #[test]
    fn test_insets_and_fallbacks() {
        let (catalogue, images) = themed();
        let cache = ImageCache::new(1 << 20);
        let assets = AssetAccess {
            catalogue: &catalogue,
            loader: &images,
            cache: &cache,
        };
        assert_eq!(border_insets(&assets, "frame", 0xFFFFFFFF, LineState::On).max(), 4);
        assert_eq!(border_insets(&assets, "Double Line", 0xFFFFFFFF, LineState::Off).max(), 2);
        assert_eq!(border_insets(&assets, "", 0xFFFFFFFF, LineState::Off).max(), 0);

        let mut raster = Raster::new(10, 10).unwrap();
        assert!(matches!(
            draw_border(&assets, &mut raster, "Nonexistent", 0xFFFFFFFF, LineState::Off),
            Err(ButtonError::AssetMissing(_))
        ));
        draw_border(&assets, &mut raster, "Double Line", 0xFF00FF00, LineState::Off).unwrap();
        assert_eq!(raster.get(1, 5), 0xFF00FF00);
        assert_eq!(raster.get(2, 5), 0);
    }

    #[test]
    fn test_tinted_uses_alpha_file() {
        let images = MemoryImages::new();
        images.insert("knob.png", Raster::new(2, 2).unwrap());
        images.insert("knob_alpha.png", Raster::filled(2, 2, 0x80FFFFFF).unwrap());
        let catalogue = StaticCatalogue::new();
        let cache = ImageCache::new(1 << 20);
        let assets = AssetAccess {
            catalogue: &catalogue,
            loader: &images,
            cache: &cache,
        };
        let tinted = assets
            .tinted(&MaskedAsset::with_alpha("knob.png", "knob_alpha.png"), 0xFF0000FF, CacheKind::Slider)
            .unwrap();
        assert_eq!(tinted.get(0, 0), 0x800000FF);
    }
}
