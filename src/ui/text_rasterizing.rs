//! Text shaping, line layout and glyph coverage.
//!
//! Shaping is behind the `TextShaper` trait. `TextRenderer` shapes with
//! cosmic-text; `BlockShaper` draws solid glyph boxes for headless hosts
//! and tests where no fonts are installed.

use super::effects::CoverageMask;
use crate::types::{Align, FontRef};
use crate::ui::theme;
use cosmic_text::{
    Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Style, SwashCache, SwashContent, Weight,
};
use std::collections::HashMap;

/// A resolved typeface
#[derive(Clone, Debug, PartialEq)]
pub struct FontFace {
    pub family: String,
    /// Size in points
    pub size: f32,
    pub weight: u16,
    pub italic: bool,
    /// Symbol fonts keep their glyphs in the U+F0xx private-use range
    pub symbol: bool,
}

impl Default for FontFace {
    fn default() -> Self {
        Self {
            family: theme::DEFAULT_FONT_FAMILY.to_string(),
            size: theme::DEFAULT_FONT_SIZE,
            weight: 400,
            italic: false,
            symbol: false,
        }
    }
}

pub trait FontResolver: Send + Sync {
    fn resolve(&self, font: &FontRef) -> FontFace;
}

/// Font table of a project: font ids and font files mapped to faces
#[derive(Default)]
pub struct FontTable {
    by_id: HashMap<u32, FontFace>,
    by_file: HashMap<String, FontFace>,
    fallback: FontFace,
}

impl FontTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(mut self, id: u32, face: FontFace) -> Self {
        self.by_id.insert(id, face);
        self
    }

    /// Register a font file; the size comes from each reference
    pub fn with_file(mut self, file: &str, face: FontFace) -> Self {
        self.by_file.insert(file.to_string(), face);
        self
    }
}

impl FontResolver for FontTable {
    fn resolve(&self, font: &FontRef) -> FontFace {
        match font {
            FontRef::Id(id) => self.by_id.get(id).cloned().unwrap_or_else(|| {
                log::debug!("Font {} not in table, using {}", id, self.fallback.family);
                self.fallback.clone()
            }),
            FontRef::File { file, size } => {
                let mut face = self
                    .by_file
                    .get(file)
                    .cloned()
                    .unwrap_or_else(|| self.fallback.clone());
                face.size = *size;
                face
            }
        }
    }
}

/// Map text into the private-use range a symbol font expects
pub fn map_symbol(text: &str) -> String {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code < 0x100 && !c.is_control() {
                char::from_u32(code + 0xF000).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Coverage bitmap of one glyph, positioned relative to its line's top-left
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphCoverage {
    pub left: i32,
    pub top: i32,
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapedLine {
    pub width: f32,
    pub height: f32,
    pub glyphs: Vec<GlyphCoverage>,
}

pub trait TextShaper: Send {
    /// Shape and rasterize one line at `pixel_size`
    fn shape_line(&mut self, text: &str, face: &FontFace, pixel_size: f32) -> ShapedLine;

    fn measure(&mut self, text: &str, face: &FontFace, pixel_size: f32) -> f32 {
        self.shape_line(text, face, pixel_size).width
    }
}

pub struct TextRenderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
}

impl TextRenderer {
    /// Renderer with the system's installed fonts
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
        }
    }

    /// Renderer with extra font files loaded on top of the system fonts
    pub fn with_font_data(fonts: Vec<Vec<u8>>) -> Self {
        let mut font_system = FontSystem::new();
        let db = font_system.db_mut();
        for data in fonts {
            db.load_font_data(data);
        }
        Self {
            font_system,
            swash_cache: SwashCache::new(),
        }
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextShaper for TextRenderer {
    fn shape_line(&mut self, text: &str, face: &FontFace, pixel_size: f32) -> ShapedLine {
        let mut attrs = Attrs::new()
            .family(Family::Name(&face.family))
            .weight(Weight(face.weight));
        if face.italic {
            attrs = attrs.style(Style::Italic);
        }

        let metrics = Metrics::relative(pixel_size, 1.2);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        buffer.set_size(&mut self.font_system, None, None);
        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let mut line = ShapedLine {
            width: 0.,
            height: metrics.line_height,
            glyphs: Vec::new(),
        };

        for run in buffer.layout_runs() {
            line.width = line.width.max(run.line_w);
            line.height = run.line_height;
            let baseline_offset = run.line_y;

            for glyph in run.glyphs {
                let physical_glyph = glyph.physical((0., 0.), 1.);

                if let Some(image) = self
                    .swash_cache
                    .get_image(&mut self.font_system, physical_glyph.cache_key)
                {
                    let glyph_width = image.placement.width as usize;
                    let glyph_height = image.placement.height as usize;
                    // Colour glyphs (emoji) carry RGBA; keep only their alpha
                    let data = match image.content {
                        SwashContent::Color => image.data.chunks(4).map(|px| px[3]).collect(),
                        SwashContent::SubpixelMask => image
                            .data
                            .chunks(4)
                            .map(|px| px[0].max(px[1]).max(px[2]))
                            .collect(),
                        SwashContent::Mask => image.data.clone(),
                    };
                    line.glyphs.push(GlyphCoverage {
                        left: physical_glyph.x + image.placement.left,
                        top: physical_glyph.y + baseline_offset as i32 - image.placement.top,
                        width: glyph_width,
                        height: glyph_height,
                        data,
                    });
                }
            }
        }
        line
    }
}

/// Deterministic shaper: every visible character is a solid box half as wide as it is tall
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockShaper;

impl TextShaper for BlockShaper {
    fn shape_line(&mut self, text: &str, _face: &FontFace, pixel_size: f32) -> ShapedLine {
        let advance = (pixel_size / 2.).round().max(1.) as usize;
        let height = pixel_size.round().max(1.) as usize;
        let glyph_w = advance.saturating_sub(1).max(1);
        let mut glyphs = Vec::new();
        let mut count = 0;

        for (i, c) in text.chars().enumerate() {
            count = i + 1;
            if c.is_whitespace() {
                continue;
            }
            glyphs.push(GlyphCoverage {
                left: (i * advance) as i32,
                top: 0,
                width: glyph_w,
                height,
                data: vec![255; glyph_w * height],
            });
        }
        ShapedLine {
            width: (count * advance) as f32,
            height: height as f32,
            glyphs,
        }
    }
}

/// Split `text` into lines: explicit newlines, then greedy word-wrap when
/// `wrap_width` is given
pub fn break_lines(
    shaper: &mut dyn TextShaper,
    text: &str,
    face: &FontFace,
    pixel_size: f32,
    wrap_width: Option<f32>,
) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let Some(max) = wrap_width else {
            lines.push(paragraph.to_string());
            continue;
        };

        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if current.is_empty() || shaper.measure(&candidate, face, pixel_size) <= max {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        lines.push(current);
    }
    lines
}

/// Position of a text block inside the button
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    Grid { column: Align, row: Align },
    Absolute { x: i32, y: i32 },
}

/// Shape `lines` and stamp their glyph coverage into a button-sized mask.
///
/// The block is placed vertically by the anchor row; each line is placed
/// horizontally by the anchor column on its own.
///
/// # Arguments
/// * `size` - Button width and height
/// * `inset` - Border thickness plus text padding
pub fn rasterize_lines(
    shaper: &mut dyn TextShaper,
    lines: &[String],
    face: &FontFace,
    pixel_size: f32,
    size: (usize, usize),
    inset: usize,
    anchor: TextAnchor,
) -> crate::error::Result<CoverageMask> {
    let (width, height) = size;
    let mut mask = CoverageMask::new(width, height)?;
    let shaped: Vec<ShapedLine> = lines
        .iter()
        .map(|l| shaper.shape_line(l, face, pixel_size))
        .collect();
    let block_height: f32 = shaped.iter().map(|l| l.height).sum();

    let mut y = match anchor {
        TextAnchor::Absolute { y, .. } => y as f32,
        TextAnchor::Grid { row, .. } => match row {
            Align::Start => inset as f32,
            Align::Middle => (height as f32 - block_height) / 2.,
            Align::End => height as f32 - block_height - inset as f32,
        },
    };

    for line in &shaped {
        let x = match anchor {
            TextAnchor::Absolute { x, .. } => x as f32,
            TextAnchor::Grid { column, .. } => match column {
                Align::Start => inset as f32,
                Align::Middle => (width as f32 - line.width) / 2.,
                Align::End => width as f32 - line.width - inset as f32,
            },
        };
        let (ox, oy) = (x.round() as i32, y.round() as i32);

        for glyph in &line.glyphs {
            for gy in 0..glyph.height {
                for gx in 0..glyph.width {
                    let coverage = glyph.data[gy * glyph.width + gx];
                    if coverage > 0 {
                        mask.stamp(
                            ox + glyph.left + gx as i32,
                            oy + glyph.top + gy as i32,
                            coverage,
                        );
                    }
                }
            }
        }
        y += line.height;
    }
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_mapping() {
        assert_eq!(map_symbol("A"), "\u{F041}");
        assert_eq!(map_symbol("\u{F0FF}"), "\u{F0FF}");
        assert_eq!(map_symbol("a\nb"), "\u{F061}\n\u{F062}");
        assert_eq!(map_symbol("\u{FF}\u{100}\u{20AC}"), "\u{F0FF}\u{100}\u{20AC}");
    }

    #[test]
    fn test_font_table() {
        let table = FontTable::new()
            .with_font(
                5,
                FontFace {
                    family: "Webdings".into(),
                    symbol: true,
                    ..Default::default()
                },
            )
            .with_file(
                "arialbd.ttf",
                FontFace {
                    family: "Arial".into(),
                    weight: 700,
                    ..Default::default()
                },
            );
        assert!(table.resolve(&FontRef::Id(5)).symbol);
        assert_eq!(table.resolve(&FontRef::Id(99)).family, theme::DEFAULT_FONT_FAMILY);
        let face = table.resolve(&FontRef::File {
            file: "arialbd.ttf".into(),
            size: 18.,
        });
        assert_eq!((face.family.as_str(), face.weight, face.size), ("Arial", 700, 18.));
    }

    #[test]
    fn test_block_shaper_metrics() {
        let line = BlockShaper.shape_line("ab c", &FontFace::default(), 10.);
        assert_eq!(line.width, 20.);
        assert_eq!(line.height, 10.);
        assert_eq!(line.glyphs.len(), 3);
    }

    #[test]
    fn test_break_lines_newlines_and_wrap() {
        let face = FontFace::default();
        let mut shaper = BlockShaper;
        let lines = break_lines(&mut shaper, "one\ntwo", &face, 10., None);
        assert_eq!(lines, vec!["one", "two"]);

        // 5 px per character: "aaa bbb" is 35 px, "aaa" 15 px
        let lines = break_lines(&mut shaper, "aaa bbb ccc", &face, 10., Some(30.));
        assert_eq!(lines, vec!["aaa", "bbb", "ccc"]);
        let lines = break_lines(&mut shaper, "aaa bbb ccc", &face, 10., Some(40.));
        assert_eq!(lines, vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn test_lines_justified_independently() {
        let face = FontFace::default();
        let mut shaper = BlockShaper;
        let lines = vec!["aaaa".to_string(), "aa".to_string()];
        let anchor = TextAnchor::Grid {
            column: Align::End,
            row: Align::Start,
        };
        let mask = rasterize_lines(&mut shaper, &lines, &face, 10., (60, 40), 4, anchor).unwrap();
        // Both lines end at the right inset; the last glyph column is 54
        assert!(mask.get(54, 5) > 0);
        assert_eq!(mask.get(55, 5), 0);
        assert!(mask.get(54, 15) > 0);
        // Second line is shorter, so its left edge is further right
        assert!(mask.get(37, 5) > 0);
        assert_eq!(mask.get(37, 15), 0);
    }
}
