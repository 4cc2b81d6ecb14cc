//! Layered compositing of a button instance into a raster.
//!
//! Elements are drawn in draw-order onto a transparent, button-sized raster:
//! fill, bitmaps (or chameleon), icon, text and border. A missing asset
//! degrades its own element only; a missing chameleon mask fails the render.

use super::bargraph::{self, Axis};
use super::border::{border_insets, draw_border, AssetAccess, BorderInsets};
use super::chameleon::colourize;
use super::drawing::{fill_gradient, fill_solid};
use super::effects;
use super::position::place;
use super::raster::Raster;
use super::text_rasterizing::{
    break_lines, map_symbol, rasterize_lines, FontResolver, TextAnchor, TextShaper,
};
use crate::config::EngineConfig;
use crate::error::{ButtonError, Result};
use crate::lock;
use crate::storage::{CacheKind, LineState};
use crate::types::{
    Align, BitmapSource, ButtonGeometry, ButtonInstance, Direction, DrawElement, DrawOrder,
    Justification, RemoteSource,
};
use std::sync::{Arc, Mutex};

/// Everything a render reads besides the instance itself
pub struct RenderContext<'a> {
    pub geometry: &'a ButtonGeometry,
    pub assets: AssetAccess<'a>,
    pub fonts: &'a dyn FontResolver,
    pub shaper: &'a Mutex<Box<dyn TextShaper>>,
    pub config: &'a EngineConfig,
}

/// Remote bitmap layer that has no fetched image yet
#[derive(Clone, Debug, PartialEq)]
pub struct PendingLayer {
    pub layer: usize,
    pub source: RemoteSource,
}

/// Result of compositing one instance
#[derive(Debug)]
pub struct Composed {
    pub raster: Raster,
    /// Text drawn into the raster (empty when the text layer was skipped)
    pub text: String,
    pub pending: Vec<PendingLayer>,
}

/// Pass degradable errors (missing or broken assets) through as warnings
fn degrade(ctx: &RenderContext, what: &str, result: Result<()>) -> Result<()> {
    match result {
        Err(e) if e.is_degradable() => {
            log::warn!("Button {}: {} skipped: {}", ctx.geometry.handle, what, e);
            Ok(())
        }
        other => other,
    }
}

fn size_of(ctx: &RenderContext) -> (usize, usize) {
    (ctx.geometry.rect.width, ctx.geometry.rect.height)
}

/// Draw order of an instance: its own descriptor, or the default for the button type
pub fn draw_order_for(geometry: &ButtonGeometry, instance: &ButtonInstance) -> DrawOrder {
    instance.draw_order.clone().unwrap_or_else(|| {
        if geometry.kind.is_level_driven() {
            DrawOrder::legacy()
        } else {
            DrawOrder::five_element()
        }
    })
}

fn draw_fill(raster: &mut Raster, instance: &ButtonInstance) -> Result<()> {
    match &instance.gradient {
        Some(gradient) => fill_gradient(raster, gradient),
        None => fill_solid(raster, instance.fill),
    }
}

/// Load a bitmap layer's image; remote images come from the cache once fetched
fn layer_image(
    ctx: &RenderContext,
    source: &BitmapSource,
    layer: usize,
    pending: &mut Vec<PendingLayer>,
) -> Result<Option<Arc<Raster>>> {
    match source {
        BitmapSource::File(name) => ctx.assets.image(name, CacheKind::Bitmap).map(Some),
        BitmapSource::Remote(remote) => {
            let cached = ctx.assets.cache.get(&remote.url, CacheKind::Remote);
            if cached.is_none() {
                pending.push(PendingLayer {
                    layer,
                    source: remote.clone(),
                });
            }
            Ok(cached)
        }
    }
}

/// Place `image` by `justification` and composite it
fn draw_placed(raster: &mut Raster, image: &Raster, justification: Justification, insets: BorderInsets) -> Result<()> {
    let (w, h) = (raster.width(), raster.height());
    let inset = insets.max();
    let placement = place((w, h), (image.width(), image.height()), inset, justification);

    if placement.scaled {
        let scaled = image.stretched(placement.width, placement.height)?;
        raster.draw_over(&scaled, placement.left, placement.top);
    } else if justification.is_scaled() {
        raster.draw_over(image, placement.left, placement.top);
    } else {
        // Kept-size layers only show the part inside the border
        raster.draw_over_clipped(image, placement.left, placement.top, insets.interior(w, h));
    }
    Ok(())
}

fn draw_chameleon(
    ctx: &RenderContext,
    raster: &mut Raster,
    instance: &ButtonInstance,
    mask_name: &str,
    fill: u32,
    border: u32,
    pending: &mut Vec<PendingLayer>,
) -> Result<()> {
    // The mask is essential: without it the button has no body at all
    let mask = ctx.assets.image(mask_name, CacheKind::Chameleon)?;

    let mut overlay = None;
    let mut justification = Justification::CentreMiddle;
    if let Some(first) = instance.bitmaps.first() {
        justification = first.justification;
        match layer_image(ctx, &first.source, 0, pending) {
            Ok(image) => overlay = image,
            Err(e) if e.is_degradable() => {
                log::warn!("Button {}: chameleon overlay skipped: {}", ctx.geometry.handle, e)
            }
            Err(e) => return Err(e),
        }
    }

    let coloured = colourize(&mask, overlay.as_deref(), fill, border)?;
    draw_placed(raster, &coloured, justification, BorderInsets::default())
}

fn draw_bitmaps(
    ctx: &RenderContext,
    raster: &mut Raster,
    instance: &ButtonInstance,
    insets: BorderInsets,
    pending: &mut Vec<PendingLayer>,
) -> Result<()> {
    if let (true, Some(mask)) = (instance.uses_chameleon(), &instance.chameleon) {
        return draw_chameleon(
            ctx,
            raster,
            instance,
            mask,
            instance.fill,
            instance.border_colour,
            pending,
        );
    }

    for (layer, bitmap) in instance.bitmaps.iter().enumerate() {
        let drawn = layer_image(ctx, &bitmap.source, layer, pending).and_then(|image| match image {
            Some(image) => draw_placed(raster, &image, bitmap.justification, insets),
            None => Ok(()),
        });
        degrade(ctx, &format!("bitmap layer {}", layer), drawn)?;
    }
    Ok(())
}

fn draw_icon(ctx: &RenderContext, raster: &mut Raster, instance: &ButtonInstance) -> Result<()> {
    let Some(icon) = instance.icon else {
        return Ok(());
    };
    let file = ctx
        .assets
        .catalogue
        .icon(icon.index)
        .ok_or_else(|| ButtonError::AssetMissing(format!("icon {}", icon.index)))?;
    let image = ctx.assets.image(&file, CacheKind::Icon)?;
    // Icons ignore the border; anything past the edges is clipped
    draw_placed(raster, &image, icon.justification, BorderInsets::default())
}

fn text_anchor(justification: Justification) -> TextAnchor {
    match justification {
        Justification::Absolute { x, y } => TextAnchor::Absolute { x, y },
        j if j.is_scaled() => TextAnchor::Grid {
            column: Align::Middle,
            row: Align::Middle,
        },
        j => TextAnchor::Grid {
            column: j.column(),
            row: j.row(),
        },
    }
}

/// Lay out, shape and draw the instance text with its effect.
/// Returns the text that was drawn.
fn draw_text(
    ctx: &RenderContext,
    raster: &mut Raster,
    instance: &ButtonInstance,
    insets: BorderInsets,
) -> Result<String> {
    if instance.text.is_empty() || instance.is_marquee_line() {
        return Ok(String::new());
    }

    let face = ctx.fonts.resolve(&instance.font);
    let pixel_size = face.size * ctx.config.font_scale;
    let text = if face.symbol {
        map_symbol(&instance.text)
    } else {
        instance.text.clone()
    };
    let inset = insets.max() + ctx.config.text_padding;
    let (w, h) = (raster.width(), raster.height());
    let wrap_width = instance
        .word_wrap
        .then(|| w.saturating_sub(inset * 2) as f32);

    let mask = {
        let mut shaper = lock(ctx.shaper);
        let lines = break_lines(shaper.as_mut(), &text, &face, pixel_size, wrap_width);
        rasterize_lines(
            shaper.as_mut(),
            &lines,
            &face,
            pixel_size,
            (w, h),
            inset,
            text_anchor(instance.text_justification),
        )?
    };

    effects::draw_under(raster, &mask, instance.effect, instance.effect_colour);
    mask.paint(raster, instance.text_colour);
    Ok(instance.text.clone())
}

fn draw_instance_border(
    ctx: &RenderContext,
    raster: &mut Raster,
    instance: &ButtonInstance,
    state: LineState,
) -> Result<()> {
    if !instance.has_border() {
        return Ok(());
    }
    let drawn = draw_border(
        &ctx.assets,
        raster,
        &instance.border_style,
        instance.border_colour,
        state,
    );
    degrade(ctx, "border", drawn)
}

/// Overall opacity: the lower of the global and the instance opacity
pub fn effective_opacity(global: u8, instance: Option<u8>) -> u8 {
    instance.map_or(global, |o| o.min(global))
}

/// Composite one instance of a button
///
/// # Arguments
/// * `ctx` - Geometry and services
/// * `instance` - The visual state to draw
/// * `global_opacity` - Button-wide opacity, combined with the instance's own
pub fn render_instance(ctx: &RenderContext, instance: &ButtonInstance, global_opacity: u8) -> Result<Composed> {
    let (w, h) = size_of(ctx);
    let mut raster = Raster::new(w, h)?;
    let state = LineState::for_instance(instance.index);
    let insets = border_insets(&ctx.assets, &instance.border_style, instance.border_colour, state);
    let mut pending = Vec::new();
    let mut text = String::new();

    for element in draw_order_for(ctx.geometry, instance).elements() {
        crate::render_trace!("{} instance {}: {:?}", ctx.geometry.handle, instance.index, element);
        match element {
            DrawElement::Fill => draw_fill(&mut raster, instance)?,
            DrawElement::Bitmap => draw_bitmaps(ctx, &mut raster, instance, insets, &mut pending)?,
            DrawElement::Icon => {
                let drawn = draw_icon(ctx, &mut raster, instance);
                degrade(ctx, "icon", drawn)?
            }
            DrawElement::Text => text = draw_text(ctx, &mut raster, instance, insets)?,
            DrawElement::Border => draw_instance_border(ctx, &mut raster, instance, state)?,
        }
    }

    raster.scale_opacity(effective_opacity(global_opacity, instance.opacity));
    Ok(Composed {
        raster,
        text,
        pending,
    })
}

/// Button-sized image of an instance's first bitmap layer, or its solid fill
fn bar_image(
    ctx: &RenderContext,
    instance: &ButtonInstance,
    layer_fill: u32,
    chameleon: Option<(&str, u32, u32)>,
    insets: BorderInsets,
    pending: &mut Vec<PendingLayer>,
) -> Result<Raster> {
    let (w, h) = size_of(ctx);
    let mut image = Raster::new(w, h)?;

    if let Some((mask, fill, border)) = chameleon {
        draw_chameleon(ctx, &mut image, instance, mask, fill, border, pending)?;
        return Ok(image);
    }
    match instance.bitmaps.first() {
        Some(bitmap) => {
            let drawn = layer_image(ctx, &bitmap.source, 0, pending).and_then(|img| match img {
                Some(img) => draw_placed(&mut image, &img, bitmap.justification, insets),
                None => Ok(()),
            });
            degrade(ctx, "bargraph image", drawn)?;
        }
        None => fill_solid(&mut image, layer_fill)?,
    }
    Ok(image)
}

/// Composite a two-state bargraph at `level`.
///
/// Fill and border come from the "empty" instance 0; bitmap, icon and text
/// from the "full" instance 1.
pub fn render_bargraph(
    ctx: &RenderContext,
    empty: &ButtonInstance,
    full: &ButtonInstance,
    level: i32,
    global_opacity: u8,
) -> Result<Composed> {
    let geometry = ctx.geometry;
    let (w, h) = size_of(ctx);
    let state = LineState::Off;
    let insets = border_insets(&ctx.assets, &empty.border_style, empty.border_colour, state);
    let axis = Axis::new(geometry.direction, geometry.inverted);
    let mut raster = Raster::new(w, h)?;
    let mut pending = Vec::new();
    let mut text = String::new();

    for element in draw_order_for(geometry, full).elements() {
        crate::render_trace!("{} bargraph level {}: {:?}", geometry.handle, level, element);
        match element {
            DrawElement::Fill => draw_fill(&mut raster, empty)?,
            DrawElement::Bitmap => {
                let chameleon_empty = empty
                    .uses_chameleon()
                    .then_some(empty.chameleon.as_deref())
                    .flatten();
                let mut bar = bar_image(
                    ctx,
                    empty,
                    empty.fill,
                    chameleon_empty.map(|m| (m, empty.fill, empty.border_colour)),
                    insets,
                    &mut pending,
                )?;
                // The chameleon mask of "empty" is reused in the colours of "full"
                let (full_source, full_chameleon) = match chameleon_empty {
                    Some(mask) => (empty, Some((mask, full.fill, full.border_colour))),
                    None => (full, None),
                };
                let full_image = bar_image(ctx, full_source, full.fill, full_chameleon, insets, &mut pending)?;

                let extent = match geometry.direction {
                    Direction::Vertical => h,
                    Direction::Horizontal => w,
                };
                let span = bargraph::reveal_span(level, &geometry.range, extent);
                bargraph::reveal(&mut bar, &full_image, bargraph::reveal_rect(span, (w, h), axis))?;
                raster.draw_over(&bar, 0, 0);

                if let Some(slider) = &geometry.slider {
                    let boundary = bargraph::slider_boundary(level, &geometry.range, (w, h), insets, axis);
                    let drawn = bargraph::draw_slider(&ctx.assets, &mut raster, slider, axis, boundary, insets);
                    degrade(ctx, "slider", drawn)?;
                }
            }
            DrawElement::Icon => {
                let drawn = draw_icon(ctx, &mut raster, full);
                degrade(ctx, "icon", drawn)?
            }
            DrawElement::Text => text = draw_text(ctx, &mut raster, full, insets)?,
            DrawElement::Border => draw_instance_border(ctx, &mut raster, empty, state)?,
        }
    }

    raster.scale_opacity(effective_opacity(global_opacity, empty.opacity));
    Ok(Composed {
        raster,
        text,
        pending,
    })
}

/// Composite a joystick: the instance, then the cursor at (x, y)
pub fn render_joystick(
    ctx: &RenderContext,
    instance: &ButtonInstance,
    x: i32,
    y: i32,
    global_opacity: u8,
) -> Result<Composed> {
    let geometry = ctx.geometry;
    let mut composed = render_instance(ctx, instance, 255)?;
    let centre = bargraph::cursor_centre(
        x,
        y,
        &geometry.range,
        size_of(ctx),
        geometry.aux_inverted,
    );
    let drawn = bargraph::draw_cursor(
        &ctx.assets,
        &mut composed.raster,
        geometry.cursor.as_ref(),
        centre,
    );
    degrade(ctx, "cursor", drawn)?;
    composed
        .raster
        .scale_opacity(effective_opacity(global_opacity, instance.opacity));
    Ok(composed)
}
