//! Instance setters.
//!
//! Each setter works on one instance or all of them, copies the instance table
//! on write so renders in flight keep their snapshot, and redraws when the
//! button is on screen.

use super::{Button, ButtonCore};
use crate::error::{ButtonError, Result};
use crate::types::{
    BitmapLayer, ButtonInstance, DrawOrder, FontRef, Gradient, IconRef, Justification, Marquee,
    TextEffect, MAX_BITMAP_LAYERS,
};
use std::sync::Arc;

/// Instances a setter applies to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstanceSel {
    All,
    One(usize),
}

impl From<usize> for InstanceSel {
    fn from(index: usize) -> Self {
        InstanceSel::One(index)
    }
}

impl ButtonCore {
    /// Apply `f` to the selected instances. Nothing changes when the index is
    /// out of range.
    pub(crate) fn update_instances<F>(&self, sel: InstanceSel, mut f: F) -> Result<()>
    where
        F: FnMut(&mut ButtonInstance),
    {
        if let InstanceSel::One(index) = sel {
            self.check_instance(index)?;
        }
        {
            let mut st = self.state();
            let instances = Arc::make_mut(&mut st.instances);
            match sel {
                InstanceSel::All => instances.iter_mut().for_each(&mut f),
                InstanceSel::One(index) => f(&mut instances[index]),
            }
            st.touch();
        }
        self.refresh_if_visible();
        Ok(())
    }
}

impl Button {
    fn update<F>(&self, sel: impl Into<InstanceSel>, f: F) -> Result<()>
    where
        F: FnMut(&mut ButtonInstance),
    {
        self.core.update_instances(sel.into(), f)
    }

    pub fn set_text(&self, sel: impl Into<InstanceSel>, text: &str) -> Result<()> {
        self.update(sel, |i| i.text = text.to_string())
    }

    pub fn set_fill_colour(&self, sel: impl Into<InstanceSel>, colour: u32) -> Result<()> {
        self.update(sel, |i| i.fill = colour)
    }

    pub fn set_border_colour(&self, sel: impl Into<InstanceSel>, colour: u32) -> Result<()> {
        self.update(sel, |i| i.border_colour = colour)
    }

    pub fn set_text_colour(&self, sel: impl Into<InstanceSel>, colour: u32) -> Result<()> {
        self.update(sel, |i| i.text_colour = colour)
    }

    /// Colour of the outline, glow or shadow around the text
    pub fn set_effect_colour(&self, sel: impl Into<InstanceSel>, colour: u32) -> Result<()> {
        self.update(sel, |i| i.effect_colour = colour)
    }

    /// Border by name; an empty name removes the border
    pub fn set_border_style(&self, sel: impl Into<InstanceSel>, style: &str) -> Result<()> {
        self.update(sel, |i| i.border_style = style.to_string())
    }

    /// Replace bitmap layer `layer`, or append it when `layer` is the next free slot
    pub fn set_bitmap(&self, sel: impl Into<InstanceSel>, layer: usize, bitmap: BitmapLayer) -> Result<()> {
        if layer >= MAX_BITMAP_LAYERS {
            return Err(ButtonError::InvalidDefinition(format!(
                "bitmap layer {} (max {})",
                layer, MAX_BITMAP_LAYERS
            )));
        }
        self.update(sel, |i| {
            if layer < i.bitmaps.len() {
                i.bitmaps[layer] = bitmap.clone();
            } else {
                i.bitmaps.push(bitmap.clone());
            }
        })
    }

    pub fn clear_bitmaps(&self, sel: impl Into<InstanceSel>) -> Result<()> {
        self.update(sel, |i| i.bitmaps.clear())
    }

    pub fn set_icon(&self, sel: impl Into<InstanceSel>, icon: Option<IconRef>) -> Result<()> {
        self.update(sel, |i| i.icon = icon)
    }

    pub fn set_font(&self, sel: impl Into<InstanceSel>, font: FontRef) -> Result<()> {
        self.update(sel, |i| i.font = font.clone())
    }

    pub fn set_text_justification(&self, sel: impl Into<InstanceSel>, justification: Justification) -> Result<()> {
        self.update(sel, |i| i.text_justification = justification)
    }

    pub fn set_word_wrap(&self, sel: impl Into<InstanceSel>, wrap: bool) -> Result<()> {
        self.update(sel, |i| i.word_wrap = wrap)
    }

    pub fn set_text_effect(&self, sel: impl Into<InstanceSel>, effect: TextEffect) -> Result<()> {
        self.update(sel, |i| i.effect = effect)
    }

    /// Instance opacity; the button-wide opacity still caps it
    pub fn set_opacity(&self, sel: impl Into<InstanceSel>, opacity: u8) -> Result<()> {
        self.update(sel, |i| i.opacity = Some(opacity))
    }

    pub fn set_marquee(&self, sel: impl Into<InstanceSel>, marquee: Option<Marquee>) -> Result<()> {
        self.update(sel, |i| i.marquee = marquee)
    }

    /// Chameleon mask name, `None` turns chameleon rendering off
    pub fn set_chameleon(&self, sel: impl Into<InstanceSel>, mask: Option<&str>) -> Result<()> {
        self.update(sel, |i| i.chameleon = mask.map(str::to_string))
    }

    pub fn set_gradient(&self, sel: impl Into<InstanceSel>, gradient: Option<Gradient>) -> Result<()> {
        self.update(sel, |i| i.gradient = gradient.clone())
    }

    /// Draw order from its textual form, e.g. "0102030405"
    pub fn set_draw_order(&self, sel: impl Into<InstanceSel>, order: &str) -> Result<()> {
        let order = DrawOrder::parse(order)?;
        self.update(sel, |i| i.draw_order = Some(order.clone()))
    }

    /// Opacity applied to every instance
    pub fn set_global_opacity(&self, opacity: u8) {
        {
            let mut st = self.core.state();
            if st.global_opacity == opacity {
                return;
            }
            st.global_opacity = opacity;
            st.touch();
        }
        self.core.refresh_if_visible();
    }
}
