//! Declarative button definition, checked before a button is built.

use crate::error::{ButtonError, Result};
use crate::types::{ButtonGeometry, ButtonInstance, ButtonType, MAX_BITMAP_LAYERS};

#[derive(Clone, Debug)]
pub struct ButtonDefinition {
    pub geometry: ButtonGeometry,
    pub instances: Vec<ButtonInstance>,
}

impl ButtonDefinition {
    pub fn new(geometry: ButtonGeometry, instances: Vec<ButtonInstance>) -> Self {
        Self {
            geometry,
            instances,
        }
    }

    /// `count` default instances, numbered 0..count
    pub fn with_instances(geometry: ButtonGeometry, count: usize) -> Self {
        Self::new(geometry, (0..count).map(ButtonInstance::new).collect())
    }

    pub fn validate(&self) -> Result<()> {
        let g = &self.geometry;
        let invalid = |msg: String| Err(ButtonError::InvalidDefinition(format!("{} ({})", msg, g.handle)));

        if self.instances.is_empty() {
            return invalid("button has no instances".into());
        }
        if g.rect.is_empty() {
            return invalid(format!("empty size {}x{}", g.rect.width, g.rect.height));
        }
        if matches!(g.kind, ButtonType::Bargraph | ButtonType::MultistateBargraph)
            && self.instances.len() < 2
        {
            return invalid(format!(
                "bargraph needs at least 2 instances, has {}",
                self.instances.len()
            ));
        }
        if g.kind.is_level_driven() && g.range.low >= g.range.high {
            return invalid(format!("level range {}..{} is empty", g.range.low, g.range.high));
        }
        if !(0..=4).contains(&g.password_level) {
            return invalid(format!("password level {}", g.password_level));
        }
        for (i, instance) in self.instances.iter().enumerate() {
            if instance.bitmaps.len() > MAX_BITMAP_LAYERS {
                return invalid(format!(
                    "instance {} has {} bitmap layers (max {})",
                    i,
                    instance.bitmaps.len(),
                    MAX_BITMAP_LAYERS
                ));
            }
        }
        Ok(())
    }
}
