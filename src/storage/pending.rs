//! Staging records for remote images being fetched out-of-band.

use crate::lock;
use crate::types::{ButtonHandle, Rect};
use crate::ui::raster::Raster;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug)]
pub struct PendingRemoteImage {
    pub handle: ButtonHandle,
    pub layer: usize,
    pub url: String,
    /// Button area the final image is delivered to
    pub target: Rect,
    /// Raster rendered without the remote layer, shown until the fetch lands
    pub partial: Arc<Raster>,
    pub ready: bool,
    pub valid: bool,
}

#[derive(Default)]
pub struct PendingImages {
    records: Mutex<Vec<PendingRemoteImage>>,
}

impl PendingImages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a record, replacing any earlier one for the same (button, layer)
    pub fn stage(&self, record: PendingRemoteImage) {
        let mut records = lock(&self.records);
        records.retain(|r| !(r.handle == record.handle && r.layer == record.layer));
        records.push(record);
    }

    pub fn contains(&self, handle: ButtonHandle, layer: usize) -> bool {
        lock(&self.records)
            .iter()
            .any(|r| r.handle == handle && r.layer == layer)
    }

    // Records are matched on the URL too: a fetch for a source the layer
    // no longer shows must leave the newer record alone.

    pub fn mark_ready(&self, handle: ButtonHandle, layer: usize, url: &str) {
        self.update(handle, layer, url, |r| r.ready = true);
    }

    pub fn mark_invalid(&self, handle: ButtonHandle, layer: usize, url: &str) {
        self.update(handle, layer, url, |r| r.valid = false);
    }

    fn update(&self, handle: ButtonHandle, layer: usize, url: &str, f: impl FnOnce(&mut PendingRemoteImage)) {
        if let Some(record) = lock(&self.records)
            .iter_mut()
            .find(|r| r.handle == handle && r.layer == layer && r.url == url)
        {
            f(record);
        }
    }

    /// Remove and return the record for (button, layer) staged for `url`
    pub fn take(&self, handle: ButtonHandle, layer: usize, url: &str) -> Option<PendingRemoteImage> {
        let mut records = lock(&self.records);
        let pos = records
            .iter()
            .position(|r| r.handle == handle && r.layer == layer && r.url == url)?;
        Some(records.remove(pos))
    }

    /// Drop every record marked invalid; returns how many were dropped
    pub fn discard_invalid(&self) -> usize {
        let mut records = lock(&self.records);
        let before = records.len();
        records.retain(|r| r.valid);
        before - records.len()
    }

    /// Drop all records of a button (teardown)
    pub fn remove_button(&self, handle: ButtonHandle) {
        lock(&self.records).retain(|r| r.handle != handle);
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
