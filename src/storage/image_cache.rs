//! Shared decoded-image cache.
//!
//! Entries are indexed by (name, kind) and evicted oldest-first once the byte
//! budget is exceeded. Rasters are handed out as `Arc`s so an evicted image
//! stays alive for any render still using it.

use crate::lock;
use crate::ui::raster::Raster;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// What a cached raster is used for; the same file may be cached per use
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheKind {
    Bitmap,
    Chameleon,
    Icon,
    /// Assembled and coloured border frame
    Border,
    Slider,
    Cursor,
    /// Image fetched from a remote source
    Remote,
}

struct CacheEntry {
    /// Insertion stamp; an order record with another stamp is stale
    seq: u64,
    raster: Arc<Raster>,
}

#[derive(Default)]
struct CacheInner {
    index: HashMap<CacheKind, HashMap<String, CacheEntry>>,
    /// Eviction order, oldest first. Replaced and removed entries leave stale
    /// records behind that are skipped on eviction.
    order: VecDeque<(u64, CacheKind, String)>,
    entries: usize,
    bytes: usize,
    next_seq: u64,
}

impl CacheInner {
    fn lookup(&self, key: &str, kind: CacheKind) -> Option<&CacheEntry> {
        self.index.get(&kind).and_then(|entries| entries.get(key))
    }

    fn take(&mut self, key: &str, kind: CacheKind) -> Option<CacheEntry> {
        let old = self.index.get_mut(&kind)?.remove(key)?;
        self.entries -= 1;
        self.bytes -= old.raster.byte_size();
        Some(old)
    }

    fn is_current(&self, seq: u64, kind: CacheKind, key: &str) -> bool {
        self.lookup(key, kind).is_some_and(|e| e.seq == seq)
    }

    /// Drop stale order records once they outnumber live entries
    fn compact(&mut self) {
        if self.order.len() <= 2 * self.entries + 16 {
            return;
        }
        let order = std::mem::take(&mut self.order);
        self.order = order
            .into_iter()
            .filter(|(seq, kind, key)| self.is_current(*seq, *kind, key))
            .collect();
    }
}

pub struct ImageCache {
    inner: Mutex<CacheInner>,
    budget: usize,
}

impl ImageCache {
    pub fn new(budget: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            budget,
        }
    }

    pub fn exists(&self, key: &str, kind: CacheKind) -> bool {
        lock(&self.inner).lookup(key, kind).is_some()
    }

    pub fn get(&self, key: &str, kind: CacheKind) -> Option<Arc<Raster>> {
        lock(&self.inner)
            .lookup(key, kind)
            .map(|e| Arc::clone(&e.raster))
    }

    /// Insert or replace an entry, then evict the oldest entries over budget.
    /// The newest entry is always kept, even when it alone exceeds the budget.
    pub fn add(&self, key: &str, raster: Arc<Raster>, kind: CacheKind) {
        let mut inner = lock(&self.inner);
        inner.take(key, kind);

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.bytes += raster.byte_size();
        inner.entries += 1;
        inner
            .index
            .entry(kind)
            .or_default()
            .insert(key.to_string(), CacheEntry { seq, raster });
        inner.order.push_back((seq, kind, key.to_string()));

        while inner.bytes > self.budget && inner.entries > 1 {
            let Some((seq, kind, key)) = inner.order.pop_front() else {
                break;
            };
            if inner.is_current(seq, kind, &key) {
                log::debug!("Image cache: evicting {} ({:?})", key, kind);
                inner.take(&key, kind);
            }
        }
        inner.compact();
    }

    pub fn remove(&self, key: &str, kind: CacheKind) -> bool {
        lock(&self.inner).take(key, kind).is_some()
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).entries
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bytes(&self) -> usize {
        lock(&self.inner).bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(side: usize) -> Arc<Raster> {
        Arc::new(Raster::new(side, side).unwrap())
    }

    #[test]
    fn test_add_get_by_kind() {
        let cache = ImageCache::new(1 << 20);
        cache.add("logo.png", raster(4), CacheKind::Bitmap);
        assert!(cache.exists("logo.png", CacheKind::Bitmap));
        assert!(!cache.exists("logo.png", CacheKind::Icon));
        let r = cache.get("logo.png", CacheKind::Bitmap).unwrap();
        assert_eq!((r.width(), r.height()), (4, 4));
    }

    #[test]
    fn test_replace_keeps_byte_count() {
        let cache = ImageCache::new(1 << 20);
        cache.add("a", raster(4), CacheKind::Bitmap);
        cache.add("a", raster(8), CacheKind::Bitmap);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.bytes(), 8 * 8 * 4);
    }

    #[test]
    fn test_oldest_evicted_first() {
        // Room for two 8x8 rasters
        let cache = ImageCache::new(2 * 8 * 8 * 4);
        cache.add("a", raster(8), CacheKind::Bitmap);
        cache.add("b", raster(8), CacheKind::Bitmap);
        cache.add("c", raster(8), CacheKind::Bitmap);
        assert!(!cache.exists("a", CacheKind::Bitmap));
        assert!(cache.exists("b", CacheKind::Bitmap));
        assert!(cache.exists("c", CacheKind::Bitmap));
    }

    #[test]
    fn test_oversized_entry_kept() {
        let cache = ImageCache::new(16);
        cache.add("big", raster(32), CacheKind::Remote);
        assert!(cache.exists("big", CacheKind::Remote));
        assert!(cache.remove("big", CacheKind::Remote));
        assert_eq!(cache.bytes(), 0);
    }

    #[test]
    fn test_replaced_entry_evicted_by_newest_stamp() {
        let cache = ImageCache::new(2 * 8 * 8 * 4);
        cache.add("a", raster(8), CacheKind::Bitmap);
        cache.add("b", raster(8), CacheKind::Bitmap);
        // "a" is now the newest, so "b" goes first
        cache.add("a", raster(8), CacheKind::Bitmap);
        cache.add("c", raster(8), CacheKind::Bitmap);
        assert!(cache.exists("a", CacheKind::Bitmap));
        assert!(!cache.exists("b", CacheKind::Bitmap));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.bytes(), 2 * 8 * 8 * 4);
    }

    #[test]
    fn test_repeated_refresh_stays_bounded() {
        let cache = ImageCache::new(1 << 20);
        for _ in 0..500 {
            cache.add("http://cam/live.jpg", raster(2), CacheKind::Remote);
        }
        assert_eq!(cache.len(), 1);
        assert!(lock(&cache.inner).order.len() <= 18);
    }
}
