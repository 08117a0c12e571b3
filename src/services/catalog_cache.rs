use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::Pokemon;

/// Bounded least-recently-used cache of normalized catalog records.
///
/// Keys are lower-cased identifiers; a record is usually stored twice, under
/// the name it was requested by and under its numeric id.
pub struct CatalogCache {
    capacity: usize,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    tick: u64,
    entries: HashMap<String, Slot>,
}

struct Slot {
    value: Pokemon,
    last_used: u64,
}

impl CatalogCache {
    /// A capacity of zero disables caching
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn key(identifier: &str) -> String {
        identifier.trim().to_lowercase()
    }

    pub fn get(&self, identifier: &str) -> Option<Pokemon> {
        let mut inner = self.lock();
        inner.tick += 1;
        let tick = inner.tick;

        inner.entries.get_mut(&Self::key(identifier)).map(|slot| {
            slot.last_used = tick;
            slot.value.clone()
        })
    }

    pub fn insert(&self, identifier: &str, value: Pokemon) {
        if self.capacity == 0 {
            return;
        }

        let key = Self::key(identifier);
        let mut inner = self.lock();
        inner.tick += 1;
        let tick = inner.tick;

        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.capacity {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                inner.entries.remove(&oldest);
            }
        }

        inner.entries.insert(
            key,
            Slot {
                value,
                last_used: tick,
            },
        );
    }

    /// Drop a single key
    pub fn invalidate(&self, identifier: &str) -> bool {
        self.lock().entries.remove(&Self::key(identifier)).is_some()
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A poisoned lock only means another request panicked mid-update; the map
    // itself is still consistent.
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
