//! Result cache module.
//!
//! Memoizes resolved triples per `(card, strategy, level)` for one catalog
//! generation. The cache lives inside its catalog, so a reload starts
//! from an empty one.

use crate::card_id::CardId;
use crate::stats::{Level, StatTriple};
use crate::strategy::Strategy;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Key of one memoized resolution.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct CacheKey {
    pub card: CardId,
    pub strategy: Strategy,
    pub level: Level,
}

impl CacheKey {
    pub fn new(card: CardId, strategy: Strategy, level: Level) -> Self {
        Self {
            card,
            strategy,
            level,
        }
    }
}

/// Thread-safe memo of resolved triples.
///
/// Concurrent misses on the same key may both compute and insert; values
/// are deterministic, so the last writer wins harmlessly.
///
/// Only resolution writes entries; callers can read and clear the memo.
///
/// ```compile_fail
/// use evostat::record::CatalogRecords;
/// use evostat::{CacheKey, CardId, Catalog, Level, StatTriple, Strategy};
///
/// let catalog = Catalog::load(CatalogRecords::default()).unwrap();
/// let key = CacheKey::new(CardId::new(1), Strategy::Standard, Level::Max);
/// catalog.cache().insert(key, StatTriple::new(1, 1, 1));
/// ```
#[derive(Debug, Default)]
pub struct ResultCache {
    generation: u64,
    entries: RwLock<HashMap<CacheKey, StatTriple>>,
}

impl ResultCache {
    pub(crate) fn new(generation: u64) -> Self {
        Self {
            generation,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Generation of the catalog owning this cache.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, key: &CacheKey) -> Option<StatTriple> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
    }

    pub(crate) fn insert(&self, key: CacheKey, stats: StatTriple) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, stats);
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
