//! Stat engine module.
//!
//! Provides `StatEngine`, a reloadable handle around the current catalog,
//! and the `StatSheet` rows a card page is rendered from.

use crate::card_id::CardId;
use crate::catalog::Catalog;
use crate::config::EvolutionConstants;
use crate::error::{CatalogError, LineageError};
use crate::lineage::PredecessorEdge;
use crate::record::CatalogRecords;
use crate::stats::{Level, StatTriple};
use crate::strategy::Strategy;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// Reloadable access to the current catalog.
///
/// Readers take an `Arc` snapshot; a reload builds and validates the new
/// catalog first and then swaps it in, so in-flight resolutions finish on
/// the catalog they started with.
///
/// # Examples
///
/// ```rust
/// use evostat::record::{CardRecord, CatalogRecords, RarityRecord};
/// use evostat::{CardId, EvolutionConstants, Level, StatEngine, Strategy};
///
/// let records = CatalogRecords {
///     cards: vec![CardRecord::new(1, 1, 1).max_stats(120, 80, 400)],
///     rarities: vec![RarityRecord::new(1, "r", 1000, 1000, 1000)],
///     ..Default::default()
/// };
/// let engine = StatEngine::load(records.clone(), EvolutionConstants::default()).unwrap();
/// let before = engine.catalog().generation();
///
/// engine.reload(records).unwrap();
/// assert!(engine.catalog().generation() > before);
///
/// let stats = engine.resolve_or_placeholder(CardId::new(1), Strategy::Standard, Level::Max);
/// assert_eq!(stats.map(|s| s.attack), Some(120));
/// assert_eq!(engine.resolve_or_placeholder(CardId::new(2), Strategy::Standard, Level::Max), None);
/// ```
#[derive(Debug)]
pub struct StatEngine {
    catalog: RwLock<Arc<Catalog>>,
}

impl StatEngine {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: RwLock::new(Arc::new(catalog)),
        }
    }

    /// Load a catalog and wrap it.
    pub fn load(
        records: CatalogRecords,
        constants: EvolutionConstants,
    ) -> Result<Self, CatalogError> {
        Ok(Self::new(Catalog::load_with(records, constants)?))
    }

    /// Snapshot of the current catalog.
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replace the catalog, keeping the current evolution constants.
    ///
    /// Returns the new generation. On error the current catalog stays.
    pub fn reload(&self, records: CatalogRecords) -> Result<u64, CatalogError> {
        let constants = self.catalog().constants().clone();
        self.reload_with(records, constants)
    }

    /// Replace the catalog and the evolution constants.
    pub fn reload_with(
        &self,
        records: CatalogRecords,
        constants: EvolutionConstants,
    ) -> Result<u64, CatalogError> {
        let catalog = match Catalog::load_with(records, constants) {
            Ok(catalog) => catalog,
            Err(err) => {
                log::warn!("reload rejected, keeping current catalog: {}", err);
                return Err(err);
            }
        };
        let generation = catalog.generation();
        let previous = std::mem::replace(
            &mut *self.catalog.write().unwrap_or_else(PoisonError::into_inner),
            Arc::new(catalog),
        );
        log::info!(
            "catalog generation {} replaced by {}",
            previous.generation(),
            generation
        );
        Ok(generation)
    }

    pub fn resolve(
        &self,
        card: CardId,
        strategy: Strategy,
        level: Level,
    ) -> Result<StatTriple, LineageError> {
        self.catalog().resolve(card, strategy, level)
    }

    pub fn predecessor_of(&self, card: CardId) -> Result<PredecessorEdge, LineageError> {
        self.catalog().predecessor_of(card).cloned()
    }

    /// Resolve, degrading any failure to `None` and a warning.
    pub fn resolve_or_placeholder(
        &self,
        card: CardId,
        strategy: Strategy,
        level: Level,
    ) -> Option<StatTriple> {
        placeholder(&self.catalog(), card, strategy, level)
    }

    /// Every applicable strategy of `card` at both levels, resolved
    /// against one catalog snapshot.
    pub fn stat_sheet(&self, card: CardId) -> Result<StatSheet, LineageError> {
        let catalog = self.catalog();
        let rows = catalog
            .applicable_strategies(card)?
            .into_iter()
            .map(|strategy| SheetRow {
                strategy,
                base: placeholder(&catalog, card, strategy, Level::Base),
                max: placeholder(&catalog, card, strategy, Level::Max),
            })
            .collect();
        Ok(StatSheet {
            card,
            generation: catalog.generation(),
            rows,
        })
    }
}

fn placeholder(
    catalog: &Catalog,
    card: CardId,
    strategy: Strategy,
    level: Level,
) -> Option<StatTriple> {
    match catalog.resolve(card, strategy, level) {
        Ok(stats) => Some(stats),
        Err(err) => {
            log::warn!(
                "no {} stats for card {} under {}: {}",
                level,
                card,
                strategy,
                err
            );
            None
        }
    }
}

/// Resolved stats of one card under every applicable strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSheet {
    pub card: CardId,
    /// Catalog generation the rows were resolved against.
    pub generation: u64,
    pub rows: Vec<SheetRow>,
}

impl StatSheet {
    pub fn row(&self, strategy: Strategy) -> Option<&SheetRow> {
        self.rows.iter().find(|row| row.strategy == strategy)
    }
}

/// One strategy row; `None` marks a value that could not be resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetRow {
    pub strategy: Strategy,
    pub base: Option<StatTriple>,
    pub max: Option<StatTriple>,
}
