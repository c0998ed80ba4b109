//! # evostat - Card Lineage Stat Engine
//!
//! Computes the attack, defense and soldier count of a card anywhere along
//! its lineage from the stored base values of every card and the recipes
//! linking them:
//! - **Sequential evolution** of a card into the next stage of its line
//! - **Amalgamation** of several materials into a new card
//! - **Awakening** and **rebirth** of a card into a stronger form
//! - **Turnover accidents**, the alternate outcome of an evolution
//!
//! ## Core Concepts
//!
//! ### Resolution
//!
//! ```text
//! [CatalogRecords] → [Catalog] → resolve(card, Strategy, Level) → [StatTriple]
//! ```
//!
//! 1. **Records** are decoded master data tables
//! 2. **Catalog** validates them once and builds the lineage indices
//! 3. **Resolution** walks the predecessor edges recursively, applying the
//!    evolution arithmetic of each edge and the rarity cap at every step
//!
//! A [`Strategy`] states how thoroughly the materials feeding a card were
//! evolved; resolving a card under every strategy gives the realistic
//! range of its stats.
//!
//! ### Key Features
//!
//! - **Deterministic**: integer arithmetic truncated after every multiplication
//! - **Validated loads**: dangling references and ambiguous lineage are
//!   rejected up front
//! - **Cycle safety**: cyclic lineage is reported, never looped on
//! - **Caching**: results are memoized per catalog generation
//! - **Reloadable**: [`StatEngine`] swaps catalogs atomically
//!
//! ## Example
//!
//! ```rust
//! use evostat::record::{AmalgamationRecord, CardRecord, CatalogRecords, RarityRecord};
//! use evostat::{CardId, Catalog, Level, Strategy};
//!
//! let records = CatalogRecords {
//!     cards: vec![
//!         CardRecord::new(1, 1, 1).max_stats(400, 400, 400),
//!         CardRecord::new(2, 2, 1).max_stats(420, 420, 420),
//!         CardRecord::new(3, 3, 1).max_stats(450, 450, 450),
//!         CardRecord::new(4, 4, 1).max_stats(1000, 1000, 1000),
//!     ],
//!     amalgamations: vec![AmalgamationRecord::new(1, &[1, 2, 3], 4)],
//!     rarities: vec![RarityRecord::new(1, "ur", 9999, 9999, 9999)],
//!     ..Default::default()
//! };
//! let catalog = Catalog::load(records).unwrap();
//!
//! let stats = catalog.resolve(CardId::new(4), Strategy::Perfect, Level::Max).unwrap();
//! // 1000 + trunc(0.08 * 400) + trunc(0.08 * 420) + trunc(0.08 * 450)
//! assert_eq!(stats.attack, 1101);
//! ```
//!
//! ## Modules
//!
//! - [`card_id`] - Card identifier type
//! - [`stats`] - Stat triple and level
//! - [`rarity`] - Rarity tiers and the rarity cap
//! - [`record`] - Input records
//! - [`catalog`] - Validated card tables
//! - [`lineage`] - Predecessor edges and evolution lines
//! - [`graph`] - Lineage graph
//! - [`strategy`] - Evolution strategies
//! - [`cache`] - Result cache
//! - [`engine`] - Reloadable engine and stat sheets
//! - [`config`] - Evolution constants
//! - [`error`] - Error types

pub mod cache;
pub mod card_id;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod lineage;
pub mod rarity;
pub mod record;
mod resolver;
pub mod stats;
pub mod strategy;

// Re-export main types for convenience
pub use cache::{CacheKey, ResultCache};
pub use card_id::CardId;
pub use catalog::{Amalgamation, Awakening, Card, Catalog, Rebirth};
pub use config::{ConfigError, EvolutionConstants};
pub use engine::{SheetRow, StatEngine, StatSheet};
pub use error::{CatalogError, LineageError};
pub use lineage::{EdgeKind, EvolutionLine, PredecessorEdge, SuccessorEdge};
pub use rarity::{cap, RarityCode, RarityTier};
pub use stats::{Level, StatTriple};
pub use strategy::Strategy;
