//! Error types for catalog loading and stat resolution.
//!
//! `CatalogError` is returned by eager validation when records are loaded;
//! `LineageError` is returned by resolution against a loaded catalog.

use crate::card_id::CardId;
use crate::config::ConfigError;
use crate::lineage::EdgeKind;
use crate::strategy::Strategy;
use thiserror::Error;

/// Format a cycle path as a readable string.
fn format_cycle_path(path: &[CardId]) -> String {
    if path.is_empty() {
        return String::from("(empty cycle)");
    }
    path.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn format_kinds(kinds: &[EdgeKind]) -> String {
    kinds
        .iter()
        .map(|kind| kind.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that can occur while resolving a card's stats.
///
/// # Examples
///
/// ```rust
/// use evostat::{CardId, LineageError};
///
/// let err = LineageError::DanglingReference(CardId::new(42));
/// assert_eq!(err.to_string(), "Dangling reference: card 42 is not in the catalog");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LineageError {
    /// A lineage edge (or the caller) names a card that is not loaded.
    #[error("Dangling reference: card {0} is not in the catalog")]
    DanglingReference(CardId),

    /// The predecessor chain revisits a card.
    ///
    /// If A evolves from B and B evolves from A, resolving A reports
    /// `[A, B, A]`.
    #[error("Cyclic lineage: {}", format_cycle_path(.path))]
    CyclicLineage { path: Vec<CardId> },

    /// The strategy has no transformation for this card's lineage, e.g. a
    /// nine-card evolution on a line that never reaches rank 3.
    #[error("Strategy {strategy} cannot resolve card {card}: {reason}")]
    UnresolvedStrategy {
        card: CardId,
        strategy: Strategy,
        reason: String,
    },
}

/// Errors found while loading and validating catalog records.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    /// Two card records share an ID.
    #[error("Duplicate card id: {0}")]
    DuplicateCard(CardId),

    /// Two rarity records share an ID.
    #[error("Duplicate rarity id: {0}")]
    DuplicateRarity(u32),

    /// A record references a card that does not exist.
    #[error("Dangling {relation} reference from {owner}: card {target} is not in the catalog")]
    DanglingReference {
        relation: &'static str,
        owner: u32,
        target: CardId,
    },

    /// A card references a rarity that does not exist.
    #[error("Card {card} references unknown rarity {rarity}")]
    UnknownRarity { card: CardId, rarity: u32 },

    /// A recipe record is malformed.
    #[error("Invalid {kind} recipe {id}: {reason}")]
    InvalidRecipe {
        kind: EdgeKind,
        id: u32,
        reason: String,
    },

    /// A card is the target of more than one edge of the same kind.
    #[error("Card {card} is the result of more than one {kind}")]
    DuplicateEdge { kind: EdgeKind, card: CardId },

    /// More than one predecessor edge kind applies to a card.
    #[error("Card {card} has ambiguous lineage: {}", format_kinds(.kinds))]
    AmbiguousLineage { card: CardId, kinds: Vec<EdgeKind> },

    /// A card record violates a card invariant.
    #[error("Invalid card {card}: {reason}")]
    InvalidCard { card: CardId, reason: String },

    /// Rarity ceilings decrease along the rarity ordering.
    #[error("Rarity ceiling of {higher} is below {lower}")]
    RarityOrdering { lower: String, higher: String },

    /// The evolution constants handed to the loader are unusable.
    #[error("Invalid evolution constants: {0}")]
    InvalidConstants(String),

    /// The record document could not be parsed.
    #[error("Failed to parse catalog records: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Parse(err.to_string())
    }
}

impl From<ConfigError> for CatalogError {
    fn from(err: ConfigError) -> Self {
        CatalogError::InvalidConstants(err.to_string())
    }
}
