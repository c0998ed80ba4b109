//! Stat resolver module.
//!
//! Provides the `StatResolver` type, the recursive walk that turns a card's
//! lineage into a stat triple. One function handles every
//! `(strategy, level)` pair with a single match on the predecessor edge:
//!
//! | Edge | Result |
//! |---|---|
//! | none | own stats |
//! | sequential evolution | stage multiplier on own stats plus two material shares |
//! | amalgamation | own stats plus a share of every material |
//! | awakening, rebirth | own stats plus what the source gained over its base |
//! | turnover accident | own stats plus two material shares of the source |
//!
//! Every step is capped to the card's rarity before it feeds the next one.

use crate::cache::CacheKey;
use crate::card_id::CardId;
use crate::catalog::{Card, Catalog};
use crate::error::LineageError;
use crate::lineage::{EvolutionLine, PredecessorEdge};
use crate::stats::{Level, StatTriple};
use crate::strategy::Strategy;

/// Resolves cards against one catalog.
///
/// The resolver borrows the catalog and writes into its cache; it holds no
/// state of its own between calls.
pub(crate) struct StatResolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> StatResolver<'a> {
    pub(crate) fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Resolve `card` under `strategy` at `level`.
    pub(crate) fn resolve(
        &self,
        card: CardId,
        strategy: Strategy,
        level: Level,
    ) -> Result<StatTriple, LineageError> {
        let mut path = Vec::new();
        let stats = self
            .resolve_step(card, strategy, level, &mut path)
            .map_err(|err| match err {
                LineageError::UnresolvedStrategy {
                    card: stage,
                    strategy,
                    reason,
                } if stage != card => LineageError::UnresolvedStrategy {
                    card,
                    strategy,
                    reason: format!("stage {stage}: {reason}"),
                },
                other => other,
            })?;
        log::debug!("resolved {} under {} at {}: {}", card, strategy, level, stats);
        Ok(stats)
    }

    fn resolve_step(
        &self,
        id: CardId,
        strategy: Strategy,
        level: Level,
        path: &mut Vec<CardId>,
    ) -> Result<StatTriple, LineageError> {
        let key = CacheKey::new(id, strategy, level);
        if let Some(stats) = self.catalog.cache().get(&key) {
            return Ok(stats);
        }

        let card = self.card(id)?;
        if let Some(start) = path.iter().position(|&visited| visited == id) {
            let mut cycle = path[start..].to_vec();
            cycle.push(id);
            return Err(LineageError::CyclicLineage { path: cycle });
        }
        if path.len() >= self.catalog.len() {
            let mut cycle = path.clone();
            cycle.push(id);
            return Err(LineageError::CyclicLineage { path: cycle });
        }

        path.push(id);
        let transformed = self.transform(card, strategy, level, path);
        path.pop();

        let stats = self.cap(card, transformed?);
        log::trace!("{} ({}, {}) = {}", card, strategy, level, stats);
        self.catalog.cache().insert(key, stats);
        Ok(stats)
    }

    fn transform(
        &self,
        card: &Card,
        strategy: Strategy,
        level: Level,
        path: &mut Vec<CardId>,
    ) -> Result<StatTriple, LineageError> {
        let constants = self.catalog.constants();
        let own = card.stats_at(level);

        match self.catalog.predecessor_of(card.id)? {
            PredecessorEdge::None => Ok(own),
            PredecessorEdge::SequentialEvolution { material } => {
                self.evolve(card, *material, strategy, level, path)
            }
            PredecessorEdge::Amalgamation { materials, .. } => {
                let mut stats = own;
                for &material in materials {
                    let feed = self.feed_strategy(material, strategy);
                    let resolved = self.resolve_step(material, feed, level, path)?;
                    stats = stats + resolved.scale(constants.amalgamation_transfer_rate);
                }
                Ok(stats)
            }
            PredecessorEdge::Awakening { source } | PredecessorEdge::Rebirth { source } => {
                let feed = self.feed_strategy(*source, strategy);
                let resolved = self.resolve_step(*source, feed, level, path)?;
                let source_base = self.card(*source)?.base;
                Ok(own + (resolved - source_base))
            }
            PredecessorEdge::TurnoverAccident { source } => {
                let resolved = self.resolve_step(*source, Strategy::Standard, Level::Max, path)?;
                let share = resolved.scale(constants.material_transfer_rate);
                Ok(share * constants.turnover_material_count + own)
            }
        }
    }

    /// Sequential evolution: pick the two materials the strategy assumes,
    /// then combine them with the card's own stats.
    fn evolve(
        &self,
        card: &Card,
        material: CardId,
        strategy: Strategy,
        level: Level,
        path: &mut Vec<CardId>,
    ) -> Result<StatTriple, LineageError> {
        let rank = card.evolution_rank;
        let required = strategy.required_line_rank();
        if card.last_evolution_rank < required {
            return Err(self.unresolved(
                card,
                strategy,
                format!(
                    "line ends at rank {}, needs rank {}",
                    card.last_evolution_rank, required
                ),
            ));
        }

        let (first_material, second_material) = match strategy {
            Strategy::Standard => {
                let previous = self.resolve_step(material, strategy, level, path)?;
                let first = self.line(card)?.first();
                (previous, self.resolve_step(first, strategy, level, path)?)
            }
            Strategy::Mixed => {
                let previous = self.resolve_step(material, strategy, level, path)?;
                let amalgamated = matches!(
                    self.catalog.predecessor_of(material)?,
                    PredecessorEdge::Amalgamation { .. }
                );
                if rank == 1 && amalgamated {
                    // the second copy is a plain drop, never amalgamated
                    let dropped = self.card(material)?;
                    (previous, self.cap(dropped, dropped.stats_at(level)))
                } else {
                    let first = self.line(card)?.first();
                    (previous, self.resolve_step(first, strategy, level, path)?)
                }
            }
            Strategy::SixCard => {
                let previous = self.resolve_step(material, strategy, level, path)?;
                let line = self.line(card)?;
                let partner = if rank == 4 {
                    self.stage(card, line, 1, strategy)?
                } else {
                    line.first()
                };
                (previous, self.resolve_step(partner, strategy, level, path)?)
            }
            Strategy::NineCard if rank <= 2 => {
                let previous = self.resolve_step(material, Strategy::Perfect, level, path)?;
                (previous, previous)
            }
            Strategy::NineCard if rank == 3 => {
                let line = self.line(card)?;
                let second = self.stage(card, line, 2, strategy)?;
                let first = self.stage(card, line, 1, strategy)?;
                (
                    self.resolve_step(second, Strategy::Standard, level, path)?,
                    self.resolve_step(first, Strategy::Standard, level, path)?,
                )
            }
            Strategy::NineCard => {
                let line = self.line(card)?;
                let second = self.stage(card, line, 2, strategy)?;
                let third = self.stage(card, line, 3, strategy)?;
                (
                    self.resolve_step(second, strategy, level, path)?,
                    self.resolve_step(third, strategy, level, path)?,
                )
            }
            Strategy::Perfect => {
                let previous = self.resolve_step(material, strategy, level, path)?;
                (previous, previous)
            }
        };

        self.combine(card, level, first_material, second_material)
    }

    /// Strategy a material or awakening source is resolved under. A card
    /// whose line is too short for `strategy` is fed as a standard
    /// evolution; only the requested card reports the strategy unresolved.
    fn feed_strategy(&self, id: CardId, strategy: Strategy) -> Strategy {
        match self.catalog.card(id) {
            Some(card) if card.last_evolution_rank < strategy.required_line_rank() => {
                Strategy::Standard
            }
            _ => strategy,
        }
    }

    /// `trunc(multiplier * own) + trunc(rate * first) + trunc(rate * second)`
    fn combine(
        &self,
        card: &Card,
        level: Level,
        first_material: StatTriple,
        second_material: StatTriple,
    ) -> Result<StatTriple, LineageError> {
        let constants = self.catalog.constants();
        let result_stat = if constants.four_star_uses_first_evo_stat && card.last_evolution_rank == 4
        {
            self.card(self.line(card)?.first())?.stats_at(level)
        } else {
            card.stats_at(level)
        };
        let rate = constants.material_transfer_rate;
        Ok(result_stat.scale(self.stage_multiplier(card))
            + first_material.scale(rate)
            + second_material.scale(rate))
    }

    fn stage_multiplier(&self, card: &Card) -> f64 {
        let constants = self.catalog.constants();
        let legacy = constants.is_legacy_character(card.character_id);
        let rank = card.evolution_rank;
        let last = card.last_evolution_rank;

        if rank == last && rank == 1 {
            constants.single_stage_multiplier
        } else if rank == last {
            if legacy {
                constants.legacy_final_stage_multiplier
            } else {
                constants.final_stage_multiplier
            }
        } else if legacy {
            constants.legacy_intermediate_stage_multiplier
        } else {
            constants.intermediate_stage_multiplier
        }
    }

    fn cap(&self, card: &Card, stats: StatTriple) -> StatTriple {
        let Some(tier) = self.catalog.rarity(card.rarity_id) else {
            unreachable!("{} was loaded without rarity {}", card, card.rarity_id)
        };
        tier.cap(stats)
    }

    fn card(&self, id: CardId) -> Result<&'a Card, LineageError> {
        self.catalog
            .card(id)
            .ok_or(LineageError::DanglingReference(id))
    }

    /// The card's evolution line. A card with a sequential predecessor but
    /// no line sits on a sequential cycle.
    fn line(&self, card: &Card) -> Result<&'a EvolutionLine, LineageError> {
        self.catalog
            .evolution_line(card.id)
            .ok_or_else(|| LineageError::CyclicLineage {
                path: self.catalog.lineage().sequential_cycle(card.id),
            })
    }

    fn stage(
        &self,
        card: &Card,
        line: &EvolutionLine,
        rank: i32,
        strategy: Strategy,
    ) -> Result<CardId, LineageError> {
        line.stage(rank).ok_or_else(|| {
            self.unresolved(card, strategy, format!("line has no rank {rank} stage"))
        })
    }

    fn unresolved(&self, card: &Card, strategy: Strategy, reason: String) -> LineageError {
        LineageError::UnresolvedStrategy {
            card: card.id,
            strategy,
            reason,
        }
    }
}
