//! Lineage navigation.
//!
//! Every card has at most one predecessor edge: the way it is produced.
//! The edges, the sequential evolution lines and the lineage graph are
//! built once when a catalog is loaded so that every lookup during
//! resolution is a single map access.

use crate::card_id::CardId;
use crate::catalog::{Amalgamation, Awakening, Card};
use crate::error::CatalogError;
use crate::graph::LineageGraph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Kind of a lineage edge.
///
/// Variants are declared in precedence order: when several edge kinds could
/// produce the same card, the earliest one wins.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Amalgamation,
    Rebirth,
    Awakening,
    TurnoverAccident,
    SequentialEvolution,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::Amalgamation => f.write_str("amalgamation"),
            EdgeKind::Rebirth => f.write_str("rebirth"),
            EdgeKind::Awakening => f.write_str("awakening"),
            EdgeKind::TurnoverAccident => f.write_str("turnover accident"),
            EdgeKind::SequentialEvolution => f.write_str("sequential evolution"),
        }
    }
}

/// How a card is produced.
///
/// # Examples
///
/// ```rust
/// use evostat::{CardId, EdgeKind, PredecessorEdge};
///
/// let edge = PredecessorEdge::Awakening { source: CardId::new(4) };
/// assert_eq!(edge.kind(), Some(EdgeKind::Awakening));
/// assert_eq!(edge.sources(), vec![CardId::new(4)]);
/// assert!(PredecessorEdge::None.is_root());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredecessorEdge {
    /// A root card: its stored stats are used as-is.
    None,
    /// Evolved from the previous stage of its line.
    SequentialEvolution { material: CardId },
    /// Amalgamated from `materials`; `first_evo` is the first stage of the
    /// result's own evolution line.
    Amalgamation {
        materials: Vec<CardId>,
        first_evo: CardId,
    },
    /// Awoken from `source`.
    Awakening { source: CardId },
    /// Reborn from `source`, itself an awoken card.
    Rebirth { source: CardId },
    /// The accidental evolution outcome of `source`.
    TurnoverAccident { source: CardId },
}

impl PredecessorEdge {
    /// Edge kind, `None` for roots.
    pub fn kind(&self) -> Option<EdgeKind> {
        match self {
            PredecessorEdge::None => None,
            PredecessorEdge::SequentialEvolution { .. } => Some(EdgeKind::SequentialEvolution),
            PredecessorEdge::Amalgamation { .. } => Some(EdgeKind::Amalgamation),
            PredecessorEdge::Awakening { .. } => Some(EdgeKind::Awakening),
            PredecessorEdge::Rebirth { .. } => Some(EdgeKind::Rebirth),
            PredecessorEdge::TurnoverAccident { .. } => Some(EdgeKind::TurnoverAccident),
        }
    }

    /// Cards consumed by this edge.
    pub fn sources(&self) -> Vec<CardId> {
        match self {
            PredecessorEdge::None => Vec::new(),
            PredecessorEdge::SequentialEvolution { material } => vec![*material],
            PredecessorEdge::Amalgamation { materials, .. } => materials.clone(),
            PredecessorEdge::Awakening { source }
            | PredecessorEdge::Rebirth { source }
            | PredecessorEdge::TurnoverAccident { source } => vec![*source],
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, PredecessorEdge::None)
    }
}

/// A card produced from another card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessorEdge {
    pub kind: EdgeKind,
    pub card: CardId,
}

/// One sequential evolution line: its first stage and every stage by rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvolutionLine {
    first: CardId,
    stages: BTreeMap<i32, CardId>,
}

impl EvolutionLine {
    /// First stage of the line.
    pub fn first(&self) -> CardId {
        self.first
    }

    /// Card at `rank`, if the line has one.
    pub fn stage(&self, rank: i32) -> Option<CardId> {
        self.stages.get(&rank).copied()
    }

    /// Stages in rank order.
    pub fn stages(&self) -> impl Iterator<Item = (i32, CardId)> + '_ {
        self.stages.iter().map(|(&rank, &card)| (rank, card))
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Predecessor edges, evolution lines and the lineage graph of a catalog.
#[derive(Debug, Clone)]
pub(crate) struct LineageIndex {
    predecessors: HashMap<CardId, PredecessorEdge>,
    lines: Vec<EvolutionLine>,
    line_of: HashMap<CardId, usize>,
    /// Sequential links, next stage -> previous stage.
    sequential_of: HashMap<CardId, CardId>,
    graph: LineageGraph,
}

impl LineageIndex {
    /// Build the index. Card references inside `cards` and the recipes must
    /// already be validated.
    pub(crate) fn build(
        cards: &HashMap<CardId, Card>,
        amalgamations: &[Amalgamation],
        awakenings: &[Awakening],
        rebirths: &[Awakening],
        strict: bool,
    ) -> Result<Self, CatalogError> {
        let mut ids: Vec<CardId> = cards.keys().copied().collect();
        ids.sort();

        let mut amalgamation_of: HashMap<CardId, &Amalgamation> = HashMap::new();
        for recipe in amalgamations {
            if amalgamation_of.insert(recipe.result, recipe).is_some() {
                return Err(CatalogError::DuplicateEdge {
                    kind: EdgeKind::Amalgamation,
                    card: recipe.result,
                });
            }
        }
        let awakening_of = index_by_result(awakenings, EdgeKind::Awakening)?;
        let rebirth_of = index_by_result(rebirths, EdgeKind::Rebirth)?;

        let mut turnover_of: HashMap<CardId, CardId> = HashMap::new();
        let mut sequential_of: HashMap<CardId, CardId> = HashMap::new();
        for id in &ids {
            let card = &cards[id];
            if let Some(target) = card.turnover {
                if turnover_of.insert(target, card.id).is_some() {
                    return Err(CatalogError::DuplicateEdge {
                        kind: EdgeKind::TurnoverAccident,
                        card: target,
                    });
                }
            }
            let Some(next) = card.next_evolution.and_then(|next| cards.get(&next)) else {
                continue;
            };
            if is_sequential(card, next) && sequential_of.insert(next.id, card.id).is_some() {
                return Err(CatalogError::DuplicateEdge {
                    kind: EdgeKind::SequentialEvolution,
                    card: next.id,
                });
            }
        }

        let (lines, line_of) = build_lines(cards, &ids, &sequential_of);

        let mut predecessors = HashMap::with_capacity(ids.len());
        for &id in &ids {
            let first_evo = line_of.get(&id).map_or(id, |&line| lines[line].first);
            let mut candidates = Vec::new();
            if let Some(recipe) = amalgamation_of.get(&id) {
                candidates.push(PredecessorEdge::Amalgamation {
                    materials: recipe.materials.clone(),
                    first_evo,
                });
            }
            if let Some(&source) = rebirth_of.get(&id) {
                candidates.push(PredecessorEdge::Rebirth { source });
            }
            if let Some(&source) = awakening_of.get(&id) {
                candidates.push(PredecessorEdge::Awakening { source });
            }
            if let Some(&source) = turnover_of.get(&id) {
                candidates.push(PredecessorEdge::TurnoverAccident { source });
            }
            if let Some(&material) = sequential_of.get(&id) {
                candidates.push(PredecessorEdge::SequentialEvolution { material });
            }

            if candidates.len() > 1 {
                let kinds: Vec<EdgeKind> = candidates.iter().filter_map(|e| e.kind()).collect();
                if strict {
                    return Err(CatalogError::AmbiguousLineage { card: id, kinds });
                }
                log::warn!(
                    "card {} has ambiguous lineage ({:?}), keeping {}",
                    id,
                    kinds,
                    kinds[0]
                );
            }
            let edge = candidates.into_iter().next().unwrap_or(PredecessorEdge::None);
            predecessors.insert(id, edge);
        }

        let mut graph = LineageGraph::new();
        for &id in &ids {
            graph.add_node(id);
        }
        for &id in &ids {
            let edge = &predecessors[&id];
            if let Some(kind) = edge.kind() {
                for source in edge.sources() {
                    graph.add_edge(source, id, kind);
                }
            }
        }

        Ok(Self {
            predecessors,
            lines,
            line_of,
            sequential_of,
            graph,
        })
    }

    pub(crate) fn predecessor(&self, card: CardId) -> Option<&PredecessorEdge> {
        self.predecessors.get(&card)
    }

    pub(crate) fn line_of(&self, card: CardId) -> Option<&EvolutionLine> {
        self.line_of.get(&card).map(|&line| &self.lines[line])
    }

    pub(crate) fn lines(&self) -> &[EvolutionLine] {
        &self.lines
    }

    pub(crate) fn graph(&self) -> &LineageGraph {
        &self.graph
    }

    /// The sequential cycle `card` sits on, in production order and closed
    /// on `card`. Only meaningful for cards without an evolution line.
    pub(crate) fn sequential_cycle(&self, card: CardId) -> Vec<CardId> {
        let mut path = vec![card];
        let mut current = card;
        while let Some(&previous) = self.sequential_of.get(&current) {
            path.push(previous);
            if previous == card || path.len() > self.sequential_of.len() + 1 {
                break;
            }
            current = previous;
        }
        path.reverse();
        path
    }
}

/// `next` is the following stage of `card`'s own line. An evolution into
/// another character's card (or into a rank-0 card) is not.
fn is_sequential(card: &Card, next: &Card) -> bool {
    card.character_id.is_some()
        && card.character_id == next.character_id
        && card.id != next.id
        && next.evolution_rank > 0
}

fn index_by_result(
    recipes: &[Awakening],
    kind: EdgeKind,
) -> Result<HashMap<CardId, CardId>, CatalogError> {
    let mut index = HashMap::with_capacity(recipes.len());
    for recipe in recipes {
        if index.insert(recipe.result, recipe.base).is_some() {
            return Err(CatalogError::DuplicateEdge {
                kind,
                card: recipe.result,
            });
        }
    }
    Ok(index)
}

/// Walk each chain forward from its first stage. Cards on a sequential
/// cycle have no first stage and stay out of every line.
fn build_lines(
    cards: &HashMap<CardId, Card>,
    ids: &[CardId],
    sequential_of: &HashMap<CardId, CardId>,
) -> (Vec<EvolutionLine>, HashMap<CardId, usize>) {
    let next_of: HashMap<CardId, CardId> = sequential_of
        .iter()
        .map(|(&next, &previous)| (previous, next))
        .collect();

    let mut lines = Vec::new();
    let mut line_of = HashMap::new();
    for &first in ids {
        if sequential_of.contains_key(&first) {
            continue;
        }
        let index = lines.len();
        let mut stages = BTreeMap::new();
        let mut seen = HashSet::new();
        let mut current = Some(first);
        while let Some(card) = current {
            if !seen.insert(card) {
                break;
            }
            stages.entry(cards[&card].evolution_rank).or_insert(card);
            line_of.insert(card, index);
            current = next_of.get(&card).copied();
        }
        lines.push(EvolutionLine { first, stages });
    }
    (lines, line_of)
}
