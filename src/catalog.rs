//! Catalog module.
//!
//! Provides the `Catalog` type: the validated, immutable card tables of one
//! master data load together with their lineage indices and the result
//! cache. Every query and every resolution goes through a catalog handle.

use crate::cache::ResultCache;
use crate::card_id::CardId;
use crate::config::EvolutionConstants;
use crate::error::{CatalogError, LineageError};
use crate::lineage::{EdgeKind, EvolutionLine, LineageIndex, PredecessorEdge, SuccessorEdge};
use crate::rarity::{self, RarityCode, RarityTier};
use crate::record::{AmalgamationRecord, AwakeningRecord, CardRecord, CatalogRecords};
use crate::resolver::StatResolver;
use crate::stats::{Level, StatTriple};
use crate::strategy::Strategy;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// A loaded card.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: CardId,
    /// Character the card depicts; sequential lines never cross characters.
    pub character_id: Option<u32>,
    pub rarity_id: u32,
    /// 0 to 4, or -1 for unranked cards.
    pub evolution_rank: i32,
    pub last_evolution_rank: i32,
    /// Level-1 stats.
    pub base: StatTriple,
    /// Max-level stats.
    pub max: StatTriple,
    pub next_evolution: Option<CardId>,
    pub turnover: Option<CardId>,
    pub name: String,
}

impl Card {
    fn from_record(record: &CardRecord) -> Self {
        Self {
            id: CardId::new(record.id),
            character_id: u32::try_from(record.character_id).ok().filter(|&c| c > 0),
            rarity_id: record.rarity_id,
            evolution_rank: record.evolution_rank,
            last_evolution_rank: record.last_evolution_rank,
            base: StatTriple::new(
                record.default_offense,
                record.default_defense,
                record.default_soldiers,
            ),
            max: StatTriple::new(record.max_offense, record.max_defense, record.max_soldiers),
            next_evolution: CardId::from_raw(record.evolution_card_id),
            turnover: CardId::from_raw(record.trans_card_id),
            name: record.name.clone(),
        }
    }

    /// Stored stats at `level`.
    pub fn stats_at(&self, level: Level) -> StatTriple {
        match level {
            Level::Base => self.base,
            Level::Max => self.max,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "card {}", self.id)
        } else {
            write!(f, "{} ({})", self.name, self.id)
        }
    }
}

/// A loaded amalgamation recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct Amalgamation {
    pub id: u32,
    /// Between two and four materials, in recipe order.
    pub materials: Vec<CardId>,
    pub result: CardId,
}

/// A loaded awakening or rebirth recipe. Only open recipes are loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Awakening {
    pub id: u32,
    pub base: CardId,
    pub result: CardId,
    /// Success chance in percent.
    pub percent: u32,
    /// `(item id, count)` requirements.
    pub items: Vec<(i64, u32)>,
    pub order: i32,
}

/// Rebirth recipes share the awakening shape.
pub type Rebirth = Awakening;

impl Awakening {
    /// A recipe with a 100% success rate and no item requirements.
    pub fn new(id: u32, base: CardId, result: CardId) -> Self {
        Self {
            id,
            base,
            result,
            percent: 100,
            items: Vec::new(),
            order: 0,
        }
    }
}

/// Validated card tables and their lineage.
///
/// A catalog never changes after [`Catalog::load`]; only its result cache
/// fills up. A new master data version means a new catalog (see
/// [`StatEngine`](crate::StatEngine) for swapping one in).
///
/// # Examples
///
/// ```rust
/// use evostat::record::{CardRecord, CatalogRecords, RarityRecord};
/// use evostat::{CardId, Catalog, Level, Strategy};
///
/// let records = CatalogRecords {
///     cards: vec![
///         CardRecord::new(1, 7, 1).ranks(0, 2).base_stats(100, 100, 100).max_stats(300, 300, 300).evolves_to(2),
///         CardRecord::new(2, 7, 1).ranks(1, 2).base_stats(200, 200, 200).max_stats(500, 500, 500),
///     ],
///     rarities: vec![RarityRecord::new(1, "sr", 9999, 9999, 9999)],
///     ..Default::default()
/// };
/// let catalog = Catalog::load(records).unwrap();
///
/// let stats = catalog.resolve(CardId::new(2), Strategy::Standard, Level::Max).unwrap();
/// // 1.05 * 500 + 0.15 * 300 + 0.15 * 300
/// assert_eq!(stats.attack, 615);
/// ```
#[derive(Debug)]
pub struct Catalog {
    cards: HashMap<CardId, Card>,
    rarities: HashMap<u32, RarityTier>,
    amalgamations: Vec<Amalgamation>,
    awakenings: Vec<Awakening>,
    rebirths: Vec<Rebirth>,
    lineage: LineageIndex,
    constants: EvolutionConstants,
    generation: u64,
    cache: ResultCache,
}

impl Catalog {
    /// Load and validate records with the default evolution constants.
    pub fn load(records: CatalogRecords) -> Result<Self, CatalogError> {
        Self::load_with(records, EvolutionConstants::default())
    }

    /// Load and validate records.
    ///
    /// Every reference is checked eagerly, so resolution against the
    /// returned catalog can only fail on lineage shape (cycles, strategies
    /// a line cannot support) or on IDs the caller made up.
    pub fn load_with(
        records: CatalogRecords,
        constants: EvolutionConstants,
    ) -> Result<Self, CatalogError> {
        constants.validate()?;

        let mut rarities = HashMap::with_capacity(records.rarities.len());
        for record in &records.rarities {
            if rarities
                .insert(record.id, RarityTier::from_record(record))
                .is_some()
            {
                return Err(CatalogError::DuplicateRarity(record.id));
            }
        }
        rarity::check_ordering(rarities.values())?;

        let cards = load_cards(&records.cards, &rarities)?;
        let amalgamations = records
            .amalgamations
            .iter()
            .map(|record| load_amalgamation(record, &cards))
            .collect::<Result<Vec<_>, _>>()?;
        let awakenings = load_awakenings(&records.awakenings, &cards, EdgeKind::Awakening)?;
        let rebirths = load_awakenings(&records.rebirths, &cards, EdgeKind::Rebirth)?;

        let lineage = LineageIndex::build(
            &cards,
            &amalgamations,
            &awakenings,
            &rebirths,
            constants.strict_lineage,
        )?;

        for card in cards.values() {
            let is_root = lineage.predecessor(card.id).map_or(true, PredecessorEdge::is_root);
            if is_root && !card.max.dominates(&card.base) {
                return Err(CatalogError::InvalidCard {
                    card: card.id,
                    reason: format!("max stats ({}) below base stats ({})", card.max, card.base),
                });
            }
        }

        if let Some(cycle) = lineage.graph().find_cycle() {
            log::warn!(
                "{}",
                LineageError::CyclicLineage { path: cycle }
            );
        }

        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        log::info!(
            "loaded catalog generation {}: {} cards, {} rarities, {} amalgamations, {} awakenings, {} rebirths, {} evolution lines",
            generation,
            cards.len(),
            rarities.len(),
            amalgamations.len(),
            awakenings.len(),
            rebirths.len(),
            lineage.lines().len()
        );

        Ok(Self {
            cards,
            rarities,
            amalgamations,
            awakenings,
            rebirths,
            lineage,
            constants,
            generation,
            cache: ResultCache::new(generation),
        })
    }

    /// Number of cards.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(&id)
    }

    /// All cards, in no particular order.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    pub fn rarity(&self, id: u32) -> Option<&RarityTier> {
        self.rarities.get(&id)
    }

    pub fn amalgamations(&self) -> &[Amalgamation] {
        &self.amalgamations
    }

    pub fn awakenings(&self) -> &[Awakening] {
        &self.awakenings
    }

    pub fn rebirths(&self) -> &[Rebirth] {
        &self.rebirths
    }

    pub fn constants(&self) -> &EvolutionConstants {
        &self.constants
    }

    /// Load generation; strictly increasing across loads in one process.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The memo cache of this catalog.
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Drop every memoized result.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Resolve the stats of `card` under `strategy` at `level`.
    ///
    /// Results are memoized per `(card, strategy, level)` for the lifetime
    /// of the catalog.
    pub fn resolve(
        &self,
        card: CardId,
        strategy: Strategy,
        level: Level,
    ) -> Result<StatTriple, LineageError> {
        StatResolver::new(self).resolve(card, strategy, level)
    }

    /// How `card` is produced.
    pub fn predecessor_of(&self, card: CardId) -> Result<&PredecessorEdge, LineageError> {
        self.lineage
            .predecessor(card)
            .ok_or(LineageError::DanglingReference(card))
    }

    /// Cards produced from `card`, ordered by card ID. Empty for unknown IDs.
    pub fn successors_of(&self, card: CardId) -> Vec<SuccessorEdge> {
        self.lineage.graph().successors(card)
    }

    /// The sequential line `card` belongs to. Cards on a sequential cycle
    /// have none.
    pub fn evolution_line(&self, card: CardId) -> Option<&EvolutionLine> {
        self.lineage.line_of(card)
    }

    /// Every card that feeds into `card`, ordered by card ID.
    pub fn ancestry(&self, card: CardId) -> Vec<CardId> {
        self.lineage.graph().ancestors(card)
    }

    /// A lineage cycle, if the catalog has one.
    pub fn lineage_cycle(&self) -> Option<Vec<CardId>> {
        self.lineage.graph().find_cycle()
    }

    /// The card an awakening or rebirth chain starts from; `card` itself
    /// when it is neither.
    pub fn anchor_of(&self, card: CardId) -> CardId {
        let mut seen = HashSet::new();
        let mut current = card;
        while seen.insert(current) {
            match self.lineage.predecessor(current) {
                Some(PredecessorEdge::Awakening { source } | PredecessorEdge::Rebirth { source }) => {
                    current = *source;
                }
                _ => break,
            }
        }
        current
    }

    /// `true` when `card` can be reached by a mixed evolution: its line
    /// starts at an amalgamation result and has a rank-1 stage, or it is a
    /// lone amalgamation result fed by such a card.
    pub fn possible_mixed_evo(&self, card: CardId) -> bool {
        self.possible_mixed_evo_inner(card, &mut HashSet::new())
    }

    fn possible_mixed_evo_inner(&self, card: CardId, visited: &mut HashSet<CardId>) -> bool {
        if !visited.insert(card) {
            return false;
        }
        let anchor = self.anchor_of(card);
        let Some(line) = self.lineage.line_of(anchor) else {
            return false;
        };
        let Some(PredecessorEdge::Amalgamation { materials, .. }) =
            self.lineage.predecessor(line.first())
        else {
            return false;
        };
        if line.stage(1).is_some() {
            return true;
        }
        line.len() == 1
            && materials
                .iter()
                .any(|&material| self.possible_mixed_evo_inner(material, visited))
    }

    /// Strategies worth showing for `card`, in [`Strategy::ALL`] order.
    pub fn applicable_strategies(&self, card: CardId) -> Result<Vec<Strategy>, LineageError> {
        let current = self.card(card).ok_or(LineageError::DanglingReference(card))?;
        let anchor = self
            .card(self.anchor_of(card))
            .ok_or(LineageError::DanglingReference(card))?;
        let four_star = anchor.evolution_rank == 4 && anchor.last_evolution_rank == 4;
        let legendary = self
            .rarity(current.rarity_id)
            .and_then(RarityTier::main_code)
            == Some(RarityCode::LR);

        let mut strategies = vec![Strategy::Standard];
        if self.possible_mixed_evo(card) {
            strategies.push(Strategy::Mixed);
        }
        if four_star {
            strategies.push(Strategy::SixCard);
            if !legendary {
                strategies.push(Strategy::NineCard);
            }
        }
        if !self.predecessor_of(card)?.is_root() {
            strategies.push(Strategy::Perfect);
        }
        Ok(strategies)
    }

    pub(crate) fn lineage(&self) -> &LineageIndex {
        &self.lineage
    }
}

fn load_cards(
    records: &[CardRecord],
    rarities: &HashMap<u32, RarityTier>,
) -> Result<HashMap<CardId, Card>, CatalogError> {
    let mut cards = HashMap::with_capacity(records.len());
    for record in records {
        let card = Card::from_record(record);
        if !rarities.contains_key(&card.rarity_id) {
            return Err(CatalogError::UnknownRarity {
                card: card.id,
                rarity: card.rarity_id,
            });
        }
        if card.evolution_rank > card.last_evolution_rank {
            return Err(CatalogError::InvalidCard {
                card: card.id,
                reason: format!(
                    "evolution rank {} above last evolution rank {}",
                    card.evolution_rank, card.last_evolution_rank
                ),
            });
        }
        if let Some(previous) = cards.insert(card.id, card) {
            return Err(CatalogError::DuplicateCard(previous.id));
        }
    }

    for card in cards.values() {
        let links = [
            ("next evolution", card.next_evolution),
            ("turnover", card.turnover),
        ];
        for (relation, target) in links {
            if let Some(target) = target.filter(|target| !cards.contains_key(target)) {
                return Err(CatalogError::DanglingReference {
                    relation,
                    owner: card.id.get(),
                    target,
                });
            }
        }
    }
    Ok(cards)
}

fn existing_card(
    raw: i64,
    cards: &HashMap<CardId, Card>,
    relation: &'static str,
    kind: EdgeKind,
    owner: u32,
) -> Result<CardId, CatalogError> {
    let id = CardId::from_raw(raw).ok_or_else(|| CatalogError::InvalidRecipe {
        kind,
        id: owner,
        reason: format!("{relation} {raw} is not a card id"),
    })?;
    if !cards.contains_key(&id) {
        return Err(CatalogError::DanglingReference {
            relation,
            owner,
            target: id,
        });
    }
    Ok(id)
}

fn load_amalgamation(
    record: &AmalgamationRecord,
    cards: &HashMap<CardId, Card>,
) -> Result<Amalgamation, CatalogError> {
    let kind = EdgeKind::Amalgamation;
    let raw = record.materials();
    if !(2..=4).contains(&raw.len()) {
        return Err(CatalogError::InvalidRecipe {
            kind,
            id: record.id,
            reason: format!("{} materials, expected 2 to 4", raw.len()),
        });
    }
    let materials = raw
        .into_iter()
        .map(|material| existing_card(material, cards, "amalgamation material", kind, record.id))
        .collect::<Result<Vec<_>, _>>()?;
    let result = existing_card(
        record.fusion_card_id,
        cards,
        "amalgamation result",
        kind,
        record.id,
    )?;
    Ok(Amalgamation {
        id: record.id,
        materials,
        result,
    })
}

fn load_awakenings(
    records: &[AwakeningRecord],
    cards: &HashMap<CardId, Card>,
    kind: EdgeKind,
) -> Result<Vec<Awakening>, CatalogError> {
    let (base_relation, result_relation) = match kind {
        EdgeKind::Rebirth => ("rebirth base", "rebirth result"),
        _ => ("awakening base", "awakening result"),
    };
    let mut recipes = Vec::with_capacity(records.len());
    for record in records {
        if !record.is_open() {
            log::debug!("skipping closed {} recipe {}", kind, record.id);
            continue;
        }
        recipes.push(Awakening {
            id: record.id,
            base: existing_card(record.base_card_id, cards, base_relation, kind, record.id)?,
            result: existing_card(record.result_card_id, cards, result_relation, kind, record.id)?,
            percent: record.percent,
            items: record.items(),
            order: record.order,
        });
    }
    Ok(recipes)
}
