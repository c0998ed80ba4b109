//! Input records.
//!
//! Records are the already-decoded master data handed to
//! [`Catalog::load`](crate::Catalog::load). Field names follow the master
//! data JSON so a decoded document deserializes directly; raw references
//! use `0` or `-1` for "none".

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};

fn no_card() -> i64 {
    -1
}

/// One card as stored in master data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    #[serde(rename = "_id")]
    pub id: u32,
    #[serde(rename = "card_chara_id", default)]
    pub character_id: i64,
    #[serde(rename = "card_rare_id")]
    pub rarity_id: u32,
    #[serde(default)]
    pub evolution_rank: i32,
    #[serde(default)]
    pub last_evolution_rank: i32,
    /// Card this one evolves into, `-1` for none.
    #[serde(default = "no_card")]
    pub evolution_card_id: i64,
    /// Turnover accident target, `0` for none.
    #[serde(default)]
    pub trans_card_id: i64,
    #[serde(default)]
    pub default_offense: i64,
    #[serde(default)]
    pub default_defense: i64,
    #[serde(rename = "default_follower", default)]
    pub default_soldiers: i64,
    #[serde(default)]
    pub max_offense: i64,
    #[serde(default)]
    pub max_defense: i64,
    #[serde(rename = "max_follower", default)]
    pub max_soldiers: i64,
    /// Display name attached by the string tables, if any.
    #[serde(default)]
    pub name: String,
}

impl CardRecord {
    /// A rank-0, single-stage card with zeroed stats and no links.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use evostat::record::CardRecord;
    ///
    /// let card = CardRecord::new(10, 1, 3)
    ///     .ranks(0, 4)
    ///     .base_stats(100, 90, 500)
    ///     .max_stats(300, 270, 1500)
    ///     .evolves_to(11);
    /// assert_eq!(card.evolution_card_id, 11);
    /// ```
    pub fn new(id: u32, character_id: i64, rarity_id: u32) -> Self {
        Self {
            id,
            character_id,
            rarity_id,
            evolution_rank: 0,
            last_evolution_rank: 0,
            evolution_card_id: no_card(),
            trans_card_id: 0,
            default_offense: 0,
            default_defense: 0,
            default_soldiers: 0,
            max_offense: 0,
            max_defense: 0,
            max_soldiers: 0,
            name: String::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn ranks(mut self, evolution_rank: i32, last_evolution_rank: i32) -> Self {
        self.evolution_rank = evolution_rank;
        self.last_evolution_rank = last_evolution_rank;
        self
    }

    pub fn base_stats(mut self, attack: i64, defense: i64, soldiers: i64) -> Self {
        self.default_offense = attack;
        self.default_defense = defense;
        self.default_soldiers = soldiers;
        self
    }

    pub fn max_stats(mut self, attack: i64, defense: i64, soldiers: i64) -> Self {
        self.max_offense = attack;
        self.max_defense = defense;
        self.max_soldiers = soldiers;
        self
    }

    pub fn evolves_to(mut self, card: u32) -> Self {
        self.evolution_card_id = i64::from(card);
        self
    }

    pub fn turnover_to(mut self, card: u32) -> Self {
        self.trans_card_id = i64::from(card);
        self
    }
}

/// An amalgamation recipe: up to four materials and one result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmalgamationRecord {
    #[serde(rename = "_id")]
    pub id: u32,
    #[serde(default)]
    pub material_1: i64,
    #[serde(default)]
    pub material_2: i64,
    #[serde(default)]
    pub material_3: i64,
    #[serde(default)]
    pub material_4: i64,
    pub fusion_card_id: i64,
}

impl AmalgamationRecord {
    /// Build a recipe from a material list (at most four are kept).
    pub fn new(id: u32, materials: &[u32], result: u32) -> Self {
        let slot = |index: usize| materials.get(index).map_or(0, |&m| i64::from(m));
        Self {
            id,
            material_1: slot(0),
            material_2: slot(1),
            material_3: slot(2),
            material_4: slot(3),
            fusion_card_id: i64::from(result),
        }
    }

    /// Raw material references in slot order, empty slots skipped.
    pub fn materials(&self) -> Vec<i64> {
        [self.material_1, self.material_2, self.material_3, self.material_4]
            .into_iter()
            .filter(|&raw| raw > 0)
            .collect()
    }
}

/// An awakening or rebirth recipe.
///
/// Rebirths share the awakening layout in master data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwakeningRecord {
    #[serde(rename = "_id")]
    pub id: u32,
    pub base_card_id: i64,
    pub result_card_id: i64,
    /// Chance of success.
    #[serde(default)]
    pub percent: u32,
    #[serde(default)]
    pub material_1_item: i64,
    #[serde(default)]
    pub material_1_count: u32,
    #[serde(default)]
    pub material_2_item: i64,
    #[serde(default)]
    pub material_2_count: u32,
    #[serde(default)]
    pub material_3_item: i64,
    #[serde(default)]
    pub material_3_count: u32,
    #[serde(default)]
    pub material_4_item: i64,
    #[serde(default)]
    pub material_4_count: u32,
    #[serde(default)]
    pub material_5_item: i64,
    #[serde(default)]
    pub material_5_count: u32,
    #[serde(default)]
    pub order: i32,
    /// Non-zero for unreleased recipes.
    #[serde(default)]
    pub is_closed: i32,
}

/// Rebirth recipes use the awakening layout.
pub type RebirthRecord = AwakeningRecord;

impl AwakeningRecord {
    /// An open recipe with a 100% success rate and no item requirements.
    pub fn new(id: u32, base: u32, result: u32) -> Self {
        Self {
            id,
            base_card_id: i64::from(base),
            result_card_id: i64::from(result),
            percent: 100,
            material_1_item: 0,
            material_1_count: 0,
            material_2_item: 0,
            material_2_count: 0,
            material_3_item: 0,
            material_3_count: 0,
            material_4_item: 0,
            material_4_count: 0,
            material_5_item: 0,
            material_5_count: 0,
            order: 0,
            is_closed: 0,
        }
    }

    /// Mark the recipe as unreleased.
    pub fn closed(mut self) -> Self {
        self.is_closed = 1;
        self
    }

    pub fn is_open(&self) -> bool {
        self.is_closed == 0
    }

    /// `(item id, count)` pairs for the occupied item slots.
    pub fn items(&self) -> Vec<(i64, u32)> {
        [
            (self.material_1_item, self.material_1_count),
            (self.material_2_item, self.material_2_count),
            (self.material_3_item, self.material_3_count),
            (self.material_4_item, self.material_4_count),
            (self.material_5_item, self.material_5_count),
        ]
        .into_iter()
        .filter(|&(item, count)| item > 0 && count > 0)
        .collect()
    }
}

/// Stat ceilings of one rarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityRecord {
    #[serde(rename = "_id")]
    pub id: u32,
    #[serde(default)]
    pub max_card_level: u32,
    pub signature: String,
    #[serde(rename = "limt_offense")]
    pub limit_offense: i64,
    #[serde(rename = "limt_defense")]
    pub limit_defense: i64,
    #[serde(rename = "limt_max_follower")]
    pub limit_soldiers: i64,
    #[serde(default)]
    pub order: i32,
}

impl RarityRecord {
    pub fn new(id: u32, signature: &str, attack: i64, defense: i64, soldiers: i64) -> Self {
        Self {
            id,
            max_card_level: 0,
            signature: signature.to_string(),
            limit_offense: attack,
            limit_defense: defense,
            limit_soldiers: soldiers,
            order: i32::try_from(id).unwrap_or(i32::MAX),
        }
    }
}

/// Every record the catalog is built from.
///
/// Deserializes from a master data document, ignoring the tables this
/// crate does not use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecords {
    #[serde(default)]
    pub cards: Vec<CardRecord>,
    #[serde(rename = "fusion_list", default)]
    pub amalgamations: Vec<AmalgamationRecord>,
    #[serde(rename = "card_awaken", default)]
    pub awakenings: Vec<AwakeningRecord>,
    #[serde(rename = "card_super_awaken", default)]
    pub rebirths: Vec<RebirthRecord>,
    #[serde(rename = "card_rares", default)]
    pub rarities: Vec<RarityRecord>,
}

impl CatalogRecords {
    /// Parse a master data JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }
}
