//! Rarity tiers and the rarity cap.
//!
//! A card's rarity bounds its stats. Every resolution step clamps its
//! result to the card's tier, so an overfed intermediate evolution is
//! clamped before it is fed any further.

use crate::error::CatalogError;
use crate::record::RarityRecord;
use crate::stats::StatTriple;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Letter code of a rarity.
///
/// Plain codes (`N`, `R`, `SR`, `UR`, `LR`, `X`) head a family; `H`
/// (evolved), `G` (awoken) and `X` (reborn) prefixes move up the family.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RarityCode {
    N,
    R,
    SR,
    UR,
    LR,
    X,
    HN,
    HR,
    HSR,
    HUR,
    HLR,
    HX,
    GSR,
    GUR,
    GLR,
    XSR,
    XUR,
    XLR,
}

impl RarityCode {
    const ALL: [RarityCode; 18] = [
        RarityCode::N,
        RarityCode::R,
        RarityCode::SR,
        RarityCode::UR,
        RarityCode::LR,
        RarityCode::X,
        RarityCode::HN,
        RarityCode::HR,
        RarityCode::HSR,
        RarityCode::HUR,
        RarityCode::HLR,
        RarityCode::HX,
        RarityCode::GSR,
        RarityCode::GUR,
        RarityCode::GLR,
        RarityCode::XSR,
        RarityCode::XUR,
        RarityCode::XLR,
    ];

    /// Parse a rarity signature such as `"hsr"` or `"GUR"`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use evostat::RarityCode;
    ///
    /// assert_eq!(RarityCode::parse("hsr"), Some(RarityCode::HSR));
    /// assert_eq!(RarityCode::parse("GUR"), Some(RarityCode::GUR));
    /// assert_eq!(RarityCode::parse("SSR"), None);
    /// ```
    pub fn parse(signature: &str) -> Option<Self> {
        let upper = signature.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|code| code.as_str() == upper)
    }

    /// The code as written in master data, upper-cased.
    pub fn as_str(self) -> &'static str {
        match self {
            RarityCode::N => "N",
            RarityCode::R => "R",
            RarityCode::SR => "SR",
            RarityCode::UR => "UR",
            RarityCode::LR => "LR",
            RarityCode::X => "X",
            RarityCode::HN => "HN",
            RarityCode::HR => "HR",
            RarityCode::HSR => "HSR",
            RarityCode::HUR => "HUR",
            RarityCode::HLR => "HLR",
            RarityCode::HX => "HX",
            RarityCode::GSR => "GSR",
            RarityCode::GUR => "GUR",
            RarityCode::GLR => "GLR",
            RarityCode::XSR => "XSR",
            RarityCode::XUR => "XUR",
            RarityCode::XLR => "XLR",
        }
    }

    /// The family head this code belongs to (`GUR` -> `UR`, `HX` -> `X`).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use evostat::RarityCode;
    ///
    /// assert_eq!(RarityCode::GUR.main(), RarityCode::UR);
    /// assert_eq!(RarityCode::XLR.main(), RarityCode::LR);
    /// assert_eq!(RarityCode::X.main(), RarityCode::X);
    /// ```
    pub fn main(self) -> RarityCode {
        match self {
            RarityCode::N | RarityCode::HN => RarityCode::N,
            RarityCode::R | RarityCode::HR => RarityCode::R,
            RarityCode::SR | RarityCode::HSR | RarityCode::GSR | RarityCode::XSR => RarityCode::SR,
            RarityCode::UR | RarityCode::HUR | RarityCode::GUR | RarityCode::XUR => RarityCode::UR,
            RarityCode::LR | RarityCode::HLR | RarityCode::GLR | RarityCode::XLR => RarityCode::LR,
            RarityCode::X | RarityCode::HX => RarityCode::X,
        }
    }

    /// Position inside the family: 0 plain, 1 evolved, 2 awoken, 3 reborn.
    pub fn step(self) -> u8 {
        match self {
            RarityCode::N
            | RarityCode::R
            | RarityCode::SR
            | RarityCode::UR
            | RarityCode::LR
            | RarityCode::X => 0,
            RarityCode::HN
            | RarityCode::HR
            | RarityCode::HSR
            | RarityCode::HUR
            | RarityCode::HLR
            | RarityCode::HX => 1,
            RarityCode::GSR | RarityCode::GUR | RarityCode::GLR => 2,
            RarityCode::XSR | RarityCode::XUR | RarityCode::XLR => 3,
        }
    }
}

impl fmt::Display for RarityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stat ceilings and level limit of one rarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityTier {
    pub id: u32,
    /// Signature as found in master data.
    pub signature: String,
    /// Parsed code; `None` for signatures this crate does not know.
    pub code: Option<RarityCode>,
    pub max_card_level: u32,
    /// Per-stat ceiling.
    pub limit: StatTriple,
    pub order: i32,
}

impl RarityTier {
    /// Build a tier from its record.
    pub fn from_record(record: &RarityRecord) -> Self {
        Self {
            id: record.id,
            signature: record.signature.clone(),
            code: RarityCode::parse(&record.signature),
            max_card_level: record.max_card_level,
            limit: StatTriple::new(
                record.limit_offense,
                record.limit_defense,
                record.limit_soldiers,
            ),
            order: record.order,
        }
    }

    /// Clamp `stats` to this tier's ceilings.
    pub fn cap(&self, stats: StatTriple) -> StatTriple {
        stats.min_each(self.limit)
    }

    /// Family head of this tier, if the code is known.
    pub fn main_code(&self) -> Option<RarityCode> {
        self.code.map(RarityCode::main)
    }
}

/// Clamp `stats` to the ceilings of `tier`, per stat.
///
/// # Examples
///
/// ```rust
/// use evostat::{cap, RarityTier, StatTriple};
///
/// let tier = RarityTier {
///     id: 3,
///     signature: "sr".into(),
///     code: None,
///     max_card_level: 70,
///     limit: StatTriple::new(9999, 9999, 15000),
///     order: 3,
/// };
/// assert_eq!(
///     cap(StatTriple::new(12000, 800, 15001), &tier),
///     StatTriple::new(9999, 800, 15000),
/// );
/// ```
pub fn cap(stats: StatTriple, tier: &RarityTier) -> StatTriple {
    tier.cap(stats)
}

/// Family heads in canonical order; `X` stands apart.
const HEAD_ORDER: [RarityCode; 5] = [
    RarityCode::N,
    RarityCode::R,
    RarityCode::SR,
    RarityCode::UR,
    RarityCode::LR,
];

/// Check that ceilings never decrease along `F -> HF -> GF -> XF`, nor
/// across family heads along `N -> R -> SR -> UR -> LR`.
pub(crate) fn check_ordering<'a>(
    tiers: impl IntoIterator<Item = &'a RarityTier>,
) -> Result<(), CatalogError> {
    let mut families: BTreeMap<RarityCode, Vec<(u8, &RarityTier)>> = BTreeMap::new();
    for tier in tiers {
        if let Some(code) = tier.code {
            families
                .entry(code.main())
                .or_default()
                .push((code.step(), tier));
        }
    }

    for members in families.values_mut() {
        members.sort_by_key(|(step, tier)| (*step, tier.id));
        check_rising(members)?;
    }

    let heads: Vec<(u8, &RarityTier)> = HEAD_ORDER
        .iter()
        .zip(0u8..)
        .filter_map(|(head, position)| {
            let members = families.get(head)?;
            members
                .iter()
                .find(|(step, _)| *step == 0)
                .map(|&(_, tier)| (position, tier))
        })
        .collect();
    check_rising(&heads)
}

/// Ceilings must not fall between neighbours of different rank.
fn check_rising(ranked: &[(u8, &RarityTier)]) -> Result<(), CatalogError> {
    for pair in ranked.windows(2) {
        let (lower_rank, lower) = pair[0];
        let (higher_rank, higher) = pair[1];
        if lower_rank == higher_rank {
            continue;
        }
        if !higher.limit.dominates(&lower.limit) {
            return Err(CatalogError::RarityOrdering {
                lower: lower.signature.clone(),
                higher: higher.signature.clone(),
            });
        }
    }
    Ok(())
}
