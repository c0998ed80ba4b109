//! Evolution strategies.
//!
//! A strategy is an assumption about how thoroughly a card's materials were
//! evolved before they were fed into it. Resolving the same card under
//! different strategies gives the realistic range of its stats.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the materials feeding a card were themselves evolved.
///
/// # Examples
///
/// ```rust
/// use evostat::Strategy;
///
/// assert_eq!(Strategy::NineCard.required_line_rank(), 3);
/// assert_eq!(Strategy::Perfect.card_count(4), Some(16));
/// assert_eq!(Strategy::SixCard.to_string(), "6 card evolution");
/// ```
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Materials evolved with the minimal, typical steps: each stage is fed
    /// the previous stage plus a fresh first stage.
    Standard,
    /// A rank-1 card whose first stage is an amalgamation result, evolved
    /// from one amalgamated copy and one dropped copy.
    ///
    /// Standard already treats both copies as amalgamated, so Mixed sits at
    /// or below Standard and marks the low end of the card's range.
    Mixed,
    /// Four-star six-card evolution.
    SixCard,
    /// Four-star nine-card evolution.
    NineCard,
    /// Every material assumed maximally evolved.
    Perfect,
}

impl Strategy {
    /// All strategies, from least to most invested.
    pub const ALL: [Strategy; 5] = [
        Strategy::Standard,
        Strategy::Mixed,
        Strategy::SixCard,
        Strategy::NineCard,
        Strategy::Perfect,
    ];

    /// Minimum last evolution rank a line needs for this strategy to have a
    /// sequential-evolution transformation.
    pub fn required_line_rank(self) -> i32 {
        match self {
            Strategy::SixCard => 2,
            Strategy::NineCard => 3,
            Strategy::Standard | Strategy::Mixed | Strategy::Perfect => 0,
        }
    }

    /// Number of first-stage cards consumed to reach `rank`, where the
    /// strategy fixes it.
    pub fn card_count(self, rank: i32) -> Option<u32> {
        match self {
            Strategy::SixCard => Some(6),
            Strategy::NineCard => Some(9),
            Strategy::Perfect if (0..=4).contains(&rank) => Some(1 << rank),
            _ => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Standard => f.write_str("standard evolution"),
            Strategy::Mixed => f.write_str("mixed evolution"),
            Strategy::SixCard => f.write_str("6 card evolution"),
            Strategy::NineCard => f.write_str("9 card evolution"),
            Strategy::Perfect => f.write_str("perfect evolution"),
        }
    }
}
