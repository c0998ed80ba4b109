//! Stat triple module.
//!
//! Every resolved value in the engine is a `StatTriple` of attack, defense
//! and soldiers. Arithmetic follows the game's integer rules: scaling by a
//! rate truncates toward zero immediately after each multiplication.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Which stored stat set of a card is used: level 1 or max level.
///
/// # Examples
///
/// ```rust
/// use evostat::Level;
///
/// assert_eq!(Level::ALL, [Level::Base, Level::Max]);
/// assert_eq!(Level::Max.to_string(), "max");
/// ```
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Level 1.
    Base,
    /// Max character level for the card's rarity.
    Max,
}

impl Level {
    /// Both levels, base first.
    pub const ALL: [Level; 2] = [Level::Base, Level::Max];
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Base => f.write_str("base"),
            Level::Max => f.write_str("max"),
        }
    }
}

/// Attack, defense and soldier count.
///
/// Values are plain integers. Negative intermediate values are possible
/// (an awakening delta can be negative) and are kept as-is.
///
/// # Examples
///
/// ```rust
/// use evostat::StatTriple;
///
/// let a = StatTriple::new(300, 250, 1000);
/// let b = StatTriple::new(10, 20, 30);
///
/// assert_eq!(a + b, StatTriple::new(310, 270, 1030));
/// assert_eq!(a - b, StatTriple::new(290, 230, 970));
///
/// // 0.15 * 300 = 45, 0.15 * 250 = 37.5 -> 37, 0.15 * 1000 = 150
/// assert_eq!(a.scale(0.15), StatTriple::new(45, 37, 150));
/// ```
#[derive(Debug, Clone, Copy, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatTriple {
    /// Attack.
    pub attack: i64,
    /// Defense.
    pub defense: i64,
    /// Soldier count.
    pub soldiers: i64,
}

impl StatTriple {
    /// Create a new stat triple.
    pub const fn new(attack: i64, defense: i64, soldiers: i64) -> Self {
        Self {
            attack,
            defense,
            soldiers,
        }
    }

    /// Multiply every stat by `factor`, truncating each result toward zero.
    pub fn scale(self, factor: f64) -> Self {
        self.map(|value| truncate(value, factor))
    }

    /// Clamp every stat to the matching value of `limit`.
    pub fn min_each(self, limit: StatTriple) -> Self {
        Self {
            attack: self.attack.min(limit.attack),
            defense: self.defense.min(limit.defense),
            soldiers: self.soldiers.min(limit.soldiers),
        }
    }

    /// `true` when every stat is `>=` the matching stat of `other`.
    pub fn dominates(&self, other: &StatTriple) -> bool {
        self.attack >= other.attack
            && self.defense >= other.defense
            && self.soldiers >= other.soldiers
    }

    /// Apply `f` to each stat.
    pub fn map(self, f: impl Fn(i64) -> i64) -> Self {
        Self {
            attack: f(self.attack),
            defense: f(self.defense),
            soldiers: f(self.soldiers),
        }
    }
}

/// `value * factor`, truncated toward zero.
pub(crate) fn truncate(value: i64, factor: f64) -> i64 {
    // `as` saturates and truncates toward zero, the game's integer conversion
    (value as f64 * factor) as i64
}

impl Add for StatTriple {
    type Output = StatTriple;

    fn add(self, rhs: StatTriple) -> StatTriple {
        StatTriple {
            attack: self.attack + rhs.attack,
            defense: self.defense + rhs.defense,
            soldiers: self.soldiers + rhs.soldiers,
        }
    }
}

impl Sub for StatTriple {
    type Output = StatTriple;

    fn sub(self, rhs: StatTriple) -> StatTriple {
        StatTriple {
            attack: self.attack - rhs.attack,
            defense: self.defense - rhs.defense,
            soldiers: self.soldiers - rhs.soldiers,
        }
    }
}

impl Mul<i64> for StatTriple {
    type Output = StatTriple;

    fn mul(self, rhs: i64) -> StatTriple {
        self.map(|value| value * rhs)
    }
}

impl fmt::Display for StatTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.attack, self.defense, self.soldiers)
    }
}
