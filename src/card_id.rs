//! Card identifier module.
//!
//! Provides the `CardId` type, the numeric key every catalog table and
//! lineage index is keyed by.

use serde::{Deserialize, Serialize};

/// Numeric identifier of a card.
///
/// Master data uses signed integers where `0` or `-1` mean "no card";
/// those sentinels never become a `CardId` (see [`CardId::from_raw`]).
///
/// # Examples
///
/// ```rust
/// use evostat::CardId;
///
/// let id = CardId::new(1042);
/// assert_eq!(id.get(), 1042);
/// assert_eq!(id.to_string(), "1042");
///
/// assert_eq!(CardId::from_raw(1042), Some(id));
/// assert_eq!(CardId::from_raw(-1), None);
/// assert_eq!(CardId::from_raw(0), None);
/// ```
#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CardId(u32);

impl CardId {
    /// Create a `CardId` from its numeric value.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Convert a raw master-data reference into a `CardId`.
    ///
    /// Returns `None` for the "no card" sentinels (`<= 0`) and for values
    /// that do not fit a card identifier.
    pub fn from_raw(raw: i64) -> Option<Self> {
        if raw <= 0 {
            return None;
        }
        u32::try_from(raw).ok().map(Self)
    }

    /// Get the numeric value of this `CardId`.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for CardId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
