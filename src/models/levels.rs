use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LevelTableError {
    #[error("{side} level at index {index} is not finite")]
    NotFinite { side: &'static str, index: usize },

    #[error("{side} level {value} at index {index} is not positive")]
    NotPositive {
        side: &'static str,
        index: usize,
        value: f64,
    },

    #[error("{side} levels are not sorted ascending at index {index}")]
    Unsorted { side: &'static str, index: usize },

    #[error("{side} level {value} is outside the plausible range {min}..{max}")]
    OutOfRange {
        side: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Serialized shape of a levels file: `{"supports": [...], "resistances": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLevels {
    pub supports: Vec<f64>,
    pub resistances: Vec<f64>,
}

/// Institutional support and resistance levels for one instrument.
///
/// Both sides are sorted ascending and hold only positive finite prices
/// inside the instrument's plausible range. The table cannot be changed
/// once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelTable {
    supports: Vec<f64>,
    resistances: Vec<f64>,
}

impl LevelTable {
    pub fn new(
        supports: Vec<f64>,
        resistances: Vec<f64>,
        min_price: f64,
        max_price: f64,
    ) -> Result<Self, LevelTableError> {
        check_side("support", &supports, min_price, max_price)?;
        check_side("resistance", &resistances, min_price, max_price)?;
        Ok(Self {
            supports,
            resistances,
        })
    }

    /// Build from tables known to satisfy the invariants (compiled-in defaults).
    pub(crate) fn new_unchecked(supports: Vec<f64>, resistances: Vec<f64>) -> Self {
        Self {
            supports,
            resistances,
        }
    }

    pub fn from_raw(raw: RawLevels, min_price: f64, max_price: f64) -> Result<Self, LevelTableError> {
        Self::new(raw.supports, raw.resistances, min_price, max_price)
    }

    pub fn supports(&self) -> &[f64] {
        &self.supports
    }

    pub fn resistances(&self) -> &[f64] {
        &self.resistances
    }

    /// Highest support strictly below `price`.
    pub fn nearest_support_below(&self, price: f64) -> Option<f64> {
        let idx = self.supports.partition_point(|&l| l < price);
        if idx == 0 {
            None
        } else {
            Some(self.supports[idx - 1])
        }
    }

    /// Lowest resistance strictly above `price`.
    pub fn nearest_resistance_above(&self, price: f64) -> Option<f64> {
        let idx = self.resistances.partition_point(|&l| l <= price);
        self.resistances.get(idx).copied()
    }
}

fn check_side(
    side: &'static str,
    levels: &[f64],
    min_price: f64,
    max_price: f64,
) -> Result<(), LevelTableError> {
    for (index, &value) in levels.iter().enumerate() {
        if !value.is_finite() {
            return Err(LevelTableError::NotFinite { side, index });
        }
        if value <= 0.0 {
            return Err(LevelTableError::NotPositive { side, index, value });
        }
        if value < min_price || value > max_price {
            return Err(LevelTableError::OutOfRange {
                side,
                value,
                min: min_price,
                max: max_price,
            });
        }
        if index > 0 && levels[index - 1] > value {
            return Err(LevelTableError::Unsorted { side, index });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> LevelTable {
        LevelTable::new(
            vec![1.0200, 1.0400, 1.0600],
            vec![1.0300, 1.0500, 1.0700],
            0.5,
            2.0,
        )
        .unwrap()
    }

    #[test]
    fn nearest_support_is_strictly_below() {
        let t = table();
        assert_eq!(t.nearest_support_below(1.0450), Some(1.0400));
        // A price sitting exactly on a level does not count it as "below"
        assert_eq!(t.nearest_support_below(1.0400), Some(1.0200));
        assert_eq!(t.nearest_support_below(1.0100), None);
    }

    #[test]
    fn nearest_resistance_is_strictly_above() {
        let t = table();
        assert_eq!(t.nearest_resistance_above(1.0450), Some(1.0500));
        assert_eq!(t.nearest_resistance_above(1.0500), Some(1.0700));
        assert_eq!(t.nearest_resistance_above(1.0800), None);
    }

    #[test]
    fn empty_side_is_allowed() {
        let t = LevelTable::new(vec![], vec![1.1], 0.5, 2.0).unwrap();
        assert_eq!(t.nearest_support_below(1.05), None);
        assert_eq!(t.nearest_resistance_above(1.05), Some(1.1));
    }

    #[test]
    fn rejects_unsorted_levels() {
        let err = LevelTable::new(vec![1.05, 1.04], vec![], 0.5, 2.0).unwrap_err();
        assert_eq!(
            err,
            LevelTableError::Unsorted {
                side: "support",
                index: 1
            }
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            LevelTable::new(vec![f64::NAN], vec![], 0.5, 2.0),
            Err(LevelTableError::NotFinite { .. })
        ));
        assert!(matches!(
            LevelTable::new(vec![], vec![-1.0], 0.5, 2.0),
            Err(LevelTableError::NotPositive { .. })
        ));
        assert!(matches!(
            LevelTable::new(vec![], vec![2.5], 0.5, 2.0),
            Err(LevelTableError::OutOfRange { .. })
        ));
    }
}
