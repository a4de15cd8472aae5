//! Property improvement levels and valuation.

use serde::{Deserialize, Serialize};

use super::EconomyError;

/// The number of improvement steps, from unimproved through skyscraper.
pub const LEVEL_COUNT: usize = 7;

/// The improvement stage of a street property.
///
/// A 7-step ordinal scale: unimproved, one through four houses, hotel,
/// skyscraper. Drives both rent and valuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ImprovementLevel {
    Unimproved = 0,
    OneHouse = 1,
    TwoHouses = 2,
    ThreeHouses = 3,
    FourHouses = 4,
    Hotel = 5,
    Skyscraper = 6,
}

/// All improvement levels in ascending order.
pub const ALL_LEVELS: [ImprovementLevel; LEVEL_COUNT] = [
    ImprovementLevel::Unimproved,
    ImprovementLevel::OneHouse,
    ImprovementLevel::TwoHouses,
    ImprovementLevel::ThreeHouses,
    ImprovementLevel::FourHouses,
    ImprovementLevel::Hotel,
    ImprovementLevel::Skyscraper,
];

impl ImprovementLevel {
    pub fn index(self) -> usize {
        self as usize
    }

    /// The next level up, or `None` at skyscraper.
    pub fn next(self) -> Option<ImprovementLevel> {
        ALL_LEVELS.get(self.index() + 1).copied()
    }

    /// The next level down, or `None` at unimproved.
    pub fn prev(self) -> Option<ImprovementLevel> {
        self.index().checked_sub(1).map(|i| ALL_LEVELS[i])
    }
}

/// Real-value multiplier per improvement level. Strictly increasing.
const LEVEL_VALUE_MULTIPLIER: [f64; LEVEL_COUNT] = [1.0, 1.6, 2.2, 2.8, 3.4, 4.2, 5.0];

/// The intrinsic ("real") value of a street property at a given level.
pub fn valuation(base_price: f64, level: ImprovementLevel) -> f64 {
    base_price * LEVEL_VALUE_MULTIPLIER[level.index()]
}

/// The cost of moving a property between improvement levels: the valuation
/// delta. Negative when `to` is below `from` (a downgrade).
pub fn upgrade_cost(
    base_price: f64,
    from: ImprovementLevel,
    to: ImprovementLevel,
) -> Result<f64, EconomyError> {
    let cost = valuation(base_price, to) - valuation(base_price, from);
    if !cost.is_finite() {
        return Err(EconomyError::NonFiniteAmount {
            context: "upgrade cost",
            value: cost,
        });
    }
    Ok(cost)
}
