//! Rent formulas for streets, railroads, and utilities.

use super::value::{ImprovementLevel, LEVEL_COUNT};

/// Rent multiplier per improvement level.
const RENT_LEVEL_MULTIPLIER: [f64; LEVEL_COUNT] = [1.0, 5.0, 15.0, 30.0, 45.0, 60.0, 75.0];

/// Railroad rent by number of railroads held by the same owner.
pub const RAILROAD_RENT: [f64; 5] = [0.0, 25.0, 50.0, 100.0, 200.0];

/// Utility roll multiplier by number of utilities held by the same owner.
pub const UTILITY_MULTIPLIER: [f64; 3] = [0.0, 4.0, 10.0];

/// Street rent: base rent scaled by the improvement level, doubled iff the
/// owner holds the full color group and the property is unimproved.
pub fn street_rent(base_rent: f64, level: ImprovementLevel, color_monopoly: bool) -> f64 {
    let rent = base_rent * RENT_LEVEL_MULTIPLIER[level.index()];
    if color_monopoly && level == ImprovementLevel::Unimproved {
        rent * 2.0
    } else {
        rent
    }
}

/// Railroad rent as a step function of the owner's railroad count.
pub fn railroad_rent(owned: usize) -> f64 {
    RAILROAD_RENT[owned.min(RAILROAD_RENT.len() - 1)]
}

/// Utility rent: the paying player's roll total scaled by the owner's
/// utility count. The caller is responsible for rejecting a payer with no
/// recorded roll.
pub fn utility_rent(owned: usize, roll_total: u8) -> f64 {
    f64::from(roll_total) * UTILITY_MULTIPLIER[owned.min(UTILITY_MULTIPLIER.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn street_rent_scales_with_level() {
        assert_eq!(street_rent(8.0, ImprovementLevel::Unimproved, false), 8.0);
        assert_eq!(street_rent(8.0, ImprovementLevel::OneHouse, false), 40.0);
        assert_eq!(street_rent(8.0, ImprovementLevel::Hotel, false), 480.0);
        assert_eq!(street_rent(8.0, ImprovementLevel::Skyscraper, false), 600.0);
    }

    #[test]
    fn monopoly_doubles_only_unimproved() {
        assert_eq!(street_rent(8.0, ImprovementLevel::Unimproved, true), 16.0);
        // An improved property already earns the level multiplier; no doubling.
        assert_eq!(street_rent(8.0, ImprovementLevel::OneHouse, true), 40.0);
    }

    #[test]
    fn railroad_rent_tiers() {
        assert_eq!(railroad_rent(0), 0.0);
        assert_eq!(railroad_rent(1), 25.0);
        assert_eq!(railroad_rent(2), 50.0);
        assert_eq!(railroad_rent(3), 100.0);
        assert_eq!(railroad_rent(4), 200.0);
        assert_eq!(railroad_rent(9), 200.0);
    }

    #[test]
    fn utility_rent_scales_with_roll() {
        assert_eq!(utility_rent(0, 7), 0.0);
        assert_eq!(utility_rent(1, 7), 28.0);
        assert_eq!(utility_rent(2, 7), 70.0);
        assert_eq!(utility_rent(2, 12), 120.0);
    }
}
