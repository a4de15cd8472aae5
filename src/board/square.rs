//! Square definitions and metadata for the standard board.
//!
//! Each of the 40 squares carries a name and a kind; property-bearing
//! kinds also carry pricing metadata. The full layout lives in
//! `board::layout` as a compile-time table.

use serde::{Deserialize, Serialize};

/// The color groups that street properties belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColorGroup {
    Brown,
    LightBlue,
    Pink,
    Orange,
    Red,
    Yellow,
    Green,
    Blue,
}

/// All color groups in board order.
pub const ALL_COLORS: [ColorGroup; 8] = [
    ColorGroup::Brown,
    ColorGroup::LightBlue,
    ColorGroup::Pink,
    ColorGroup::Orange,
    ColorGroup::Red,
    ColorGroup::Yellow,
    ColorGroup::Green,
    ColorGroup::Blue,
];

/// What a player finds on a board square.
///
/// `Go` and `FreeParking` are both no-ops on landing; they are distinct
/// variants so the canonical layout is reproduced exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SquareKind {
    Go,
    Property {
        color: ColorGroup,
        price: f64,
        base_rent: f64,
    },
    Railroad {
        price: f64,
    },
    Utility {
        price: f64,
    },
    Tax {
        amount: f64,
    },
    Chance,
    CommunityChest,
    Jail,
    GoToJail,
    FreeParking,
}

impl SquareKind {
    /// Returns true for kinds that are instantiated as ownable assets.
    pub fn is_ownable(&self) -> bool {
        matches!(
            self,
            SquareKind::Property { .. } | SquareKind::Railroad { .. } | SquareKind::Utility { .. }
        )
    }
}

/// A single board square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Square {
    pub name: &'static str,
    pub kind: SquareKind,
}

impl Square {
    pub const fn new(name: &'static str, kind: SquareKind) -> Self {
        Square { name, kind }
    }
}
