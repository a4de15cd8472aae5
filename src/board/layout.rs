//! The canonical 40-square board and the `Board` topology type.
//!
//! The layout table must stay bit-for-bit stable: rent and valuation
//! formulas key off these prices and base rents.

use thiserror::Error;

use super::square::{ColorGroup, Square, SquareKind};

/// The number of squares on the standard board.
pub const SQUARE_COUNT: usize = 40;

const fn property(name: &'static str, color: ColorGroup, price: f64, base_rent: f64) -> Square {
    Square::new(
        name,
        SquareKind::Property {
            color,
            price,
            base_rent,
        },
    )
}

const fn railroad(name: &'static str) -> Square {
    Square::new(name, SquareKind::Railroad { price: 200.0 })
}

const fn utility(name: &'static str) -> Square {
    Square::new(name, SquareKind::Utility { price: 150.0 })
}

const fn tax(name: &'static str, amount: f64) -> Square {
    Square::new(name, SquareKind::Tax { amount })
}

/// The standard US board layout, clockwise from Go.
pub const STANDARD_LAYOUT: [Square; SQUARE_COUNT] = [
    Square::new("Go", SquareKind::Go),
    property("Mediterranean Avenue", ColorGroup::Brown, 60.0, 2.0),
    Square::new("Community Chest", SquareKind::CommunityChest),
    property("Baltic Avenue", ColorGroup::Brown, 60.0, 4.0),
    tax("Income Tax", 200.0),
    railroad("Reading Railroad"),
    property("Oriental Avenue", ColorGroup::LightBlue, 100.0, 6.0),
    Square::new("Chance", SquareKind::Chance),
    property("Vermont Avenue", ColorGroup::LightBlue, 100.0, 6.0),
    property("Connecticut Avenue", ColorGroup::LightBlue, 120.0, 8.0),
    Square::new("Jail", SquareKind::Jail),
    property("St. Charles Place", ColorGroup::Pink, 140.0, 10.0),
    utility("Electric Company"),
    property("States Avenue", ColorGroup::Pink, 140.0, 10.0),
    property("Virginia Avenue", ColorGroup::Pink, 160.0, 12.0),
    railroad("Pennsylvania Railroad"),
    property("St. James Place", ColorGroup::Orange, 180.0, 14.0),
    Square::new("Community Chest", SquareKind::CommunityChest),
    property("Tennessee Avenue", ColorGroup::Orange, 180.0, 14.0),
    property("New York Avenue", ColorGroup::Orange, 200.0, 16.0),
    Square::new("Free Parking", SquareKind::FreeParking),
    property("Kentucky Avenue", ColorGroup::Red, 220.0, 18.0),
    Square::new("Chance", SquareKind::Chance),
    property("Indiana Avenue", ColorGroup::Red, 220.0, 18.0),
    property("Illinois Avenue", ColorGroup::Red, 240.0, 20.0),
    railroad("B. & O. Railroad"),
    property("Atlantic Avenue", ColorGroup::Yellow, 260.0, 22.0),
    property("Ventnor Avenue", ColorGroup::Yellow, 260.0, 22.0),
    utility("Water Works"),
    property("Marvin Gardens", ColorGroup::Yellow, 280.0, 24.0),
    Square::new("Go To Jail", SquareKind::GoToJail),
    property("Pacific Avenue", ColorGroup::Green, 300.0, 26.0),
    property("North Carolina Avenue", ColorGroup::Green, 300.0, 26.0),
    Square::new("Community Chest", SquareKind::CommunityChest),
    property("Pennsylvania Avenue", ColorGroup::Green, 320.0, 28.0),
    railroad("Short Line"),
    Square::new("Chance", SquareKind::Chance),
    property("Park Place", ColorGroup::Blue, 350.0, 35.0),
    tax("Luxury Tax", 100.0),
    property("Boardwalk", ColorGroup::Blue, 400.0, 50.0),
];

/// Errors detected when constructing a board from a custom layout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("board must have at least one square")]
    Empty,

    #[error("board must contain exactly one jail square, found {0}")]
    JailCount(usize),
}

/// Immutable board topology: an ordered sequence of squares where the
/// vector index is the board position.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    squares: Vec<Square>,
    jail_position: usize,
}

impl Board {
    /// Creates the standard 40-square board.
    pub fn standard() -> Board {
        Board::custom(STANDARD_LAYOUT.to_vec()).expect("standard layout is valid")
    }

    /// Creates a board from a custom layout, validating its invariants:
    /// non-empty and exactly one jail square.
    pub fn custom(squares: Vec<Square>) -> Result<Board, BoardError> {
        if squares.is_empty() {
            return Err(BoardError::Empty);
        }
        let jails: Vec<usize> = squares
            .iter()
            .enumerate()
            .filter(|(_, sq)| matches!(sq.kind, SquareKind::Jail))
            .map(|(i, _)| i)
            .collect();
        if jails.len() != 1 {
            return Err(BoardError::JailCount(jails.len()));
        }
        Ok(Board {
            jail_position: jails[0],
            squares,
        })
    }

    pub fn len(&self) -> usize {
        self.squares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }

    /// The square at a board position. Positions are always reduced modulo
    /// the board length by movement, so this indexes directly.
    pub fn square(&self, position: usize) -> &Square {
        &self.squares[position]
    }

    pub fn squares(&self) -> &[Square] {
        &self.squares
    }

    /// The single jail position.
    pub fn jail_position(&self) -> usize {
        self.jail_position
    }

    /// Positions of all squares matching a predicate on their kind.
    pub fn positions_where<F>(&self, mut pred: F) -> Vec<usize>
    where
        F: FnMut(&SquareKind) -> bool,
    {
        self.squares
            .iter()
            .enumerate()
            .filter(|(_, sq)| pred(&sq.kind))
            .map(|(i, _)| i)
            .collect()
    }

    /// Positions of all railroad squares.
    pub fn railroad_positions(&self) -> Vec<usize> {
        self.positions_where(|k| matches!(k, SquareKind::Railroad { .. }))
    }

    /// Positions of all utility squares.
    pub fn utility_positions(&self) -> Vec<usize> {
        self.positions_where(|k| matches!(k, SquareKind::Utility { .. }))
    }

    /// Positions of all street properties in a color group.
    pub fn properties_of_color(&self, color: ColorGroup) -> Vec<usize> {
        self.positions_where(|k| matches!(k, SquareKind::Property { color: c, .. } if *c == color))
    }

    /// Positions of all ownable squares, in board order.
    pub fn ownable_positions(&self) -> Vec<usize> {
        self.positions_where(SquareKind::is_ownable)
    }
}
