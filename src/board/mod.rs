//! Board representation.
//!
//! Contains the immutable board topology, the square and color-group
//! types, and the canonical 40-square layout.

pub mod layout;
pub mod square;

pub use layout::{Board, BoardError, SQUARE_COUNT, STANDARD_LAYOUT};
pub use square::{ColorGroup, Square, SquareKind, ALL_COLORS};
