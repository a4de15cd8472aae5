//! Entity records, keyed stores, and the `GameState` aggregate.

pub mod asset;
pub mod game;
pub mod loan;
pub mod player;
pub mod stores;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use asset::{Asset, AssetKind, AssetTag, StreetData};
pub use game::{GameRules, GameState, Snapshot};
pub use loan::{Loan, PaymentSplit, RateKind};
pub use player::{DiceRoll, Player};
pub use stores::{AssetStore, LoanStore, PlayerStore};

/// A player identifier. `PlayerId::BANK` is the sentinel owner of
/// unsold assets and the counterparty of taxes and salaries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PlayerId(pub u32);

impl PlayerId {
    pub const BANK: PlayerId = PlayerId(0);

    pub fn is_bank(self) -> bool {
        self == PlayerId::BANK
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bank() {
            write!(f, "bank")
        } else {
            write!(f, "player-{}", self.0)
        }
    }
}

/// An asset (street/railroad/utility) identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PropertyId(pub u32);

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "property-{}", self.0)
    }
}

/// A loan identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct LoanId(pub u32);

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loan-{}", self.0)
    }
}

/// Errors raised by entity mutation and store access. Every variant is a
/// data-integrity violation that aborts the current operation.
#[derive(Debug, Error, PartialEq)]
pub enum StateError {
    #[error("cash for {player} became non-finite ({value})")]
    NonFiniteCash { player: PlayerId, value: f64 },

    #[error("payment amount is invalid ({0})")]
    InvalidAmount(f64),

    #[error("loan rate is invalid ({0})")]
    InvalidRate(f64),

    #[error("rate change on fixed-rate {0}")]
    RateChangeOnFixedLoan(LoanId),

    #[error("unknown {0}")]
    UnknownPlayer(PlayerId),

    #[error("unknown {0}")]
    UnknownAsset(PropertyId),

    #[error("unknown {0}")]
    UnknownLoan(LoanId),

    #[error("{0} already registered")]
    DuplicateLoan(LoanId),

    #[error("{property} is a {actual:?}, expected {expected:?}")]
    KindMismatch {
        property: PropertyId,
        expected: AssetTag,
        actual: AssetTag,
    },

    #[error("{0} is already at its maximum improvement level")]
    AtMaxImprovement(PropertyId),

    #[error("{0} is already unimproved")]
    AtMinImprovement(PropertyId),

    #[error("{0} holds no get-out-of-jail card")]
    NoJailCard(PlayerId),

    #[error("{player} does not hold {loan} as creditor")]
    NotCreditor { player: PlayerId, loan: LoanId },
}
