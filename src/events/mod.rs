//! The typed event taxonomy and the event bus.
//!
//! Every state transition is an `Event`; the bus in `events::bus` applies
//! them to the `GameState`, appends them to an immutable log, and drains
//! cascaded follow-ups from an explicit work queue.

pub mod bus;

use serde::{Deserialize, Serialize};

use crate::state::{Loan, LoanId, PlayerId, PropertyId};

pub use bus::{EngineError, EventBus, Observer};

/// Why a player left jail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JailRelease {
    /// Rolled doubles while jailed.
    Doubles,
    /// Paid the fine.
    Pay,
    /// Spent a get-out-of-jail card.
    Card,
    /// Sat out the configured jail duration.
    Served,
}

/// Why cash moved to or from the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentReason {
    Tax,
    PayToGetOutOfJail,
    GoSalary,
    UpgradeCost,
    DowngradeRefund,
}

/// Which card deck a draw came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeckKind {
    Chance,
    CommunityChest,
}

/// A logged event: the kind plus its resolved turn/order stamps. The
/// `order` stamp is the event's index in the log, so the log is totally
/// ordered and replays byte-for-byte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub turn: u64,
    pub order: u64,
    pub kind: EventKind,
}

/// Every state transition the engine knows. The bus dispatch over this
/// enum is compiler-exhaustive; adding a variant without a handler is a
/// compile error, not a silently ignored event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EventKind {
    /// A dice roll is recorded on the player.
    Roll { player: PlayerId, die1: u8, die2: u8 },
    /// The player advances by their last roll, triggering landing effects.
    PlayerMove { player: PlayerId },
    /// The player is sent to jail.
    GoToJail { player: PlayerId },
    /// The player leaves jail.
    GetOutOfJail {
        player: PlayerId,
        reason: JailRelease,
    },
    /// The player draws from a deck. Card effects are stubbed; the deck
    /// rotates so draws replay identically.
    DrawCard { player: PlayerId, deck: DeckKind },
    /// The player pays rent on an asset; the amount is computed from state
    /// at application time, not at synthesis time.
    RentPayment {
        property: PropertyId,
        player: PlayerId,
    },
    /// The player pays the bank (cash is burned).
    PayBank {
        player: PlayerId,
        amount: f64,
        reason: PaymentReason,
    },
    /// The bank pays the player (cash is minted).
    BankPayPlayer {
        player: PlayerId,
        amount: f64,
        reason: PaymentReason,
    },
    /// Ownership of an asset moves, with payment.
    PropertyTransfer {
        from: PlayerId,
        to: PlayerId,
        property: PropertyId,
        amount: f64,
    },
    /// A street moves one improvement level up.
    PropertyUpgrade { property: PropertyId },
    /// A street moves one improvement level down.
    PropertyDowngrade { property: PropertyId },
    /// A loan is registered and its principal disbursed.
    LoanCreation { loan: Loan },
    /// A payment against a loan: interest first, then principal.
    LoanPayment { loan: LoanId, amount: f64 },
    /// The debtor settles the loan's full current balance.
    PlayerPayOffLoan { loan: LoanId },
    /// The loan moves to a new creditor for a price.
    LoanTransfer {
        loan: LoanId,
        from: PlayerId,
        to: PlayerId,
        amount: f64,
    },
    /// One period of interest accrues on the loan.
    LoanInterestAccrued { loan: LoanId },
    /// A variable-rate loan is repriced.
    LoanRateChanged { loan: LoanId, rate: f64 },
    /// The player's credit rating is recomputed from current state.
    CreditReview { player: PlayerId },
    /// The current player's turn is over; the turn index advances.
    PlayerTurnEnded { player: PlayerId },
    /// All players have acted; the global turn counter advances and the
    /// turn index resets.
    TurnEnded,
}
