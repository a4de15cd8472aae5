//! The decision-maker capability contract.
//!
//! Decision makers are external collaborators (humans, heuristics, bank
//! policy); the core only consumes this trait. A declined quote is a
//! normal outcome, an unimplemented capability is an explicit signal, and
//! a timed-out request is distinct from both. Every method defaults to
//! `Unsupported`, so partial collaborators are well-defined.

use serde::{Deserialize, Serialize};

use crate::state::{GameState, LoanId, PlayerId, PropertyId, RateKind};

/// The outcome of asking a decision maker for something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision<T> {
    /// The collaborator said yes, with its answer.
    Accepted(T),
    /// The collaborator said no. This is an expected outcome, never an
    /// error.
    Declined,
    /// The collaborator does not implement this capability.
    Unsupported,
    /// The collaborator did not answer in time. The orchestrator treats
    /// this as a decline but reports it separately.
    TimedOut,
}

impl<T> Decision<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Decision::Accepted(_))
    }

    /// The accepted value, if any.
    pub fn accepted(self) -> Option<T> {
        match self {
            Decision::Accepted(value) => Some(value),
            _ => None,
        }
    }
}

/// A proposed loan awaiting acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanQuote {
    pub creditor: PlayerId,
    pub debtor: PlayerId,
    pub principal: f64,
    pub rate: f64,
    pub rate_kind: RateKind,
    pub term: u32,
}

/// A proposed property sale awaiting acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropertyQuote {
    pub property: PropertyId,
    pub seller: PlayerId,
    pub buyer: PlayerId,
    pub amount: f64,
}

/// How a player wants to fund a payment they cannot cover from cash.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FinancingPlan {
    /// Pay from cash anyway (going negative is the player's problem).
    Cash,
    /// Borrow against the payment.
    Borrow(LoanQuote),
}

/// An optional end-of-turn action a player may take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionalAction {
    Upgrade(PropertyId),
    Downgrade(PropertyId),
    PayOffLoan(LoanId),
    /// Offer a property to another player.
    OfferProperty(PropertyQuote),
    /// Offer to sell a held loan to another creditor.
    OfferLoan { loan: LoanId, to: PlayerId, amount: f64 },
    /// Ask a creditor for a loan of the given principal.
    Borrow { creditor: PlayerId, amount: f64 },
}

/// The capability contract consumed by the orchestrator. Calls may block
/// arbitrarily long on an external actor; the engine awaits each answer
/// sequentially.
pub trait DecisionMaker: Send {
    /// Would this player accept the offered property sale?
    fn accept_property_quote(&mut self, _state: &GameState, _quote: &PropertyQuote) -> Decision<()> {
        Decision::Unsupported
    }

    /// Would this player accept buying the offered loan from its creditor?
    fn accept_loan_transfer_quote(
        &mut self,
        _state: &GameState,
        _loan: LoanId,
        _amount: f64,
    ) -> Decision<()> {
        Decision::Unsupported
    }

    /// Quote a loan this player would extend to `debtor`.
    fn loan_quote_for_player(
        &mut self,
        _state: &GameState,
        _debtor: PlayerId,
        _amount: f64,
    ) -> Decision<LoanQuote> {
        Decision::Unsupported
    }

    /// Quote a price at which this player would sell `property` to `buyer`.
    fn purchase_quote_for_player(
        &mut self,
        _state: &GameState,
        _property: PropertyId,
        _buyer: PlayerId,
    ) -> Decision<PropertyQuote> {
        Decision::Unsupported
    }

    /// Buy the bank-owned property just landed on, at its market value?
    fn buy_property_from_bank(
        &mut self,
        _state: &GameState,
        _property: PropertyId,
        _price: f64,
    ) -> Decision<()> {
        Decision::Unsupported
    }

    /// Spend a get-out-of-jail card this turn?
    fn use_jail_card(&mut self, _state: &GameState, _player: PlayerId) -> Decision<()> {
        Decision::Unsupported
    }

    /// Pay the fine to leave jail this turn?
    fn pay_to_leave_jail(&mut self, _state: &GameState, _player: PlayerId) -> Decision<()> {
        Decision::Unsupported
    }

    /// How should this player fund a payment of `amount`?
    fn finance_payment(
        &mut self,
        _state: &GameState,
        _player: PlayerId,
        _amount: f64,
    ) -> Decision<FinancingPlan> {
        Decision::Unsupported
    }

    /// The player's cash is negative by `shortfall`; supply a loan quote
    /// that covers it.
    fn cover_cash_shortfall(
        &mut self,
        _state: &GameState,
        _player: PlayerId,
        _shortfall: f64,
    ) -> Decision<LoanQuote> {
        Decision::Unsupported
    }

    /// Optional actions to take at the end of the player's turn.
    fn optional_actions(
        &mut self,
        _state: &GameState,
        _player: PlayerId,
    ) -> Decision<Vec<OptionalAction>> {
        Decision::Unsupported
    }
}

/// A decision maker with no capabilities at all; stands in for absent or
/// placeholder collaborators.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDecisionMaker;

impl DecisionMaker for NullDecisionMaker {}
