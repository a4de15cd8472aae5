//! Player records.
//!
//! Cash is only ever touched through `add_cash`/`subtract_cash`, which
//! fail fast if the balance stops being a finite number.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::economy::CreditRating;

use super::{LoanId, PlayerId, PropertyId, StateError};

/// A recorded two-die roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub die1: u8,
    pub die2: u8,
}

impl DiceRoll {
    pub fn total(self) -> u8 {
        self.die1 + self.die2
    }

    pub fn is_double(self) -> bool {
        self.die1 == self.die2
    }
}

/// A player's canonical record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    cash: f64,
    pub position: usize,
    pub in_jail: bool,
    /// Global turn on which the player entered jail, while jailed.
    pub jail_entered_turn: Option<u64>,
    pub credit_rating: CreditRating,
    /// Maximum total debt this player may carry.
    pub credit_limit: f64,
    /// Minimum rating this player demands of a debtor before lending.
    pub lending_threshold: CreditRating,
    pub properties: BTreeSet<PropertyId>,
    /// Loans on which this player is the creditor.
    pub credit_loans: BTreeSet<LoanId>,
    /// Loans on which this player is the debtor.
    pub debt_loans: BTreeSet<LoanId>,
    /// Derived; recomputed by the state aggregate after every mutation.
    pub net_worth: f64,
    pub last_roll: Option<DiceRoll>,
    pub jail_cards: u32,
}

impl Player {
    pub fn new(
        id: PlayerId,
        starting_cash: f64,
        credit_limit: f64,
        lending_threshold: CreditRating,
    ) -> Player {
        Player {
            id,
            cash: starting_cash,
            position: 0,
            in_jail: false,
            jail_entered_turn: None,
            credit_rating: CreditRating::BBB,
            credit_limit,
            lending_threshold,
            properties: BTreeSet::new(),
            credit_loans: BTreeSet::new(),
            debt_loans: BTreeSet::new(),
            net_worth: starting_cash,
            last_roll: None,
            jail_cards: 0,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Credits the player. Fails if the resulting balance is non-finite.
    pub fn add_cash(&mut self, amount: f64) -> Result<(), StateError> {
        self.set_cash(self.cash + amount)
    }

    /// Debits the player. The balance may go negative (bankruptcy handling
    /// is a caller concern) but never non-finite.
    pub fn subtract_cash(&mut self, amount: f64) -> Result<(), StateError> {
        self.set_cash(self.cash - amount)
    }

    fn set_cash(&mut self, value: f64) -> Result<(), StateError> {
        if !value.is_finite() {
            return Err(StateError::NonFiniteCash {
                player: self.id,
                value,
            });
        }
        self.cash = value;
        Ok(())
    }

    /// Marks the player jailed as of the given global turn.
    pub fn enter_jail(&mut self, position: usize, turn: u64) {
        self.position = position;
        self.in_jail = true;
        self.jail_entered_turn = Some(turn);
    }

    /// Clears jail state.
    pub fn leave_jail(&mut self) {
        self.in_jail = false;
        self.jail_entered_turn = None;
    }

    /// Consumes one get-out-of-jail card.
    pub fn spend_jail_card(&mut self) -> Result<(), StateError> {
        if self.jail_cards == 0 {
            return Err(StateError::NoJailCard(self.id));
        }
        self.jail_cards -= 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(PlayerId(1), 1500.0, 2000.0, CreditRating::CCC)
    }

    #[test]
    fn cash_mutations_apply() {
        let mut p = player();
        p.add_cash(200.0).unwrap();
        p.subtract_cash(50.0).unwrap();
        assert_eq!(p.cash(), 1650.0);
    }

    #[test]
    fn cash_may_go_negative_but_never_nan() {
        let mut p = player();
        p.subtract_cash(2000.0).unwrap();
        assert_eq!(p.cash(), -500.0);

        let err = p.add_cash(f64::NAN).unwrap_err();
        assert!(matches!(err, StateError::NonFiniteCash { .. }));
        // The failed mutation must not have been applied.
        assert_eq!(p.cash(), -500.0);
    }

    #[test]
    fn infinite_cash_is_rejected() {
        let mut p = player();
        assert!(p.add_cash(f64::INFINITY).is_err());
        assert_eq!(p.cash(), 1500.0);
    }

    #[test]
    fn jail_card_bookkeeping() {
        let mut p = player();
        assert_eq!(p.spend_jail_card(), Err(StateError::NoJailCard(PlayerId(1))));
        p.jail_cards = 1;
        p.spend_jail_card().unwrap();
        assert_eq!(p.jail_cards, 0);
    }

    #[test]
    fn dice_roll_helpers() {
        let roll = DiceRoll { die1: 3, die2: 3 };
        assert_eq!(roll.total(), 6);
        assert!(roll.is_double());
        assert!(!DiceRoll { die1: 2, die2: 5 }.is_double());
    }
}
