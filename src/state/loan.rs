//! Loan records and their lifecycle arithmetic.

use serde::{Deserialize, Serialize};

use super::{LoanId, PlayerId, StateError};

/// Whether a loan's rate can move after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateKind {
    Fixed,
    Variable,
}

/// How a payment amount was split between interest and principal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentSplit {
    pub interest_paid: f64,
    pub principal_paid: f64,
}

impl PaymentSplit {
    /// The cash that actually changed hands.
    pub fn total(self) -> f64 {
        self.interest_paid + self.principal_paid
    }
}

/// A loan between two players (or a player and the bank).
///
/// The outstanding balance is `remaining_principal + remaining_interest`
/// and never goes negative; `nullify` forces both to zero for defaults
/// and forgiveness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub creditor: PlayerId,
    pub debtor: PlayerId,
    pub rate: f64,
    pub rate_kind: RateKind,
    remaining_principal: f64,
    remaining_interest: f64,
    /// Immutable after creation.
    pub initial_principal: f64,
    /// Term in periods.
    pub term: u32,
}

impl Loan {
    pub fn new(
        id: LoanId,
        creditor: PlayerId,
        debtor: PlayerId,
        principal: f64,
        rate: f64,
        rate_kind: RateKind,
        term: u32,
    ) -> Result<Loan, StateError> {
        if !principal.is_finite() || principal < 0.0 {
            return Err(StateError::InvalidAmount(principal));
        }
        if !rate.is_finite() || rate < 0.0 {
            return Err(StateError::InvalidRate(rate));
        }
        Ok(Loan {
            id,
            creditor,
            debtor,
            rate,
            rate_kind,
            remaining_principal: principal,
            remaining_interest: 0.0,
            initial_principal: principal,
            term,
        })
    }

    pub fn remaining_principal(&self) -> f64 {
        self.remaining_principal
    }

    pub fn remaining_interest(&self) -> f64 {
        self.remaining_interest
    }

    /// Outstanding balance: principal plus accrued interest.
    pub fn current_balance(&self) -> f64 {
        self.remaining_principal + self.remaining_interest
    }

    /// A loan is functionally destroyed once its balance reaches zero.
    pub fn is_settled(&self) -> bool {
        self.current_balance() == 0.0
    }

    /// Applies a payment: interest is paid down before principal, and any
    /// amount beyond the outstanding balance is ignored, so the balance
    /// never goes negative. Returns the effective split.
    pub fn apply_payment(&mut self, amount: f64) -> Result<PaymentSplit, StateError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(StateError::InvalidAmount(amount));
        }
        let interest_paid = amount.min(self.remaining_interest);
        self.remaining_interest -= interest_paid;
        let principal_paid = (amount - interest_paid).min(self.remaining_principal);
        self.remaining_principal -= principal_paid;
        Ok(PaymentSplit {
            interest_paid,
            principal_paid,
        })
    }

    /// Accrues one period of interest on the remaining principal.
    pub fn accrue_interest(&mut self) -> Result<f64, StateError> {
        let accrued = self.remaining_principal * self.rate;
        if !accrued.is_finite() {
            return Err(StateError::InvalidAmount(accrued));
        }
        self.remaining_interest += accrued;
        Ok(accrued)
    }

    /// Changes the rate. Only variable-rate loans may be repriced.
    pub fn set_rate(&mut self, rate: f64) -> Result<(), StateError> {
        if self.rate_kind == RateKind::Fixed {
            return Err(StateError::RateChangeOnFixedLoan(self.id));
        }
        if !rate.is_finite() || rate < 0.0 {
            return Err(StateError::InvalidRate(rate));
        }
        self.rate = rate;
        Ok(())
    }

    /// Zeroes the balance outright (default or forgiveness).
    pub fn nullify(&mut self) {
        self.remaining_principal = 0.0;
        self.remaining_interest = 0.0;
    }
}
