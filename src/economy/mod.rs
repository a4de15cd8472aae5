//! Economic calculators.
//!
//! Pure functions over primitive inputs: credit-rating scoring, loan
//! amortization math, and rent/valuation formulas. Nothing in this module
//! reads or mutates game state.

pub mod amortize;
pub mod credit;
pub mod rent;
pub mod value;

use thiserror::Error;

pub use amortize::{nominal_payment, term_for_payment, MAX_LOAN_TERM, MIN_LOAN_TERM};
pub use credit::{credit_rating, credit_score, CreditProfile, CreditRating};
pub use rent::{railroad_rent, street_rent, utility_rent, RAILROAD_RENT, UTILITY_MULTIPLIER};
pub use value::{upgrade_cost, valuation, ImprovementLevel, LEVEL_COUNT};

/// Errors from the economic calculators. All of these are data-integrity
/// violations, not recoverable business outcomes.
#[derive(Debug, Error, PartialEq)]
pub enum EconomyError {
    #[error("credit score computation produced a non-finite value ({0})")]
    NonFiniteScore(f64),

    #[error("{context} produced a non-finite amount ({value})")]
    NonFiniteAmount { context: &'static str, value: f64 },
}
