//! Credit-rating scoring.
//!
//! A heuristic creditworthiness score in [0, 1] computed from leverage,
//! expense load, debt-to-income, and income-to-asset components, then
//! de-normalized linearly onto the ordinal rating scale.

use serde::{Deserialize, Serialize};

use super::EconomyError;

/// Ordinal creditworthiness, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CreditRating {
    D = 0,
    C = 1,
    CC = 2,
    CCC = 3,
    B = 4,
    BB = 5,
    BBB = 6,
    A = 7,
    AA = 8,
    AAA = 9,
}

/// All ratings in ascending order of creditworthiness.
pub const ALL_RATINGS: [CreditRating; 10] = [
    CreditRating::D,
    CreditRating::C,
    CreditRating::CC,
    CreditRating::CCC,
    CreditRating::B,
    CreditRating::BB,
    CreditRating::BBB,
    CreditRating::A,
    CreditRating::AA,
    CreditRating::AAA,
];

impl CreditRating {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The financial inputs to the credit scorer, all per a single player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreditProfile {
    /// Outstanding balance across all debt loans.
    pub total_debt: f64,
    /// Periodic servicing cost of debt loans.
    pub loan_expenses_per_turn: f64,
    /// Periodic non-loan expenses.
    pub other_expenses_per_turn: f64,
    /// Periodic income.
    pub income_per_turn: f64,
    /// Cash plus real value of held assets.
    pub total_assets: f64,
}

const LEVERAGE_WEIGHT: f64 = 0.35;
const EXPENSE_WEIGHT: f64 = 0.15;
const DEBT_INCOME_WEIGHT: f64 = 0.35;
const INCOME_ASSET_WEIGHT: f64 = 0.15;

/// Applied instead of the leverage and expense components when a player
/// holds no assets at all; avoids dividing by zero.
const ZERO_ASSET_PENALTY: f64 = 0.5;

/// Applied instead of the debt-to-income component when a player has no
/// income.
const ZERO_INCOME_PENALTY: f64 = 0.5;

/// Squashes a non-negative ratio into [0, 1).
fn squash(x: f64) -> f64 {
    x / (1.0 + x)
}

/// The raw credit score in [0, 1]. A non-finite intermediate is a fatal
/// invariant violation.
pub fn credit_score(profile: &CreditProfile) -> Result<f64, EconomyError> {
    let mut score = 1.0;

    if profile.total_assets > 0.0 {
        let leverage = profile.total_debt / profile.total_assets;
        let expense_ratio = (profile.loan_expenses_per_turn + profile.other_expenses_per_turn)
            / profile.total_assets;
        score -= LEVERAGE_WEIGHT * squash(leverage);
        score -= EXPENSE_WEIGHT * squash(expense_ratio);
    } else {
        score -= ZERO_ASSET_PENALTY;
    }

    if profile.income_per_turn > 0.0 {
        let debt_to_income = profile.total_debt / profile.income_per_turn;
        score -= DEBT_INCOME_WEIGHT * squash(debt_to_income);
        if profile.total_assets > 0.0 {
            let income_ratio = profile.income_per_turn / profile.total_assets;
            score += INCOME_ASSET_WEIGHT * squash(income_ratio);
        }
    } else {
        score -= ZERO_INCOME_PENALTY;
    }

    if !score.is_finite() {
        return Err(EconomyError::NonFiniteScore(score));
    }
    Ok(score.clamp(0.0, 1.0))
}

/// Maps a profile onto the ordinal rating scale: the score is scaled
/// linearly across the ten steps and clamped to the scale's bounds.
pub fn credit_rating(profile: &CreditProfile) -> Result<CreditRating, EconomyError> {
    let score = credit_score(profile)?;
    let top = (ALL_RATINGS.len() - 1) as f64;
    let idx = (score * top).round() as usize;
    Ok(ALL_RATINGS[idx.min(ALL_RATINGS.len() - 1)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(debt: f64, loan_exp: f64, other_exp: f64, income: f64, assets: f64) -> CreditProfile {
        CreditProfile {
            total_debt: debt,
            loan_expenses_per_turn: loan_exp,
            other_expenses_per_turn: other_exp,
            income_per_turn: income,
            total_assets: assets,
        }
    }

    #[test]
    fn debt_free_earner_is_aaa() {
        let p = profile(0.0, 0.0, 0.0, 500.0, 3000.0);
        assert_eq!(credit_rating(&p).unwrap(), CreditRating::AAA);
    }

    #[test]
    fn penniless_debtor_is_d() {
        let p = profile(17000.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(credit_rating(&p).unwrap(), CreditRating::D);
    }

    #[test]
    fn score_is_deterministic() {
        let p = profile(4000.0, 120.0, 50.0, 300.0, 6000.0);
        let a = credit_score(&p).unwrap();
        let b = credit_score(&p).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn more_debt_never_improves_the_score() {
        let light = profile(1000.0, 50.0, 0.0, 400.0, 5000.0);
        let heavy = profile(9000.0, 450.0, 0.0, 400.0, 5000.0);
        assert!(credit_score(&heavy).unwrap() < credit_score(&light).unwrap());
    }

    #[test]
    fn score_stays_in_unit_interval() {
        let cases = [
            profile(0.0, 0.0, 0.0, 0.0, 0.0),
            profile(1e12, 1e9, 1e9, 1.0, 1.0),
            profile(0.0, 0.0, 0.0, 1e12, 1.0),
        ];
        for p in cases {
            let s = credit_score(&p).unwrap();
            assert!((0.0..=1.0).contains(&s), "score {} out of range", s);
        }
    }

    #[test]
    fn rating_scale_is_ordered() {
        for pair in ALL_RATINGS.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}
