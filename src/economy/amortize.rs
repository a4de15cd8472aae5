//! Amortizing-loan math: nominal payments and term solving.

use super::EconomyError;

/// The shortest loan term the solver will quote, in periods.
pub const MIN_LOAN_TERM: u32 = 1;

/// The longest loan term the solver will quote, in periods.
pub const MAX_LOAN_TERM: u32 = 40;

/// The fixed periodic payment that fully amortizes `principal` over `term`
/// periods at periodic rate `rate`. A zero rate degenerates to straight
/// division.
pub fn nominal_payment(principal: f64, rate: f64, term: u32) -> Result<f64, EconomyError> {
    let n = f64::from(term.max(1));
    let payment = if rate <= 0.0 {
        principal / n
    } else {
        principal * rate / (1.0 - (1.0 + rate).powf(-n))
    };
    if !payment.is_finite() {
        return Err(EconomyError::NonFiniteAmount {
            context: "nominal payment",
            value: payment,
        });
    }
    Ok(payment)
}

/// The number of periods needed to amortize `principal` at `rate` with a
/// fixed periodic `payment`, clamped to `[MIN_LOAN_TERM, MAX_LOAN_TERM]`.
///
/// A non-positive payment never amortizes (max term); a payment covering
/// the whole principal clears in one period (min term); a payment that
/// cannot cover the periodic interest drives the log argument non-positive
/// and also never amortizes (max term).
pub fn term_for_payment(principal: f64, rate: f64, payment: f64) -> u32 {
    if payment <= 0.0 {
        return MAX_LOAN_TERM;
    }
    if payment >= principal {
        return MIN_LOAN_TERM;
    }
    if rate <= 0.0 {
        let n = (principal / payment).ceil();
        return (n as u32).clamp(MIN_LOAN_TERM, MAX_LOAN_TERM);
    }
    let arg = 1.0 - rate * principal / payment;
    if arg <= 0.0 {
        return MAX_LOAN_TERM;
    }
    let n = -arg.ln() / (1.0 + rate).ln();
    // Payments quoted from nominal_payment land on an exact integer term;
    // keep float error from pushing the ceil one period over.
    ((n - 1e-9).ceil() as u32).clamp(MIN_LOAN_TERM, MAX_LOAN_TERM)
}
