use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Money, Rate};

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Monthly discount rate from an annual rate by simple division (annual / 12).
///
/// This is not the compounded-equivalent rate `(1 + r)^(1/12) - 1`; lease
/// liabilities are measured against the nominal monthly rate.
pub fn monthly_discount_rate(annual_rate: Rate) -> Rate {
    annual_rate / MONTHS_PER_YEAR
}

/// Present value of a monthly payment stream paid in arrears.
///
/// The first payment is discounted one full period, the n-th payment n periods.
/// Once the compounded factor leaves the decimal range the remaining payments
/// are worth nothing at cent precision and are dropped.
pub fn pv_of_payment_stream(payments: &[Money], monthly_rate: Rate) -> Money {
    let mut pv = Decimal::ZERO;
    let mut discount_factor = Decimal::ONE;
    let one_plus_r = Decimal::ONE + monthly_rate;
    for payment in payments {
        discount_factor = match discount_factor.checked_mul(one_plus_r) {
            Some(factor) => factor,
            None => break,
        };
        if let Some(discounted) = payment.checked_div(discount_factor) {
            pv += discounted;
        }
    }
    pv
}
