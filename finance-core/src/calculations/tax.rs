//! Progressive-bracket tax for payroll figures.
//!
//! Brackets are applied mechanically in the order given. They are expected to
//! be ascending and contiguous but are not validated; out-of-order or gapped
//! schedules produce whatever the slice-by-slice application yields.

use rust_decimal::Decimal;

use crate::TaxBracket;
use crate::calculations::common::divide_or_zero;

/// Tax owed on `income` under a progressive schedule.
///
/// Each bracket taxes the slice of the remaining income that fits inside it.
/// Processing stops as soon as no income remains, so zero or negative income
/// owes nothing.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use finance_core::TaxBracket;
/// use finance_core::calculations::calculate_progressive_tax;
///
/// let brackets = vec![
///     TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(0.10)),
///     TaxBracket::new(dec!(10000), Some(dec!(40000)), dec!(0.20)),
/// ];
///
/// assert_eq!(calculate_progressive_tax(dec!(25000), &brackets), dec!(4000));
/// ```
pub fn calculate_progressive_tax(
    income: Decimal,
    brackets: &[TaxBracket],
) -> Decimal {
    let mut remaining = income;
    let mut tax = Decimal::ZERO;

    for bracket in brackets {
        if remaining <= Decimal::ZERO {
            break;
        }
        let taxable = match bracket.width() {
            Some(width) => remaining.min(width),
            None => remaining,
        };
        tax += taxable * bracket.rate;
        remaining -= taxable;
    }

    tax
}

/// Share of `income` paid as tax, or zero when there is no positive income.
pub fn effective_tax_rate(
    income: Decimal,
    brackets: &[TaxBracket],
) -> Decimal {
    if income <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    divide_or_zero(calculate_progressive_tax(income, brackets), income)
}

/// Gross pay minus progressive tax.
pub fn net_pay(
    gross: Decimal,
    brackets: &[TaxBracket],
) -> Decimal {
    gross - calculate_progressive_tax(gross, brackets)
}
