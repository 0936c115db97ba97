//! Year-to-date and average aggregation of monthly records.

use rust_decimal::Decimal;

use crate::calculations::common::divide_or_zero;
use crate::models::{MonthlyRecord, YtdTotals};

/// Sums every field of `records`.
///
/// The `total` field is summed from the inputs' own totals, never recomputed
/// from the components. An empty slice yields all zeros.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use finance_core::MonthlyRecord;
/// use finance_core::calculations::calculate_ytd;
///
/// let records = vec![
///     MonthlyRecord::from_components("Jan", dec!(7000), dec!(1000), dec!(2000)),
///     MonthlyRecord::from_components("Feb", dec!(7500), dec!(1000), dec!(1500)),
/// ];
///
/// let ytd = calculate_ytd(&records);
/// assert_eq!(ytd.team_salary, dec!(14500));
/// assert_eq!(ytd.total, dec!(20000));
/// ```
pub fn calculate_ytd(records: &[MonthlyRecord]) -> YtdTotals {
    records.iter().fold(YtdTotals::default(), |acc, record| YtdTotals {
        team_salary: acc.team_salary + record.team_salary,
        intern_stipend: acc.intern_stipend + record.intern_stipend,
        tasks: acc.tasks + record.tasks,
        total: acc.total + record.total,
    })
}

/// Mean of the `total` field, or zero for an empty slice.
pub fn calculate_average_monthly_spending(records: &[MonthlyRecord]) -> Decimal {
    let sum: Decimal = records.iter().map(|r| r.total).sum();
    divide_or_zero(sum, Decimal::from(records.len()))
}

/// Returns the records whose `total` disagrees with their component sum.
pub fn find_inconsistent_records(records: &[MonthlyRecord]) -> Vec<&MonthlyRecord> {
    records.iter().filter(|r| !r.is_consistent()).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::common::round_half_up;

    fn record(
        month: &str,
        team: Decimal,
        intern: Decimal,
        tasks: Decimal,
        total: Decimal,
    ) -> MonthlyRecord {
        MonthlyRecord {
            month: month.to_string(),
            team_salary: team,
            intern_stipend: intern,
            tasks,
            total,
        }
    }

    fn sample_records() -> Vec<MonthlyRecord> {
        vec![
            record("Jan", dec!(45000), dec!(6000), dec!(12000), dec!(63000)),
            record("Feb", dec!(46000), dec!(6000), dec!(13500), dec!(65500)),
            record("Mar", dec!(47500), dec!(7500), dec!(11000), dec!(66000)),
        ]
    }

    // =========================================================================
    // calculate_ytd tests
    // =========================================================================

    #[test]
    fn calculate_ytd_empty_is_all_zero() {
        assert_eq!(calculate_ytd(&[]), YtdTotals::default());
    }

    #[test]
    fn calculate_ytd_sums_each_field() {
        let ytd = calculate_ytd(&sample_records());

        assert_eq!(
            ytd,
            YtdTotals {
                team_salary: dec!(138500),
                intern_stipend: dec!(19500),
                tasks: dec!(36500),
                total: dec!(194500),
            }
        );
    }

    #[test]
    fn calculate_ytd_is_order_independent() {
        let records = sample_records();
        let mut reversed = records.clone();
        reversed.reverse();

        assert_eq!(calculate_ytd(&records), calculate_ytd(&reversed));
    }

    #[test]
    fn calculate_ytd_trusts_given_total() {
        let records = vec![record("Jan", dec!(100), dec!(10), dec!(20), dec!(500))];

        let ytd = calculate_ytd(&records);

        assert_eq!(ytd.total, dec!(500));
    }

    // =========================================================================
    // calculate_average_monthly_spending tests
    // =========================================================================

    #[test]
    fn average_of_empty_is_zero() {
        assert_eq!(calculate_average_monthly_spending(&[]), Decimal::ZERO);
    }

    #[test]
    fn average_of_single_record_is_its_total() {
        let records = vec![record("Jan", dec!(1), dec!(2), dec!(3), dec!(6))];

        assert_eq!(calculate_average_monthly_spending(&records), dec!(6));
    }

    #[test]
    fn average_divides_by_record_count() {
        let average = calculate_average_monthly_spending(&sample_records());

        assert_eq!(round_half_up(average), dec!(64833.33));
    }

    // =========================================================================
    // find_inconsistent_records tests
    // =========================================================================

    #[test]
    fn find_inconsistent_records_flags_bad_totals() {
        let mut records = sample_records();
        records[1].total = dec!(1);

        let bad = find_inconsistent_records(&records);

        assert_eq!(bad.len(), 1);
        assert_eq!(bad[0].month, "Feb");
    }
}
