//! Expense totals grouped by category, and the most recent transactions, for the dashboard.

use std::{collections::HashMap, str::FromStr};

use time::{Date, OffsetDateTime, PrimitiveDateTime};

use crate::Error;

use super::{
    core::Transaction,
    filter::{AccountScope, SortOptions},
};

/// How far back the expense summary looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimePeriod {
    #[default]
    OneMonth,
    SixMonths,
    OneYear,
}

impl TimePeriod {
    /// Every period, in the order they are offered to the user.
    pub const ALL: [TimePeriod; 3] = [
        TimePeriod::OneMonth,
        TimePeriod::SixMonths,
        TimePeriod::OneYear,
    ];

    pub fn as_query_value(&self) -> &'static str {
        match self {
            TimePeriod::OneMonth => "1month",
            TimePeriod::SixMonths => "6months",
            TimePeriod::OneYear => "1year",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimePeriod::OneMonth => "Last Month",
            TimePeriod::SixMonths => "Last 6 Months",
            TimePeriod::OneYear => "Last Year",
        }
    }

    fn months(&self) -> u8 {
        match self {
            TimePeriod::OneMonth => 1,
            TimePeriod::SixMonths => 6,
            TimePeriod::OneYear => 12,
        }
    }

    /// The start of the period ending at `now`.
    ///
    /// Months are subtracted on the calendar, with the day clamped to the
    /// length of the target month, e.g. one month before 31 March is the last
    /// day of February.
    pub fn lookback_start(&self, now: OffsetDateTime) -> OffsetDateTime {
        match subtract_months(now.date(), self.months()) {
            Some(date) => now.replace_date(date),
            None => PrimitiveDateTime::MIN.assume_offset(now.offset()),
        }
    }
}

impl FromStr for TimePeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1month" => Ok(TimePeriod::OneMonth),
            "6months" => Ok(TimePeriod::SixMonths),
            "1year" => Ok(TimePeriod::OneYear),
            other => Err(Error::InvalidQueryValue(
                "period".to_owned(),
                other.to_owned(),
            )),
        }
    }
}

/// `None` if the result is outside the range supported by [Date].
fn subtract_months(date: Date, months: u8) -> Option<Date> {
    let month = date.month();
    let wraps_year = (month as u8) <= months % 12;
    let year = date.year() - i32::from(months / 12) - i32::from(wraps_year);
    let month = month.nth_prev(months % 12);

    // Only the last few days of a month can be out of range for the target month.
    (1..=date.day())
        .rev()
        .find_map(|day| Date::from_calendar_date(year, month, day).ok())
}

/// The total spent in one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Expenses grouped by category, largest first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategorySummary {
    pub categories: Vec<CategoryTotal>,
    pub total_expense: f64,
}

impl CategorySummary {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Sum the expenses in `scope` dated within `[start, end]` by category label.
///
/// Totals are rounded to two decimal places once the sums are complete.
/// Categories are sorted by descending total, categories with equal totals
/// keep the order they were first seen in.
pub fn summarize_by_category(
    transactions: &[Transaction],
    scope: AccountScope,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> CategorySummary {
    let mut category_indices: HashMap<&str, usize> = HashMap::new();
    let mut sums: Vec<(&str, f64)> = Vec::new();
    let mut total_expense = 0.0;

    let expenses = transactions.iter().filter(|transaction| {
        transaction.is_expense()
            && scope.contains(transaction)
            && transaction.date >= start
            && transaction.date <= end
    });

    for transaction in expenses {
        let category = transaction.category_label();
        let index = *category_indices.entry(category).or_insert_with(|| {
            sums.push((category, 0.0));
            sums.len() - 1
        });

        sums[index].1 += transaction.amount;
        total_expense += transaction.amount;
    }

    let mut categories: Vec<CategoryTotal> = sums
        .into_iter()
        .map(|(category, sum)| CategoryTotal {
            category: category.to_owned(),
            total: round_to_cents(sum),
        })
        .collect();

    // `sort_by` is stable.
    categories.sort_by(|a, b| b.total.total_cmp(&a.total));

    CategorySummary {
        categories,
        total_expense: round_to_cents(total_expense),
    }
}

/// The `count` most recent transactions in `scope`, newest first.
pub fn recent_transactions(
    transactions: &[Transaction],
    scope: AccountScope,
    count: usize,
) -> Vec<Transaction> {
    let newest_first = SortOptions::default();
    let mut in_scope: Vec<&Transaction> = transactions
        .iter()
        .filter(|transaction| scope.contains(transaction))
        .collect();

    in_scope.sort_by(|a, b| newest_first.compare(a, b));

    in_scope.into_iter().take(count).cloned().collect()
}

#[cfg(test)]
mod time_period_tests {
    use time::macros::datetime;

    use super::TimePeriod;

    #[test]
    fn one_month_back() {
        let now = datetime!(2025-06-15 10:30 +12);

        assert_eq!(
            TimePeriod::OneMonth.lookback_start(now),
            datetime!(2025-05-15 10:30 +12)
        );
    }

    #[test]
    fn clamps_to_end_of_shorter_month() {
        assert_eq!(
            TimePeriod::OneMonth.lookback_start(datetime!(2025-03-31 08:00 UTC)),
            datetime!(2025-02-28 08:00 UTC)
        );
        assert_eq!(
            TimePeriod::OneMonth.lookback_start(datetime!(2024-03-31 08:00 UTC)),
            datetime!(2024-02-29 08:00 UTC)
        );
    }

    #[test]
    fn six_months_back_crosses_year() {
        assert_eq!(
            TimePeriod::SixMonths.lookback_start(datetime!(2025-03-01 00:00 UTC)),
            datetime!(2024-09-01 00:00 UTC)
        );
        assert_eq!(
            TimePeriod::SixMonths.lookback_start(datetime!(2025-08-31 00:00 UTC)),
            datetime!(2025-02-28 00:00 UTC)
        );
    }

    #[test]
    fn one_year_back_handles_leap_day() {
        assert_eq!(
            TimePeriod::OneYear.lookback_start(datetime!(2024-02-29 12:00 UTC)),
            datetime!(2023-02-28 12:00 UTC)
        );
        assert_eq!(
            TimePeriod::OneYear.lookback_start(datetime!(2025-01-10 12:00 UTC)),
            datetime!(2024-01-10 12:00 UTC)
        );
    }

    #[test]
    fn parses_query_values() {
        for period in TimePeriod::ALL {
            assert_eq!(period.as_query_value().parse::<TimePeriod>(), Ok(period));
        }

        assert!("2weeks".parse::<TimePeriod>().is_err());
    }
}
