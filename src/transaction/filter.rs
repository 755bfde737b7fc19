//! Filtering and sorting of a user's transactions for the transactions page.
//!
//! Every function here works on an already fetched slice of transactions and
//! returns new values, the input is never modified.

use std::{cmp::Ordering, collections::BTreeSet, str::FromStr};

use crate::{Error, account::AccountId};

use super::core::{Transaction, TransactionType};

/// The accounts to include transactions from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountScope {
    /// Transactions from every account.
    #[default]
    All,
    /// Transactions from a single account.
    Account(AccountId),
}

impl AccountScope {
    /// Whether `transaction` was recorded against an account in scope.
    pub fn contains(&self, transaction: &Transaction) -> bool {
        match self {
            AccountScope::All => true,
            AccountScope::Account(account_id) => transaction.account_id == *account_id,
        }
    }

    /// The query string value for the scope.
    pub fn as_query_value(&self) -> String {
        match self {
            AccountScope::All => "all".to_owned(),
            AccountScope::Account(account_id) => account_id.to_string(),
        }
    }
}

impl FromStr for AccountScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(AccountScope::All);
        }

        s.parse::<AccountId>()
            .map(AccountScope::Account)
            .map_err(|_| Error::InvalidQueryValue("account".to_owned(), s.to_owned()))
    }
}

/// The predicates selected on the transactions page.
///
/// `None` for the type or category means "all".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub account: AccountScope,
    pub search: String,
    pub transaction_type: Option<TransactionType>,
    pub category: Option<String>,
}

impl TransactionFilter {
    /// Whether `transaction` passes every predicate.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.account.contains(transaction)
            && matches_search(transaction, &self.search)
            && matches_type(transaction, self.transaction_type)
            && matches_category(transaction, self.category.as_deref())
    }
}

/// Case-insensitive substring match against the description or the category.
///
/// An empty search term matches everything. Missing fields never match.
pub fn matches_search(transaction: &Transaction, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }

    let needle = search.to_lowercase();
    let contains = |field: &Option<String>| {
        field
            .as_deref()
            .is_some_and(|text| text.to_lowercase().contains(&needle))
    };

    contains(&transaction.description) || contains(&transaction.category)
}

pub fn matches_type(transaction: &Transaction, transaction_type: Option<TransactionType>) -> bool {
    transaction_type.is_none_or(|wanted| transaction.transaction_type == wanted)
}

/// Exact match on the category label, so "Other" selects uncategorised transactions.
pub fn matches_category(transaction: &Transaction, category: Option<&str>) -> bool {
    category.is_none_or(|wanted| transaction.category_label() == wanted)
}

/// The transaction field to sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Date,
    Amount,
    Description,
    Category,
}

impl SortField {
    pub fn as_query_value(&self) -> &'static str {
        match self {
            SortField::Date => "date",
            SortField::Amount => "amount",
            SortField::Description => "description",
            SortField::Category => "category",
        }
    }

    fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        match self {
            SortField::Date => a.date.cmp(&b.date),
            SortField::Amount => a.amount.total_cmp(&b.amount),
            SortField::Description => a
                .description_or_default()
                .cmp(b.description_or_default()),
            SortField::Category => a
                .category
                .as_deref()
                .unwrap_or_default()
                .cmp(b.category.as_deref().unwrap_or_default()),
        }
    }
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(SortField::Date),
            "amount" => Ok(SortField::Amount),
            "description" => Ok(SortField::Description),
            "category" => Ok(SortField::Category),
            other => Err(Error::InvalidQueryValue("sort".to_owned(), other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn as_query_value(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    fn reverse(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Ascending),
            "desc" => Ok(SortDirection::Descending),
            other => Err(Error::InvalidQueryValue("order".to_owned(), other.to_owned())),
        }
    }
}

/// How to order the transactions, newest first by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortOptions {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOptions {
    /// The sort options after clicking the column header for `field`.
    ///
    /// Clicking the current column flips the direction, clicking another
    /// column sorts it in descending order.
    pub fn toggle(self, field: SortField) -> Self {
        if field == self.field {
            Self {
                field,
                direction: self.direction.reverse(),
            }
        } else {
            Self {
                field,
                direction: SortDirection::Descending,
            }
        }
    }

    /// Compare two transactions, breaking ties by ascending ID in either direction.
    pub fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        let ordering = self.field.compare(a, b);
        let ordering = match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        };

        ordering.then_with(|| a.id.cmp(&b.id))
    }
}

/// Apply `filter` to `transactions` and sort the result.
pub fn filter_and_sort(
    transactions: &[Transaction],
    filter: &TransactionFilter,
    sort: SortOptions,
) -> Vec<Transaction> {
    let mut filtered: Vec<Transaction> = transactions
        .iter()
        .filter(|transaction| filter.matches(transaction))
        .cloned()
        .collect();

    filtered.sort_by(|a, b| sort.compare(a, b));

    filtered
}

/// The distinct category labels in `transactions`, sorted lexicographically.
pub fn available_categories(transactions: &[Transaction]) -> Vec<String> {
    transactions
        .iter()
        .map(|transaction| transaction.category_label())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}
