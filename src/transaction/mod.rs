//! Transaction tracking for SpendSense.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the database functions for storing and loading transactions
//! - The in-memory pipeline that filters, sorts and summarises a user's transactions
//! - View handlers for the transactions page and the CSV export

mod core;
mod export;
mod filter;
mod summary;
mod transactions_page;
mod view;

pub use core::{
    NewTransaction, OTHER_CATEGORY, Transaction, TransactionId, TransactionType,
    create_transaction, create_transaction_table, get_transactions_for_user,
};
pub use export::get_transactions_export;
pub use filter::{
    AccountScope, SortDirection, SortField, SortOptions, TransactionFilter, available_categories,
    filter_and_sort, matches_category, matches_search, matches_type,
};
pub use summary::{
    CategorySummary, CategoryTotal, TimePeriod, recent_transactions, summarize_by_category,
};
pub use transactions_page::get_transactions_page;

pub(crate) use view::{TransactionRow, category_icon};
