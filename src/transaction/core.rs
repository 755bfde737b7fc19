//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, account::AccountId, user::UserId};

/// The label used for transactions without a category.
pub const OTHER_CATEGORY: &str = "Other";

pub type TransactionId = i64;

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Money was earned.
    Income,
    /// Money was spent.
    Expense,
}

impl TransactionType {
    /// The string used to store and query the transaction type.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCOME" => Ok(TransactionType::Income),
            "EXPENSE" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        text.parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The account the transaction was recorded against.
    pub account_id: AccountId,
    /// Whether money was earned or spent.
    pub transaction_type: TransactionType,
    /// A free-form label such as "Travel", see [Transaction::category_label].
    pub category: Option<String>,
    /// The non-negative amount of money, in the account's currency.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
    /// When the transaction happened.
    pub date: OffsetDateTime,
}

impl Transaction {
    /// The category to display and group by, "Other" if the transaction has none.
    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or(OTHER_CATEGORY)
    }

    /// The description, or the empty string if the transaction has none.
    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    /// Whether the transaction is an expense.
    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }
}

/// The data needed to create a [Transaction].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub account_id: AccountId,
    pub transaction_type: TransactionType,
    pub category: Option<String>,
    pub amount: f64,
    pub description: Option<String>,
    pub date: OffsetDateTime,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table.
///
/// Transactions are deleted along with their account or owner.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                account_id INTEGER NOT NULL,
                type TEXT NOT NULL,
                category TEXT,
                amount REAL NOT NULL CHECK (amount >= 0),
                description TEXT,
                date TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user ON \"transaction\"(user_id)",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
///
/// Expects the columns id, account_id, type, category, amount, description, date.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        account_id: row.get(1)?,
        transaction_type: row.get(2)?,
        category: row.get(3)?,
        amount: row.get(4)?,
        description: row.get(5)?,
        date: row.get(6)?,
    })
}

/// Create a new transaction owned by `user_id`.
///
/// # Errors
/// Returns [Error::NegativeAmount] if the amount is below zero, or
/// [Error::SqlError] if the insert fails, e.g. the account does not exist.
pub fn create_transaction(
    transaction: NewTransaction,
    user_id: UserId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if transaction.amount < 0.0 {
        return Err(Error::NegativeAmount(transaction.amount));
    }

    connection.execute(
        "INSERT INTO \"transaction\" (user_id, account_id, type, category, amount, description, date)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            user_id.as_i64(),
            transaction.account_id,
            transaction.transaction_type,
            &transaction.category,
            transaction.amount,
            &transaction.description,
            transaction.date,
        ),
    )?;

    Ok(Transaction {
        id: connection.last_insert_rowid(),
        account_id: transaction.account_id,
        transaction_type: transaction.transaction_type,
        category: transaction.category,
        amount: transaction.amount,
        description: transaction.description,
        date: transaction.date,
    })
}

/// Get every transaction owned by `user_id`.
///
/// The whole collection is returned in insertion order, filtering and sorting
/// for display happens in memory.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - Transaction row mapping fails
pub fn get_transactions_for_user(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, account_id, type, category, amount, description, date
            FROM \"transaction\" WHERE user_id = ?1 ORDER BY id ASC",
        )?
        .query_map((user_id.as_i64(),), map_transaction_row)?
        .map(|transaction| transaction.map_err(Error::from))
        .collect()
}
