//! Download the transactions shown on the transactions page as a CSV file.

use axum::{
    Extension,
    extract::{Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use time::UtcOffset;

use crate::{
    Error,
    account::{Account, account_name, get_accounts_for_user},
    timezone::get_local_offset,
    user::UserId,
};

use super::{
    core::{Transaction, get_transactions_for_user},
    filter::filter_and_sort,
    transactions_page::{TransactionsParams, TransactionsQuery, TransactionsViewState},
};

#[derive(Debug, Serialize)]
struct CsvRecord<'a> {
    date: String,
    description: &'a str,
    category: &'a str,
    #[serde(rename = "type")]
    transaction_type: &'a str,
    amount: f64,
    account: &'a str,
}

/// Return every transaction matching the filters in the query string as CSV,
/// in the same order as the transactions page but without paging.
pub async fn get_transactions_export(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let params = TransactionsParams::from_query(query, state.pagination_config.default_page);
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Err(Error::InvalidTimezoneError(state.local_timezone.clone()));
    };

    let (accounts, transactions) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let accounts = get_accounts_for_user(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get accounts: {error}"))?;
        let transactions = get_transactions_for_user(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

        (accounts, transactions)
    };

    let filtered = filter_and_sort(&transactions, &params.filter, params.sort);
    let csv = write_csv(&filtered, &accounts, local_offset)
        .inspect_err(|error| tracing::error!("could not export transactions: {error}"))?;

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

fn write_csv(
    transactions: &[Transaction],
    accounts: &[Account],
    local_offset: UtcOffset,
) -> Result<String, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for transaction in transactions {
        writer
            .serialize(CsvRecord {
                date: transaction.date.to_offset(local_offset).date().to_string(),
                description: transaction.description_or_default(),
                category: transaction.category_label(),
                transaction_type: transaction.transaction_type.as_str(),
                amount: transaction.amount,
                account: account_name(accounts, transaction.account_id),
            })
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::CsvError(error.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
    };
    use rusqlite::Connection;
    use time::{UtcOffset, macros::datetime};

    use crate::{
        account::{Account, NewAccount, create_account},
        db::initialize,
        pagination::PaginationConfig,
        test_utils::{assert_content_type, assert_status_ok, get_header},
        transaction::{NewTransaction, Transaction, TransactionType, create_transaction},
        user::{UserId, ensure_user},
    };

    use super::{TransactionsViewState, get_transactions_export, write_csv};

    #[test]
    fn writes_header_and_rows() {
        let transactions = [Transaction {
            id: 1,
            account_id: 1,
            transaction_type: TransactionType::Expense,
            category: None,
            amount: 4.5,
            description: Some("Coffee, large".to_owned()),
            date: datetime!(2025-03-04 12:00 UTC),
        }];
        let accounts = [Account {
            id: 1,
            user_id: UserId::new(1),
            name: "Everyday".to_owned(),
            is_default: true,
        }];

        let csv = write_csv(&transactions, &accounts, UtcOffset::UTC).unwrap();

        assert_eq!(
            csv,
            "date,description,category,type,amount,account\n\
            2025-03-04,\"Coffee, large\",Other,EXPENSE,4.5,Everyday\n"
        );
    }

    #[tokio::test]
    async fn export_applies_filters_without_paging() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user_id = ensure_user("user_export", &connection).unwrap();
        let account = create_account(
            NewAccount {
                name: "Everyday".to_owned(),
                is_default: true,
            },
            user_id,
            &connection,
        )
        .unwrap();
        for i in 0..15 {
            create_transaction(
                NewTransaction {
                    account_id: account.id,
                    transaction_type: if i % 3 == 0 {
                        TransactionType::Income
                    } else {
                        TransactionType::Expense
                    },
                    category: None,
                    amount: 1.0,
                    description: Some(format!("Item {i}")),
                    date: datetime!(2025-03-04 12:00 UTC),
                },
                user_id,
                &connection,
            )
            .unwrap();
        }
        let state = TransactionsViewState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
            pagination_config: PaginationConfig::default(),
        };

        let response = get_transactions_export(
            State(state),
            Extension(user_id),
            Query(serde_urlencoded::from_str("type=EXPENSE&page=2").unwrap()),
        )
        .await
        .unwrap();

        assert_status_ok(&response);
        assert_content_type(&response, "text/csv; charset=utf-8");
        assert!(get_header(&response, "content-disposition").starts_with("attachment"));
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&body);
        // Header plus the ten expenses.
        assert_eq!(text.lines().count(), 11);
        assert!(!text.contains("INCOME"));
    }
}
