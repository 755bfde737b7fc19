//! Defines the route handler for the page that lists, filters and sorts transactions.
use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use axum_htmx::HxRequest;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::get_accounts_for_user,
    endpoints,
    pagination::{PaginationConfig, clamp_page, create_pagination_indicators, paginate},
    timezone::get_local_offset,
    user::UserId,
};

use super::{
    core::{TransactionType, get_transactions_for_user},
    filter::{
        AccountScope, SortField, SortOptions, TransactionFilter, available_categories,
        filter_and_sort,
    },
    view::{TransactionRow, TransactionsPage, transactions_content, transactions_view},
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for loading transactions.
    pub(super) db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub(super) local_timezone: String,
    /// The config that controls how to display pages of transactions.
    pub(super) pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The raw query parameters for the transactions page.
///
/// Every field is kept as a string so that bad values can be replaced with
/// defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    search: Option<String>,
    account: Option<String>,
    #[serde(rename = "type")]
    transaction_type: Option<String>,
    category: Option<String>,
    sort: Option<String>,
    order: Option<String>,
    page: Option<String>,
}

/// Validated view options for the transactions page, with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct TransactionsParams {
    pub(super) filter: TransactionFilter,
    pub(super) sort: SortOptions,
    pub(super) page: u64,
}

impl TransactionsParams {
    pub(super) fn from_query(query: TransactionsQuery, default_page: u64) -> Self {
        let transaction_type = match non_empty(query.transaction_type.as_deref()) {
            None | Some("all") => None,
            Some(value) => parse_or_warn::<TransactionType>(value),
        };
        let category = match non_empty(query.category.as_deref()) {
            None | Some("all") => None,
            Some(label) => Some(label.to_owned()),
        };
        let page = match non_empty(query.page.as_deref()) {
            None => default_page,
            Some(value) => value.parse::<u64>().unwrap_or_else(|error| {
                tracing::warn!("invalid page \"{value}\": {error}, using page {default_page}");
                default_page
            }),
        };

        Self {
            filter: TransactionFilter {
                account: parse_or_default(query.account.as_deref()),
                search: query.search.unwrap_or_default(),
                transaction_type,
                category,
            },
            sort: SortOptions {
                field: parse_or_default(query.sort.as_deref()),
                direction: parse_or_default(query.order.as_deref()),
            },
            page,
        }
    }

    /// The query string for the current filters with `sort`, and `page` when given.
    ///
    /// Values that match the defaults are left out.
    pub(super) fn query_string(&self, sort: SortOptions, page: Option<u64>) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();

        if !self.filter.search.is_empty() {
            pairs.push(("search", self.filter.search.clone()));
        }
        if self.filter.account != AccountScope::All {
            pairs.push(("account", self.filter.account.as_query_value()));
        }
        if let Some(transaction_type) = self.filter.transaction_type {
            pairs.push(("type", transaction_type.as_str().to_owned()));
        }
        if let Some(category) = &self.filter.category {
            pairs.push(("category", category.clone()));
        }
        pairs.push(("sort", sort.field.as_query_value().to_owned()));
        pairs.push(("order", sort.direction.as_query_value().to_owned()));
        if let Some(page) = page {
            pairs.push(("page", page.to_string()));
        }

        serde_urlencoded::to_string(pairs).unwrap_or_else(|error| {
            tracing::error!("could not encode the transactions query string: {error}");
            String::new()
        })
    }

    /// The link to `page` with the current filters and sort order.
    pub(super) fn page_url(&self, page: u64) -> String {
        format!(
            "{}?{}",
            endpoints::TRANSACTIONS_VIEW,
            self.query_string(self.sort, Some(page))
        )
    }

    /// The link that sorts by `field`, staying on the current page.
    pub(super) fn sort_url(&self, field: SortField) -> String {
        format!(
            "{}?{}",
            endpoints::TRANSACTIONS_VIEW,
            self.query_string(self.sort.toggle(field), Some(self.page))
        )
    }

    /// The link that downloads every transaction matching the current filters.
    pub(super) fn export_url(&self) -> String {
        format!(
            "{}?{}",
            endpoints::TRANSACTIONS_EXPORT,
            self.query_string(self.sort, None)
        )
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_or_warn<T: FromStr<Err = Error>>(value: &str) -> Option<T> {
    value
        .parse()
        .inspect_err(|error| tracing::warn!("{error}, using the default"))
        .ok()
}

fn parse_or_default<T: FromStr<Err = Error> + Default>(value: Option<&str>) -> T {
    non_empty(value)
        .and_then(parse_or_warn::<T>)
        .unwrap_or_default()
}

/// Render the user's transactions, filtered, sorted and paged per the query string.
///
/// HTMX requests get just the content section so the filter form and links
/// can swap it in place.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserId>,
    HxRequest(is_htmx_request): HxRequest,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let params = TransactionsParams::from_query(query, state.pagination_config.default_page);

    match render_transactions(&state, user_id, params, is_htmx_request) {
        Ok(response) => Ok(response),
        Err(error) if is_htmx_request => Ok(error.into_alert_response()),
        Err(error) => Err(error),
    }
}

fn render_transactions(
    state: &TransactionsViewState,
    user_id: UserId,
    mut params: TransactionsParams,
    is_htmx_request: bool,
) -> Result<Response, Error> {
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
    let categories = available_categories(&transactions);

    let page_size = state.pagination_config.page_size;
    let total_pages = paginate(&filtered, 1, page_size).total_pages;
    params.page = clamp_page(params.page, total_pages);
    let page = paginate(&filtered, params.page, page_size);

    let rows = page
        .items
        .iter()
        .map(|transaction| TransactionRow::new(transaction, &accounts, local_offset))
        .collect();

    let model = TransactionsPage {
        params: &params,
        accounts: &accounts,
        categories: &categories,
        rows,
        filtered_count: filtered.len(),
        start_index: page.start_index,
        end_index: page.end_index,
        total_pages,
        indicators: create_pagination_indicators(
            params.page,
            total_pages,
            state.pagination_config.max_pages,
        ),
    };

    if is_htmx_request {
        Ok(transactions_content(&model).into_response())
    } else {
        Ok(transactions_view(&model).into_response())
    }
}
