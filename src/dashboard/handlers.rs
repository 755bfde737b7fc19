//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - The route handler for displaying the dashboard
//! - HTML view functions for the recent transactions and expense breakdown cards
//! - State and query types used by the handler

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use axum_htmx::HxRequest;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    account::{Account, AccountId, default_account, get_accounts_for_user},
    dashboard::charts::{
        DashboardChart, ECHARTS_SCRIPT_URL, chart_view, expense_pie_chart, slice_color,
    },
    endpoints,
    html::{
        BUTTON_SECONDARY_STYLE, CARD_STYLE, FORM_SELECT_STYLE, HeadElement, LINK_STYLE,
        PAGE_CONTAINER_STYLE, base, format_currency, link,
    },
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::{
        AccountScope, CategorySummary, TimePeriod, TransactionRow, category_icon,
        get_transactions_for_user, recent_transactions, summarize_by_category,
    },
    user::UserId,
};

/// How many transactions the recent transactions card shows.
const RECENT_TRANSACTION_COUNT: usize = 5;

/// The state needed for displaying the dashboard page.
///
/// Contains the database connection and timezone information required
/// by dashboard handlers.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for loading accounts and transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The raw query parameters for the dashboard.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    account: Option<String>,
    period: Option<String>,
}

/// Holds all the data needed to render the dashboard.
struct DashboardData<'a> {
    accounts: &'a [Account],
    selected_account: &'a Account,
    period: TimePeriod,
    recent: Vec<TransactionRow>,
    summary: CategorySummary,
    chart: DashboardChart,
}

/// Display a page with an overview of the selected account.
///
/// The account defaults to the user's default account and the expense
/// breakdown covers the last month unless the query string says otherwise.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserId>,
    HxRequest(is_htmx_request): HxRequest,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        let error = Error::InvalidTimezoneError(state.local_timezone.clone());

        return if is_htmx_request {
            Ok(error.into_alert_response())
        } else {
            Err(error)
        };
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

    let Some(selected_account) = select_account(&accounts, query.account.as_deref()) else {
        return Ok(dashboard_no_data_view().into_response());
    };
    let period = parse_period(query.period.as_deref());

    let now = OffsetDateTime::now_utc().to_offset(local_offset);
    let scope = AccountScope::Account(selected_account.id);
    let summary = summarize_by_category(&transactions, scope, period.lookback_start(now), now);
    let recent = recent_transactions(&transactions, scope, RECENT_TRANSACTION_COUNT)
        .iter()
        .map(|transaction| TransactionRow::new(transaction, &accounts, local_offset))
        .collect();

    let data = DashboardData {
        accounts: &accounts,
        selected_account,
        period,
        recent,
        chart: DashboardChart {
            id: "expense-chart",
            options: expense_pie_chart(&summary).to_string(),
        },
        summary,
    };

    if is_htmx_request {
        Ok(dashboard_content(&data).into_response())
    } else {
        Ok(dashboard_view(&data).into_response())
    }
}

/// The account named by `requested`, falling back to the default account.
fn select_account<'a>(accounts: &'a [Account], requested: Option<&str>) -> Option<&'a Account> {
    let requested = requested.map(str::trim).filter(|value| !value.is_empty());

    let Some(requested) = requested else {
        return default_account(accounts);
    };

    let selected = requested
        .parse::<AccountId>()
        .ok()
        .and_then(|account_id| accounts.iter().find(|account| account.id == account_id));

    if selected.is_none() {
        tracing::warn!("invalid account \"{requested}\", using the default account");
    }

    selected.or_else(|| default_account(accounts))
}

fn parse_period(requested: Option<&str>) -> TimePeriod {
    requested
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| {
            value
                .parse()
                .inspect_err(|error| tracing::warn!("{error}, using the default"))
                .ok()
        })
        .unwrap_or_default()
}

/// Renders the dashboard page when the user has no accounts.
fn dashboard_no_data_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let home_link = link(endpoints::ROOT, "home page");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Your accounts and spending will show up here once an account
                has been added to your profile. In the meantime, you can find out
                more on the " (home_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

fn dashboard_view(data: &DashboardData) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            (dashboard_content(data))
        }
    );

    let scripts = [HeadElement::ScriptLink(ECHARTS_SCRIPT_URL.to_owned())];

    base("Dashboard", &scripts, &content)
}

/// The part of the dashboard that is replaced when the account or period changes.
fn dashboard_content(data: &DashboardData) -> Markup {
    html!(
        section
            id="dashboard-content"
            class="w-full space-y-4"
        {
            header class="flex justify-between flex-wrap items-end gap-2"
            {
                div
                {
                    h1 class="text-2xl font-bold" { "Dashboard" }
                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        "Overview of " (data.selected_account.name)
                    }
                }

                (filter_form(data))
            }

            div class="grid grid-cols-1 lg:grid-cols-2 gap-4"
            {
                (recent_transactions_card(&data.recent))
                (expense_breakdown_card(data))
            }
        }
    )
}

fn filter_form(data: &DashboardData) -> Markup {
    html!(
        form
            id="dashboard-filters"
            method="get"
            action=(endpoints::DASHBOARD_VIEW)
            hx-get=(endpoints::DASHBOARD_VIEW)
            hx-trigger="change"
            hx-target="#dashboard-content"
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            hx-push-url="true"
            class="flex flex-wrap items-center gap-2"
        {
            label for="account" class="sr-only" { "Account" }
            select id="account" name="account" class=(FORM_SELECT_STYLE)
            {
                @for account in data.accounts {
                    option
                        value=(account.id)
                        selected[account.id == data.selected_account.id]
                    {
                        (account.name)
                    }
                }
            }

            label for="period" class="sr-only" { "Time period" }
            select id="period" name="period" class=(FORM_SELECT_STYLE)
            {
                @for period in TimePeriod::ALL {
                    option
                        value=(period.as_query_value())
                        selected[period == data.period]
                    {
                        (period.label())
                    }
                }
            }

            noscript
            {
                button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Apply" }
            }
        }
    )
}

fn recent_transactions_card(rows: &[TransactionRow]) -> Markup {
    html!(
        div class={ (CARD_STYLE) " p-4" } data-recent-transactions
        {
            div class="flex justify-between items-center mb-4"
            {
                h2 class="text-lg font-semibold" { "Recent Transactions" }
                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "View all" }
            }

            @if rows.is_empty() {
                p class="py-8 text-center text-gray-500 dark:text-gray-400"
                {
                    "No transactions yet"
                }
            } @else {
                ul class="divide-y divide-gray-200 dark:divide-gray-700"
                {
                    @for row in rows {
                        li class="flex items-center gap-3 py-3" data-recent-transaction
                        {
                            (category_icon(&row.style))

                            div class="flex-1 min-w-0"
                            {
                                p class="font-medium truncate" { (row.description) }
                                p class="text-sm text-gray-500 dark:text-gray-400"
                                {
                                    (row.date)
                                }
                            }

                            span class={ "font-semibold " (row.amount_class()) }
                            {
                                (row.amount)
                            }
                        }
                    }
                }
            }
        }
    )
}

fn expense_breakdown_card(data: &DashboardData) -> Markup {
    let summary = &data.summary;

    html!(
        div class={ (CARD_STYLE) " p-4" } data-expense-breakdown
        {
            div class="mb-4"
            {
                h2 class="text-lg font-semibold" { "Expense Breakdown" }
                p class="text-sm text-gray-500 dark:text-gray-400" { (data.period.label()) }
            }

            @if summary.is_empty() {
                p class="py-8 text-center text-gray-500 dark:text-gray-400" data-expense-empty
                {
                    "No expenses in this period"
                }
            } @else {
                (chart_view(&data.chart))

                ul class="mt-4 space-y-2"
                {
                    @for (index, category_total) in summary.categories.iter().enumerate() {
                        li class="flex items-center gap-2 text-sm" data-legend-item
                        {
                            span
                                class="inline-block w-3 h-3 rounded-full"
                                style={ "background-color: " (slice_color(index)) }
                                aria-hidden="true"
                            {}
                            span class="flex-1" data-legend-category { (category_total.category) }
                            span class="font-medium" data-legend-total
                            {
                                (format_currency(category_total.total))
                            }
                            span class="w-12 text-right text-gray-500 dark:text-gray-400"
                            {
                                (percentage(category_total.total, summary.total_expense))
                            }
                        }
                    }
                }

                div class="flex justify-between mt-4 pt-4 border-t border-gray-200 dark:border-gray-700 font-semibold"
                {
                    span { "Total Expenses" }
                    span data-total-expense { (format_currency(summary.total_expense)) }
                }
            }
        }
    )
}

fn percentage(amount: f64, total: f64) -> String {
    if total > 0.0 {
        format!("{:.0}%", amount / total * 100.0)
    } else {
        "0%".to_owned()
    }
}
