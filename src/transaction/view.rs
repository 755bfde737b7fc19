//! HTML rendering for the transactions page.

use maud::{Markup, html};
use time::{
    OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::{
    account::{Account, account_name},
    category::{CategoryStyle, category_style},
    endpoints,
    html::{
        BUTTON_SECONDARY_STYLE, CARD_STYLE, FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_signed_amount,
    },
    navigation::NavBar,
    pagination::{PaginationIndicator, pagination_view},
};

use super::{
    core::{Transaction, TransactionType},
    filter::{AccountScope, SortDirection, SortField},
    transactions_page::TransactionsParams,
};

const DATE_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[month repr:short] [day], [year]");

/// Format `date` in the local timezone, e.g. "Mar 04, 2025".
pub(crate) fn format_transaction_date(date: OffsetDateTime, local_offset: UtcOffset) -> String {
    let local_date = date.to_offset(local_offset);

    local_date.format(DATE_FORMAT).unwrap_or_else(|error| {
        tracing::error!("could not format date {local_date}: {error}");
        local_date.date().to_string()
    })
}

/// A transaction ready for display.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TransactionRow {
    pub(crate) description: String,
    pub(crate) category: String,
    pub(crate) style: CategoryStyle,
    pub(crate) date: String,
    pub(crate) account_name: String,
    pub(crate) amount: String,
    pub(crate) is_expense: bool,
}

impl TransactionRow {
    pub(crate) fn new(
        transaction: &Transaction,
        accounts: &[Account],
        local_offset: UtcOffset,
    ) -> Self {
        let category = transaction.category_label().to_owned();

        Self {
            description: transaction
                .description
                .clone()
                .filter(|description| !description.is_empty())
                .unwrap_or_else(|| "Untitled Transaction".to_owned()),
            style: category_style(&category),
            category,
            date: format_transaction_date(transaction.date, local_offset),
            account_name: account_name(accounts, transaction.account_id).to_owned(),
            amount: format_signed_amount(transaction.amount, transaction.is_expense()),
            is_expense: transaction.is_expense(),
        }
    }

    pub(crate) fn amount_class(&self) -> &'static str {
        if self.is_expense {
            "text-red-600 dark:text-red-400"
        } else {
            "text-green-600 dark:text-green-400"
        }
    }
}

/// The category icon in a coloured circle.
pub(crate) fn category_icon(style: &CategoryStyle) -> Markup {
    html! {
        span
            class={ "inline-flex items-center justify-center w-9 h-9 shrink-0 rounded-full border " (style.color) }
            aria-hidden="true"
        {
            (style.icon)
        }
    }
}

/// Everything needed to render one page of transactions.
pub(super) struct TransactionsPage<'a> {
    pub(super) params: &'a TransactionsParams,
    pub(super) accounts: &'a [Account],
    pub(super) categories: &'a [String],
    pub(super) rows: Vec<TransactionRow>,
    pub(super) filtered_count: usize,
    pub(super) start_index: usize,
    pub(super) end_index: usize,
    pub(super) total_pages: u64,
    pub(super) indicators: Vec<PaginationIndicator>,
}

/// The full transactions page.
pub(super) fn transactions_view(page: &TransactionsPage) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            (transactions_content(page))
        }
    };

    base("Transactions", &[], &content)
}

/// The part of the transactions page that is replaced when filters, sorting or the page change.
pub(super) fn transactions_content(page: &TransactionsPage) -> Markup {
    let params = page.params;
    let has_filters = !params.filter.search.is_empty()
        || params.filter.account != AccountScope::All
        || params.filter.transaction_type.is_some()
        || params.filter.category.is_some();

    html! {
        section
            id="transactions-content"
            class="w-full space-y-4"
            hx-boost="true"
            hx-target="this"
            hx-swap="outerHTML"
        {
            header class="flex justify-between flex-wrap items-end gap-2"
            {
                div
                {
                    h1 class="text-2xl font-bold" { "Transactions" }
                    p class="text-sm text-gray-500 dark:text-gray-400" data-transaction-count
                    {
                        (page.filtered_count)
                        @if page.filtered_count == 1 { " transaction" } @else { " transactions" }
                    }
                }

                a
                    href=(params.export_url())
                    hx-boost="false"
                    download
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "Export CSV"
                }
            }

            (filter_form(page))

            div class={ (CARD_STYLE) " overflow-x-auto" }
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            (sort_header(params, SortField::Description, "Description"))
                            (sort_header(params, SortField::Category, "Category"))
                            (sort_header(params, SortField::Date, "Date"))
                            th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                            (sort_header(params, SortField::Amount, "Amount"))
                        }
                    }

                    tbody
                    {
                        @for row in &page.rows {
                            (transaction_row_view(row))
                        }

                        @if page.rows.is_empty() {
                            tr
                            {
                                td
                                    colspan="5"
                                    data-empty-state="true"
                                    class="px-6 py-8 text-center"
                                {
                                    p class="font-semibold text-gray-900 dark:text-white"
                                    {
                                        "No transactions found"
                                    }

                                    @if has_filters {
                                        p { "Try adjusting your search or filters." }
                                    }
                                }
                            }
                        }
                    }
                }
            }

            @if page.total_pages > 1 {
                p class="text-sm text-center text-gray-600 dark:text-gray-400" data-results-summary
                {
                    "Showing " (page.start_index + 1) " to " (page.end_index)
                    " of " (page.filtered_count) " results"
                }

                (pagination_view(&page.indicators, |page_number| params.page_url(page_number)))
            }
        }
    }
}

fn filter_form(page: &TransactionsPage) -> Markup {
    let filter = &page.params.filter;
    let sort = page.params.sort;
    let selected_category = filter.category.as_deref();

    html! {
        form
            id="transaction-filters"
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            hx-get=(endpoints::TRANSACTIONS_VIEW)
            hx-target="#transactions-content"
            hx-swap="outerHTML"
            hx-push-url="true"
            hx-trigger="input changed delay:300ms from:#search, change"
            class="grid grid-cols-1 md:grid-cols-5 gap-2"
        {
            label for="search" class="sr-only" { "Search" }
            input
                id="search"
                type="search"
                name="search"
                value=(filter.search)
                placeholder="Search transactions..."
                class={ (FORM_TEXT_INPUT_STYLE) " md:col-span-2" };

            label for="account" class="sr-only" { "Account" }
            select id="account" name="account" class=(FORM_SELECT_STYLE)
            {
                option value="all" selected[filter.account == AccountScope::All] { "All Accounts" }

                @for account in page.accounts {
                    option
                        value=(account.id)
                        selected[filter.account == AccountScope::Account(account.id)]
                    {
                        (account.name)
                    }
                }
            }

            label for="type" class="sr-only" { "Type" }
            select id="type" name="type" class=(FORM_SELECT_STYLE)
            {
                option value="all" selected[filter.transaction_type.is_none()] { "All Types" }
                option
                    value=(TransactionType::Income.as_str())
                    selected[filter.transaction_type == Some(TransactionType::Income)]
                {
                    "Income"
                }
                option
                    value=(TransactionType::Expense.as_str())
                    selected[filter.transaction_type == Some(TransactionType::Expense)]
                {
                    "Expense"
                }
            }

            label for="category" class="sr-only" { "Category" }
            select id="category" name="category" class=(FORM_SELECT_STYLE)
            {
                option value="all" selected[selected_category.is_none()] { "All Categories" }

                @for category in page.categories {
                    option
                        value=(category)
                        selected[selected_category == Some(category.as_str())]
                    {
                        (category)
                    }
                }
            }

            input type="hidden" name="sort" value=(sort.field.as_query_value());
            input type="hidden" name="order" value=(sort.direction.as_query_value());

            noscript
            {
                button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Apply" }
            }
        }
    }
}

fn sort_header(params: &TransactionsParams, field: SortField, label: &str) -> Markup {
    let is_current = params.sort.field == field;
    let (aria_sort, arrow) = match (is_current, params.sort.direction) {
        (false, _) => (None, ""),
        (true, SortDirection::Ascending) => (Some("ascending"), " ↑"),
        (true, SortDirection::Descending) => (Some("descending"), " ↓"),
    };

    html! {
        th scope="col" class=(TABLE_CELL_STYLE) aria-sort=[aria_sort]
        {
            a
                href=(params.sort_url(field))
                data-sort=(field.as_query_value())
                class="hover:underline"
            {
                (label) (arrow)
            }
        }
    }
}

fn transaction_row_view(row: &TransactionRow) -> Markup {
    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
        {
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex items-center gap-3"
                {
                    (category_icon(&row.style))
                    span class="font-medium text-gray-900 dark:text-white" { (row.description) }
                }
            }
            td class=(TABLE_CELL_STYLE)
            {
                span class={ "inline-flex px-2.5 py-0.5 text-xs font-semibold rounded-full border " (row.style.color) }
                {
                    (row.category)
                }
            }
            td class=(TABLE_CELL_STYLE) { (row.date) }
            td class=(TABLE_CELL_STYLE) { (row.account_name) }
            td class={ (TABLE_CELL_STYLE) " text-right font-semibold " (row.amount_class()) }
            {
                (row.amount)
            }
        }
    }
}
