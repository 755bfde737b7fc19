//! This modules defines the common functionality for paging data.

use maud::{Markup, html};

/// The config for pagination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum number of items to display per page.
    pub page_size: u64,
    /// The maximum number of pages to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            page_size: 10,
            max_pages: 5,
        }
    }
}

/// One page of an ordered list.
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    /// The items on the page.
    pub items: &'a [T],
    /// The number of pages needed to show the whole list, zero for an empty list.
    pub total_pages: u64,
    /// The index of the first item on the page.
    pub start_index: usize,
    /// One past the index of the last item on the page.
    pub end_index: usize,
}

/// Get page `page` (starting from 1) of `items`.
///
/// The slice is clipped to the bounds of `items`, so a page past the end, or
/// page zero, is an empty page rather than an error. Callers that want to
/// show the nearest valid page should clamp `page` with [clamp_page] first.
/// A `page_size` of zero is treated as one.
pub fn paginate<T>(items: &[T], page: u64, page_size: u64) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = (items.len() as u64).div_ceil(page_size);

    if page == 0 {
        return Page {
            items: &[],
            total_pages,
            start_index: 0,
            end_index: 0,
        };
    }

    let start_index = usize::try_from((page - 1).saturating_mul(page_size))
        .unwrap_or(usize::MAX)
        .min(items.len());
    let end_index = usize::try_from(page.saturating_mul(page_size))
        .unwrap_or(usize::MAX)
        .min(items.len());

    Page {
        items: &items[start_index..end_index],
        total_pages,
        start_index,
        end_index,
    }
}

/// Clamp `page` to `[1, max(total_pages, 1)]`.
pub fn clamp_page(page: u64, total_pages: u64) -> u64 {
    page.clamp(1, total_pages.max(1))
}

/// The page numbers to show in a navigation widget.
///
/// All pages are shown if there are at most `max_pages`, otherwise a window
/// of `max_pages` pages centred on `curr_page` that never starts before the
/// first page or runs past the last page.
pub fn page_numbers(curr_page: u64, page_count: u64, max_pages: u64) -> Vec<u64> {
    if page_count <= max_pages {
        return (1..=page_count).collect();
    }

    let last_start = page_count - max_pages + 1;
    let start = curr_page.saturating_sub(max_pages / 2).clamp(1, last_start);

    (start..start + max_pages).collect()
}

#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    /// Links to the previous page, `None` on the first page.
    BackButton(Option<u64>),
    /// Links to the next page, `None` on the last page.
    NextButton(Option<u64>),
}

pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let mut indicators = Vec::with_capacity(max_pages as usize + 2);

    indicators.push(PaginationIndicator::BackButton(
        (curr_page > 1).then(|| curr_page - 1),
    ));

    indicators.extend(
        page_numbers(curr_page, page_count, max_pages)
            .into_iter()
            .map(|page| {
                if page == curr_page {
                    PaginationIndicator::CurrPage(page)
                } else {
                    PaginationIndicator::Page(page)
                }
            }),
    );

    indicators.push(PaginationIndicator::NextButton(
        (curr_page < page_count).then(|| curr_page + 1),
    ));

    indicators
}

const PAGE_LINK_STYLE: &str = "px-3 py-2 rounded border border-gray-300 \
    dark:border-gray-600 text-gray-700 dark:text-gray-200 hover:bg-gray-100 \
    dark:hover:bg-gray-700";
const CURRENT_PAGE_STYLE: &str = "px-3 py-2 rounded border border-blue-600 \
    bg-blue-600 text-white";
const DISABLED_BUTTON_STYLE: &str = "px-3 py-2 rounded border border-gray-200 \
    dark:border-gray-700 text-gray-400 dark:text-gray-500 cursor-not-allowed";

/// Render the pagination indicators as a list of links.
///
/// `page_url` builds the URL for a page number.
pub fn pagination_view(
    indicators: &[PaginationIndicator],
    page_url: impl Fn(u64) -> String,
) -> Markup {
    html! {
        nav aria-label="Pagination" class="pagination flex justify-center my-4"
        {
            ul class="inline-flex items-center gap-1 text-sm"
            {
                @for indicator in indicators {
                    li
                    {
                        @match indicator {
                            PaginationIndicator::BackButton(Some(page)) => {
                                a href=(page_url(*page)) class=(PAGE_LINK_STYLE) { "Previous" }
                            }
                            PaginationIndicator::BackButton(None) => {
                                span class=(DISABLED_BUTTON_STYLE) aria-disabled="true" { "Previous" }
                            }
                            PaginationIndicator::Page(page) => {
                                a href=(page_url(*page)) class=(PAGE_LINK_STYLE) { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                span class=(CURRENT_PAGE_STYLE) aria-current="page" { (page) }
                            }
                            PaginationIndicator::NextButton(Some(page)) => {
                                a href=(page_url(*page)) class=(PAGE_LINK_STYLE) { "Next" }
                            }
                            PaginationIndicator::NextButton(None) => {
                                span class=(DISABLED_BUTTON_STYLE) aria-disabled="true" { "Next" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod paginate_tests {
    use super::{clamp_page, paginate};

    #[test]
    fn last_page_is_partial() {
        let items: Vec<u32> = (0..23).collect();

        let page = paginate(&items, 3, 10);

        assert_eq!(page.items, &[20, 21, 22]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.start_index, 20);
        assert_eq!(page.end_index, 23);
    }

    #[test]
    fn empty_list_has_no_pages() {
        let items: Vec<u32> = Vec::new();

        let page = paginate(&items, 1, 10);

        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let items: Vec<u32> = (0..5).collect();

        let page = paginate(&items, 4, 10);

        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.start_index, 5);
        assert_eq!(page.end_index, 5);
    }

    #[test]
    fn page_zero_is_empty() {
        let items: Vec<u32> = (0..5).collect();

        let page = paginate(&items, 0, 10);

        assert!(page.items.is_empty());
    }

    #[test]
    fn pages_reconstruct_the_list() {
        let items: Vec<u32> = (0..47).collect();

        for page_size in 1..=12 {
            let total_pages = paginate(&items, 1, page_size).total_pages;
            let rebuilt: Vec<u32> = (1..=total_pages)
                .flat_map(|page| paginate(&items, page, page_size).items.to_vec())
                .collect();

            assert_eq!(rebuilt, items, "page size {page_size} lost or duplicated items");
        }
    }

    #[test]
    fn clamp_page_stays_in_range() {
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(2, 3), 2);
        assert_eq!(clamp_page(9, 3), 3);
        assert_eq!(clamp_page(5, 0), 1);
    }
}


#[cfg(test)]
mod view_tests {
    use scraper::{Html, Selector};

    use super::{create_pagination_indicators, pagination_view};

    #[test]
    fn renders_links_for_other_pages_only() {
        let indicators = create_pagination_indicators(1, 3, 5);

        let html = pagination_view(&indicators, |page| format!("/items?page={page}"));
        let html = Html::parse_fragment(&html.into_string());

        let link_selector = Selector::parse("a").unwrap();
        let hrefs: Vec<&str> = html
            .select(&link_selector)
            .filter_map(|link| link.value().attr("href"))
            .collect();
        assert_eq!(hrefs, vec!["/items?page=2", "/items?page=3", "/items?page=2"]);

        let disabled_selector = Selector::parse("span[aria-disabled=true]").unwrap();
        let disabled: Vec<String> = html
            .select(&disabled_selector)
            .map(|span| span.text().collect())
            .collect();
        assert_eq!(disabled, vec!["Previous".to_owned()]);
    }
}
