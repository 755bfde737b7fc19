//! Alert messages that HTMX swaps into the page when a partial update fails.

use maud::{Markup, html};

/// An alert to display to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Error { message: String, details: String },
}

impl Alert {
    /// Render the alert as an out-of-band swap into the `#alert-container` element.
    pub fn into_html(self) -> Markup {
        match self {
            Alert::Error { message, details } => html! {
                div
                    id="alert-container"
                    hx-swap-oob="true"
                    class="w-full max-w-md px-4"
                    style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
                {
                    div
                        role="alert"
                        class="p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50
                            dark:bg-gray-800 dark:text-red-400 border border-red-300
                            dark:border-red-800"
                    {
                        p class="font-semibold" { (message) }

                        @if !details.is_empty() {
                            p { (details) }
                        }
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::Alert;

    #[test]
    fn renders_message_and_details() {
        let alert = Alert::Error {
            message: "Something went wrong".to_owned(),
            details: "Check the logs".to_owned(),
        };

        let html = Html::parse_fragment(&alert.into_html().into_string());

        let selector = Selector::parse("#alert-container [role=alert] p").unwrap();
        let text: Vec<String> = html
            .select(&selector)
            .map(|p| p.text().collect())
            .collect();
        assert_eq!(text, vec!["Something went wrong", "Check the logs"]);
    }
}
