//! The expense breakdown pie chart.
//!
//! The chart options are generated with `charming` and handed to ECharts in
//! the browser. The initialisation script is rendered inline, directly after
//! the chart container, so the chart is drawn both on a full page load and
//! when HTMX swaps in new dashboard content.

use charming::{
    Chart,
    element::{Color, ItemStyle, JsFunction, Label, Tooltip, Trigger},
    series::Pie,
};
use maud::{Markup, PreEscaped, html};

use crate::{category::PIE_CHART_COLORS, transaction::CategorySummary};

/// The ECharts bundle, loaded in the page head.
pub(super) const ECHARTS_SCRIPT_URL: &str =
    "https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js";

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// The colour used for the slice at `index`, cycling through the palette.
pub(super) fn slice_color(index: usize) -> &'static str {
    PIE_CHART_COLORS[index % PIE_CHART_COLORS.len()]
}

/// Renders the chart container followed by the script that draws the chart.
///
/// Charts are kept in `window.dashboardCharts` by container ID. A chart left
/// over from an earlier HTMX swap is disposed before the new one is drawn, and
/// the resize and colour scheme listeners are registered once per page.
pub(super) fn chart_view(chart: &DashboardChart) -> Markup {
    let script = format!(
        r#"(function() {{
            const chartDom = document.getElementById("{}");
            if (!chartDom || typeof echarts === "undefined") {{
                return;
            }}
            const charts = window.dashboardCharts || (window.dashboardCharts = {{}});
            const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
            const themeName = () => darkModeMediaQuery.matches ? 'dark' : 'default';

            if (!window.dashboardChartListeners) {{
                window.dashboardChartListeners = true;
                window.addEventListener('resize', () => {{
                    Object.values(charts).forEach((instance) => instance.resize());
                }});
                darkModeMediaQuery.addEventListener('change', () => {{
                    Object.values(charts).forEach((instance) => instance.setTheme(themeName()));
                }});
            }}

            const previous = charts[chartDom.id];
            if (previous && !previous.isDisposed()) {{
                previous.dispose();
            }}
            const existing = echarts.getInstanceByDom(chartDom);
            if (existing) {{
                existing.dispose();
            }}

            const chart = echarts.init(chartDom);
            charts[chartDom.id] = chart;
            const option = {};
            chart.setOption(option, true);
            chart.setTheme(themeName());
        }})();"#,
        chart.id,
        escape_script_json(&chart.options)
    );

    html!(
        div
            id=(chart.id)
            class="w-full min-h-[300px]"
        {}

        script { (PreEscaped(script)) }
    )
}

/// Replaces `<`, `>` and `&` with their `\u` escapes so that text from the
/// chart data cannot close the surrounding `<script>` element.
fn escape_script_json(json: &str) -> String {
    let mut escaped = String::with_capacity(json.len());

    for c in json.chars() {
        match c {
            '<' => escaped.push_str("\\u003c"),
            '>' => escaped.push_str("\\u003e"),
            '&' => escaped.push_str("\\u0026"),
            _ => escaped.push(c),
        }
    }

    escaped
}

/// A doughnut chart of the expense totals per category, largest first.
pub(super) fn expense_pie_chart(summary: &CategorySummary) -> Chart {
    let colors = (0..summary.categories.len())
        .map(|index| Color::from(slice_color(index)))
        .collect();

    let data: Vec<(f64, String)> = summary
        .categories
        .iter()
        .map(|category_total| (category_total.total, category_total.category.clone()))
        .collect();

    Chart::new()
        .color(colors)
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .series(
            Pie::new()
                .name("Expenses")
                .radius(vec!["45%", "75%"])
                .avoid_label_overlap(true)
                .item_style(
                    ItemStyle::new()
                        .border_radius(6)
                        .border_color("#fff")
                        .border_width(2),
                )
                .label(Label::new().show(false))
                .data(data),
        )
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::transaction::{CategorySummary, CategoryTotal};

    use super::{DashboardChart, chart_view, escape_script_json, expense_pie_chart, slice_color};

    fn summary() -> CategorySummary {
        CategorySummary {
            categories: vec![
                CategoryTotal {
                    category: "Travel".to_owned(),
                    total: 150.0,
                },
                CategoryTotal {
                    category: "Food & Dining".to_owned(),
                    total: 42.5,
                },
            ],
            total_expense: 192.5,
        }
    }

    #[test]
    fn pie_chart_has_a_slice_per_category() {
        let options = expense_pie_chart(&summary()).to_string();

        assert!(options.contains("\"pie\""), "{options}");
        assert!(options.contains("Travel"), "{options}");
        assert!(options.contains("Food & Dining"), "{options}");
        assert!(options.contains("150"), "{options}");
    }

    #[test]
    fn pie_chart_uses_palette_in_order() {
        let options = expense_pie_chart(&summary()).to_string();

        let first = options.find(slice_color(0)).expect("missing first colour");
        let second = options.find(slice_color(1)).expect("missing second colour");
        assert!(first < second);
        assert!(!options.contains(slice_color(2)));
    }

    #[test]
    fn palette_wraps_around() {
        assert_eq!(slice_color(10), slice_color(0));
        assert_eq!(slice_color(13), slice_color(3));
    }

    #[test]
    fn chart_view_renders_container_and_script() {
        let chart = DashboardChart {
            id: "expense-chart",
            options: "{}".to_owned(),
        };

        let html = Html::parse_fragment(&chart_view(&chart).into_string());

        let container = Selector::parse("div#expense-chart").unwrap();
        assert!(html.select(&container).next().is_some());
        let script = Selector::parse("script").unwrap();
        let script: String = html
            .select(&script)
            .next()
            .expect("missing chart script")
            .text()
            .collect();
        assert!(script.contains("getElementById(\"expense-chart\")"));
    }

    fn chart_script(html: &Html) -> String {
        let script = Selector::parse("script").unwrap();
        html.select(&script)
            .next()
            .expect("missing chart script")
            .text()
            .collect()
    }

    #[test]
    fn category_names_cannot_close_the_chart_script() {
        let label = "</script><img src=x onerror=alert(1)>";
        let summary = CategorySummary {
            categories: vec![CategoryTotal {
                category: label.to_owned(),
                total: 10.0,
            }],
            total_expense: 10.0,
        };
        let chart = DashboardChart {
            id: "expense-chart",
            options: expense_pie_chart(&summary).to_string(),
        };

        let html = Html::parse_fragment(&chart_view(&chart).into_string());

        let img = Selector::parse("img").unwrap();
        assert!(html.select(&img).next().is_none());
        let script = chart_script(&html);
        assert!(!script.contains("</script"), "{script}");
        assert!(
            script.contains("\\u003c/script\\u003e\\u003cimg src=x onerror=alert(1)\\u003e"),
            "{script}"
        );
    }

    #[test]
    fn escapes_markup_characters_in_options() {
        assert_eq!(
            escape_script_json(r#"{"name":"Food & <b>Dining</b>"}"#),
            r#"{"name":"Food \u0026 \u003cb\u003eDining\u003c/b\u003e"}"#
        );
    }

    #[test]
    fn chart_script_replaces_previous_chart_and_registers_listeners_once() {
        let chart = DashboardChart {
            id: "expense-chart",
            options: "{}".to_owned(),
        };

        let html = Html::parse_fragment(&chart_view(&chart).into_string());

        let script = chart_script(&html);
        assert!(script.contains("previous.dispose()"), "{script}");
        assert!(script.contains("if (!window.dashboardChartListeners)"), "{script}");
        assert_eq!(script.matches("addEventListener('resize'").count(), 1);
    }
}
