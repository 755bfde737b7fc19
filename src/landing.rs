//! The marketing page shown at the root of the site.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, CARD_STYLE, base},
};

struct Stat {
    value: &'static str,
    label: &'static str,
}

struct Feature {
    icon: &'static str,
    title: &'static str,
    description: &'static str,
}

struct Testimonial {
    name: &'static str,
    role: &'static str,
    company: &'static str,
    image_url: &'static str,
    quote: &'static str,
    achievement: &'static str,
}

const STATS: [Stat; 4] = [
    Stat {
        value: "50K+",
        label: "Active Users",
    },
    Stat {
        value: "$2B+",
        label: "Transactions Tracked",
    },
    Stat {
        value: "99.9%",
        label: "Uptime",
    },
    Stat {
        value: "4.9/5",
        label: "User Rating",
    },
];

const FEATURES: [Feature; 6] = [
    Feature {
        icon: "📊",
        title: "Advanced Analytics",
        description: "Get detailed insights into your spending patterns with AI-powered analytics",
    },
    Feature {
        icon: "🧾",
        title: "Smart Receipt Scanner",
        description: "Extract data automatically from receipts using advanced AI technology",
    },
    Feature {
        icon: "🥧",
        title: "Budget Planning",
        description: "Create and manage budgets with intelligent recommendations",
    },
    Feature {
        icon: "💳",
        title: "Multi-Account Support",
        description: "Manage multiple accounts and credit cards in one place",
    },
    Feature {
        icon: "🌐",
        title: "Multi-Currency",
        description: "Support for multiple currencies with real-time conversion",
    },
    Feature {
        icon: "⚡",
        title: "Automated Insights",
        description: "Get automated financial insights and recommendations",
    },
];

const STEPS: [Feature; 3] = [
    Feature {
        icon: "💳",
        title: "1. Create Your Account",
        description: "Get started in minutes with our simple and secure sign-up process",
    },
    Feature {
        icon: "📊",
        title: "2. Track Your Spending",
        description: "Automatically categorize and track your transactions in real-time",
    },
    Feature {
        icon: "🥧",
        title: "3. Get Insights",
        description: "Receive AI-powered insights and recommendations to optimize your finances",
    },
];

const TESTIMONIALS: [Testimonial; 3] = [
    Testimonial {
        name: "Alexandra Chen",
        role: "Tech Entrepreneur",
        company: "InnovateLab",
        image_url: "https://randomuser.me/api/portraits/women/68.jpg",
        quote: "SpendSense AI helped me reduce business expenses by 40% in just 3 months. \
            The AI predictions are incredibly accurate!",
        achievement: "40% Cost Reduction",
    },
    Testimonial {
        name: "Marcus Rodriguez",
        role: "Investment Banker",
        company: "Goldman Sachs",
        image_url: "https://randomuser.me/api/portraits/men/32.jpg",
        quote: "Finally, a financial tool that thinks like I do. \
            The real-time insights have saved me over $50,000 in potential losses.",
        achievement: "$50K+ Saved",
    },
    Testimonial {
        name: "Priya Sharma",
        role: "Financial Consultant",
        company: "WealthMax Advisory",
        image_url: "https://randomuser.me/api/portraits/women/44.jpg",
        quote: "My clients' portfolio performance improved by 35% after implementing \
            SpendSense AI's recommendations. It's a game-changer!",
        achievement: "35% Performance Boost",
    },
];

/// Display the landing page.
pub async fn get_landing_page() -> Response {
    landing_view().into_response()
}

fn landing_view() -> Markup {
    let content = html!(
        main class="min-h-screen bg-white dark:bg-gray-900 text-gray-900 dark:text-white"
        {
            (hero_section())
            (stats_section())
            (features_section())
            (how_it_works_section())
            (testimonials_section())
            (call_to_action_section())
        }
    );

    base("Home", &[], &content)
}

fn hero_section() -> Markup {
    html!(
        section id="hero" class="pt-32 pb-20 px-4 text-center"
        {
            h1 class="text-5xl md:text-7xl font-extrabold mb-8 leading-tight"
            {
                "Manage Your Finances"
                br;
                span
                    class="bg-gradient-to-r from-blue-600 to-purple-600
                        bg-clip-text text-transparent"
                {
                    "with Intelligence"
                }
            }

            p class="text-xl text-gray-600 dark:text-gray-400 mb-8 max-w-3xl mx-auto"
            {
                "An AI-powered financial management platform that helps you track,
                analyze, and optimize your spending with "
                span class="font-semibold text-blue-600" { "real-time insights" }
                " and predictive analytics."
            }

            div class="flex justify-center gap-4"
            {
                a href=(endpoints::DASHBOARD_VIEW) class=(BUTTON_PRIMARY_STYLE) data-cta
                {
                    "Get Started"
                }
            }
        }
    )
}

fn stats_section() -> Markup {
    html!(
        section id="stats" class="py-20 bg-blue-50 dark:bg-gray-800"
        {
            div class="container mx-auto px-4 grid grid-cols-2 md:grid-cols-4 gap-8"
            {
                @for stat in &STATS {
                    div class="text-center"
                    {
                        div class="text-4xl font-bold text-blue-600 mb-2" { (stat.value) }
                        div class="text-gray-600 dark:text-gray-400" { (stat.label) }
                    }
                }
            }
        }
    )
}

fn feature_card(feature: &Feature) -> Markup {
    html!(
        div class={ (CARD_STYLE) " p-6 space-y-4" }
        {
            div class="text-3xl" aria-hidden="true" { (feature.icon) }
            h3 class="text-xl font-semibold" { (feature.title) }
            p class="text-gray-600 dark:text-gray-400" { (feature.description) }
        }
    )
}

fn features_section() -> Markup {
    html!(
        section id="features" class="py-20"
        {
            div class="container mx-auto px-4"
            {
                h2 class="text-3xl font-bold text-center mb-12"
                {
                    "Everything you need to manage your finances"
                }

                div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-8"
                {
                    @for feature in &FEATURES {
                        (feature_card(feature))
                    }
                }
            }
        }
    )
}

fn how_it_works_section() -> Markup {
    html!(
        section id="how-it-works" class="py-20 bg-blue-50 dark:bg-gray-800"
        {
            div class="container mx-auto px-4"
            {
                h2 class="text-3xl font-bold text-center mb-16" { "How It Works" }

                div class="grid grid-cols-1 md:grid-cols-3 gap-12"
                {
                    @for step in &STEPS {
                        div class="text-center"
                        {
                            div
                                class="w-16 h-16 bg-blue-100 rounded-full flex items-center
                                    justify-center mx-auto mb-6 text-3xl"
                                aria-hidden="true"
                            {
                                (step.icon)
                            }
                            h3 class="text-xl font-semibold mb-4" { (step.title) }
                            p class="text-gray-600 dark:text-gray-400" { (step.description) }
                        }
                    }
                }
            }
        }
    )
}

fn testimonials_section() -> Markup {
    html!(
        section id="testimonials" class="py-20"
        {
            div class="container mx-auto px-4"
            {
                div class="text-center mb-16"
                {
                    h2 class="text-4xl md:text-5xl font-bold mb-4" { "Real Results from Real Users" }
                    p class="text-xl text-gray-600 dark:text-gray-400 max-w-2xl mx-auto"
                    {
                        "See how SpendSense AI is transforming financial management for
                        professionals worldwide"
                    }
                }

                div class="grid grid-cols-1 lg:grid-cols-3 gap-8"
                {
                    @for testimonial in &TESTIMONIALS {
                        figure class={ (CARD_STYLE) " p-6 flex flex-col gap-4" }
                        {
                            blockquote class="text-gray-700 dark:text-gray-300"
                            {
                                "\u{201c}" (testimonial.quote) "\u{201d}"
                            }

                            span
                                class="self-start px-3 py-1 text-sm font-semibold
                                    text-green-800 bg-green-100 rounded-full"
                            {
                                (testimonial.achievement)
                            }

                            figcaption class="flex items-center gap-3 mt-auto"
                            {
                                img
                                    src=(testimonial.image_url)
                                    alt=(testimonial.name)
                                    class="w-12 h-12 rounded-full"
                                    loading="lazy";
                                div
                                {
                                    p class="font-semibold" { (testimonial.name) }
                                    p class="text-sm text-gray-500 dark:text-gray-400"
                                    {
                                        (testimonial.role) ", " (testimonial.company)
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    )
}

fn call_to_action_section() -> Markup {
    html!(
        section id="call-to-action" class="py-20 bg-blue-600"
        {
            div class="container mx-auto px-4 text-center"
            {
                h2 class="text-3xl font-bold text-white mb-4"
                {
                    "Ready to Take Control of Your Finances?"
                }
                p class="text-blue-100 mb-8 max-w-2xl mx-auto"
                {
                    "Join thousands of users who are already managing their finances
                    smarter with SpendSense AI"
                }
                a
                    href=(endpoints::DASHBOARD_VIEW)
                    class="inline-flex items-center px-8 py-3 rounded-lg font-semibold
                        bg-white text-blue-600 hover:bg-blue-50"
                    data-cta
                {
                    "Start Free Trial"
                }
            }
        }
    )
}

#[cfg(test)]
mod tests {
    use scraper::Selector;

    use crate::{
        endpoints,
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
    };

    use super::get_landing_page;

    #[tokio::test]
    async fn renders_every_section() {
        let response = get_landing_page().await;

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        for id in [
            "hero",
            "stats",
            "features",
            "how-it-works",
            "testimonials",
            "call-to-action",
        ] {
            let selector = Selector::parse(&format!("section#{id}")).unwrap();
            assert!(html.select(&selector).next().is_some(), "missing section {id}");
        }
    }

    #[tokio::test]
    async fn calls_to_action_link_to_dashboard() {
        let response = get_landing_page().await;
        let html = parse_html_document(response).await;

        let selector = Selector::parse("a[data-cta]").unwrap();
        let links: Vec<_> = html
            .select(&selector)
            .filter_map(|link| link.value().attr("href"))
            .collect();
        assert_eq!(links, vec![endpoints::DASHBOARD_VIEW, endpoints::DASHBOARD_VIEW]);
    }
}
