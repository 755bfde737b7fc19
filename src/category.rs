//! Display styles for transaction categories.
//!
//! Categories are free-form labels, so any label without an entry here is
//! displayed with the style for "Other".

use crate::transaction::OTHER_CATEGORY;

/// How to draw the badge for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStyle {
    /// The glyph shown in the category badge.
    pub icon: &'static str,
    /// Tailwind classes for the badge background, text and border.
    pub color: &'static str,
}

const OTHER_STYLE: CategoryStyle = CategoryStyle {
    icon: "⋯",
    color: "bg-slate-100 text-slate-700 border-slate-200",
};

const CATEGORY_STYLES: [(&str, CategoryStyle); 12] = [
    (
        "Food & Dining",
        CategoryStyle {
            icon: "🍽",
            color: "bg-orange-100 text-orange-700 border-orange-200",
        },
    ),
    (
        "Transportation",
        CategoryStyle {
            icon: "🚗",
            color: "bg-blue-100 text-blue-700 border-blue-200",
        },
    ),
    (
        "Shopping",
        CategoryStyle {
            icon: "🛒",
            color: "bg-purple-100 text-purple-700 border-purple-200",
        },
    ),
    (
        "Entertainment",
        CategoryStyle {
            icon: "🎁",
            color: "bg-pink-100 text-pink-700 border-pink-200",
        },
    ),
    (
        "Bills & Utilities",
        CategoryStyle {
            icon: "⚡",
            color: "bg-yellow-100 text-yellow-700 border-yellow-200",
        },
    ),
    (
        "Healthcare",
        CategoryStyle {
            icon: "♥",
            color: "bg-red-100 text-red-700 border-red-200",
        },
    ),
    (
        "Travel",
        CategoryStyle {
            icon: "✈",
            color: "bg-indigo-100 text-indigo-700 border-indigo-200",
        },
    ),
    (
        "Home",
        CategoryStyle {
            icon: "🏠",
            color: "bg-green-100 text-green-700 border-green-200",
        },
    ),
    (
        "Business",
        CategoryStyle {
            icon: "💼",
            color: "bg-gray-100 text-gray-700 border-gray-200",
        },
    ),
    (
        "Income",
        CategoryStyle {
            icon: "$",
            color: "bg-emerald-100 text-emerald-700 border-emerald-200",
        },
    ),
    (
        "Coffee",
        CategoryStyle {
            icon: "☕",
            color: "bg-amber-100 text-amber-700 border-amber-200",
        },
    ),
    (OTHER_CATEGORY, OTHER_STYLE),
];

/// The colours used for the slices of the expense pie chart, in order.
pub const PIE_CHART_COLORS: [&str; 10] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEEAD", "#D4A5A5", "#9FA8DA", "#FFB347",
    "#87CEEB", "#DDA0DD",
];

/// Get the style for `category`, falling back to the "Other" style.
pub fn category_style(category: &str) -> CategoryStyle {
    CATEGORY_STYLES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, style)| *style)
        .unwrap_or(OTHER_STYLE)
}

#[cfg(test)]
mod tests {
    use super::{OTHER_STYLE, category_style};

    #[test]
    fn known_category_has_own_style() {
        let style = category_style("Travel");

        assert_ne!(style, OTHER_STYLE);
        assert!(style.color.contains("indigo"));
    }

    #[test]
    fn unknown_category_uses_other_style() {
        assert_eq!(category_style("Llama grooming"), OTHER_STYLE);
        assert_eq!(category_style("Other"), OTHER_STYLE);
        assert_eq!(category_style(""), OTHER_STYLE);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert_eq!(category_style("travel"), OTHER_STYLE);
    }
}
