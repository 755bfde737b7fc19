//! Dashboard module
//!
//! Provides an overview page with the most recent transactions and a pie
//! chart of expenses by category for the selected account and time period.

mod charts;
mod handlers;

pub use handlers::{DashboardQuery, DashboardState, get_dashboard_page};
