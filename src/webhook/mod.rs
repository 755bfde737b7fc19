//! Receives user lifecycle events from the identity provider.

mod handler;
pub mod signature;

pub use handler::{WebhookState, post_user_webhook};
