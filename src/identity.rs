//! Middleware that identifies the signed in user from a header set by the upstream identity provider.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, endpoints, user::ensure_user};

/// The state needed for the identity middleware.
#[derive(Debug, Clone)]
pub struct IdentityState {
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The name of the header that holds the identity provider's user ID.
    pub identity_header: String,
}

impl FromRef<AppState> for IdentityState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            identity_header: state.identity_header.clone(),
        }
    }
}

/// Middleware function that resolves the user ID from the identity header.
///
/// Requests without the header are redirected to the landing page. Users the
/// app has not seen before are added to the database, so a user who signs in
/// before the webhook arrives can still use the app.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserId>` to receive the user ID.
pub async fn identity_guard(
    State(state): State<IdentityState>,
    mut request: Request,
    next: Next,
) -> Response {
    let external_id = request
        .headers()
        .get(state.identity_header.as_str())
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned);

    let Some(external_id) = external_id else {
        tracing::debug!(
            "request to {} has no identity header, redirecting to the landing page",
            request.uri()
        );
        return Redirect::to(endpoints::ROOT).into_response();
    };

    let user_id = match state.db_connection.lock() {
        Ok(connection) => ensure_user(&external_id, &connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(Error::DatabaseLockError)
        }
    };

    match user_id {
        Ok(user_id) => {
            request.extensions_mut().insert(user_id);
            next.run(request).await
        }
        Err(error) => {
            tracing::error!("could not get user for identity {external_id}: {error}");
            error.into_response()
        }
    }
}
