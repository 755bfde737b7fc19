//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    dashboard::get_dashboard_page,
    endpoints,
    identity::identity_guard,
    internal_server_error::get_internal_server_error_page,
    landing::get_landing_page,
    not_found::get_404_not_found,
    transaction::{get_transactions_export, get_transactions_page},
    webhook::post_user_webhook,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_landing_page))
        .route(endpoints::USER_WEBHOOK, post(post_user_webhook))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::TRANSACTIONS_EXPORT, get(get_transactions_export))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            identity_guard,
        ));

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, DEFAULT_IDENTITY_HEADER, endpoints, pagination::PaginationConfig};

    use super::build_router;

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "Etc/UTC",
            PaginationConfig::default(),
            "whsec_YSBzaGFyZWQgc2VjcmV0IGZvciB0aGUgdGVzdHMhIQ==",
            DEFAULT_IDENTITY_HEADER,
        )
        .unwrap();

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    fn identity() -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static(DEFAULT_IDENTITY_HEADER),
            HeaderValue::from_static("user_1"),
        )
    }

    #[tokio::test]
    async fn landing_page_is_public() {
        let server = get_test_server();

        let response = server.get(endpoints::ROOT).await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn protected_pages_redirect_without_identity() {
        let server = get_test_server();

        for endpoint in [
            endpoints::DASHBOARD_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::TRANSACTIONS_EXPORT,
        ] {
            let response = server.get(endpoint).await;

            assert_eq!(
                response.status_code(),
                StatusCode::SEE_OTHER,
                "{endpoint} should redirect"
            );
            assert_eq!(response.header("location"), endpoints::ROOT);
        }
    }

    #[tokio::test]
    async fn protected_pages_load_with_identity() {
        let server = get_test_server();

        for endpoint in [
            endpoints::DASHBOARD_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::TRANSACTIONS_EXPORT,
        ] {
            let (name, value) = identity();
            let response = server.get(endpoint).add_header(name, value).await;

            assert_eq!(
                response.status_code(),
                StatusCode::OK,
                "{endpoint} should load"
            );
        }
    }

    #[tokio::test]
    async fn webhook_does_not_need_identity() {
        let server = get_test_server();

        let response = server.post(endpoints::USER_WEBHOOK).text("{}").await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        let response = server.get("/budgets").await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }
}
