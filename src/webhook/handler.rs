//! The route handler that keeps user records in sync with the identity provider.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    user::{UserProfile, delete_user, update_user, upsert_user},
};

use super::signature::{WebhookHeaders, verify};

/// The state needed for the user webhook.
#[derive(Debug, Clone)]
pub struct WebhookState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The `whsec_` prefixed secret shared with the identity provider.
    pub webhook_secret: String,
}

impl FromRef<AppState> for WebhookState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            webhook_secret: state.webhook_secret.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: UserData,
}

#[derive(Debug, Default, Deserialize)]
struct UserData {
    id: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    #[serde(default)]
    email_addresses: Vec<EmailAddress>,
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmailAddress {
    email_address: String,
}

impl UserData {
    fn profile(&self) -> UserProfile {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        );

        UserProfile {
            name: name.trim().to_owned(),
            email: self
                .email_addresses
                .first()
                .map(|email| email.email_address.clone()),
            image_url: self.image_url.clone(),
        }
    }
}

fn get_header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

/// Handle a user lifecycle event from the identity provider.
///
/// The request must carry valid svix signature headers. Once verified, the
/// event is always acknowledged, failures to update the database are logged
/// rather than reported back to the identity provider.
pub async fn post_user_webhook(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    payload: String,
) -> Result<Response, Error> {
    let (Some(id), Some(timestamp), Some(signature)) = (
        get_header(&headers, "svix-id"),
        get_header(&headers, "svix-timestamp"),
        get_header(&headers, "svix-signature"),
    ) else {
        return Err(Error::MissingWebhookHeaders);
    };

    let webhook_headers = WebhookHeaders {
        id,
        timestamp,
        signature,
    };
    verify(
        &state.webhook_secret,
        &webhook_headers,
        &payload,
        OffsetDateTime::now_utc(),
    )?;

    let event: WebhookEvent = serde_json::from_str(&payload)
        .map_err(|error| Error::InvalidWebhookPayload(error.to_string()))?;

    tracing::info!(
        "Webhook with an ID of {} and type of {}",
        event.data.id.as_deref().unwrap_or("<none>"),
        event.event_type
    );

    handle_event(&event, &state);

    Ok(Json(json!({ "message": "Webhook received" })).into_response())
}

fn handle_event(event: &WebhookEvent, state: &WebhookState) {
    let is_user_event = matches!(
        event.event_type.as_str(),
        "user.created" | "user.updated" | "user.deleted"
    );

    if !is_user_event {
        tracing::info!("Unhandled event type: {}", event.event_type);
        return;
    }

    let Some(external_id) = event.data.id.as_deref() else {
        tracing::error!("{} event has no user ID", event.event_type);
        return;
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return;
        }
    };

    let result = match event.event_type.as_str() {
        "user.created" => upsert_user(external_id, &event.data.profile(), &connection).map(|_| ()),
        "user.updated" => update_user(external_id, &event.data.profile(), &connection),
        _ => delete_user(external_id, &connection),
    };

    match result {
        Ok(()) => tracing::info!("Handled {} for user {external_id}", event.event_type),
        Err(error) => tracing::error!(
            "Error handling {} for user {external_id}: {error}",
            event.event_type
        ),
    }
}

#[cfg(test)]
mod user_webhook_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Router,
        http::{HeaderName, HeaderValue, StatusCode},
        routing::post,
    };
    use axum_test::{TestRequest, TestServer};
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime, macros::datetime};

    use crate::{
        account::{NewAccount, create_account, get_accounts_for_user},
        db::initialize,
        endpoints,
        transaction::{NewTransaction, TransactionType, create_transaction},
        user::{UserProfile, ensure_user, get_user_by_external_id, upsert_user},
        webhook::signature::{WebhookHeaders, decode_secret, sign},
    };

    use super::{WebhookState, post_user_webhook};

    const SECRET: &str = "whsec_YSBzaGFyZWQgc2VjcmV0IGZvciB0aGUgdGVzdHMhIQ==";

    fn get_test_server() -> (TestServer, WebhookState) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let state = WebhookState {
            db_connection: Arc::new(Mutex::new(connection)),
            webhook_secret: SECRET.to_owned(),
        };

        let app = Router::new()
            .route(endpoints::USER_WEBHOOK, post(post_user_webhook))
            .with_state(state.clone());

        (
            TestServer::try_new(app).expect("Could not create test server."),
            state,
        )
    }

    fn header(name: &'static str, value: &str) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static(name),
            HeaderValue::from_str(value).unwrap(),
        )
    }

    fn signed_request(server: &TestServer, payload: &str, sent_at: OffsetDateTime) -> TestRequest {
        let timestamp = sent_at.unix_timestamp().to_string();
        let key = decode_secret(SECRET).unwrap();
        let headers = WebhookHeaders {
            id: "msg_test",
            timestamp: &timestamp,
            signature: "",
        };
        let signature = format!("v1,{}", sign(&key, &headers, payload).unwrap());

        let (id_name, id_value) = header("svix-id", "msg_test");
        let (timestamp_name, timestamp_value) = header("svix-timestamp", &timestamp);
        let (signature_name, signature_value) = header("svix-signature", &signature);

        server
            .post(endpoints::USER_WEBHOOK)
            .add_header(id_name, id_value)
            .add_header(timestamp_name, timestamp_value)
            .add_header(signature_name, signature_value)
            .text(payload.to_owned())
    }

    #[tokio::test]
    async fn missing_headers_is_bad_request() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::USER_WEBHOOK)
            .text(r#"{"type":"user.created","data":{"id":"user_1"}}"#)
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.text(), "Error occured -- no svix headers");
    }

    #[tokio::test]
    async fn bad_signature_is_bad_request() {
        let (server, state) = get_test_server();
        let (id_name, id_value) = header("svix-id", "msg_test");
        let (timestamp_name, timestamp_value) = header(
            "svix-timestamp",
            &OffsetDateTime::now_utc().unix_timestamp().to_string(),
        );
        let (signature_name, signature_value) = header("svix-signature", "v1,bm90IGl0");

        let response = server
            .post(endpoints::USER_WEBHOOK)
            .add_header(id_name, id_value)
            .add_header(timestamp_name, timestamp_value)
            .add_header(signature_name, signature_value)
            .text(r#"{"type":"user.created","data":{"id":"user_1"}}"#)
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.text(), "Error occured");
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_user_by_external_id("user_1", &connection), Ok(None));
    }

    #[tokio::test]
    async fn stale_timestamp_is_bad_request() {
        let (server, _) = get_test_server();
        let payload = r#"{"type":"user.created","data":{"id":"user_1"}}"#;

        let response = signed_request(
            &server,
            payload,
            OffsetDateTime::now_utc() - Duration::minutes(10),
        )
        .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_payload_is_bad_request() {
        let (server, _) = get_test_server();

        let response = signed_request(&server, "{not json", OffsetDateTime::now_utc()).await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.text(), "Error occured -- invalid payload");
    }

    #[tokio::test]
    async fn user_created_inserts_user() {
        let (server, state) = get_test_server();
        let payload = r#"{
            "type": "user.created",
            "data": {
                "id": "user_1",
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email_addresses": [{"email_address": "ada@example.com"}],
                "image_url": "https://img.example.com/ada.png"
            }
        }"#;

        let response = signed_request(&server, payload, OffsetDateTime::now_utc()).await;

        response.assert_status_ok();
        response.assert_json(&serde_json::json!({ "message": "Webhook received" }));
        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_external_id("user_1", &connection)
            .unwrap()
            .expect("user should exist");
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
        assert_eq!(
            user.image_url.as_deref(),
            Some("https://img.example.com/ada.png")
        );
    }

    #[tokio::test]
    async fn user_updated_overwrites_profile() {
        let (server, state) = get_test_server();
        {
            let connection = state.db_connection.lock().unwrap();
            upsert_user(
                "user_1",
                &UserProfile {
                    name: "Old Name".to_owned(),
                    email: Some("old@example.com".to_owned()),
                    image_url: None,
                },
                &connection,
            )
            .unwrap();
        }
        let payload = r#"{
            "type": "user.updated",
            "data": {
                "id": "user_1",
                "first_name": "Grace",
                "last_name": null,
                "email_addresses": [
                    {"email_address": "grace@example.com"},
                    {"email_address": "hopper@example.com"}
                ]
            }
        }"#;

        let response = signed_request(&server, payload, OffsetDateTime::now_utc()).await;

        response.assert_status_ok();
        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_external_id("user_1", &connection)
            .unwrap()
            .expect("user should exist");
        assert_eq!(user.name, "Grace");
        assert_eq!(user.email.as_deref(), Some("grace@example.com"));
        assert_eq!(user.image_url, None);
    }

    #[tokio::test]
    async fn user_deleted_removes_owned_records() {
        let (server, state) = get_test_server();
        let user_id = {
            let connection = state.db_connection.lock().unwrap();
            let user_id = ensure_user("user_1", &connection).unwrap();
            let account = create_account(
                NewAccount {
                    name: "Everyday".to_owned(),
                    is_default: true,
                },
                user_id,
                &connection,
            )
            .unwrap();
            create_transaction(
                NewTransaction {
                    account_id: account.id,
                    transaction_type: TransactionType::Expense,
                    category: Some("Travel".to_owned()),
                    amount: 100.0,
                    description: None,
                    date: datetime!(2025-03-04 12:00 UTC),
                },
                user_id,
                &connection,
            )
            .unwrap();
            user_id
        };
        let payload = r#"{"type":"user.deleted","data":{"id":"user_1","deleted":true}}"#;

        let response = signed_request(&server, payload, OffsetDateTime::now_utc()).await;

        response.assert_status_ok();
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_user_by_external_id("user_1", &connection), Ok(None));
        assert_eq!(get_accounts_for_user(user_id, &connection), Ok(vec![]));
        let transaction_count: i64 = connection
            .query_row("SELECT COUNT(*) FROM \"transaction\"", [], |row| row.get(0))
            .unwrap();
        assert_eq!(transaction_count, 0);
    }

    #[tokio::test]
    async fn store_failures_are_still_acknowledged() {
        let (server, _) = get_test_server();
        let payload = r#"{"type":"user.deleted","data":{"id":"user_missing"}}"#;

        let response = signed_request(&server, payload, OffsetDateTime::now_utc()).await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn unknown_events_are_ignored() {
        let (server, _) = get_test_server();
        let payload = r#"{"type":"session.created","data":{"id":"sess_1"}}"#;

        let response = signed_request(&server, payload, OffsetDateTime::now_utc()).await;

        response.assert_status_ok();
    }
}
