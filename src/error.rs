//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// A transaction type other than "INCOME" or "EXPENSE".
    #[error("\"{0}\" is not a valid transaction type")]
    InvalidTransactionType(String),

    /// Transaction amounts are stored without a sign, the type says which way the money went.
    #[error("{0} is a negative amount, which is not allowed")]
    NegativeAmount(f64),

    /// A query parameter had a value that could not be parsed.
    ///
    /// Holds the name of the parameter and the value it was given.
    #[error("invalid value \"{1}\" for query parameter \"{0}\"")]
    InvalidQueryValue(String, String),

    /// Tried to update a user that does not exist
    #[error("tried to update a user that is not in the database")]
    UpdateMissingUser,

    /// Tried to delete a user that does not exist
    #[error("tried to delete a user that is not in the database")]
    DeleteMissingUser,

    /// A webhook request was missing one of the svix headers.
    #[error("Error occured -- no svix headers")]
    MissingWebhookHeaders,

    /// The webhook secret is not a `whsec_` prefixed base64 string.
    #[error("the webhook secret is not valid: {0}")]
    InvalidWebhookSecret(String),

    /// The webhook signature did not match the payload, or the timestamp was too old.
    #[error("could not verify webhook: {0}")]
    InvalidWebhookSignature(String),

    /// The webhook body could not be parsed as an event.
    #[error("could not parse webhook payload: {0}")]
    InvalidWebhookPayload(String),

    /// An error occurred while writing transactions as CSV.
    #[error("could not write CSV: {0}")]
    CsvError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::MissingWebhookHeaders => {
                (StatusCode::BAD_REQUEST, Error::MissingWebhookHeaders.to_string()).into_response()
            }
            Error::InvalidWebhookSignature(reason) => {
                tracing::warn!("rejected webhook: {reason}");
                (StatusCode::BAD_REQUEST, "Error occured").into_response()
            }
            Error::InvalidWebhookPayload(reason) => {
                tracing::warn!("rejected webhook payload: {reason}");
                (StatusCode::BAD_REQUEST, "Error occured -- invalid payload").into_response()
            }
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    ///
    /// Used for HTMX requests, which swap the alert into the page instead of
    /// replacing the whole document.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::Error;

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }

    #[tokio::test]
    async fn missing_webhook_headers_is_bad_request() {
        let response = Error::MissingWebhookHeaders.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, "Error occured -- no svix headers");
    }

    #[test]
    fn unexpected_errors_are_internal_server_errors() {
        let response = Error::CsvError("disk full".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn alert_response_keeps_status() {
        let response = Error::DatabaseLockError.into_alert_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
