use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::notifier::DeliveryError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Malformed coordinates")]
    MalformedCoordinates,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

#[derive(Serialize)]
struct ErrorBody {
    ok: bool,
    error: &'static str,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidToken => StatusCode::FORBIDDEN,
            AppError::MalformedCoordinates | AppError::MalformedPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short code sent to the client. Delivery detail stays in the logs.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidToken => "invalid_token",
            AppError::MalformedCoordinates => "bad_coords",
            AppError::MalformedPayload(_) => "bad_request",
            AppError::Delivery(_) => "email_failed",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            ok: false,
            error: self.code(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::MalformedCoordinates.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::MalformedPayload("eof".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Delivery(DeliveryError::Transport("refused".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_delivery_detail_not_exposed() {
        let error = AppError::Delivery(DeliveryError::Provider {
            status: 401,
            message: "bad api key SG.secret".into(),
        });

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], br#"{"ok":false,"error":"email_failed"}"#);
    }
}
