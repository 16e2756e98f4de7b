use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Auth service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("an account with this email already exists")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid or expired verification code")]
    InvalidCode,
    #[error("no account found with this email")]
    UserNotFound,
    #[error("unauthorized")]
    Unauthorized,
    #[error("federated sign-in is not configured")]
    FederatedUnavailable,
    #[error("federated sign-in failed")]
    FederatedFailed(anyhow::Error),
    #[error("failed to deliver verification code")]
    Delivery(anyhow::Error),
    #[error("session error")]
    Session(anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidCode => "INVALID_CODE",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::FederatedUnavailable => "FEDERATED_UNAVAILABLE",
            Self::FederatedFailed(_) => "FEDERATED_FAILED",
            Self::Delivery(_) => "DELIVERY_FAILED",
            Self::Session(_) => "SESSION",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::EmailTaken | Self::InvalidCode => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::UserNotFound | Self::FederatedUnavailable => StatusCode::NOT_FOUND,
            Self::FederatedFailed(_) | Self::Delivery(_) => StatusCode::BAD_GATEWAY,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Underlying infrastructure failure, if this variant carries one.
    pub fn cause(&self) -> Option<&anyhow::Error> {
        match self {
            Self::FederatedFailed(e) | Self::Delivery(e) | Self::Session(e) | Self::Internal(e) => {
                Some(e)
            }
            _ => None,
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx are expected client errors and TraceLayer already records them. Upstream and
        // storage failures keep their anyhow chain in the log; the client sees only the kind.
        if let Some(e) = self.cause() {
            tracing::error!(error = %format!("{e:#}"), kind = self.kind(), "auth failure");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
