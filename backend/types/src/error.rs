use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("provider not supported")]
    ProviderNotSupported,
    #[error("authentication failed")]
    AuthenticationFailed,
    #[error("internal server error")]
    Internal,
}

/// JSON body carried by every error response: `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::ProviderNotSupported => StatusCode::BAD_REQUEST,
            Error::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            Error::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }

    pub fn into_response_tuple(self) -> (StatusCode, Json<ErrorBody>) {
        (self.status_code(), Json(self.body()))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.into_response_tuple().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Error::ProviderNotSupported, StatusCode::BAD_REQUEST)]
    #[case(Error::AuthenticationFailed, StatusCode::UNAUTHORIZED)]
    #[case(Error::Internal, StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_status_code(#[case] error: Error, #[case] expected: StatusCode) {
        assert_eq!(error.status_code(), expected);
    }

    #[rstest]
    #[case(Error::ProviderNotSupported, r#"{"error":"provider not supported"}"#)]
    #[case(Error::AuthenticationFailed, r#"{"error":"authentication failed"}"#)]
    fn test_error_body_wire_format(#[case] error: Error, #[case] expected: &str) {
        let json = serde_json::to_string(&error.body()).unwrap();
        assert_eq!(json, expected);
    }
}
