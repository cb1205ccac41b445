use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

/// HTTP-boundary error taxonomy. Every variant maps to exactly one status
/// code, and no variant puts internal detail into the response body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Cita no encontrada.")]
    NotFound,

    #[error("Error interno del servidor al procesar la cita.")]
    Persistence(#[from] sqlx::Error),

    #[error("Error interno del servidor al generar el código QR.")]
    CredentialEncoding(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Persistence(_) | ApiError::CredentialEncoding(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Full detail goes to the log, never to the client.
        match self {
            ApiError::Persistence(err) => {
                tracing::error!(error = %err, "persistence failure");
            }
            ApiError::CredentialEncoding(detail) => {
                tracing::error!(%detail, "credential encoding failure");
            }
            _ => {}
        }
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_map_to_distinct_status_codes() {
        assert_eq!(
            ApiError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Persistence(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::CredentialEncoding("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn persistence_error_does_not_leak_driver_detail() {
        let err = ApiError::Persistence(sqlx::Error::PoolTimedOut);
        assert_eq!(
            err.to_string(),
            "Error interno del servidor al procesar la cita."
        );
    }
}
