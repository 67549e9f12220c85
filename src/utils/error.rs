use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use contador::CounterError;
use serde_json::json;
use std::fmt;

use crate::store::StoreError;

/// Mensagem devolvida ao cliente quando a alocação de código falha
pub const CODE_ALLOCATION_MESSAGE: &str = "Não foi possível criar o registro";

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    Unauthorized,
    NotFound(String),
    CodeAllocation(CounterError),
    Store(StoreError),
    /// Corpo JSON malformado ou sem `Content-Type: application/json`
    InvalidJson(JsonRejection),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::Unauthorized => write!(f, "Not authorized"),
            AppError::NotFound(what) => write!(f, "Not found: {}", what),
            AppError::CodeAllocation(err) => write!(f, "Code allocation failed: {}", err),
            AppError::Store(err) => write!(f, "Store error: {}", err),
            AppError::InvalidJson(rejection) => write!(f, "Invalid JSON body: {}", rejection.body_text()),
        }
    }
}

impl std::error::Error for AppError {}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidJson(rejection)
    }
}

impl From<CounterError> for AppError {
    fn from(err: CounterError) -> Self {
        AppError::CodeAllocation(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => AppError::NotFound("Not found".to_string()),
            other => AppError::Store(other),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidJson(rejection) => rejection.status(),
            AppError::Unauthorized => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::CodeAllocation(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Detalhes de store/contador vão só para o log
        let error_message = match self {
            AppError::ValidationError(msg) => msg,
            AppError::Unauthorized => "Not authorized".to_string(),
            AppError::NotFound(msg) => msg,
            AppError::CodeAllocation(err) => {
                tracing::error!("❌ Falha ao alocar código: {}", err);
                CODE_ALLOCATION_MESSAGE.to_string()
            }
            AppError::Store(err) => {
                tracing::error!("❌ Erro no store: {}", err);
                "Internal error".to_string()
            }
            AppError::InvalidJson(rejection) => rejection.body_text(),
        };

        let body = json!({
            "error": error_message,
            "status": status.as_u16()
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
