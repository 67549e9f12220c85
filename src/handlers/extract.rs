//! Extractor JSON com rejeição no formato `{"error", "status"}`

use axum::extract::FromRequest;

use crate::utils::AppError;

/// `axum::Json`, mas rejeições (JSON malformado, `Content-Type` ausente)
/// viram [`AppError::InvalidJson`]
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
