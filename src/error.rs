use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Invalid input")]
    Validation(Vec<String>),

    #[error("Unauthorized {0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl AppError {
    /// A unique-index violation becomes a 400 with `message`; anything else stays a 500.
    pub fn on_unique_violation(err: DbErr, message: impl Into<String>) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::BadRequest(message.into()),
            _ => AppError::OrmError(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::DbError(err) => tracing::error!(error = ?err, "database error"),
            AppError::OrmError(err) => tracing::error!(error = ?err, "orm error"),
            AppError::Internal(err) => tracing::error!(error = %err, "internal error"),
            _ => {}
        }

        let errors = match &self {
            AppError::Validation(messages) => messages.clone(),
            _ => Vec::new(),
        };

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
                errors,
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Collects form-style validation messages before failing with `AppError::Validation`.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.errors.push(message.into());
        }
        self
    }

    pub fn finish(&mut self) -> AppResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn assert_error(error: AppError, expected_status: StatusCode, expected_message: &str) {
        let resp = error.into_response();
        assert_eq!(resp.status(), expected_status);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["message"], expected_message);
        assert_eq!(json["data"]["error"], expected_message);
    }

    #[tokio::test]
    async fn should_return_not_found() {
        assert_error(AppError::NotFound, StatusCode::NOT_FOUND, "Not Found").await;
    }

    #[tokio::test]
    async fn should_return_bad_request() {
        assert_error(
            AppError::BadRequest("Cart is empty".into()),
            StatusCode::BAD_REQUEST,
            "Bad Request Cart is empty",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_unauthorized() {
        assert_error(
            AppError::Unauthorized("Missing Authorization header".into()),
            StatusCode::UNAUTHORIZED,
            "Unauthorized Missing Authorization header",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_forbidden() {
        assert_error(AppError::Forbidden, StatusCode::FORBIDDEN, "Forbidden").await;
    }

    #[tokio::test]
    async fn should_hide_internal_details() {
        assert_error(
            AppError::Internal(anyhow::anyhow!("connection refused")),
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
        )
        .await;
    }

    #[test]
    fn other_orm_errors_stay_internal() {
        let err = AppError::on_unique_violation(DbErr::Custom("boom".into()), "already taken");
        assert!(matches!(err, AppError::OrmError(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn validation_lists_every_message() {
        let resp = AppError::Validation(vec![
            "name is required".into(),
            "price must be >= 0".into(),
        ])
        .into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["data"]["errors"][0], "name is required");
        assert_eq!(json["data"]["errors"][1], "price must be >= 0");
    }

    #[test]
    fn validator_collects_failures_only() {
        let mut v = Validator::new();
        v.check(true, "never shown").check(false, "username is required");
        match v.finish() {
            Err(AppError::Validation(errors)) => assert_eq!(errors, vec!["username is required"]),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(Validator::new().check(true, "ok").finish().is_ok());
    }
}
