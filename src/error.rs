// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::result::DatabaseErrorKind;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error type returned by the connection pool.
pub type PoolError = deadpool::managed::PoolError<diesel_async::pooled_connection::PoolError>;

/// Failure kinds surfaced by the core operations. The HTTP layer maps each
/// kind to a status code in `IntoResponse`; none of them are retried.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("cannot send yourself a follow request")]
    SelfFollow,

    #[error("could not validate credentials")]
    Unauthenticated,

    #[error("unsupported media type")]
    UnsupportedMediaType,

    #[error("malformed request payload")]
    MalformedPayload,

    #[error("database error: {0}")]
    Database(diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("media storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("credential hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("token signing error: {0}")]
    Token(jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::SelfFollow => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::MalformedPayload => StatusCode::BAD_REQUEST,
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Io(_)
            | AppError::Image(_)
            | AppError::Hash(_)
            | AppError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => AppError::NotFound("record"),
            // Unique constraints back the duplicate checks, so a racing
            // insert fails as a conflict rather than a server error.
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                AppError::Conflict("duplicate record")
            }
            other => AppError::Database(other),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(_: axum::extract::multipart::MultipartError) -> Self {
        AppError::MalformedPayload
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed: {}", self);
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        if let AppError::Unauthenticated = self {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response();
        }

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_kinds_map_to_expected_statuses() {
        assert_eq!(
            AppError::NotFound("post").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Forbidden("not allowed").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Conflict("already following").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::SelfFollow.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::UnsupportedMediaType.status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn unique_violations_become_conflicts() {
        let err = diesel::result::Error::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key".to_string()),
        );
        assert!(matches!(AppError::from(err), AppError::Conflict(_)));
    }

    #[test]
    fn missing_rows_become_not_found() {
        let err = diesel::result::Error::NotFound;
        assert!(matches!(AppError::from(err), AppError::NotFound(_)));
    }

    #[test]
    fn unauthenticated_response_carries_challenge_header() {
        let response = AppError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }
}
