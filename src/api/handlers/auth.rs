// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::auth;
use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::identity;
use crate::models::NewUser;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Register a new user
pub async fn signup(
    State(db_pool): State<DbPool>,
    Json(form): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let password_hash = auth::hash_password(&form.password)?;

    let mut conn = db::conn(&db_pool).await?;
    let user = identity::create_user(
        &mut conn,
        NewUser {
            username: form.username,
            display_name: form.display_name,
            email: form.email,
            password_hash,
            created_at: Utc::now(),
        },
    )
    .await?;

    debug!("signup complete for {}", user.username);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": user.id,
            "username": user.username
        })),
    ))
}

/// Exchange credentials for an access token
pub async fn login(
    State(db_pool): State<DbPool>,
    Json(form): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let mut conn = db::conn(&db_pool).await?;
    let user = identity::find_by_username(&mut conn, &form.username)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    if !auth::verify_password(&form.password, &user.password_hash)? {
        return Err(AppError::Unauthenticated);
    }

    let access_token = auth::create_access_token(user.id)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}
