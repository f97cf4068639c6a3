// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::api::extract::AuthUser;
use crate::content;
use crate::db::{self, DbPool};
use crate::error::AppError;

/// Like a post
pub async fn like_post(
    State(db_pool): State<DbPool>,
    AuthUser(actor): AuthUser,
    Path(post_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&db_pool).await?;
    content::like_post(&mut conn, actor.id, post_id).await?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "post liked" }))))
}

/// Remove one's like from a post
pub async fn unlike_post(
    State(db_pool): State<DbPool>,
    AuthUser(actor): AuthUser,
    Path(post_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&db_pool).await?;
    content::unlike_post(&mut conn, actor.id, post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
