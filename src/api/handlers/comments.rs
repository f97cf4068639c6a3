// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::api::extract::AuthUser;
use crate::content;
use crate::db::{self, DbPool};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub body: String,
    /// Present when replying to a top-level comment on the same post.
    pub parent_id: Option<i32>,
}

/// Comment on a post, or reply to one of its comments
pub async fn create_comment(
    State(db_pool): State<DbPool>,
    AuthUser(actor): AuthUser,
    Path(post_id): Path<i32>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&db_pool).await?;
    let comment = content::create_comment(
        &mut conn,
        actor.id,
        post_id,
        request.body,
        request.parent_id,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Delete one's own comment or reply
pub async fn delete_comment(
    State(db_pool): State<DbPool>,
    AuthUser(actor): AuthUser,
    Path(comment_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&db_pool).await?;
    content::delete_comment(&mut conn, actor.id, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
