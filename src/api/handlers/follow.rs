// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::api::extract::AuthUser;
use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::graph;
use crate::identity;
use crate::models::PendingRequest;

/// Send a follow request to another user
pub async fn follow(
    State(db_pool): State<DbPool>,
    AuthUser(actor): AuthUser,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&db_pool).await?;
    let receiver = identity::find_by_username(&mut conn, &username)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    graph::send_request(&mut conn, actor.id, receiver.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "follow request sent" })),
    ))
}

/// Stop following another user
pub async fn unfollow(
    State(db_pool): State<DbPool>,
    AuthUser(actor): AuthUser,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&db_pool).await?;
    let target = identity::find_by_username(&mut conn, &username)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    graph::unfollow(&mut conn, actor.id, target.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List one's received follow requests, oldest first
pub async fn get_requests(
    State(db_pool): State<DbPool>,
    AuthUser(actor): AuthUser,
) -> Result<Json<Vec<PendingRequest>>, AppError> {
    let mut conn = db::conn(&db_pool).await?;
    let requests = graph::pending_requests(&mut conn, actor.id).await?;
    Ok(Json(requests))
}

/// Accept a received follow request
pub async fn accept_request(
    State(db_pool): State<DbPool>,
    AuthUser(actor): AuthUser,
    Path(request_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&db_pool).await?;
    graph::accept_request(&mut conn, request_id, actor.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "request accepted" })),
    ))
}

/// Decline a received follow request
pub async fn decline_request(
    State(db_pool): State<DbPool>,
    AuthUser(actor): AuthUser,
    Path(request_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&db_pool).await?;
    graph::decline_request(&mut conn, request_id, actor.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
