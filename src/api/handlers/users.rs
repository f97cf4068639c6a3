// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::api::extract::AuthUser;
use crate::config::Config;
use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::identity;
use crate::media;
use crate::models::{ProfileResponse, UserChanges, UserSummary};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Search users by username, display name or bio
pub async fn search_users(
    State(db_pool): State<DbPool>,
    _actor: AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    let mut conn = db::conn(&db_pool).await?;
    let users = identity::search(&mut conn, query.q.as_deref().unwrap_or("")).await?;
    Ok(Json(users))
}

/// Display a user's profile at the detail level the policy allows
pub async fn get_user(
    State(db_pool): State<DbPool>,
    AuthUser(actor): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<ProfileResponse>, AppError> {
    let mut conn = db::conn(&db_pool).await?;
    let profile = identity::user_profile(&mut conn, actor.id, &username).await?;
    Ok(Json(profile))
}

/// Update one's own profile
pub async fn edit_user(
    State(db_pool): State<DbPool>,
    AuthUser(actor): AuthUser,
    Path(username): Path<String>,
    Json(changes): Json<UserChanges>,
) -> Result<Json<serde_json::Value>, AppError> {
    if actor.username != username {
        return Err(AppError::Forbidden("cannot edit another user's profile"));
    }

    let mut conn = db::conn(&db_pool).await?;
    identity::update_user(&mut conn, actor.id, &changes).await?;
    Ok(Json(json!({ "message": "user updated" })))
}

/// Upload a new avatar for one's own profile
pub async fn upload_avatar(
    State(db_pool): State<DbPool>,
    AuthUser(actor): AuthUser,
    Path(username): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    if actor.username != username {
        return Err(AppError::Forbidden("cannot edit another user's profile"));
    }

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("avatar") {
            let filename = field
                .file_name()
                .ok_or(AppError::MalformedPayload)?
                .to_string();
            let bytes = field.bytes().await?;
            upload = Some((filename, bytes));
            break;
        }
    }
    let (filename, bytes) = upload.ok_or(AppError::MalformedPayload)?;

    let config = Config::get();
    let reference = media::store_avatar(
        std::path::Path::new(&config.media.root),
        actor.id,
        &actor.username,
        &filename,
        &bytes,
    )?;

    let mut conn = db::conn(&db_pool).await?;
    identity::update_user(
        &mut conn,
        actor.id,
        &UserChanges {
            avatar_url: Some(reference.clone()),
            ..Default::default()
        },
    )
    .await?;

    debug!("user {} updated avatar", actor.username);
    Ok(Json(json!({ "avatar_url": reference })))
}

/// Delete one's own account; everything owned goes with it
pub async fn delete_user(
    State(db_pool): State<DbPool>,
    AuthUser(actor): AuthUser,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if actor.username != username {
        return Err(AppError::Forbidden("cannot delete another user's profile"));
    }

    let mut conn = db::conn(&db_pool).await?;
    identity::delete_user(&mut conn, actor.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
