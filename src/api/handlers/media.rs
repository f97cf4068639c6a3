// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::config::Config;
use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::media;
use crate::schema::{posts, users};

/// Serve a stored post image. Only references still held by a post row
/// resolve; anything else is a 404.
pub async fn get_post_image(
    State(db_pool): State<DbPool>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let reference = format!("media/posts/{}", filename);

    let mut conn = db::conn(&db_pool).await?;
    let known = diesel::select(exists(
        posts::table.filter(posts::image_url.eq(&reference)),
    ))
    .get_result::<bool>(&mut conn)
    .await?;
    if !known {
        return Err(AppError::NotFound("post image"));
    }

    let config = Config::get();
    let path = media::post_image_path(std::path::Path::new(&config.media.root), &filename);
    let bytes = tokio::fs::read(path).await?;

    Ok((
        [(header::CONTENT_TYPE, media::content_type_for(&filename))],
        bytes,
    ))
}

/// Serve a stored avatar, resolved against users' avatar references.
pub async fn get_avatar_image(
    State(db_pool): State<DbPool>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let reference = format!("media/avatars/{}", filename);

    let mut conn = db::conn(&db_pool).await?;
    let known = diesel::select(exists(
        users::table.filter(users::avatar_url.eq(&reference)),
    ))
    .get_result::<bool>(&mut conn)
    .await?;
    if !known {
        return Err(AppError::NotFound("avatar"));
    }

    let config = Config::get();
    let path = media::avatar_path(std::path::Path::new(&config.media.root), &filename);
    let bytes = tokio::fs::read(path).await?;

    Ok((
        [(header::CONTENT_TYPE, media::content_type_for(&filename))],
        bytes,
    ))
}
