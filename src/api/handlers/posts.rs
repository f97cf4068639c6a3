// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::api::extract::AuthUser;
use crate::config::Config;
use crate::content;
use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::feed::{self, SortMode};
use crate::media;
use crate::models::{NewPost, PostDetail, PostPatch, PostView};

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub page: Option<i64>,
    pub sort: Option<String>,
}

/// Display the actor's feed
pub async fn get_feed(
    State(db_pool): State<DbPool>,
    AuthUser(actor): AuthUser,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<PostView>>, AppError> {
    let page = query.page.unwrap_or(1);
    let sort = SortMode::parse(query.sort.as_deref());

    let mut conn = db::conn(&db_pool).await?;
    let posts = feed::get_feed(&mut conn, actor.id, page, sort).await?;
    Ok(Json(posts))
}

/// Create a post from a multipart upload: an `image` file plus optional
/// `caption`, `published` and `location` fields.
pub async fn create_post(
    State(db_pool): State<DbPool>,
    AuthUser(actor): AuthUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut image = None;
    let mut caption = None;
    let mut published = true;
    let mut location = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(|name| name.to_string());
        match name.as_deref() {
            Some("image") => {
                let filename = field
                    .file_name()
                    .ok_or(AppError::MalformedPayload)?
                    .to_string();
                let bytes = field.bytes().await?;
                image = Some((filename, bytes));
            }
            Some("caption") => caption = Some(field.text().await?),
            Some("published") => {
                published = field
                    .text()
                    .await?
                    .parse()
                    .map_err(|_| AppError::MalformedPayload)?;
            }
            Some("location") => location = Some(field.text().await?),
            _ => {}
        }
    }
    let (filename, bytes) = image.ok_or(AppError::MalformedPayload)?;

    let config = Config::get();
    let image_url = media::store_post_image(
        std::path::Path::new(&config.media.root),
        actor.id,
        &filename,
        &bytes,
    )?;

    let now = Utc::now();
    let mut conn = db::conn(&db_pool).await?;
    let post = content::create_post(
        &mut conn,
        NewPost {
            author_id: actor.id,
            image_url,
            caption,
            published,
            location,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// View a post with its likers and comments
pub async fn get_post(
    State(db_pool): State<DbPool>,
    AuthUser(actor): AuthUser,
    Path(post_id): Path<i32>,
) -> Result<Json<PostDetail>, AppError> {
    let mut conn = db::conn(&db_pool).await?;
    let detail = content::get_post(&mut conn, actor.id, post_id).await?;
    Ok(Json(detail))
}

/// Edit one's own post
pub async fn edit_post(
    State(db_pool): State<DbPool>,
    AuthUser(actor): AuthUser,
    Path(post_id): Path<i32>,
    Json(patch): Json<PostPatch>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&db_pool).await?;
    content::edit_post(&mut conn, actor.id, post_id, &patch).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "message": "post updated" })),
    ))
}

/// Delete one's own post
pub async fn delete_post(
    State(db_pool): State<DbPool>,
    AuthUser(actor): AuthUser,
    Path(post_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&db_pool).await?;
    content::delete_post(&mut conn, actor.id, post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
