// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::comment::CommentView;
use crate::models::user::UserSummary;
use crate::schema::posts;

/// Model for a post
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: i32,
    pub author_id: i32,
    pub image_url: String,
    pub caption: Option<String>,
    pub published: bool,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new post
#[derive(Debug, Insertable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewPost {
    pub author_id: i32,
    pub image_url: String,
    pub caption: Option<String>,
    pub published: bool,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Patch applied to a post; `None` fields are left untouched.
#[derive(Debug, Default, AsChangeset, Deserialize)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PostPatch {
    pub caption: Option<String>,
    pub published: Option<bool>,
    pub location: Option<String>,
}

/// Post as it appears in the feed and in profile listings, with the
/// like count derived from the likes table.
#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: i32,
    pub author: UserSummary,
    pub image_url: String,
    pub caption: Option<String>,
    pub location: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub like_count: i64,
}

impl PostView {
    pub fn new(post: Post, author: UserSummary, like_count: i64) -> Self {
        PostView {
            id: post.id,
            author,
            image_url: post.image_url,
            caption: post.caption,
            location: post.location,
            published: post.published,
            created_at: post.created_at,
            like_count,
        }
    }
}

/// Single-post response: the post plus who liked it and its comment tree.
#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub id: i32,
    pub author: UserSummary,
    pub image_url: String,
    pub caption: Option<String>,
    pub location: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub like_count: i64,
    pub liked_by: Vec<UserSummary>,
    pub comments: Vec<CommentView>,
}
