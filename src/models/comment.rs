// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::models::user::UserSummary;
use crate::schema::comments;

/// Model for comments and replies. A row with no parent is a top-level
/// comment; a row with a parent is a reply to that comment.
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Comment {
    pub id: i32,
    pub post_id: i32,
    pub author_id: i32,
    pub parent_id: Option<i32>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// DTO for creating a new comment or reply
#[derive(Debug, Insertable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewComment {
    pub post_id: i32,
    pub author_id: i32,
    pub parent_id: Option<i32>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Top-level comment with its replies nested one level deep
#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: i32,
    pub post_id: i32,
    pub author: UserSummary,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<ReplyView>,
}

#[derive(Debug, Serialize)]
pub struct ReplyView {
    pub id: i32,
    pub parent_id: i32,
    pub author: UserSummary,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
