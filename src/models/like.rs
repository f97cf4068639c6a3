// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::schema::likes;

/// Model for a like; identity is the (user, post) pair.
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = likes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Like {
    pub user_id: i32,
    pub post_id: i32,
    pub created_at: DateTime<Utc>,
}

/// DTO for creating a new like
#[derive(Debug, Insertable)]
#[diesel(table_name = likes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewLike {
    pub user_id: i32,
    pub post_id: i32,
    pub created_at: DateTime<Utc>,
}
