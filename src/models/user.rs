// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::post::PostView;
use crate::schema::users;

/// Model for a registered user
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// DTO for creating a new user
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewUser {
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Patch applied to a user's profile; `None` fields are left untouched.
#[derive(Debug, Default, AsChangeset, Deserialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserChanges {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    // Set through the avatar upload route, never through the JSON patch.
    #[serde(skip)]
    pub avatar_url: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.email.is_none()
            && self.bio.is_none()
            && self.avatar_url.is_none()
    }
}

/// Short user representation embedded in posts, comments and listings
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        UserSummary {
            id: user.id,
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// Profile view returned by the user endpoint. The variant is selected by
/// the visibility policy: `Full` for the profile owner and their followers,
/// `Summary` (counts only, no post listing) for everyone else.
#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ProfileResponse {
    Full(FullProfile),
    Summary(SummaryProfile),
}

#[derive(Debug, Serialize)]
pub struct FullProfile {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub posts: Vec<PostView>,
    pub following: Vec<UserSummary>,
    pub followers: Vec<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct SummaryProfile {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub follower_count: i64,
    pub following_count: i64,
}
