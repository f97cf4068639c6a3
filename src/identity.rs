// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

//! User records: creation, lookup, search, profile assembly and deletion.

use std::collections::HashMap;

use diesel::dsl::{count, exists};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::error::AppError;
use crate::graph;
use crate::models::{
    FullProfile, NewUser, Post, PostView, ProfileResponse, SummaryProfile, User, UserChanges,
    UserSummary,
};
use crate::policy::{self, ProfileAccess};
use crate::schema::{likes, posts, users};

/// Register a new user. The username and email must both be unused; the
/// unique constraints make a racing duplicate fail as a conflict too.
pub async fn create_user(
    conn: &mut AsyncPgConnection,
    new_user: NewUser,
) -> Result<User, AppError> {
    let username_taken = diesel::select(exists(
        users::table.filter(users::username.eq(&new_user.username)),
    ))
    .get_result::<bool>(conn)
    .await?;
    if username_taken {
        return Err(AppError::Conflict("username already taken"));
    }

    let email_taken = diesel::select(exists(
        users::table.filter(users::email.eq(&new_user.email)),
    ))
    .get_result::<bool>(conn)
    .await?;
    if email_taken {
        return Err(AppError::Conflict("email already registered"));
    }

    let user = diesel::insert_into(users::table)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(conn)
        .await?;

    debug!("created user {} ({})", user.username, user.id);
    Ok(user)
}

pub async fn find_by_username(
    conn: &mut AsyncPgConnection,
    username: &str,
) -> Result<Option<User>, AppError> {
    users::table
        .filter(users::username.eq(username))
        .first::<User>(conn)
        .await
        .optional()
        .map_err(AppError::from)
}

pub async fn find_by_id(
    conn: &mut AsyncPgConnection,
    user_id: i32,
) -> Result<Option<User>, AppError> {
    users::table
        .find(user_id)
        .first::<User>(conn)
        .await
        .optional()
        .map_err(AppError::from)
}

/// Case-insensitive substring search over username, display name and bio.
/// An empty query lists everyone.
pub async fn search(
    conn: &mut AsyncPgConnection,
    query: &str,
) -> Result<Vec<UserSummary>, AppError> {
    let query = query.trim();
    if query.is_empty() {
        return users::table
            .order(users::id.asc())
            .select(UserSummary::as_select())
            .load(conn)
            .await
            .map_err(AppError::from);
    }

    let pattern = format!("%{}%", query);
    users::table
        .filter(
            users::username
                .ilike(&pattern)
                .nullable()
                .or(users::display_name.ilike(&pattern).nullable())
                .or(users::bio.ilike(&pattern)),
        )
        .order(users::id.asc())
        .select(UserSummary::as_select())
        .load(conn)
        .await
        .map_err(AppError::from)
}

/// Apply a profile patch; `None` fields are left untouched.
pub async fn update_user(
    conn: &mut AsyncPgConnection,
    user_id: i32,
    changes: &UserChanges,
) -> Result<(), AppError> {
    if changes.is_empty() {
        return Ok(());
    }

    diesel::update(users::table.find(user_id))
        .set(changes)
        .execute(conn)
        .await?;
    Ok(())
}

/// Delete a user. Foreign keys cascade the deletion to their posts,
/// comments, likes, follow edges and follow requests, both directions.
pub async fn delete_user(conn: &mut AsyncPgConnection, user_id: i32) -> Result<(), AppError> {
    diesel::delete(users::table.find(user_id))
        .execute(conn)
        .await?;
    debug!("deleted user {}", user_id);
    Ok(())
}

/// Profile view for `username` as seen by `actor_id`. The detail level
/// comes from the visibility policy: the owner sees everything including
/// unpublished posts, a follower sees published posts, anyone else gets
/// the counts-only summary.
pub async fn user_profile(
    conn: &mut AsyncPgConnection,
    actor_id: i32,
    username: &str,
) -> Result<ProfileResponse, AppError> {
    let user = find_by_username(conn, username)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    let rel = graph::relation(conn, actor_id, user.id).await?;
    match policy::profile_access(rel) {
        ProfileAccess::Own => full_profile(conn, &user, true).await,
        ProfileAccess::Followed => full_profile(conn, &user, false).await,
        ProfileAccess::Summary => {
            let (follower_count, following_count) = graph::follow_counts(conn, user.id).await?;
            Ok(ProfileResponse::Summary(SummaryProfile {
                id: user.id,
                username: user.username,
                display_name: user.display_name,
                bio: user.bio,
                avatar_url: user.avatar_url,
                follower_count,
                following_count,
            }))
        }
    }
}

async fn full_profile(
    conn: &mut AsyncPgConnection,
    user: &User,
    include_unpublished: bool,
) -> Result<ProfileResponse, AppError> {
    let mut query = posts::table
        .filter(posts::author_id.eq(user.id))
        .select(Post::as_select())
        .into_boxed();
    if !include_unpublished {
        query = query.filter(posts::published.eq(true));
    }
    let user_posts = query
        .order(posts::created_at.desc())
        .load::<Post>(conn)
        .await?;

    // Like counts for the listed posts, derived in one grouped query.
    let post_ids: Vec<i32> = user_posts.iter().map(|post| post.id).collect();
    let like_counts: HashMap<i32, i64> = likes::table
        .filter(likes::post_id.eq_any(&post_ids))
        .group_by(likes::post_id)
        .select((likes::post_id, count(likes::user_id)))
        .load::<(i32, i64)>(conn)
        .await?
        .into_iter()
        .collect();

    let author = UserSummary::from(user);
    let post_views = user_posts
        .into_iter()
        .map(|post| {
            let like_count = like_counts.get(&post.id).copied().unwrap_or(0);
            PostView::new(post, author.clone(), like_count)
        })
        .collect();

    Ok(ProfileResponse::Full(FullProfile {
        id: user.id,
        username: user.username.clone(),
        display_name: user.display_name.clone(),
        bio: user.bio.clone(),
        avatar_url: user.avatar_url.clone(),
        posts: post_views,
        following: graph::following_profiles(conn, user.id).await?,
        followers: graph::follower_profiles(conn, user.id).await?,
    }))
}
