// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

//! Posts, comments and likes. Every mutating operation takes the
//! resolved actor id and consults the visibility policy before touching
//! anything; ownership checks are against the stored author, never
//! against request parameters.

use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::error::AppError;
use crate::graph;
use crate::models::{
    Comment, CommentView, NewComment, NewLike, NewPost, Post, PostDetail, PostPatch, ReplyView,
    UserSummary,
};
use crate::policy;
use crate::schema::{comments, likes, posts, users};

pub async fn find_post(
    conn: &mut AsyncPgConnection,
    post_id: i32,
) -> Result<Option<Post>, AppError> {
    posts::table
        .find(post_id)
        .first::<Post>(conn)
        .await
        .optional()
        .map_err(AppError::from)
}

/// Create a post. Any authenticated actor may post; the caller supplies
/// the stored image reference.
pub async fn create_post(
    conn: &mut AsyncPgConnection,
    new_post: NewPost,
) -> Result<Post, AppError> {
    let post = diesel::insert_into(posts::table)
        .values(&new_post)
        .returning(Post::as_returning())
        .get_result(conn)
        .await?;

    debug!("user {} created post {}", post.author_id, post.id);
    Ok(post)
}

/// Fetch a single post with its likers and comment tree. Gated on
/// `can_view_post`: unpublished posts are the author's alone.
pub async fn get_post(
    conn: &mut AsyncPgConnection,
    actor_id: i32,
    post_id: i32,
) -> Result<PostDetail, AppError> {
    let post = find_post(conn, post_id)
        .await?
        .ok_or(AppError::NotFound("post"))?;

    let rel = graph::relation(conn, actor_id, post.author_id).await?;
    if !policy::can_view_post(rel, post.published) {
        return Err(AppError::Forbidden("not following the author"));
    }

    let author = users::table
        .find(post.author_id)
        .select(UserSummary::as_select())
        .first::<UserSummary>(conn)
        .await?;

    let liked_by = likes::table
        .inner_join(users::table)
        .filter(likes::post_id.eq(post.id))
        .order(likes::created_at.asc())
        .select(UserSummary::as_select())
        .load::<UserSummary>(conn)
        .await?;

    let comment_rows = comments::table
        .filter(comments::post_id.eq(post.id))
        .order(comments::id.asc())
        .select(Comment::as_select())
        .load::<Comment>(conn)
        .await?;

    let author_ids: Vec<i32> = comment_rows.iter().map(|c| c.author_id).collect();
    let comment_authors: HashMap<i32, UserSummary> = users::table
        .filter(users::id.eq_any(&author_ids))
        .select(UserSummary::as_select())
        .load::<UserSummary>(conn)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    // Nest replies under their parents; rows are already in id order.
    let mut replies: HashMap<i32, Vec<ReplyView>> = HashMap::new();
    let mut top_level = Vec::new();
    for comment in comment_rows {
        let Some(comment_author) = comment_authors.get(&comment.author_id).cloned() else {
            continue;
        };
        match comment.parent_id {
            Some(parent_id) => replies.entry(parent_id).or_default().push(ReplyView {
                id: comment.id,
                parent_id,
                author: comment_author,
                body: comment.body,
                created_at: comment.created_at,
            }),
            None => top_level.push((comment, comment_author)),
        }
    }
    let comment_views = top_level
        .into_iter()
        .map(|(comment, comment_author)| CommentView {
            id: comment.id,
            post_id: comment.post_id,
            author: comment_author,
            body: comment.body,
            created_at: comment.created_at,
            replies: replies.remove(&comment.id).unwrap_or_default(),
        })
        .collect();

    Ok(PostDetail {
        id: post.id,
        author,
        image_url: post.image_url,
        caption: post.caption,
        location: post.location,
        published: post.published,
        created_at: post.created_at,
        updated_at: post.updated_at,
        like_count: liked_by.len() as i64,
        liked_by,
        comments: comment_views,
    })
}

/// Apply a patch to a post. Author-only; untouched fields stay as they
/// are and the modification timestamp always advances.
pub async fn edit_post(
    conn: &mut AsyncPgConnection,
    actor_id: i32,
    post_id: i32,
    patch: &PostPatch,
) -> Result<(), AppError> {
    let post = find_post(conn, post_id)
        .await?
        .ok_or(AppError::NotFound("post"))?;
    if post.author_id != actor_id {
        return Err(AppError::Forbidden("only the author may edit a post"));
    }

    diesel::update(posts::table.find(post.id))
        .set((patch, posts::updated_at.eq(Utc::now())))
        .execute(conn)
        .await?;
    Ok(())
}

/// Delete a post. Author-only; comments and likes cascade with it.
pub async fn delete_post(
    conn: &mut AsyncPgConnection,
    actor_id: i32,
    post_id: i32,
) -> Result<(), AppError> {
    let post = find_post(conn, post_id)
        .await?
        .ok_or(AppError::NotFound("post"))?;
    if post.author_id != actor_id {
        return Err(AppError::Forbidden("only the author may delete a post"));
    }

    diesel::delete(posts::table.find(post.id))
        .execute(conn)
        .await?;
    debug!("user {} deleted post {}", actor_id, post_id);
    Ok(())
}

/// Create a comment, or a reply when `parent_id` is given. The parent
/// must be a top-level comment on the same post; interaction gating
/// deliberately ignores the published flag.
pub async fn create_comment(
    conn: &mut AsyncPgConnection,
    actor_id: i32,
    post_id: i32,
    body: String,
    parent_id: Option<i32>,
) -> Result<Comment, AppError> {
    let post = find_post(conn, post_id)
        .await?
        .ok_or(AppError::NotFound("post"))?;

    if let Some(parent) = parent_id {
        comments::table
            .find(parent)
            .filter(comments::post_id.eq(post.id))
            .filter(comments::parent_id.is_null())
            .first::<Comment>(conn)
            .await
            .optional()?
            .ok_or(AppError::NotFound("comment"))?;
    }

    let rel = graph::relation(conn, actor_id, post.author_id).await?;
    if !policy::can_interact(rel) {
        return Err(AppError::Forbidden("not following the author"));
    }

    let comment = diesel::insert_into(comments::table)
        .values(&NewComment {
            post_id: post.id,
            author_id: actor_id,
            parent_id,
            body,
            created_at: Utc::now(),
        })
        .returning(Comment::as_returning())
        .get_result(conn)
        .await?;

    debug!("user {} commented on post {}", actor_id, post_id);
    Ok(comment)
}

/// Delete a comment or reply. Only its author may; replies cascade when
/// a top-level comment goes.
pub async fn delete_comment(
    conn: &mut AsyncPgConnection,
    actor_id: i32,
    comment_id: i32,
) -> Result<(), AppError> {
    let comment = comments::table
        .find(comment_id)
        .first::<Comment>(conn)
        .await
        .optional()?
        .ok_or(AppError::NotFound("comment"))?;

    if comment.author_id != actor_id {
        return Err(AppError::Forbidden(
            "only the author may delete a comment",
        ));
    }

    diesel::delete(comments::table.find(comment.id))
        .execute(conn)
        .await?;
    Ok(())
}

/// Like a post, at most once per (user, post). The composite primary
/// key backs the duplicate check under concurrency.
pub async fn like_post(
    conn: &mut AsyncPgConnection,
    actor_id: i32,
    post_id: i32,
) -> Result<(), AppError> {
    let post = find_post(conn, post_id)
        .await?
        .ok_or(AppError::NotFound("post"))?;

    let rel = graph::relation(conn, actor_id, post.author_id).await?;
    if !policy::can_interact(rel) {
        return Err(AppError::Forbidden("not following the author"));
    }

    let already_liked = likes::table
        .find((actor_id, post.id))
        .first::<crate::models::Like>(conn)
        .await
        .optional()?
        .is_some();
    if already_liked {
        return Err(AppError::Conflict("post already liked"));
    }

    diesel::insert_into(likes::table)
        .values(&NewLike {
            user_id: actor_id,
            post_id: post.id,
            created_at: Utc::now(),
        })
        .execute(conn)
        .await?;

    debug!("user {} liked post {}", actor_id, post_id);
    Ok(())
}

/// Remove the actor's like from a post; removes exactly the (actor,
/// post) row.
pub async fn unlike_post(
    conn: &mut AsyncPgConnection,
    actor_id: i32,
    post_id: i32,
) -> Result<(), AppError> {
    let post = find_post(conn, post_id)
        .await?
        .ok_or(AppError::NotFound("post"))?;

    let rel = graph::relation(conn, actor_id, post.author_id).await?;
    if !policy::can_interact(rel) {
        return Err(AppError::Forbidden("not following the author"));
    }

    let deleted = diesel::delete(likes::table.find((actor_id, post.id)))
        .execute(conn)
        .await?;
    if deleted == 0 {
        return Err(AppError::Conflict("post not liked"));
    }

    debug!("user {} unliked post {}", actor_id, post_id);
    Ok(())
}

/// Derived like count for a post.
pub async fn like_count(conn: &mut AsyncPgConnection, post_id: i32) -> Result<i64, AppError> {
    likes::table
        .filter(likes::post_id.eq(post_id))
        .count()
        .get_result(conn)
        .await
        .map_err(AppError::from)
}
