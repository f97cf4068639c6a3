// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

//! The follow graph: directed follow edges plus the request workflow
//! that creates them. Edges live only in `user_follows`; "followers of
//! X" is always the inverse lookup, never a second stored collection.

use chrono::Utc;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::error::AppError;
use crate::models::{FollowRequest, NewFollowRequest, PendingRequest, UserSummary};
use crate::policy::{self, Relation};
use crate::schema::{follow_requests, user_follows, users};

/// Whether an edge `follower -> target` exists.
pub async fn is_following(
    conn: &mut AsyncPgConnection,
    follower_id: i32,
    target_id: i32,
) -> Result<bool, AppError> {
    diesel::select(exists(
        user_follows::table
            .filter(user_follows::follower_id.eq(follower_id))
            .filter(user_follows::following_id.eq(target_id)),
    ))
    .get_result(conn)
    .await
    .map_err(AppError::from)
}

/// Resolve the actor's relation to a target user for the visibility policy.
pub async fn relation(
    conn: &mut AsyncPgConnection,
    actor_id: i32,
    target_id: i32,
) -> Result<Relation, AppError> {
    if actor_id == target_id {
        return Ok(Relation::to_self());
    }
    Ok(Relation {
        is_self: false,
        follows: is_following(conn, actor_id, target_id).await?,
    })
}

/// Send a follow request from `sender` to `receiver`.
///
/// Allowed only from a clean state: no existing edge, no pending request,
/// not addressed to oneself. The unique constraint on (sender, receiver)
/// turns a racing duplicate into a conflict as well.
pub async fn send_request(
    conn: &mut AsyncPgConnection,
    sender_id: i32,
    receiver_id: i32,
) -> Result<FollowRequest, AppError> {
    let is_self = sender_id == receiver_id;
    let (following, pending) = if is_self {
        (false, false)
    } else {
        let following = is_following(conn, sender_id, receiver_id).await?;
        let pending = diesel::select(exists(
            follow_requests::table
                .filter(follow_requests::sender_id.eq(sender_id))
                .filter(follow_requests::receiver_id.eq(receiver_id)),
        ))
        .get_result(conn)
        .await?;
        (following, pending)
    };

    policy::check_follow_request(is_self, following, pending)?;

    let request = diesel::insert_into(follow_requests::table)
        .values(&NewFollowRequest {
            sender_id,
            receiver_id,
            created_at: Utc::now(),
        })
        .returning(FollowRequest::as_returning())
        .get_result(conn)
        .await?;

    debug!(
        "follow request {} created: {} -> {}",
        request.id, sender_id, receiver_id
    );
    Ok(request)
}

/// Accept a pending request: create the edge sender -> receiver and
/// consume the request, atomically. Only the receiver may accept.
pub async fn accept_request(
    conn: &mut AsyncPgConnection,
    request_id: i32,
    actor_id: i32,
) -> Result<(), AppError> {
    let request = follow_requests::table
        .find(request_id)
        .first::<FollowRequest>(conn)
        .await
        .optional()?
        .ok_or(AppError::NotFound("follow request"))?;

    if request.receiver_id != actor_id {
        return Err(AppError::Forbidden("only the receiver may accept a request"));
    }

    let (sender_id, receiver_id) = (request.sender_id, request.receiver_id);
    conn.transaction::<_, AppError, _>(|conn| {
        async move {
            diesel::insert_into(user_follows::table)
                .values((
                    user_follows::follower_id.eq(sender_id),
                    user_follows::following_id.eq(receiver_id),
                    user_follows::created_at.eq(Utc::now()),
                ))
                .on_conflict((user_follows::follower_id, user_follows::following_id))
                .do_nothing()
                .execute(conn)
                .await?;

            diesel::delete(follow_requests::table.find(request_id))
                .execute(conn)
                .await?;

            Ok(())
        }
        .scope_boxed()
    })
    .await?;

    debug!(
        "follow request {} accepted: {} now follows {}",
        request_id, sender_id, receiver_id
    );
    Ok(())
}

/// Decline a pending request: consume it without creating an edge. Only
/// the receiver may decline.
pub async fn decline_request(
    conn: &mut AsyncPgConnection,
    request_id: i32,
    actor_id: i32,
) -> Result<(), AppError> {
    let request = follow_requests::table
        .find(request_id)
        .first::<FollowRequest>(conn)
        .await
        .optional()?
        .ok_or(AppError::NotFound("follow request"))?;

    if request.receiver_id != actor_id {
        return Err(AppError::Forbidden(
            "only the receiver may decline a request",
        ));
    }

    diesel::delete(follow_requests::table.find(request.id))
        .execute(conn)
        .await?;

    debug!("follow request {} declined", request_id);
    Ok(())
}

/// Remove the edge `follower -> target`. There is no way back to a
/// pending request; re-following starts over with a new request.
pub async fn unfollow(
    conn: &mut AsyncPgConnection,
    follower_id: i32,
    target_id: i32,
) -> Result<(), AppError> {
    let deleted = diesel::delete(
        user_follows::table
            .filter(user_follows::follower_id.eq(follower_id))
            .filter(user_follows::following_id.eq(target_id)),
    )
    .execute(conn)
    .await?;

    if deleted == 0 {
        return Err(AppError::Conflict("not following"));
    }

    debug!("{} unfollowed {}", follower_id, target_id);
    Ok(())
}

/// Requests received by `user_id`, oldest first, with sender summaries.
pub async fn pending_requests(
    conn: &mut AsyncPgConnection,
    user_id: i32,
) -> Result<Vec<PendingRequest>, AppError> {
    let rows = follow_requests::table
        .inner_join(users::table.on(users::id.eq(follow_requests::sender_id)))
        .filter(follow_requests::receiver_id.eq(user_id))
        .order(follow_requests::id.asc())
        .select((FollowRequest::as_select(), UserSummary::as_select()))
        .load::<(FollowRequest, UserSummary)>(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(request, sender)| PendingRequest {
            id: request.id,
            sender,
            created_at: request.created_at,
        })
        .collect())
}

/// Ids of everyone `user_id` follows.
pub async fn following_ids(
    conn: &mut AsyncPgConnection,
    user_id: i32,
) -> Result<Vec<i32>, AppError> {
    user_follows::table
        .filter(user_follows::follower_id.eq(user_id))
        .select(user_follows::following_id)
        .load(conn)
        .await
        .map_err(AppError::from)
}

/// Profiles `user_id` follows, most recent first.
pub async fn following_profiles(
    conn: &mut AsyncPgConnection,
    user_id: i32,
) -> Result<Vec<UserSummary>, AppError> {
    user_follows::table
        .inner_join(users::table.on(users::id.eq(user_follows::following_id)))
        .filter(user_follows::follower_id.eq(user_id))
        .order(user_follows::created_at.desc())
        .select(UserSummary::as_select())
        .load(conn)
        .await
        .map_err(AppError::from)
}

/// Profiles following `user_id`, most recent first.
pub async fn follower_profiles(
    conn: &mut AsyncPgConnection,
    user_id: i32,
) -> Result<Vec<UserSummary>, AppError> {
    user_follows::table
        .inner_join(users::table.on(users::id.eq(user_follows::follower_id)))
        .filter(user_follows::following_id.eq(user_id))
        .order(user_follows::created_at.desc())
        .select(UserSummary::as_select())
        .load(conn)
        .await
        .map_err(AppError::from)
}

/// Follower and following counts for a profile summary.
pub async fn follow_counts(
    conn: &mut AsyncPgConnection,
    user_id: i32,
) -> Result<(i64, i64), AppError> {
    let followers = user_follows::table
        .filter(user_follows::following_id.eq(user_id))
        .count()
        .get_result::<i64>(conn)
        .await?;
    let following = user_follows::table
        .filter(user_follows::follower_id.eq(user_id))
        .count()
        .get_result::<i64>(conn)
        .await?;

    Ok((followers, following))
}
