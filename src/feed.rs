// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

//! Feed assembly: published posts by the actor and everyone they
//! follow, sorted and paginated in the database. Nothing here mutates
//! state and nothing is cached; every call recomputes from the store.

use std::collections::HashMap;

use diesel::dsl::count;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::error::AppError;
use crate::graph;
use crate::models::{Post, PostView, UserSummary};
use crate::schema::{likes, posts, users};

pub const PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Newest first (the default).
    Recent,
    /// Most liked first, newest first among ties.
    Likes,
}

impl SortMode {
    /// Anything other than an explicit "likes" falls back to recency.
    pub fn parse(sort: Option<&str>) -> Self {
        match sort {
            Some("likes") => SortMode::Likes,
            _ => SortMode::Recent,
        }
    }
}

/// Offset for a 1-indexed page. Non-positive pages clamp to the first
/// page rather than turning into a negative offset.
pub fn page_offset(page: i64) -> i64 {
    (page.max(1) - 1) * PAGE_SIZE
}

/// One page of the actor's feed, with like counts derived in the same
/// grouped query.
pub async fn get_feed(
    conn: &mut AsyncPgConnection,
    actor_id: i32,
    page: i64,
    sort: SortMode,
) -> Result<Vec<PostView>, AppError> {
    let mut author_ids = graph::following_ids(conn, actor_id).await?;
    author_ids.push(actor_id);

    let offset = page_offset(page);

    let rows: Vec<(Post, i64)> = match sort {
        SortMode::Likes => {
            posts::table
                .left_join(likes::table)
                .filter(posts::author_id.eq_any(&author_ids))
                .filter(posts::published.eq(true))
                .group_by(posts::id)
                .select((Post::as_select(), count(likes::post_id.nullable())))
                .order((
                    count(likes::post_id.nullable()).desc(),
                    posts::created_at.desc(),
                ))
                .limit(PAGE_SIZE)
                .offset(offset)
                .load(conn)
                .await?
        }
        SortMode::Recent => {
            posts::table
                .left_join(likes::table)
                .filter(posts::author_id.eq_any(&author_ids))
                .filter(posts::published.eq(true))
                .group_by(posts::id)
                .select((Post::as_select(), count(likes::post_id.nullable())))
                .order(posts::created_at.desc())
                .limit(PAGE_SIZE)
                .offset(offset)
                .load(conn)
                .await?
        }
    };

    let page_author_ids: Vec<i32> = rows.iter().map(|(post, _)| post.author_id).collect();
    let authors: HashMap<i32, UserSummary> = users::table
        .filter(users::id.eq_any(&page_author_ids))
        .select(UserSummary::as_select())
        .load::<UserSummary>(conn)
        .await?
        .into_iter()
        .map(|author| (author.id, author))
        .collect();

    Ok(rows
        .into_iter()
        .filter_map(|(post, like_count)| {
            let author = authors.get(&post.author_id).cloned()?;
            Some(PostView::new(post, author, like_count))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_mode_parsing() {
        assert_eq!(SortMode::parse(Some("likes")), SortMode::Likes);
        assert_eq!(SortMode::parse(Some("recent")), SortMode::Recent);
        assert_eq!(SortMode::parse(Some("anything")), SortMode::Recent);
        assert_eq!(SortMode::parse(None), SortMode::Recent);
    }

    #[test]
    fn pages_are_one_indexed_windows_of_ten() {
        assert_eq!(page_offset(1), 0);
        assert_eq!(page_offset(2), 10);
        assert_eq!(page_offset(3), 20);
        assert_eq!(page_offset(4), 30);
    }

    #[test]
    fn non_positive_pages_clamp_to_first() {
        assert_eq!(page_offset(0), 0);
        assert_eq!(page_offset(-5), 0);
    }

    #[test]
    fn pagination_windows_cover_twenty_five_items() {
        // 25 candidates paginate as 10 / 10 / 5 / 0.
        let items: Vec<i64> = (0..25).collect();
        let window = |page: i64| -> usize {
            let start = page_offset(page).min(items.len() as i64) as usize;
            let end = (page_offset(page) + PAGE_SIZE).min(items.len() as i64) as usize;
            items[start..end].len()
        };

        assert_eq!(window(1), 10);
        assert_eq!(window(2), 10);
        assert_eq!(window(3), 5);
        assert_eq!(window(4), 0);
    }
}
