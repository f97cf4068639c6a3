// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

// Import diesel table macros
use diesel::allow_tables_to_appear_in_same_query;
use diesel::joinable;
use diesel::table;

table! {
    users (id) {
        id -> Integer,
        username -> Varchar,
        display_name -> Varchar,
        email -> Varchar,
        password_hash -> Varchar,
        bio -> Nullable<Text>,
        avatar_url -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

table! {
    follow_requests (id) {
        id -> Integer,
        sender_id -> Integer,
        receiver_id -> Integer,
        created_at -> Timestamptz,
    }
}

table! {
    user_follows (follower_id, following_id) {
        follower_id -> Integer,
        following_id -> Integer,
        created_at -> Timestamptz,
    }
}

table! {
    posts (id) {
        id -> Integer,
        author_id -> Integer,
        image_url -> Varchar,
        caption -> Nullable<Text>,
        published -> Bool,
        location -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    comments (id) {
        id -> Integer,
        post_id -> Integer,
        author_id -> Integer,
        parent_id -> Nullable<Integer>,
        body -> Text,
        created_at -> Timestamptz,
    }
}

table! {
    likes (user_id, post_id) {
        user_id -> Integer,
        post_id -> Integer,
        created_at -> Timestamptz,
    }
}

joinable!(posts -> users (author_id));
joinable!(comments -> posts (post_id));
joinable!(comments -> users (author_id));
joinable!(likes -> posts (post_id));
joinable!(likes -> users (user_id));

// follow_requests and user_follows reference users twice, so joins against
// users are spelled with explicit `.on()` clauses instead of `joinable!`.
allow_tables_to_appear_in_same_query!(
    users,
    follow_requests,
    user_follows,
    posts,
    comments,
    likes,
);
