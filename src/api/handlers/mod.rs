// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

pub mod auth;
pub mod comments;
pub mod follow;
pub mod health;
pub mod likes;
pub mod media;
pub mod posts;
pub mod users;
