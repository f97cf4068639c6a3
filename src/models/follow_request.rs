// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::models::user::UserSummary;
use crate::schema::follow_requests;

/// Model for a pending follow request. Requests are never updated in
/// place: accepting one replaces it with a follow edge, declining one
/// simply deletes it.
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = follow_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FollowRequest {
    pub id: i32,
    pub sender_id: i32,
    pub receiver_id: i32,
    pub created_at: DateTime<Utc>,
}

/// DTO for creating a new follow request
#[derive(Debug, Insertable)]
#[diesel(table_name = follow_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewFollowRequest {
    pub sender_id: i32,
    pub receiver_id: i32,
    pub created_at: DateTime<Utc>,
}

/// Received request with the sender's summary, as listed to the receiver
#[derive(Debug, Serialize)]
pub struct PendingRequest {
    pub id: i32,
    pub sender: UserSummary,
    pub created_at: DateTime<Utc>,
}
