// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::headers::authorization::Bearer;
use axum::headers::Authorization;
use axum::http::request::Parts;
use axum::{RequestPartsExt, TypedHeader};

use crate::auth;
use crate::db::DbPool;
use crate::error::AppError;
use crate::identity;
use crate::models::User;

/// The acting user, resolved from the request's bearer token. Handlers
/// that take this extractor are authenticated; everything downstream
/// works with the resolved identity only.
pub struct AuthUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    DbPool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Unauthenticated)?;

        let user_id = auth::verify_access_token(bearer.token())?;

        let pool = DbPool::from_ref(state);
        let mut conn = pool.get().await?;
        let user = identity::find_by_id(&mut conn, user_id)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        Ok(AuthUser(user))
    }
}
