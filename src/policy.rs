// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

//! Visibility rules for posts, interactions and profiles.
//!
//! Everything here is a pure decision over the actor's relation to a
//! target user; resolving that relation against the follow graph is the
//! graph module's job.

use crate::error::AppError;

/// How the acting user relates to a target user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub is_self: bool,
    pub follows: bool,
}

impl Relation {
    pub fn to_self() -> Self {
        Relation {
            is_self: true,
            follows: false,
        }
    }
}

/// Detail level of a profile view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileAccess {
    /// Own profile: full detail, all posts including unpublished ones.
    Own,
    /// Followed profile: full detail, published posts only.
    Followed,
    /// Anyone else: counts only, no post listing.
    Summary,
}

/// Whether `published` gates reading a post. An unpublished post is
/// visible only to its author, regardless of follow state.
pub fn can_view_post(rel: Relation, published: bool) -> bool {
    rel.is_self || (rel.follows && published)
}

/// Whether the actor may comment on or like a post. Unlike reading,
/// interaction does not consult the published flag, so a follower may
/// still comment on an unpublished post they cannot fetch.
pub fn can_interact(rel: Relation) -> bool {
    rel.is_self || rel.follows
}

pub fn profile_access(rel: Relation) -> ProfileAccess {
    if rel.is_self {
        ProfileAccess::Own
    } else if rel.follows {
        ProfileAccess::Followed
    } else {
        ProfileAccess::Summary
    }
}

/// Guard for the only way a follow edge comes into existence: a request
/// from a non-follower to someone else, with no request already pending.
pub fn check_follow_request(
    is_self: bool,
    already_following: bool,
    pending: bool,
) -> Result<(), AppError> {
    if is_self {
        return Err(AppError::SelfFollow);
    }
    if already_following {
        return Err(AppError::Conflict("already following"));
    }
    if pending {
        return Err(AppError::Conflict("follow request already sent"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRANGER: Relation = Relation {
        is_self: false,
        follows: false,
    };
    const FOLLOWER: Relation = Relation {
        is_self: false,
        follows: true,
    };
    const AUTHOR: Relation = Relation {
        is_self: true,
        follows: false,
    };

    #[test]
    fn author_sees_own_posts_regardless_of_published() {
        assert!(can_view_post(AUTHOR, true));
        assert!(can_view_post(AUTHOR, false));
    }

    #[test]
    fn follower_sees_only_published_posts() {
        assert!(can_view_post(FOLLOWER, true));
        assert!(!can_view_post(FOLLOWER, false));
    }

    #[test]
    fn stranger_sees_nothing() {
        assert!(!can_view_post(STRANGER, true));
        assert!(!can_view_post(STRANGER, false));
    }

    #[test]
    fn interaction_ignores_published() {
        // A follower cannot view an unpublished post but may still
        // comment on or like it; the asymmetry is intentional.
        assert!(!can_view_post(FOLLOWER, false));
        assert!(can_interact(FOLLOWER));

        assert!(can_interact(AUTHOR));
        assert!(!can_interact(STRANGER));
    }

    #[test]
    fn profile_access_levels() {
        assert_eq!(profile_access(AUTHOR), ProfileAccess::Own);
        assert_eq!(profile_access(FOLLOWER), ProfileAccess::Followed);
        assert_eq!(profile_access(STRANGER), ProfileAccess::Summary);
    }

    #[test]
    fn follow_request_allowed_from_clean_state() {
        assert!(check_follow_request(false, false, false).is_ok());
    }

    #[test]
    fn follow_request_rejects_self() {
        assert!(matches!(
            check_follow_request(true, false, false),
            Err(AppError::SelfFollow)
        ));
    }

    #[test]
    fn follow_request_rejects_existing_edge() {
        assert!(matches!(
            check_follow_request(false, true, false),
            Err(AppError::Conflict("already following"))
        ));
    }

    #[test]
    fn follow_request_rejects_duplicate_request() {
        assert!(matches!(
            check_follow_request(false, false, true),
            Err(AppError::Conflict("follow request already sent"))
        ));
    }
}
