use crate::authz::closure::{closure_for_user, closure_from_role};
use crate::errors::PortcullisError;
use crate::store;
use sea_orm::ConnectionTrait;
use std::collections::HashSet;

/// Check if `user_id` may perform `action` on the resource identified by
/// `section` / `item` / `item_id`.
///
/// A single active grant whose every non-null scope dimension matches the
/// request authorizes it; there is no precedence among matching grants.
/// `item_id = 0` asks about the section/item in general, so only grants with
/// an unscoped instance match. The anonymous user (id 0) skips closure
/// computation and can only match fully unscoped grants.
pub async fn is_allowed<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    section: &str,
    item: &str,
    item_id: i64,
    action: &str,
) -> Result<bool, PortcullisError> {
    let roles = if user_id == store::ANONYMOUS_USER {
        HashSet::new()
    } else {
        closure_for_user(db, user_id).await?
    };

    store::check_grant(db, section, item, item_id, action, user_id, &roles).await
}

/// Check if a role itself, directly or through delegation, carries an active
/// grant for `(section, action)`. User-scoped grants never apply here.
pub async fn role_check<C: ConnectionTrait>(
    db: &C,
    role_id: i64,
    section: &str,
    action: &str,
) -> Result<bool, PortcullisError> {
    let roles = closure_from_role(db, role_id).await?;
    store::check_role_grant(db, section, action, &roles).await
}
