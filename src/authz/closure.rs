use crate::errors::PortcullisError;
use crate::store;
use sea_orm::ConnectionTrait;
use std::collections::{HashSet, VecDeque};

/// Compute the transitive set of role ids effectively held by `user_id`:
/// the user's direct assignments plus every role reachable through active
/// delegation grants.
pub async fn closure_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
) -> Result<HashSet<i64>, PortcullisError> {
    let seeds = store::get_direct_roles_for_user(db, user_id).await?;
    expand(db, seeds).await
}

/// Same expansion seeded with a single role instead of a user's assignments.
pub async fn closure_from_role<C: ConnectionTrait>(
    db: &C,
    role_id: i64,
) -> Result<HashSet<i64>, PortcullisError> {
    expand(db, vec![role_id]).await
}

/// Breadth-first expansion to a fixed point. A role is enqueued only when it
/// is newly inserted into the set, so delegation cycles terminate. A storage
/// error aborts the whole computation; a partial closure is never returned.
async fn expand<C: ConnectionTrait>(
    db: &C,
    seeds: Vec<i64>,
) -> Result<HashSet<i64>, PortcullisError> {
    let mut closure = HashSet::new();
    let mut queue = VecDeque::new();

    for role_id in seeds {
        if closure.insert(role_id) {
            queue.push_back(role_id);
        }
    }

    while let Some(role_id) = queue.pop_front() {
        for name in store::get_role_delegations(db, role_id).await? {
            // A delegation naming an unknown role grants nothing
            let Some(delegate) = store::get_role_by_name(db, &name).await? else {
                continue;
            };
            if closure.insert(delegate.id) {
                queue.push_back(delegate.id);
            }
        }
    }

    Ok(closure)
}
