use crate::authz::template::Template;
use crate::errors::PortcullisError;
use crate::store::{self, NewGrant, ALLOW_RULE};
use sea_orm::ConnectionTrait;
use tracing::debug;

/// Reconcile the live store to match `template`, stamping `now` (epoch
/// seconds) on timestamp-bearing role properties.
///
/// Must run inside a single caller-supplied transaction. Each role's grants
/// are deleted and re-inserted, so a mid-call failure would otherwise leave
/// a role with no grants; the caller rolls back on error. The full-replace
/// strategy makes repeated application with the same template a no-op.
///
/// Roles are only created or updated here, never deleted.
pub async fn apply<C: ConnectionTrait>(
    db: &C,
    template: &Template,
    now: i64,
) -> Result<(), PortcullisError> {
    for role_def in &template.roles {
        let role_id = match store::get_role_by_name(db, &role_def.name).await? {
            Some(existing) => {
                store::update_role(
                    db,
                    existing.id,
                    &role_def.name,
                    role_def.can_login,
                    role_def.is_admin,
                    role_def.can_login,
                    Some(now),
                )
                .await?;
                existing.id
            }
            None => {
                store::create_role(
                    db,
                    &role_def.name,
                    role_def.can_login,
                    role_def.is_admin,
                    role_def.can_login,
                    Some(now),
                )
                .await?
                .id
            }
        };

        store::delete_grants_by_role_id(db, role_id).await?;

        for grant_def in &role_def.grants {
            store::create_grant(
                db,
                NewGrant {
                    role_id: Some(role_id),
                    user_id: None,
                    section: grant_def.section.clone(),
                    item: grant_def.scoped_item().map(str::to_string),
                    item_id: grant_def.scoped_item_id(),
                    action: grant_def.action.clone(),
                    rule_type: ALLOW_RULE.to_string(),
                    active: true,
                },
            )
            .await?;
        }

        debug!(
            role = %role_def.name,
            grants = role_def.grants.len(),
            "reconciled role"
        );
    }

    Ok(())
}
