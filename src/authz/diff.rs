use crate::authz::template::{GrantDef, Template};
use crate::entities::grant;
use crate::errors::PortcullisError;
use crate::store;
use sea_orm::ConnectionTrait;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleStatus {
    New,
    Existing,
}

impl fmt::Display for RoleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleStatus::New => write!(f, "new"),
            RoleStatus::Existing => write!(f, "existing"),
        }
    }
}

/// Canonical identity of a grant for set comparison. Both sentinel forms
/// (`""`/`0` from templates, null from the store) normalize to `None`, so a
/// template key and a store key for the same grant always compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GrantKey {
    pub section: String,
    pub item: Option<String>,
    pub action: String,
    pub item_id: Option<i64>,
}

impl GrantKey {
    pub fn from_def(def: &GrantDef) -> Self {
        Self {
            section: def.section.clone(),
            item: def.scoped_item().map(str::to_string),
            action: def.action.clone(),
            item_id: def.scoped_item_id(),
        }
    }

    pub fn from_model(model: &grant::Model) -> Self {
        Self {
            section: model.section.clone(),
            item: model.item.clone().filter(|i| !i.is_empty()),
            action: model.action.clone(),
            item_id: model.item_id.filter(|id| *id != 0),
        }
    }
}

impl fmt::Display for GrantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {}",
            self.section,
            self.item.as_deref().unwrap_or("*"),
            self.action
        )?;
        if let Some(id) = self.item_id {
            write!(f, " [{id}]")?;
        }
        Ok(())
    }
}

/// One template role compared against the live store.
#[derive(Debug, Serialize)]
pub struct RoleDiff {
    pub role: String,
    pub status: RoleStatus,
    pub changes: Vec<String>,
    pub added: Vec<GrantKey>,
    pub removed: Vec<GrantKey>,
}

/// Compare `template` against the live store, in template order. Performs no
/// writes; after a successful `apply` of the same template the report is
/// all-existing with empty change lists.
pub async fn diff<C: ConnectionTrait>(
    db: &C,
    template: &Template,
) -> Result<Vec<RoleDiff>, PortcullisError> {
    let mut report = Vec::with_capacity(template.roles.len());

    for role_def in &template.roles {
        let Some(stored) = store::get_role_by_name(db, &role_def.name).await? else {
            report.push(RoleDiff {
                role: role_def.name.clone(),
                status: RoleStatus::New,
                changes: Vec::new(),
                added: Vec::new(),
                removed: Vec::new(),
            });
            continue;
        };

        let mut changes = Vec::new();
        let stored_can_login = stored.can_login != 0;
        if stored_can_login != role_def.can_login {
            changes.push(format!(
                "CanLogin: {} → {}",
                stored_can_login, role_def.can_login
            ));
        }
        let stored_is_admin = stored.is_admin != 0;
        if stored_is_admin != role_def.is_admin {
            changes.push(format!(
                "IsAdmin: {} → {}",
                stored_is_admin, role_def.is_admin
            ));
        }

        let current = store::get_grants_by_role_id(db, stored.id).await?;
        let current_keys: HashSet<GrantKey> = current.iter().map(GrantKey::from_model).collect();
        let desired_keys: HashSet<GrantKey> =
            role_def.grants.iter().map(GrantKey::from_def).collect();

        // Added keys keep template order; removed keys are sorted for a
        // stable report.
        let added = role_def
            .grants
            .iter()
            .map(GrantKey::from_def)
            .filter(|k| !current_keys.contains(k))
            .collect();
        let mut removed: Vec<GrantKey> = current_keys
            .difference(&desired_keys)
            .cloned()
            .collect();
        removed.sort();

        report.push(RoleDiff {
            role: role_def.name.clone(),
            status: RoleStatus::Existing,
            changes,
            added,
            removed,
        });
    }

    Ok(report)
}
