use crate::authz::template::{GrantDef, RoleDef, Template};
use std::collections::BTreeMap;

/// Registry of the templates known to this build. Constructed once at
/// startup and passed by reference; there is no mutation API.
#[derive(Debug)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, Template>,
}

impl TemplateRegistry {
    pub fn new(templates: Vec<Template>) -> Self {
        let templates = templates
            .into_iter()
            .map(|t| (t.name.clone(), t))
            .collect();
        Self { templates }
    }

    /// Registry holding the templates compiled into this binary.
    pub fn builtin() -> Self {
        Self::new(vec![standard(), lockdown()])
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Registered template names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }
}

/// The default provisioning for a public site: anonymous visitors can read,
/// members post, moderators clean up, admins hold everything through the
/// moderator delegation chain.
fn standard() -> Template {
    Template {
        name: "standard".to_string(),
        description: "Public site: open reading, member posting, delegated moderation".to_string(),
        roles: vec![
            RoleDef {
                name: "anonymous".to_string(),
                can_login: false,
                is_admin: false,
                // Held by the guest pseudo-user the session layer substitutes
                // for unauthenticated visitors; the zero-identity actor itself
                // matches no role-scoped grant.
                description: "Guest pseudo-user role, read-only".to_string(),
                grants: vec![
                    GrantDef::new("forum", "topic", "view"),
                    GrantDef::new("forum", "reply", "view"),
                    GrantDef::new("blog", "post", "view"),
                    GrantDef::new("news", "post", "view"),
                    GrantDef::new("images", "image", "view"),
                    GrantDef::new("writings", "piece", "view"),
                ],
            },
            RoleDef {
                name: "user".to_string(),
                can_login: true,
                is_admin: false,
                description: "Registered members".to_string(),
                grants: vec![
                    GrantDef::new("forum", "topic", "view"),
                    GrantDef::new("forum", "topic", "post"),
                    GrantDef::new("forum", "reply", "view"),
                    GrantDef::new("forum", "reply", "post"),
                    GrantDef::new("blog", "post", "view"),
                    GrantDef::new("blog", "comment", "post"),
                    GrantDef::new("news", "post", "view"),
                    GrantDef::new("news", "comment", "post"),
                    GrantDef::new("images", "image", "view"),
                    GrantDef::new("images", "image", "post"),
                    GrantDef::new("images", "image", "label"),
                    GrantDef::new("writings", "piece", "view"),
                    GrantDef::new("bookmarks", "bookmark", "view"),
                    GrantDef::new("bookmarks", "bookmark", "post"),
                ],
            },
            RoleDef {
                name: "moderator".to_string(),
                can_login: true,
                is_admin: false,
                description: "Members with cleanup powers over user content".to_string(),
                grants: vec![
                    GrantDef::delegate("user"),
                    GrantDef::new("forum", "topic", "lock"),
                    GrantDef::new("forum", "topic", "delete"),
                    GrantDef::new("forum", "reply", "delete"),
                    GrantDef::new("blog", "comment", "delete"),
                    GrantDef::new("news", "comment", "delete"),
                    GrantDef::new("images", "image", "delete"),
                ],
            },
            RoleDef {
                name: "admin".to_string(),
                can_login: true,
                is_admin: true,
                description: "Site operators; hold moderator transitively".to_string(),
                grants: vec![
                    GrantDef::delegate("moderator"),
                    GrantDef::new("blog", "post", "post"),
                    GrantDef::new("blog", "post", "edit"),
                    GrantDef::new("news", "post", "post"),
                    GrantDef::new("news", "post", "edit"),
                    GrantDef::new("writings", "piece", "post"),
                    GrantDef::new("writings", "piece", "edit"),
                    // item left unscoped: every kind in the section
                    GrantDef::new("forum", "", "edit"),
                ],
            },
        ],
    }
}

/// Members-only variant: identical role chain, but anonymous visitors get
/// nothing at all.
fn lockdown() -> Template {
    let mut t = standard();
    t.name = "lockdown".to_string();
    t.description = "Members-only site: anonymous visitors see nothing".to_string();
    for role in &mut t.roles {
        if role.name == "anonymous" {
            role.description = "Unauthenticated visitors, no access".to_string();
            role.grants.clear();
        }
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ROLE_SECTION;

    #[test]
    fn test_names_sorted() {
        let registry = TemplateRegistry::builtin();
        assert_eq!(registry.names(), vec!["lockdown", "standard"]);
    }

    #[test]
    fn test_get() {
        let registry = TemplateRegistry::builtin();
        assert!(registry.get("standard").is_some());
        assert!(registry.get("no-such-template").is_none());
    }

    #[test]
    fn test_delegations_target_roles_in_template() {
        let registry = TemplateRegistry::builtin();
        for name in registry.names() {
            let template = registry.get(&name).unwrap();
            let role_names: Vec<&str> =
                template.roles.iter().map(|r| r.name.as_str()).collect();
            for role in &template.roles {
                for grant in &role.grants {
                    if grant.section == ROLE_SECTION {
                        assert!(
                            role_names.contains(&grant.action.as_str()),
                            "template {name}: role {} delegates to unknown role {}",
                            role.name,
                            grant.action
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_lockdown_anonymous_has_no_grants() {
        let registry = TemplateRegistry::builtin();
        let lockdown = registry.get("lockdown").unwrap();
        let anonymous = lockdown
            .roles
            .iter()
            .find(|r| r.name == "anonymous")
            .expect("anonymous role missing");
        assert!(anonymous.grants.is_empty());
        assert!(!anonymous.can_login);
    }
}
