use crate::entities;
use crate::errors::PortcullisError;
use crate::settings::Database as DbCfg;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, Database, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use std::collections::HashSet;

/// Reserved section name for role-to-role delegation rows. A grant in this
/// section has another role's name in `action`; the role owning the grant is
/// considered to also hold the named role.
pub const ROLE_SECTION: &str = "role";

/// Actor id for requests with no authenticated user. It never matches a
/// user-scoped or role-scoped grant.
pub const ANONYMOUS_USER: i64 = 0;

/// The only rule type this core ever writes. Deny rules are unimplemented.
pub const ALLOW_RULE: &str = "allow";

/// A grant about to be inserted. `None` scope fields mean "unrestricted".
#[derive(Debug, Clone)]
pub struct NewGrant {
    pub role_id: Option<i64>,
    pub user_id: Option<i64>,
    pub section: String,
    pub item: Option<String>,
    pub item_id: Option<i64>,
    pub action: String,
    pub rule_type: String,
    pub active: bool,
}

pub async fn init(cfg: &DbCfg) -> Result<DatabaseConnection, PortcullisError> {
    let db = Database::connect(&cfg.url).await?;
    Ok(db)
}

// Role operations

pub async fn get_role_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<Option<entities::role::Model>, PortcullisError> {
    use entities::role::{Column, Entity};

    Ok(Entity::find().filter(Column::Name.eq(name)).one(db).await?)
}

pub async fn get_role_by_id<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> Result<Option<entities::role::Model>, PortcullisError> {
    use entities::role::Entity;

    Ok(Entity::find_by_id(id).one(db).await?)
}

pub async fn create_role<C: ConnectionTrait>(
    db: &C,
    name: &str,
    can_login: bool,
    is_admin: bool,
    private_labels: bool,
    public_profile_allowed_at: Option<i64>,
) -> Result<entities::role::Model, PortcullisError> {
    let role = entities::role::ActiveModel {
        id: Default::default(),
        name: Set(name.to_string()),
        can_login: Set(if can_login { 1 } else { 0 }),
        is_admin: Set(if is_admin { 1 } else { 0 }),
        private_labels: Set(if private_labels { 1 } else { 0 }),
        public_profile_allowed_at: Set(public_profile_allowed_at),
    };

    Ok(role.insert(db).await?)
}

/// Overwrite every stored property of an existing role.
pub async fn update_role<C: ConnectionTrait>(
    db: &C,
    id: i64,
    name: &str,
    can_login: bool,
    is_admin: bool,
    private_labels: bool,
    public_profile_allowed_at: Option<i64>,
) -> Result<(), PortcullisError> {
    use entities::role::Entity;

    let role = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(PortcullisError::RoleNotFound(id))?;

    let mut active: entities::role::ActiveModel = role.into();
    active.name = Set(name.to_string());
    active.can_login = Set(if can_login { 1 } else { 0 });
    active.is_admin = Set(if is_admin { 1 } else { 0 });
    active.private_labels = Set(if private_labels { 1 } else { 0 });
    active.public_profile_allowed_at = Set(public_profile_allowed_at);
    active.update(db).await?;

    Ok(())
}

// Grant operations

pub async fn get_grants_by_role_id<C: ConnectionTrait>(
    db: &C,
    role_id: i64,
) -> Result<Vec<entities::grant::Model>, PortcullisError> {
    use entities::grant::{Column, Entity};

    Ok(Entity::find()
        .filter(Column::RoleId.eq(role_id))
        .all(db)
        .await?)
}

pub async fn delete_grants_by_role_id<C: ConnectionTrait>(
    db: &C,
    role_id: i64,
) -> Result<u64, PortcullisError> {
    use entities::grant::{Column, Entity};

    let result = Entity::delete_many()
        .filter(Column::RoleId.eq(role_id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

pub async fn create_grant<C: ConnectionTrait>(
    db: &C,
    input: NewGrant,
) -> Result<entities::grant::Model, PortcullisError> {
    let grant = entities::grant::ActiveModel {
        id: Default::default(),
        role_id: Set(input.role_id),
        user_id: Set(input.user_id),
        section: Set(input.section),
        item: Set(input.item),
        item_id: Set(input.item_id),
        action: Set(input.action),
        rule_type: Set(input.rule_type),
        active: Set(if input.active { 1 } else { 0 }),
    };

    Ok(grant.insert(db).await?)
}

/// Names of roles the given role delegates to, i.e. the `action` values of
/// its active grants in the reserved `role` section.
pub async fn get_role_delegations<C: ConnectionTrait>(
    db: &C,
    role_id: i64,
) -> Result<Vec<String>, PortcullisError> {
    use entities::grant::{Column, Entity};

    let grants = Entity::find()
        .filter(Column::Section.eq(ROLE_SECTION))
        .filter(Column::RoleId.eq(role_id))
        .filter(Column::Active.eq(1))
        .all(db)
        .await?;

    Ok(grants.into_iter().map(|g| g.action).collect())
}

// User-role assignment operations

pub async fn get_direct_roles_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
) -> Result<Vec<i64>, PortcullisError> {
    use entities::user_role::{Column, Entity};

    let assignments = Entity::find()
        .filter(Column::UserId.eq(user_id))
        .all(db)
        .await?;

    Ok(assignments.into_iter().map(|a| a.role_id).collect())
}

/// Assign a role to a user. Re-assigning an existing pair is a no-op.
pub async fn assign_user_role<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    role_id: i64,
) -> Result<(), PortcullisError> {
    use entities::user_role::{ActiveModel, Column, Entity};
    use sea_orm::sea_query::OnConflict;

    let assignment = ActiveModel {
        user_id: Set(user_id),
        role_id: Set(role_id),
    };

    Entity::insert(assignment)
        .on_conflict(
            OnConflict::columns([Column::UserId, Column::RoleId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(())
}

pub async fn revoke_user_role<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    role_id: i64,
) -> Result<(), PortcullisError> {
    use entities::user_role::{Column, Entity};

    Entity::delete_many()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::RoleId.eq(role_id))
        .exec(db)
        .await?;

    Ok(())
}

// Matching queries

/// True iff at least one active grant matches the request. Every scope
/// dimension matches when the stored column is null or equals the requested
/// value; the anonymous user and an empty closure only ever match null
/// columns. `rule_type` is not consulted: only allow rows are written, deny
/// rules are unimplemented.
pub async fn check_grant<C: ConnectionTrait>(
    db: &C,
    section: &str,
    item: &str,
    item_id: i64,
    action: &str,
    user_id: i64,
    roles: &HashSet<i64>,
) -> Result<bool, PortcullisError> {
    use entities::grant::{Column, Entity};

    let user_cond = if user_id == ANONYMOUS_USER {
        Condition::all().add(Column::UserId.is_null())
    } else {
        Condition::any()
            .add(Column::UserId.is_null())
            .add(Column::UserId.eq(user_id))
    };

    let role_cond = if roles.is_empty() {
        Condition::all().add(Column::RoleId.is_null())
    } else {
        Condition::any()
            .add(Column::RoleId.is_null())
            .add(Column::RoleId.is_in(roles.iter().copied()))
    };

    let matches = Entity::find()
        .filter(Column::Active.eq(1))
        .filter(Column::Section.eq(section))
        .filter(Column::Action.eq(action))
        .filter(
            Condition::any()
                .add(Column::Item.is_null())
                .add(Column::Item.eq(item)),
        )
        .filter(
            Condition::any()
                .add(Column::ItemId.is_null())
                .add(Column::ItemId.eq(item_id)),
        )
        .filter(user_cond)
        .filter(role_cond)
        .count(db)
        .await?;

    Ok(matches > 0)
}

/// Role-seeded variant of [`check_grant`]: does any role in the closure carry
/// an active grant for `(section, action)`? User-scoped rows never match and
/// item scoping is ignored.
pub async fn check_role_grant<C: ConnectionTrait>(
    db: &C,
    section: &str,
    action: &str,
    roles: &HashSet<i64>,
) -> Result<bool, PortcullisError> {
    use entities::grant::{Column, Entity};

    let role_cond = if roles.is_empty() {
        Condition::all().add(Column::RoleId.is_null())
    } else {
        Condition::any()
            .add(Column::RoleId.is_null())
            .add(Column::RoleId.is_in(roles.iter().copied()))
    };

    let matches = Entity::find()
        .filter(Column::Active.eq(1))
        .filter(Column::Section.eq(section))
        .filter(Column::Action.eq(action))
        .filter(Column::UserId.is_null())
        .filter(role_cond)
        .count(db)
        .await?;

    Ok(matches > 0)
}
