use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A stored permission rule. Null scope columns mean "unrestricted in that
/// dimension". A row with `section = "role"` delegates the role named by
/// `action` to the role holding the grant.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub role_id: Option<i64>,
    pub user_id: Option<i64>,
    pub section: String,
    pub item: Option<String>,
    pub item_id: Option<i64>,
    pub action: String,
    pub rule_type: String,
    pub active: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
