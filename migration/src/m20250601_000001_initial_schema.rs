use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Enable foreign keys for SQLite
        if manager.get_database_backend() == sea_orm::DatabaseBackend::Sqlite {
            manager
                .get_connection()
                .execute_unprepared("PRAGMA foreign_keys = ON")
                .await?;
        }

        // Auto-increment ids need a backend-specific column type: SQLite only
        // autoincrements INTEGER primary keys.
        let role_id = match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => ColumnDef::new(Roles::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key()
                .to_owned(),
            _ => ColumnDef::new(Roles::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key()
                .to_owned(),
        };

        // Create roles table
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(role_id)
                    .col(
                        ColumnDef::new(Roles::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Roles::CanLogin)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Roles::IsAdmin)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Roles::PrivateLabels)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(big_integer_null(Roles::PublicProfileAllowedAt))
                    .to_owned(),
            )
            .await?;

        let grant_id = match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => ColumnDef::new(Grants::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key()
                .to_owned(),
            _ => ColumnDef::new(Grants::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key()
                .to_owned(),
        };

        // Create grants table
        manager
            .create_table(
                Table::create()
                    .table(Grants::Table)
                    .if_not_exists()
                    .col(grant_id)
                    .col(big_integer_null(Grants::RoleId))
                    .col(big_integer_null(Grants::UserId))
                    .col(string(Grants::Section))
                    .col(string_null(Grants::Item))
                    .col(big_integer_null(Grants::ItemId))
                    .col(string(Grants::Action))
                    .col(string(Grants::RuleType))
                    .col(
                        ColumnDef::new(Grants::Active)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .to_owned(),
            )
            .await?;

        // Lookup index used by the matcher
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grants_section_item_action")
                    .table(Grants::Table)
                    .col(Grants::Section)
                    .col(Grants::Item)
                    .col(Grants::Action)
                    .to_owned(),
            )
            .await?;

        // Lookup index used by the reconciler and closure resolver
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grants_role")
                    .table(Grants::Table)
                    .col(Grants::RoleId)
                    .to_owned(),
            )
            .await?;

        // Create user_roles association table
        manager
            .create_table(
                Table::create()
                    .table(UserRoles::Table)
                    .if_not_exists()
                    .col(big_integer(UserRoles::UserId))
                    .col(big_integer(UserRoles::RoleId))
                    .primary_key(
                        Index::create()
                            .col(UserRoles::UserId)
                            .col(UserRoles::RoleId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_roles_user")
                    .table(UserRoles::Table)
                    .col(UserRoles::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserRoles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Grants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Roles {
    Table,
    Id,
    Name,
    CanLogin,
    IsAdmin,
    PrivateLabels,
    PublicProfileAllowedAt,
}

#[derive(DeriveIden)]
enum Grants {
    Table,
    Id,
    RoleId,
    UserId,
    Section,
    Item,
    ItemId,
    Action,
    RuleType,
    Active,
}

#[derive(DeriveIden)]
enum UserRoles {
    Table,
    UserId,
    RoleId,
}
