use portcullis::entities::role;
use portcullis::store::{self, NewGrant, ALLOW_RULE, ROLE_SECTION};
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tempfile::NamedTempFile;

/// Test database with automatic cleanup
pub struct TestDb {
    connection: DatabaseConnection,
    _temp_file: NamedTempFile,
}

impl TestDb {
    /// Create a new test database with migrations applied
    pub async fn new() -> Self {
        // Create temporary SQLite database file
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_str().expect("Invalid temp file path");
        let db_url = format!("sqlite://{}?mode=rwc", db_path);

        // Connect to database
        let connection = Database::connect(&db_url)
            .await
            .expect("Failed to connect to test database");

        // Run migrations
        migration::Migrator::up(&connection, None)
            .await
            .expect("Failed to run migrations");

        Self {
            connection,
            _temp_file: temp_file,
        }
    }

    /// Get database connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}

/// Create a login-capable, non-admin role for testing
pub async fn seed_role(db: &DatabaseConnection, name: &str) -> role::Model {
    store::create_role(db, name, true, false, true, None)
        .await
        .expect("Failed to create test role")
}

/// Create an active resource grant scoped to a role
pub async fn seed_grant(
    db: &DatabaseConnection,
    role_id: i64,
    section: &str,
    item: &str,
    action: &str,
) {
    store::create_grant(
        db,
        NewGrant {
            role_id: Some(role_id),
            user_id: None,
            section: section.to_string(),
            item: if item.is_empty() {
                None
            } else {
                Some(item.to_string())
            },
            item_id: None,
            action: action.to_string(),
            rule_type: ALLOW_RULE.to_string(),
            active: true,
        },
    )
    .await
    .expect("Failed to create test grant");
}

/// Create an active delegation grant: `role_id` also holds the role named `to`
pub async fn seed_delegation(db: &DatabaseConnection, role_id: i64, to: &str) {
    store::create_grant(
        db,
        NewGrant {
            role_id: Some(role_id),
            user_id: None,
            section: ROLE_SECTION.to_string(),
            item: None,
            item_id: None,
            action: to.to_string(),
            rule_type: ALLOW_RULE.to_string(),
            active: true,
        },
    )
    .await
    .expect("Failed to create test delegation");
}
