//! Test database setup and management
#![allow(dead_code)]

use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Schema};
use std::env;
use std::sync::Once;
use tempfile::TempDir;

static INIT_SYNC: Once = Once::new();

/// Holds the SQLite file for the whole test run.
static TEST_DB_DIR: OnceCell<TempDir> = OnceCell::new();

/// Initialize synchronous global state (ARGON2, config)
fn init_sync_globals() {
    INIT_SYNC.call_once(|| {
        placementhub::app_config::init();
        placementhub::session::init();
    });
}

/// Initialize async global state (DB_POOL)
/// Must be called from an async context
async fn init_async_globals() {
    // Ensure sync globals are initialized first
    init_sync_globals();

    // Use a static flag to ensure this only runs once
    // We can't use the regular Once::call_once because it's not async-friendly
    use std::sync::atomic::{AtomicBool, Ordering};
    static DB_INITIALIZED: AtomicBool = AtomicBool::new(false);

    if !DB_INITIALIZED.swap(true, Ordering::SeqCst) {
        let database_url = env::var("TEST_DATABASE_URL").unwrap_or_else(|_| {
            let dir = TEST_DB_DIR
                .get_or_init(|| tempfile::tempdir().expect("Failed to create test database dir"));
            format!(
                "sqlite://{}?mode=rwc",
                dir.path().join("placementhub_test.db").display()
            )
        });

        placementhub::db::init_db(database_url).await;
        create_schema(placementhub::db::get_db_pool())
            .await
            .expect("Failed to create test schema");
    }
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;
    Ok(())
}

/// Create every table from the entity definitions. Parent tables go first so
/// the foreign keys resolve.
async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    use placementhub::orm::{
        announcements, comments, company_standardizations, experience_rounds, experiences,
        notifications, reports, round_questions, sessions, users,
    };

    create_table(db, users::Entity).await?;
    create_table(db, sessions::Entity).await?;
    create_table(db, experiences::Entity).await?;
    create_table(db, experience_rounds::Entity).await?;
    create_table(db, round_questions::Entity).await?;
    create_table(db, comments::Entity).await?;
    create_table(db, reports::Entity).await?;
    create_table(db, announcements::Entity).await?;
    create_table(db, notifications::Entity).await?;
    create_table(db, company_standardizations::Entity).await?;
    Ok(())
}

/// Setup test database - initialize globals and return the shared pool.
///
/// Handlers resolve the pool through the process-wide global, so tests share
/// the same connection the application code uses.
pub async fn setup_test_database() -> Result<DatabaseConnection, DbErr> {
    init_async_globals().await;
    Ok(placementhub::db::get_db_pool().clone())
}

/// Cleanup function to remove test data
///
/// Deletes from child tables before their parents to avoid foreign key
/// constraint violations.
pub async fn cleanup_test_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    use placementhub::orm::{
        announcements, comments, company_standardizations, experience_rounds, experiences,
        notifications, reports, round_questions, sessions, users,
    };

    round_questions::Entity::delete_many().exec(db).await?;
    experience_rounds::Entity::delete_many().exec(db).await?;
    notifications::Entity::delete_many().exec(db).await?;
    comments::Entity::delete_many().exec(db).await?;
    reports::Entity::delete_many().exec(db).await?;
    announcements::Entity::delete_many().exec(db).await?;
    company_standardizations::Entity::delete_many().exec(db).await?;
    experiences::Entity::delete_many().exec(db).await?;
    sessions::Entity::delete_many().exec(db).await?;
    users::Entity::delete_many().exec(db).await?;

    Ok(())
}
