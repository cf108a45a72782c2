//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for all application data.

mod repository;
mod seed;

pub use repository::*;
pub use seed::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Create tables if they don't exist
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS commissions (
            num_acta INTEGER NOT NULL,
            data_comissio TEXT NOT NULL,
            num_temes INTEGER NOT NULL DEFAULT 0,
            dia_setmana TEXT NOT NULL,
            avis_email INTEGER NOT NULL DEFAULT 0,
            data_email TEXT,
            estat TEXT NOT NULL DEFAULT 'Oberta',
            PRIMARY KEY (num_acta, data_comissio)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS commission_details (
            num_acta INTEGER NOT NULL,
            sessio TEXT NOT NULL,
            data_actual TEXT NOT NULL,
            hora TEXT NOT NULL,
            estat TEXT NOT NULL DEFAULT 'Oberta',
            mitja TEXT NOT NULL,
            expedients_count INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (num_acta, sessio)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS expedients (
            num_acta INTEGER NOT NULL,
            sessio TEXT NOT NULL,
            ordre INTEGER NOT NULL,
            id TEXT NOT NULL,
            peticionari TEXT NOT NULL DEFAULT '',
            procediment TEXT NOT NULL DEFAULT '',
            descripcio TEXT NOT NULL DEFAULT '',
            indret TEXT NOT NULL DEFAULT '',
            sentit_informe TEXT NOT NULL DEFAULT '',
            tecnic TEXT NOT NULL DEFAULT '',
            departament TEXT NOT NULL DEFAULT ''
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS admin_items (
            list TEXT NOT NULL,
            id TEXT NOT NULL,
            name TEXT NOT NULL,
            email TEXT,
            PRIMARY KEY (list, id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            password TEXT,
            role TEXT NOT NULL DEFAULT 'viewer'
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS backups (
            timestamp INTEGER PRIMARY KEY,
            description TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS backup_blobs (
            timestamp INTEGER PRIMARY KEY,
            snapshot TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_commissions_data ON commissions(data_comissio);
        CREATE INDEX IF NOT EXISTS idx_details_acta ON commission_details(num_acta);
        CREATE INDEX IF NOT EXISTS idx_expedients_session ON expedients(num_acta, sessio, ordre);
        CREATE INDEX IF NOT EXISTS idx_admin_items_list ON admin_items(list);
        CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
