//! Embedded `SQLite` migrations.
//!
//! ```rust,ignore
//! use companies::sqlite::migrations;
//!
//! migrations::run(&pool).await?;
//! ```

use sqlx::{Executor, SqlitePool};

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "20250301000001_create_users_table",
        include_str!("../../migrations_sqlite/20250301000001_create_users_table.sql"),
    ),
    (
        "20250301000002_create_companies_table",
        include_str!("../../migrations_sqlite/20250301000002_create_companies_table.sql"),
    ),
    (
        "20250301000003_create_company_user_table",
        include_str!("../../migrations_sqlite/20250301000003_create_company_user_table.sql"),
    ),
    (
        "20250301000004_create_company_invitations_table",
        include_str!(
            "../../migrations_sqlite/20250301000004_create_company_invitations_table.sql"
        ),
    ),
    (
        "20250301000005_create_api_tokens_table",
        include_str!("../../migrations_sqlite/20250301000005_create_api_tokens_table.sql"),
    ),
];

/// Applies pending migrations in order, recording each in
/// `_companies_migrations`.
pub async fn run(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    pool.execute(
        r"
        CREATE TABLE IF NOT EXISTS _companies_migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        ",
    )
    .await?;

    for (name, sql) in MIGRATIONS {
        let applied: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM _companies_migrations WHERE name = ?)",
        )
        .bind(*name)
        .fetch_one(pool)
        .await?;

        if applied {
            continue;
        }

        // one statement per execute; the bundled files keep semicolons out
        // of string literals
        for statement in sql.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                pool.execute(trimmed).await?;
            }
        }

        sqlx::query("INSERT INTO _companies_migrations (name) VALUES (?)")
            .bind(*name)
            .execute(pool)
            .await?;

        log::debug!(target: "companies", "msg=\"migration applied\", name=\"{name}\"");
    }

    Ok(())
}
