//! SQLite schema migration management.

use sqlx::SqlitePool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Failed to execute migration {version}: {source}")]
    ExecutionError {
        version: i64,
        #[source]
        source: sqlx::Error,
    },
    #[error("Failed to get schema version: {0}")]
    VersionCheckError(#[source] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub description: String,
    pub sql: String,
}

pub struct Migrator {
    pool: SqlitePool,
}

impl Migrator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply all embedded migrations newer than the stored version.
    pub async fn run_embedded_migrations(
        &self,
        migrations: Vec<Migration>,
    ) -> Result<usize, MigrationError> {
        self.ensure_migrations_table().await?;
        let current_version = self.get_current_version().await?;
        let pending: Vec<_> = migrations
            .into_iter()
            .filter(|m| m.version > current_version)
            .collect();

        if pending.is_empty() {
            return Ok(0);
        }

        for migration in &pending {
            self.apply_migration(migration).await?;
        }

        Ok(pending.len())
    }

    async fn ensure_migrations_table(&self) -> Result<(), MigrationError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now')),
                description TEXT
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| MigrationError::ExecutionError { version: 0, source: e })?;
        Ok(())
    }

    pub async fn get_current_version(&self) -> Result<i64, MigrationError> {
        let result: Option<(i64,)> =
            sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
                .fetch_optional(&self.pool)
                .await
                .map_err(MigrationError::VersionCheckError)?;
        Ok(result.map(|(v,)| v).unwrap_or(0))
    }

    async fn apply_migration(&self, migration: &Migration) -> Result<(), MigrationError> {
        sqlx::raw_sql(&migration.sql)
            .execute(&self.pool)
            .await
            .map_err(|e| MigrationError::ExecutionError {
                version: migration.version,
                source: e,
            })?;

        sqlx::query("INSERT INTO schema_migrations (version, description) VALUES (?, ?)")
            .bind(migration.version)
            .bind(&migration.description)
            .execute(&self.pool)
            .await
            .map_err(|e| MigrationError::ExecutionError {
                version: migration.version,
                source: e,
            })?;
        Ok(())
    }
}

/// The adapter's initial schema.
pub fn initial_schema_migration() -> Migration {
    Migration {
        version: 1,
        description: "Initial schema".to_string(),
        sql: r"
            CREATE TABLE IF NOT EXISTS followup_requests (
                id TEXT PRIMARY KEY,
                obj TEXT NOT NULL,
                allocation TEXT NOT NULL,
                payload TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending submission',
                last_modified_by TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS facility_transactions (
                id TEXT PRIMARY KEY,
                followup_request_id TEXT NOT NULL REFERENCES followup_requests(id),
                initiator_id TEXT NOT NULL,
                request TEXT NOT NULL,
                response TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_request
                ON facility_transactions(followup_request_id, created_at);

            CREATE TABLE IF NOT EXISTS comments (
                id TEXT PRIMARY KEY,
                obj_id TEXT NOT NULL,
                text TEXT NOT NULL,
                attachment_name TEXT,
                attachment_bytes TEXT,
                author_id TEXT NOT NULL,
                group_ids TEXT NOT NULL,
                bot INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_comments_obj ON comments(obj_id);

            CREATE TABLE IF NOT EXISTS observations (
                instrument_id TEXT NOT NULL,
                observation_id INTEGER NOT NULL,
                obstime TEXT NOT NULL,
                ra REAL NOT NULL,
                dec REAL NOT NULL,
                seeing REAL,
                limmag REAL,
                exposure_time REAL NOT NULL,
                filter TEXT NOT NULL,
                processed_fraction REAL NOT NULL,
                target_name TEXT NOT NULL,
                UNIQUE(instrument_id, observation_id, filter)
            );
        "
        .to_string(),
    }
}

/// All embedded migrations, oldest first.
pub fn all_migrations() -> Vec<Migration> {
    vec![initial_schema_migration()]
}
