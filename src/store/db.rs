//! Clinic database handle
//!
//! Owns the SQLite connection pool, applies the schema and loads the sample
//! data set.

use crate::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

const SCHEMA_SQL: &str = include_str!("../../migrations/001_create_schema.sql");
const SAMPLE_DATA_SQL: &str = include_str!("../../migrations/002_sample_data.sql");

/// Tables checked before seeding; seeding only happens when all are empty
const CLINIC_TABLES: &[&str] = &[
    "owners",
    "pet_types",
    "pets",
    "visits",
    "vets",
    "specialties",
    "vet_specialties",
];

/// Shared store handle, cheap to clone
#[derive(Debug, Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Initialize database connection pool and apply the schema
    ///
    /// # Arguments
    /// * `db_path` - SQLite URL (`sqlite:...`) or plain path to the database file
    /// * `max_connections` - Upper bound on pooled connections
    ///
    /// # Returns
    /// * `Ok(Db)` if successful
    /// * `Err(AppError)` if connection or migration failed
    pub async fn connect(db_path: &str, max_connections: u32) -> Result<Self, AppError> {
        let file_path = db_path
            .trim_start_matches("sqlite://")
            .trim_start_matches("sqlite:");

        // Ensure parent directory exists
        if !file_path.starts_with(":memory:") {
            if let Some(parent) = Path::new(file_path).parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("Failed to create db directory: {}", e))
                })?;
            }
        }

        let connection_string = if db_path.starts_with("sqlite:") {
            db_path.to_string()
        } else {
            format!("sqlite:{}", db_path)
        };

        let options = SqliteConnectOptions::from_str(&connection_string)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid database path: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true)
            .with_regexp();

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to connect to database: {}", e))
            })?;

        info!("Connected to SQLite database at: {}", db_path);

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Apply the embedded schema; every statement is idempotent
    async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations...");

        for statement in split_statements(SCHEMA_SQL) {
            sqlx::query(&statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::Internal(anyhow::anyhow!(
                        "Migration failed: {} - Statement: {}",
                        e,
                        statement.chars().take(100).collect::<String>()
                    ))
                })?;
        }

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Load the sample clinic data when the store holds no records
    ///
    /// # Returns
    /// * `Ok(true)` - sample data was inserted
    /// * `Ok(false)` - the store already had data; nothing changed
    pub async fn seed_sample_data(&self) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        for table in CLINIC_TABLES {
            let sql = format!("SELECT COUNT(*) FROM {}", table);
            let count: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *tx).await?;
            if count > 0 {
                info!(table, "Store already holds data, skipping sample data");
                return Ok(false);
            }
        }

        for statement in split_statements(SAMPLE_DATA_SQL) {
            sqlx::query(&statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        info!("Loaded sample clinic data");
        Ok(true)
    }

    /// Get the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Split a SQL script into statements, dropping `--` comments
fn split_statements(script: &str) -> Vec<String> {
    let mut cleaned_sql = String::new();
    for line in script.lines() {
        let trimmed = line.trim();
        // Skip empty lines and comment-only lines
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }
        let without_comments = match trimmed.find("--") {
            Some(comment_pos) => &trimmed[..comment_pos],
            None => trimmed,
        };
        cleaned_sql.push_str(without_comments.trim());
        cleaned_sql.push(' ');
    }

    cleaned_sql
        .split(';')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_split_statements() {
        let script = "-- header\nCREATE TABLE a (x INTEGER); -- trailing\n\nINSERT INTO a VALUES (1);\n";
        let statements = split_statements(script);
        assert_eq!(
            statements,
            vec!["CREATE TABLE a (x INTEGER)", "INSERT INTO a VALUES (1)"]
        );
    }

    #[test]
    fn test_embedded_scripts_split_cleanly() {
        assert_eq!(split_statements(SCHEMA_SQL).len(), 12);
        assert_eq!(split_statements(SAMPLE_DATA_SQL).len(), 7);
    }

    #[tokio::test]
    async fn test_connect_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("clinic.db");
        let url = format!("sqlite:{}", db_path.display());

        let db = Db::connect(&url, 1).await.unwrap();
        assert!(db_path.exists());

        // Reconnecting re-runs the idempotent schema
        drop(db);
        Db::connect(&url, 1).await.unwrap();
    }

    #[tokio::test]
    async fn test_seed_sample_data_once() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("seed.db");
        let db = Db::connect(db_path.to_str().unwrap(), 2).await.unwrap();

        assert!(db.seed_sample_data().await.unwrap());
        assert!(!db.seed_sample_data().await.unwrap());

        let owners: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM owners")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vet_specialties")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(owners, 10);
        assert_eq!(links, 7);
    }
}
