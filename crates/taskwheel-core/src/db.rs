use std::path::Path;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::error::CoreError;

// Re-export the pool for use in other parts of the core crate
pub use sqlx::SqlitePool as DbPool;

/// Establishes a connection pool to the SQLite database and runs migrations.
///
/// # Arguments
///
/// * `db_path` - The path to the SQLite database file.
///
/// # Returns
///
/// A `Result` containing the `SqlitePool` or a `CoreError` if the connection
/// fails or migrations cannot be run.
pub async fn establish_connection(db_path: &str) -> Result<SqlitePool, CoreError> {
    // On-disk databases need the file to exist before sqlite will open it;
    // URI forms and in-memory databases must be passed through untouched.
    if !db_path.starts_with("sqlite:") && db_path != ":memory:" {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.exists() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        if !Path::new(db_path).exists() {
            tokio::fs::File::create(db_path).await?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_path)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
