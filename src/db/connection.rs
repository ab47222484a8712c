// Database Connection Pool
// Manages PostgreSQL and SQLite connection pools with sqlx

use crate::db::config::{DatabaseConfig, DatabaseType};
use crate::error::NotifyError;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Sqlite};
use std::str::FromStr;
use std::time::Duration;

/// QueryBuilder that handles placeholder syntax differences between databases.
/// PostgreSQL uses $1, $2, $3... while SQLite uses ?, ?, ?...
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    db_type: DatabaseType,
    param_count: usize,
}

impl QueryBuilder {
    pub fn new(db_type: DatabaseType) -> Self {
        Self {
            db_type,
            param_count: 0,
        }
    }

    /// Get the next placeholder for the current database type
    pub fn placeholder(&mut self) -> String {
        self.param_count += 1;
        match self.db_type {
            DatabaseType::Postgres => format!("${}", self.param_count),
            DatabaseType::Sqlite => "?".to_string(),
        }
    }

    /// Generate N placeholders separated by commas
    pub fn placeholders(&mut self, count: usize) -> String {
        (0..count)
            .map(|_| self.placeholder())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn reset(&mut self) {
        self.param_count = 0;
    }

    /// Build an INSERT query with the correct placeholders
    pub fn insert_query(&mut self, table: &str, columns: &[&str]) -> String {
        self.reset();
        let cols = columns.join(", ");
        let placeholders = self.placeholders(columns.len());
        format!("INSERT INTO {} ({}) VALUES ({})", table, cols, placeholders)
    }
}

/// Database pool enum supporting both PostgreSQL and SQLite
#[derive(Clone)]
pub enum DatabasePool {
    Postgres(Pool<Postgres>),
    Sqlite(Pool<Sqlite>),
}

impl DatabasePool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> crate::Result<Self> {
        let connection_string = config.connection_string()?;

        let pool = match config.db_type {
            DatabaseType::Postgres => {
                let max_connections = config.max_connections.unwrap_or(5);

                let pool = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(max_connections)
                    .acquire_timeout(Duration::from_secs(30))
                    .connect(&connection_string)
                    .await
                    .map_err(|e| {
                        NotifyError::DatabaseError(format!("PostgreSQL connection failed: {}", e))
                    })?;

                DatabasePool::Postgres(pool)
            }
            DatabaseType::Sqlite => {
                let connect_options =
                    sqlx::sqlite::SqliteConnectOptions::from_str(&connection_string)
                        .map_err(|e| {
                            NotifyError::DatabaseError(format!(
                                "Failed to parse SQLite connection string: {}",
                                e
                            ))
                        })?
                        .create_if_missing(true);

                let pool = sqlx::sqlite::SqlitePoolOptions::new()
                    .max_connections(1) // SQLite is single-writer
                    .acquire_timeout(Duration::from_secs(30))
                    .connect_with(connect_options)
                    .await
                    .map_err(|e| {
                        NotifyError::DatabaseError(format!("SQLite connection failed: {}", e))
                    })?;

                DatabasePool::Sqlite(pool)
            }
        };

        Ok(pool)
    }

    pub fn db_type(&self) -> DatabaseType {
        match self {
            DatabasePool::Postgres(_) => DatabaseType::Postgres,
            DatabasePool::Sqlite(_) => DatabaseType::Sqlite,
        }
    }

    pub async fn close(&self) {
        match self {
            DatabasePool::Postgres(pool) => pool.close().await,
            DatabasePool::Sqlite(pool) => pool.close().await,
        }
    }

    /// Create a QueryBuilder for this pool's database type
    pub fn query_builder(&self) -> QueryBuilder {
        QueryBuilder::new(self.db_type())
    }

    /// Execute a statement without returning rows
    pub async fn execute(&self, query: &str, bindings: Vec<BindValue>) -> crate::Result<u64> {
        let affected = match self {
            DatabasePool::Postgres(pool) => {
                let mut q = sqlx::query(query);
                for binding in bindings {
                    q = binding.bind_postgres(q);
                }
                q.execute(pool)
                    .await
                    .map_err(|e| NotifyError::DatabaseError(format!("Query failed: {}", e)))?
                    .rows_affected()
            }
            DatabasePool::Sqlite(pool) => {
                let mut q = sqlx::query(query);
                for binding in bindings {
                    q = binding.bind_sqlite(q);
                }
                q.execute(pool)
                    .await
                    .map_err(|e| NotifyError::DatabaseError(format!("Query failed: {}", e)))?
                    .rows_affected()
            }
        };

        Ok(affected)
    }

    /// Run a SELECT and decode every row into `T`
    pub async fn fetch_all_as<T>(&self, query: &str, bindings: Vec<BindValue>) -> crate::Result<Vec<T>>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>
            + for<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow>
            + Send
            + Unpin,
    {
        match self {
            DatabasePool::Postgres(pool) => {
                let mut q = sqlx::query(query);
                for binding in bindings {
                    q = binding.bind_postgres(q);
                }
                let rows = q
                    .fetch_all(pool)
                    .await
                    .map_err(|e| NotifyError::DatabaseError(format!("Query failed: {}", e)))?;
                rows.iter()
                    .map(|row| {
                        <T as sqlx::FromRow<'_, sqlx::postgres::PgRow>>::from_row(row)
                            .map_err(NotifyError::from)
                    })
                    .collect()
            }
            DatabasePool::Sqlite(pool) => {
                let mut q = sqlx::query(query);
                for binding in bindings {
                    q = binding.bind_sqlite(q);
                }
                let rows = q
                    .fetch_all(pool)
                    .await
                    .map_err(|e| NotifyError::DatabaseError(format!("Query failed: {}", e)))?;
                rows.iter()
                    .map(|row| {
                        <T as sqlx::FromRow<'_, sqlx::sqlite::SqliteRow>>::from_row(row)
                            .map_err(NotifyError::from)
                    })
                    .collect()
            }
        }
    }
}

/// Bind values for database-agnostic query binding
#[derive(Debug, Clone)]
pub enum BindValue {
    Int64(i64),
    String(String),
    OptString(Option<String>),
    Bool(bool),
    Date(NaiveDate),
    OptDate(Option<NaiveDate>),
}

impl BindValue {
    fn bind_postgres<'q>(
        self,
        query: sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments>,
    ) -> sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments> {
        match self {
            BindValue::Int64(v) => query.bind(v),
            BindValue::String(v) => query.bind(v),
            BindValue::OptString(v) => query.bind(v),
            BindValue::Bool(v) => query.bind(v),
            BindValue::Date(v) => query.bind(v),
            BindValue::OptDate(v) => query.bind(v),
        }
    }

    fn bind_sqlite<'q>(
        self,
        query: sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    ) -> sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
        match self {
            BindValue::Int64(v) => query.bind(v),
            BindValue::String(v) => query.bind(v),
            BindValue::OptString(v) => query.bind(v),
            BindValue::Bool(v) => query.bind(v),
            BindValue::Date(v) => query.bind(v),
            BindValue::OptDate(v) => query.bind(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_query_builder_placeholders() {
        let mut pg = QueryBuilder::new(DatabaseType::Postgres);
        assert_eq!(pg.placeholders(3), "$1, $2, $3");

        let mut lite = QueryBuilder::new(DatabaseType::Sqlite);
        assert_eq!(lite.placeholders(2), "?, ?");
    }

    #[test]
    fn test_insert_query_resets_counter() {
        let mut pg = QueryBuilder::new(DatabaseType::Postgres);
        pg.placeholder();
        assert_eq!(
            pg.insert_query("certificates", &["owner", "issued_to"]),
            "INSERT INTO certificates (owner, issued_to) VALUES ($1, $2)"
        );
    }

    #[tokio::test]
    async fn test_sqlite_pool_creation() {
        let config = DatabaseConfig::sqlite(PathBuf::from(":memory:"));
        let pool = DatabasePool::new(&config)
            .await
            .expect("test assertion should succeed");

        assert_eq!(pool.db_type(), DatabaseType::Sqlite);
        pool.close().await;
    }
}
