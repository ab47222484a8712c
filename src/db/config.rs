// Database Configuration
// Handles PostgreSQL and SQLite database configuration

use crate::error::NotifyError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Database type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    Postgres,
    Sqlite,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(rename = "type")]
    pub db_type: DatabaseType,

    // PostgreSQL settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,

    // SQLite settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    /// Create PostgreSQL configuration
    pub fn postgres(
        host: String,
        port: u16,
        database: String,
        username: String,
        password: String,
    ) -> Self {
        Self {
            db_type: DatabaseType::Postgres,
            host: Some(host),
            port: Some(port),
            database: Some(database),
            username: Some(username),
            password: Some(password),
            max_connections: Some(5),
            path: None,
        }
    }

    /// Create SQLite configuration
    pub fn sqlite(path: PathBuf) -> Self {
        Self {
            db_type: DatabaseType::Sqlite,
            host: None,
            port: None,
            database: None,
            username: None,
            password: None,
            max_connections: None,
            path: Some(path),
        }
    }

    /// Generate database URL for sqlx
    pub fn connection_string(&self) -> crate::Result<String> {
        match self.db_type {
            DatabaseType::Postgres => {
                let host = self.host.as_ref().ok_or_else(|| {
                    NotifyError::DatabaseError("Missing PostgreSQL host".to_string())
                })?;
                let port = self.port.ok_or_else(|| {
                    NotifyError::DatabaseError("Missing PostgreSQL port".to_string())
                })?;
                let database = self.database.as_ref().ok_or_else(|| {
                    NotifyError::DatabaseError("Missing database name".to_string())
                })?;
                let username = self
                    .username
                    .as_ref()
                    .ok_or_else(|| NotifyError::DatabaseError("Missing username".to_string()))?;
                let password = self
                    .password
                    .as_ref()
                    .ok_or_else(|| NotifyError::DatabaseError("Missing password".to_string()))?;

                Ok(format!(
                    "postgres://{}:{}@{}:{}/{}",
                    username, password, host, port, database
                ))
            }
            DatabaseType::Sqlite => {
                let path = self
                    .path
                    .as_ref()
                    .ok_or_else(|| NotifyError::DatabaseError("Missing SQLite path".to_string()))?;

                let path_str = path.to_string_lossy();
                if path_str == ":memory:" {
                    Ok(format!("sqlite:{}", path_str))
                } else if path_str.starts_with('/') {
                    // Absolute UNIX path already supplies the third slash
                    Ok(format!("sqlite://{}", path.display()))
                } else if cfg!(windows) && path_str.len() > 1 && path_str.as_bytes()[1] == b':' {
                    Ok(format!("sqlite:///{}", path.display()))
                } else {
                    Ok(format!("sqlite:{}", path.display()))
                }
            }
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::sqlite(PathBuf::from("clm.db"))
    }
}
