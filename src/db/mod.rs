// Database Module
// Connection handling and schema for the certificate inventory table

pub mod config;
pub mod connection;
pub mod schema;

pub use config::{DatabaseConfig, DatabaseType};
pub use connection::{BindValue, DatabasePool, QueryBuilder};
pub use schema::{CERTIFICATES_TABLE, ensure_schema, insert_certificate};
