// Inventory schema
// Creates the certificates table and inserts inventory rows

use crate::db::connection::{BindValue, DatabasePool};
use crate::model::CertificateRecord;

/// Name of the certificate inventory table
pub const CERTIFICATES_TABLE: &str = "certificates";

const SQLITE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS certificates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    certificate_name TEXT NOT NULL,
    issued_to TEXT,
    issued_by TEXT,
    issuing_date DATE,
    expire_date DATE,
    cert_type TEXT,
    owner TEXT,
    comment TEXT,
    active BOOLEAN NOT NULL DEFAULT 1
)"#;

const POSTGRES_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS certificates (
    id BIGSERIAL PRIMARY KEY,
    certificate_name TEXT NOT NULL,
    issued_to TEXT,
    issued_by TEXT,
    issuing_date DATE,
    expire_date DATE,
    cert_type TEXT,
    owner TEXT,
    comment TEXT,
    active BOOLEAN NOT NULL DEFAULT TRUE
)"#;

const EXPIRY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_certificates_expiry ON certificates (active, expire_date)";

/// Create the inventory table and its expiry index if missing
pub async fn ensure_schema(pool: &DatabasePool) -> crate::Result<()> {
    let ddl = match pool {
        DatabasePool::Postgres(_) => POSTGRES_SCHEMA,
        DatabasePool::Sqlite(_) => SQLITE_SCHEMA,
    };

    pool.execute(ddl, Vec::new()).await?;
    pool.execute(EXPIRY_INDEX, Vec::new()).await?;

    tracing::debug!("Ensured {} table exists", CERTIFICATES_TABLE);
    Ok(())
}

/// Insert one inventory row
pub async fn insert_certificate(
    pool: &DatabasePool,
    record: &CertificateRecord,
    active: bool,
) -> crate::Result<()> {
    let query = pool.query_builder().insert_query(
        CERTIFICATES_TABLE,
        &[
            "certificate_name",
            "issued_to",
            "issued_by",
            "issuing_date",
            "expire_date",
            "cert_type",
            "owner",
            "comment",
            "active",
        ],
    );

    pool.execute(
        &query,
        vec![
            BindValue::String(record.name.clone()),
            BindValue::String(record.issued_to.clone()),
            BindValue::OptString(record.issued_by.clone()),
            BindValue::OptDate(record.issuing_date),
            BindValue::Date(record.expiry_date),
            BindValue::String(record.cert_type.clone()),
            BindValue::String(record.owner.clone()),
            BindValue::OptString(record.comment.clone()),
            BindValue::Bool(active),
        ],
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DatabaseConfig;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_schema_is_idempotent_and_accepts_rows() {
        let pool = DatabasePool::new(&DatabaseConfig::sqlite(PathBuf::from(":memory:")))
            .await
            .unwrap();

        ensure_schema(&pool).await.unwrap();
        ensure_schema(&pool).await.unwrap();

        let record = CertificateRecord::new(
            "CertA",
            "ops",
            "ops",
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        )
        .with_comment("REQ-1");
        insert_certificate(&pool, &record, true).await.unwrap();

        let affected = pool
            .execute("UPDATE certificates SET active = 0", Vec::new())
            .await
            .unwrap();
        assert_eq!(affected, 1);
    }
}
