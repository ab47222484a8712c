// SQL inventory source
//
// Keyset pagination over the certificates table: each batch continues after
// the last row id seen, so memory stays bounded by the batch size no matter
// how large the inventory is.

use crate::Result;
use crate::db::{BindValue, CERTIFICATES_TABLE, DatabasePool};
use crate::error::NotifyError;
use crate::model::CertificateRecord;
use crate::source::{CertificateSource, WindowFilter};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};

/// Raw inventory row; nullable columns are tolerated here and resolved later
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CertificateRow {
    pub id: i64,
    pub certificate_name: String,
    pub issued_to: Option<String>,
    pub issued_by: Option<String>,
    pub issuing_date: Option<NaiveDate>,
    pub expire_date: Option<NaiveDate>,
    pub cert_type: Option<String>,
    pub owner: Option<String>,
    pub comment: Option<String>,
}

impl CertificateRow {
    /// Convert into a record; rows without an expiry date are not certificates we can classify
    pub fn into_record(self) -> Option<CertificateRecord> {
        let expiry_date = self.expire_date?;

        Some(CertificateRecord {
            name: self.certificate_name,
            issued_to: self.issued_to.unwrap_or_default(),
            owner: self.owner.unwrap_or_default(),
            expiry_date,
            cert_type: self.cert_type.unwrap_or_default(),
            comment: self.comment.filter(|c| !c.trim().is_empty()),
            issued_by: self.issued_by,
            issuing_date: self.issuing_date,
        })
    }
}

/// Streams qualifying certificates out of the inventory table
pub struct SqlCertificateSource {
    pool: DatabasePool,
    batch_size: usize,
    filter: WindowFilter,
    last_id: i64,
    exhausted: bool,
}

impl SqlCertificateSource {
    pub fn new(pool: DatabasePool, batch_size: usize, filter: WindowFilter) -> Self {
        Self {
            pool,
            batch_size: batch_size.max(1),
            filter,
            last_id: 0,
            exhausted: false,
        }
    }

    /// Build the page query for the pool's dialect
    fn page_query(&self) -> String {
        let mut qb = self.pool.query_builder();
        let active = qb.placeholder();
        let horizon = qb.placeholder();
        let after = qb.placeholder();
        let limit = qb.placeholder();

        format!(
            "SELECT id, certificate_name, issued_to, issued_by, issuing_date, expire_date, \
             cert_type, owner, comment \
             FROM {} \
             WHERE active = {} AND expire_date IS NOT NULL AND expire_date <= {} AND id > {} \
             ORDER BY id LIMIT {}",
            CERTIFICATES_TABLE, active, horizon, after, limit
        )
    }

    /// Latest expiry date that can still qualify
    fn horizon_date(&self) -> NaiveDate {
        self.filter.now().date_naive() + Duration::days(self.filter.window().horizon_days())
    }

    async fn fetch_page(&self) -> Result<Vec<CertificateRow>> {
        let query = self.page_query();
        let bindings = vec![
            BindValue::Bool(true),
            BindValue::Date(self.horizon_date()),
            BindValue::Int64(self.last_id),
            BindValue::Int64(self.batch_size as i64),
        ];

        self.pool
            .fetch_all_as::<CertificateRow>(&query, bindings)
            .await
            .map_err(NotifyError::source_unavailable)
    }
}

#[async_trait]
impl CertificateSource for SqlCertificateSource {
    async fn next_batch(&mut self) -> Result<Option<Vec<CertificateRecord>>> {
        // The SQL predicate is a coarse range; the exact day set is applied here.
        // Pages that filter down to nothing are skipped rather than returned empty.
        while !self.exhausted {
            let rows = self.fetch_page().await?;

            if rows.len() < self.batch_size {
                self.exhausted = true;
            }
            if let Some(last) = rows.last() {
                self.last_id = last.id;
            }

            let fetched = rows.len();
            let batch: Vec<CertificateRecord> = rows
                .into_iter()
                .filter_map(CertificateRow::into_record)
                .filter(|record| self.filter.admits(record))
                .collect();

            tracing::debug!(
                "Fetched {} row(s) after id {}, {} qualify",
                fetched,
                self.last_id,
                batch.len()
            );

            if !batch.is_empty() {
                return Ok(Some(batch));
            }
        }

        Ok(None)
    }

    fn source_name(&self) -> &str {
        "database"
    }
}
