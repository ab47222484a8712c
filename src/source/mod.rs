// Certificate Sources
//
// A source yields the certificate inventory in bounded batches. Sources own
// the prefiltering: only active certificates with an expiry date whose
// day-distance is admitted by the notification window reach the classifier.

pub mod csv_file;
pub mod sql;

pub use csv_file::{CsvCertificateSource, read_inventory};
pub use sql::SqlCertificateSource;

use crate::Result;
use crate::expiry::{ExpiryWindow, day_distance};
use crate::model::CertificateRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Default number of records per batch
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Streaming certificate source
#[async_trait]
pub trait CertificateSource: Send {
    /// Next batch of qualifying records, `None` once the source is exhausted.
    /// Errors are reported as `NotifyError::SourceUnavailable`.
    async fn next_batch(&mut self) -> Result<Option<Vec<CertificateRecord>>>;

    /// Source name for logging
    fn source_name(&self) -> &str;
}

/// Evaluation-time filter shared by source implementations
#[derive(Debug, Clone)]
pub struct WindowFilter {
    window: ExpiryWindow,
    now: DateTime<Utc>,
}

impl WindowFilter {
    pub fn new(window: ExpiryWindow, now: DateTime<Utc>) -> Self {
        Self { window, now }
    }

    pub fn window(&self) -> &ExpiryWindow {
        &self.window
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Whether a record qualifies for notification
    pub fn admits(&self, record: &CertificateRecord) -> bool {
        self.window.admits(day_distance(record.expiry_date, self.now))
    }
}

/// In-memory source, mostly for tests and dry runs
pub struct MemorySource {
    records: std::vec::IntoIter<CertificateRecord>,
    batch_size: usize,
    filter: Option<WindowFilter>,
}

impl MemorySource {
    /// Serve `records` unfiltered in batches of `batch_size`
    pub fn new(records: Vec<CertificateRecord>, batch_size: usize) -> Self {
        Self {
            records: records.into_iter(),
            batch_size: batch_size.max(1),
            filter: None,
        }
    }

    /// Apply the notification window like a real inventory query would
    pub fn with_filter(mut self, filter: WindowFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

#[async_trait]
impl CertificateSource for MemorySource {
    async fn next_batch(&mut self) -> Result<Option<Vec<CertificateRecord>>> {
        let mut batch = Vec::with_capacity(self.batch_size);

        for record in self.records.by_ref() {
            if let Some(filter) = &self.filter
                && !filter.admits(&record)
            {
                continue;
            }

            batch.push(record);
            if batch.len() == self.batch_size {
                break;
            }
        }

        if batch.is_empty() {
            Ok(None)
        } else {
            Ok(Some(batch))
        }
    }

    fn source_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn record(name: &str, expiry: NaiveDate) -> CertificateRecord {
        CertificateRecord::new(name, "ops", "ops", expiry)
    }

    #[tokio::test]
    async fn test_memory_source_batches() {
        let expiry = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let records = (0..5).map(|i| record(&format!("c{}", i), expiry)).collect();
        let mut source = MemorySource::new(records, 2);

        let mut sizes = Vec::new();
        while let Some(batch) = source.next_batch().await.unwrap() {
            sizes.push(batch.len());
        }

        assert_eq!(sizes, vec![2, 2, 1]);
        assert!(source.next_batch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_source_window_filter() {
        let now = Utc.with_ymd_and_hms(2026, 4, 1, 8, 0, 0).unwrap();
        let today = now.date_naive();
        let records = vec![
            record("expired", today - chrono::Duration::days(3)),
            record("in-3-days", today + chrono::Duration::days(3)),
            record("in-7-days", today + chrono::Duration::days(7)),
            record("in-90-days", today + chrono::Duration::days(90)),
        ];

        let mut source = MemorySource::new(records, 10)
            .with_filter(WindowFilter::new(ExpiryWindow::default(), now));

        let batch = source.next_batch().await.unwrap().unwrap();
        let names: Vec<_> = batch.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["expired", "in-7-days"]);
        assert!(source.next_batch().await.unwrap().is_none());
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        let source = MemorySource::new(Vec::new(), 0);
        assert_eq!(source.batch_size, 1);
        assert_eq!(source.source_name(), "memory");
    }
}
