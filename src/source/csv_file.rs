// CSV inventory source
//
// Reads an inventory export with the same columns as the certificates table.
// Both the spreadsheet-style headers ("Certificate Name", "Expire date", ...)
// and the snake_case column names are accepted.

use crate::Result;
use crate::error::NotifyError;
use crate::model::CertificateRecord;
use crate::source::{CertificateSource, WindowFilter};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Date layouts seen in inventory exports
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%Y-%m-%d %H:%M:%S"];

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Certificate Name", alias = "certificate_name", alias = "name")]
    name: String,
    #[serde(rename = "Issued To", alias = "issued_to", default)]
    issued_to: Option<String>,
    #[serde(rename = "Issued By", alias = "issued_by", default)]
    issued_by: Option<String>,
    #[serde(rename = "Issuing Date", alias = "issuing_date", default)]
    issuing_date: Option<String>,
    #[serde(rename = "Expire date", alias = "expire_date", alias = "expiry_date", default)]
    expire_date: Option<String>,
    #[serde(rename = "Type", alias = "cert_type", default)]
    cert_type: Option<String>,
    #[serde(rename = "Owner", alias = "owner", default)]
    owner: Option<String>,
    #[serde(rename = "Comment", alias = "comment", default)]
    comment: Option<String>,
    #[serde(rename = "Active", alias = "active", default)]
    active: Option<String>,
}

impl CsvRow {
    fn is_active(&self) -> bool {
        match self.active.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(flag) => matches!(
                flag.to_ascii_lowercase().as_str(),
                "yes" | "y" | "true" | "1"
            ),
        }
    }

    fn into_record(self) -> std::result::Result<CertificateRecord, String> {
        let raw_expiry = self
            .expire_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "missing expiry date".to_string())?;
        let expiry_date =
            parse_date(raw_expiry).ok_or_else(|| format!("unparseable expiry date '{}'", raw_expiry))?;

        let issuing_date = self.issuing_date.as_deref().and_then(parse_date);

        Ok(CertificateRecord {
            name: self.name.trim().to_string(),
            issued_to: self.issued_to.unwrap_or_default(),
            owner: self.owner.unwrap_or_default(),
            expiry_date,
            cert_type: self.cert_type.unwrap_or_default(),
            comment: non_blank(self.comment),
            issued_by: non_blank(self.issued_by),
            issuing_date,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse a date in any of the accepted export layouts
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(raw, fmt).ok().or_else(|| {
            chrono::NaiveDateTime::parse_from_str(raw, fmt)
                .ok()
                .map(|dt| dt.date())
        })
    })
}

/// Every decodable row of an export with its active flag, used for database import
pub fn read_inventory(path: impl AsRef<Path>) -> Result<Vec<(CertificateRecord, bool)>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_path(path)
        .map_err(|e| NotifyError::source_unavailable(format!("cannot open {}: {}", path.display(), e)))?;

    let mut rows = Vec::new();
    for row in reader.deserialize::<CsvRow>() {
        let row = match row {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                tracing::warn!("Skipping malformed row in {}: {}", path.display(), e);
                continue;
            }
        };

        let active = row.is_active();
        let name = row.name.clone();
        match row.into_record() {
            Ok(record) => rows.push((record, active)),
            Err(reason) => tracing::warn!("Skipping certificate '{}': {}", name, reason),
        }
    }

    Ok(rows)
}

/// Streams qualifying certificates out of a CSV export
pub struct CsvCertificateSource {
    path: PathBuf,
    rows: csv::DeserializeRecordsIntoIter<File, CsvRow>,
    batch_size: usize,
    filter: WindowFilter,
    rejected: usize,
}

impl CsvCertificateSource {
    /// Open the export; a missing or unreadable file is a source failure
    pub fn open(path: impl AsRef<Path>, batch_size: usize, filter: WindowFilter) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_path(&path)
            .map_err(|e| {
                NotifyError::source_unavailable(format!("cannot open {}: {}", path.display(), e))
            })?;

        Ok(Self {
            path,
            rows: reader.into_deserialize(),
            batch_size: batch_size.max(1),
            filter,
            rejected: 0,
        })
    }

    /// Rows dropped so far because they could not be decoded
    pub fn rejected_rows(&self) -> usize {
        self.rejected
    }
}

#[async_trait]
impl CertificateSource for CsvCertificateSource {
    async fn next_batch(&mut self) -> Result<Option<Vec<CertificateRecord>>> {
        let mut batch = Vec::with_capacity(self.batch_size);

        for row in self.rows.by_ref() {
            let row = match row {
                Ok(row) => row,
                Err(e) if e.is_io_error() => {
                    return Err(NotifyError::source_unavailable(format!(
                        "read error in {}: {}",
                        self.path.display(),
                        e
                    )));
                }
                Err(e) => {
                    self.rejected += 1;
                    tracing::warn!("Skipping malformed row in {}: {}", self.path.display(), e);
                    continue;
                }
            };

            if !row.is_active() {
                continue;
            }

            let name = row.name.clone();
            let record = match row.into_record() {
                Ok(record) => record,
                Err(reason) => {
                    self.rejected += 1;
                    tracing::warn!("Skipping certificate '{}': {}", name, reason);
                    continue;
                }
            };

            if !self.filter.admits(&record) {
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
        "csv"
    }
}
