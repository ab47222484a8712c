// Certificate inventory records
//
// Read-only snapshots produced by a certificate source. The engine classifies
// and groups them but never mutates them.

use crate::expiry::UrgencyCategory;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the certificate inventory table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub name: String,
    pub issued_to: String,
    pub owner: String,
    pub expiry_date: NaiveDate,
    pub cert_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuing_date: Option<NaiveDate>,
}

impl CertificateRecord {
    /// Create a record with the required fields
    pub fn new(
        name: impl Into<String>,
        owner: impl Into<String>,
        issued_to: impl Into<String>,
        expiry_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            issued_to: issued_to.into(),
            owner: owner.into(),
            expiry_date,
            cert_type: String::new(),
            comment: None,
            issued_by: None,
            issuing_date: None,
        }
    }

    /// Set certificate type
    pub fn with_type(mut self, cert_type: impl Into<String>) -> Self {
        self.cert_type = cert_type.into();
        self
    }

    /// Set associated comment (usually the request number)
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Set issuer information
    pub fn with_issuer(mut self, issued_by: impl Into<String>, issuing_date: Option<NaiveDate>) -> Self {
        self.issued_by = Some(issued_by.into());
        self.issuing_date = issuing_date;
        self
    }

    /// Comment or an empty string
    pub fn comment_or_empty(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }
}

/// A certificate record tagged with its day-distance and urgency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    pub record: CertificateRecord,
    pub days_until_expiry: i64,
    pub urgency: UrgencyCategory,
}

impl ClassifiedRecord {
    /// Certificate name
    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// Whether the certificate already expired
    pub fn is_expired(&self) -> bool {
        self.days_until_expiry < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let expiry = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let record = CertificateRecord::new("api.example.com", "ops", "ops-list", expiry)
            .with_type("TLS Server")
            .with_comment("REQ-1042");

        assert_eq!(record.name, "api.example.com");
        assert_eq!(record.owner, "ops");
        assert_eq!(record.issued_to, "ops-list");
        assert_eq!(record.cert_type, "TLS Server");
        assert_eq!(record.comment_or_empty(), "REQ-1042");
        assert!(record.issued_by.is_none());
    }

    #[test]
    fn test_record_serialization_skips_empty_optionals() {
        let expiry = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let record = CertificateRecord::new("a", "b", "c", expiry);

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"expiry_date\":\"2026-01-31\""));
        assert!(!json.contains("comment"));

        let back: CertificateRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
