// Run summary

use crate::error::NotifyError;
use crate::expiry::UrgencyCategory;
use crate::grouping::{RecipientGroup, SkippedRecord};
use colored::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A group whose notification could not be delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendFailureReport {
    pub recipients: String,
    pub urgency: UrgencyCategory,
    pub certificates: Vec<String>,
    pub reason: String,
}

impl SendFailureReport {
    pub fn new(group: &RecipientGroup, reason: impl std::fmt::Display) -> Self {
        Self {
            recipients: group.recipients().to_string(),
            urgency: group.urgency(),
            certificates: group.certificate_names(),
            reason: reason.to_string(),
        }
    }
}

impl From<SendFailureReport> for NotifyError {
    fn from(report: SendFailureReport) -> Self {
        NotifyError::SendFailure {
            recipients: report.recipients,
            urgency: report.urgency,
            certificates: report.certificates,
            reason: report.reason,
        }
    }
}

/// Outcome of one notification run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub batches: usize,
    pub records_seen: usize,
    pub groups_built: usize,
    pub notifications_sent: usize,
    /// Classified records per urgency category
    pub per_category: BTreeMap<UrgencyCategory, usize>,
    pub skipped: Vec<SkippedRecord>,
    pub failures: Vec<SendFailureReport>,
}

impl RunSummary {
    /// No skipped records and no failed sends
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.failures.is_empty()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Records classified into `category`
    pub fn count_for(&self, category: UrgencyCategory) -> usize {
        self.per_category.get(&category).copied().unwrap_or(0)
    }

    /// Every collected problem as an error value
    pub fn errors(&self) -> Vec<NotifyError> {
        self.skipped
            .iter()
            .cloned()
            .map(NotifyError::from)
            .chain(self.failures.iter().cloned().map(NotifyError::from))
            .collect()
    }

    pub(crate) fn record_category(&mut self, category: UrgencyCategory) {
        *self.per_category.entry(category).or_insert(0) += 1;
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", "Certificate Expiry Notification Summary".cyan().bold())?;
        writeln!(f, "  Batches processed:   {}", self.batches)?;
        writeln!(f, "  Certificates seen:   {}", self.records_seen)?;
        for category in UrgencyCategory::ALL {
            let count = self.count_for(category);
            if count > 0 {
                let label = format!("{:<8}", category.to_string());
                let label = if category.is_critical() {
                    label.red().bold()
                } else {
                    label.yellow()
                };
                writeln!(f, "    {} {}", label, count)?;
            }
        }
        writeln!(f, "  Groups built:        {}", self.groups_built)?;
        writeln!(
            f,
            "  Notifications sent:  {}",
            self.notifications_sent.to_string().green()
        )?;

        if !self.skipped.is_empty() {
            writeln!(f, "  {} {}", "Skipped records:".yellow(), self.skipped.len())?;
            for skipped in &self.skipped {
                writeln!(f, "    - {} ({})", skipped.name, skipped.reason)?;
            }
        }

        if !self.failures.is_empty() {
            writeln!(f, "  {} {}", "Failed notifications:".red().bold(), self.failures.len())?;
            for failure in &self.failures {
                writeln!(
                    f,
                    "    - {} [{}]: {}",
                    failure.recipients, failure.urgency, failure.reason
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_summary() {
        let mut summary = RunSummary::default();
        summary.record_category(UrgencyCategory::Today);
        summary.record_category(UrgencyCategory::Today);

        assert!(summary.is_clean());
        assert_eq!(summary.count_for(UrgencyCategory::Today), 2);
        assert_eq!(summary.count_for(UrgencyCategory::Expired), 0);
        assert!(summary.errors().is_empty());
    }

    #[test]
    fn test_errors_cover_skips_and_failures() {
        let summary = RunSummary {
            skipped: vec![SkippedRecord {
                name: "Orphan".to_string(),
                owner: String::new(),
                issued_to: "bob".to_string(),
                reason: "owner is empty".to_string(),
            }],
            failures: vec![SendFailureReport {
                recipients: "ops".to_string(),
                urgency: UrgencyCategory::Expired,
                certificates: vec!["CertA".to_string()],
                reason: "relay refused".to_string(),
            }],
            ..Default::default()
        };

        assert!(!summary.is_clean());
        let errors = summary.errors();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], NotifyError::InvalidRecord { .. }));
        assert!(matches!(errors[1], NotifyError::SendFailure { .. }));
        assert!(errors.iter().all(|e| !e.is_fatal()));
    }

    #[test]
    fn test_display_lists_failures() {
        colored::control::set_override(false);
        let summary = RunSummary {
            batches: 1,
            records_seen: 3,
            failures: vec![SendFailureReport {
                recipients: "dave,carol".to_string(),
                urgency: UrgencyCategory::SevenDays,
                certificates: vec!["CertC".to_string()],
                reason: "timeout".to_string(),
            }],
            ..Default::default()
        };

        let text = summary.to_string();
        assert!(text.contains("Certificates seen:   3"));
        assert!(text.contains("dave,carol [7 Days]: timeout"));
    }

    #[test]
    fn test_summary_json() {
        let mut summary = RunSummary::default();
        summary.record_category(UrgencyCategory::SevenDays);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"per_category\""));
    }
}
