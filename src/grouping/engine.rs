// Recipient Grouping Engine

use crate::error::NotifyError;
use crate::expiry::UrgencyCategory;
use crate::grouping::identity::{IdentityResolver, Recipients, SubstringResolver, normalize_identity};
use crate::model::{CertificateRecord, ClassifiedRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Composite key of a notification group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    pub recipients: Recipients,
    pub urgency: UrgencyCategory,
}

impl GroupKey {
    pub fn new(recipients: Recipients, urgency: UrgencyCategory) -> Self {
        Self {
            recipients,
            urgency,
        }
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.recipients, self.urgency)
    }
}

/// Certificates that go out in one notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientGroup {
    pub key: GroupKey,
    pub records: Vec<ClassifiedRecord>,
}

impl RecipientGroup {
    pub fn recipients(&self) -> &Recipients {
        &self.key.recipients
    }

    pub fn urgency(&self) -> UrgencyCategory {
        self.key.urgency
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Certificate names in group order
    pub fn certificate_names(&self) -> Vec<String> {
        self.records.iter().map(|r| r.record.name.clone()).collect()
    }
}

/// A record that could not be grouped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub name: String,
    pub owner: String,
    pub issued_to: String,
    pub reason: String,
}

impl SkippedRecord {
    fn from_record(record: &CertificateRecord, reason: &str) -> Self {
        Self {
            name: record.name.clone(),
            owner: record.owner.clone(),
            issued_to: record.issued_to.clone(),
            reason: reason.to_string(),
        }
    }
}

impl From<SkippedRecord> for NotifyError {
    fn from(skipped: SkippedRecord) -> Self {
        NotifyError::InvalidRecord {
            name: skipped.name,
            owner: skipped.owner,
            issued_to: skipped.issued_to,
            reason: skipped.reason,
        }
    }
}

/// Result of grouping one batch
#[derive(Debug, Clone, Default)]
pub struct GroupingOutcome {
    /// Groups in order of first appearance
    pub groups: Vec<RecipientGroup>,
    pub skipped: Vec<SkippedRecord>,
}

impl GroupingOutcome {
    /// Number of records placed into groups
    pub fn grouped_records(&self) -> usize {
        self.groups.iter().map(RecipientGroup::len).sum()
    }

    /// Look a group up by key
    pub fn get(&self, key: &GroupKey) -> Option<&RecipientGroup> {
        self.groups.iter().find(|g| &g.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.skipped.is_empty()
    }
}

/// Builds recipient groups for one batch at a time
///
/// The engine holds no per-batch state: every call to [`GroupingEngine::group`]
/// starts from an empty mapping, and the full mapping is built before any
/// group is returned.
#[derive(Clone)]
pub struct GroupingEngine {
    resolver: Arc<dyn IdentityResolver>,
}

impl GroupingEngine {
    pub fn new(resolver: Arc<dyn IdentityResolver>) -> Self {
        Self { resolver }
    }

    pub fn resolver_name(&self) -> &str {
        self.resolver.resolver_name()
    }

    /// Recipients for a single record, or the reason it cannot be grouped
    pub fn recipients_for(&self, record: &CertificateRecord) -> Result<Recipients, SkippedRecord> {
        if normalize_identity(&record.owner).is_empty() {
            return Err(SkippedRecord::from_record(record, "owner is empty"));
        }

        let recipients = self.resolver.resolve(&record.owner, &record.issued_to);
        if recipients.is_empty() {
            return Err(SkippedRecord::from_record(
                record,
                "owner resolved to no recipients",
            ));
        }

        Ok(recipients)
    }

    /// Partition a batch into recipient groups
    pub fn group(&self, records: Vec<ClassifiedRecord>) -> GroupingOutcome {
        let mut outcome = GroupingOutcome::default();
        let mut index: HashMap<GroupKey, usize> = HashMap::new();

        for classified in records {
            let recipients = match self.recipients_for(&classified.record) {
                Ok(recipients) => recipients,
                Err(skipped) => {
                    tracing::warn!(
                        "Skipping certificate '{}' (owner: '{}', issued to: '{}'): {}",
                        skipped.name,
                        skipped.owner,
                        skipped.issued_to,
                        skipped.reason
                    );
                    outcome.skipped.push(skipped);
                    continue;
                }
            };

            let key = GroupKey::new(recipients, classified.urgency);
            match index.get(&key) {
                Some(&position) => outcome.groups[position].records.push(classified),
                None => {
                    index.insert(key.clone(), outcome.groups.len());
                    outcome.groups.push(RecipientGroup {
                        key,
                        records: vec![classified],
                    });
                }
            }
        }

        tracing::debug!(
            "Grouped {} record(s) into {} group(s), {} skipped",
            outcome.grouped_records(),
            outcome.groups.len(),
            outcome.skipped.len()
        );

        outcome
    }
}

impl Default for GroupingEngine {
    fn default() -> Self {
        Self::new(Arc::new(SubstringResolver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expiry::ExpiryClassifier;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn classified(name: &str, owner: &str, issued_to: &str, days: i64) -> ClassifiedRecord {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();
        let expiry = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap() + chrono::Duration::days(days);
        let record = CertificateRecord::new(name, owner, issued_to, expiry);
        ExpiryClassifier::default().classify(record, now)
    }

    fn key(recipients: &str, urgency: UrgencyCategory) -> GroupKey {
        GroupKey::new(Recipients::new(recipients), urgency)
    }

    #[test]
    fn test_end_to_end_scenario() {
        let engine = GroupingEngine::default();
        let outcome = engine.group(vec![
            classified("CertA", "ops", "ops", -5),
            classified("CertB", "ops", "OPS", -2),
            classified("CertC", "dave", "carol", 7),
        ]);

        assert_eq!(outcome.groups.len(), 2);
        assert!(outcome.skipped.is_empty());

        let expired = outcome.get(&key("ops", UrgencyCategory::Expired)).unwrap();
        assert_eq!(expired.certificate_names(), vec!["CertA", "CertB"]);

        let seven = outcome
            .get(&key("dave,carol", UrgencyCategory::SevenDays))
            .unwrap();
        assert_eq!(seven.certificate_names(), vec!["CertC"]);
    }

    #[test]
    fn test_category_separation() {
        let engine = GroupingEngine::default();
        let outcome = engine.group(vec![
            classified("Today", "ops", "ops", 0),
            classified("Later", "ops", "ops", 30),
        ]);

        assert_eq!(outcome.groups.len(), 2);
        assert!(outcome.groups.iter().all(|g| g.len() == 1));
        assert_eq!(outcome.groups[0].urgency(), UrgencyCategory::Today);
        assert_eq!(outcome.groups[1].urgency(), UrgencyCategory::ThirtyDays);
    }

    #[test]
    fn test_empty_owner_is_skipped() {
        let engine = GroupingEngine::default();
        let outcome = engine.group(vec![
            classified("Orphan", "   ", "bob", 7),
            classified("Owned", "alice", "bob", 7),
        ]);

        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].name, "Orphan");
        assert_eq!(outcome.skipped[0].issued_to, "bob");
        assert_eq!(outcome.grouped_records(), 1);
        assert!(
            outcome
                .groups
                .iter()
                .all(|g| !g.certificate_names().contains(&"Orphan".to_string()))
        );
    }

    #[test]
    fn test_empty_issued_to_groups_under_owner() {
        let engine = GroupingEngine::default();
        let outcome = engine.group(vec![classified("NoSubject", "Ops Team", "", 14)]);

        assert_eq!(outcome.groups.len(), 1);
        assert_eq!(outcome.groups[0].recipients().as_str(), "opsteam");
    }

    #[test]
    fn test_group_order_follows_input() {
        let engine = GroupingEngine::default();
        let outcome = engine.group(vec![
            classified("B1", "bob", "bob", 7),
            classified("A1", "alice", "alice", 7),
            classified("B2", "bob", "bob", 7),
        ]);

        assert_eq!(outcome.groups[0].recipients().as_str(), "bob");
        assert_eq!(outcome.groups[0].certificate_names(), vec!["B1", "B2"]);
        assert_eq!(outcome.groups[1].recipients().as_str(), "alice");
    }

    #[test]
    fn test_composite_key_avoids_string_collisions() {
        let engine = GroupingEngine::default();
        let outcome = engine.group(vec![
            classified("Tricky", "ops_Expired", "ops_Expired", 7),
            classified("Plain", "ops", "ops", -1),
        ]);

        assert_eq!(outcome.groups.len(), 2);
        assert!(
            outcome
                .get(&key("ops_expired", UrgencyCategory::SevenDays))
                .is_some()
        );
    }

    #[test]
    fn test_skipped_record_into_error() {
        let skipped = SkippedRecord {
            name: "CertX".to_string(),
            owner: String::new(),
            issued_to: "x".to_string(),
            reason: "owner is empty".to_string(),
        };
        let err: NotifyError = skipped.into();
        assert!(matches!(err, NotifyError::InvalidRecord { .. }));
    }

    #[test]
    fn test_empty_batch() {
        let outcome = GroupingEngine::default().group(Vec::new());
        assert!(outcome.is_empty());
        assert_eq!(outcome.grouped_records(), 0);
    }
}
