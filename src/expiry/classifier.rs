// Expiry Classifier

use crate::expiry::category::UrgencyCategory;
use crate::model::{CertificateRecord, ClassifiedRecord};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Condition tested against a day-distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum DayPredicate {
    /// Strictly negative (already expired)
    Negative,
    /// Exactly this many days
    Exactly(i64),
    /// Inclusive range
    Between(i64, i64),
    /// Always matches
    Any,
}

impl DayPredicate {
    pub fn matches(&self, days: i64) -> bool {
        match *self {
            DayPredicate::Negative => days < 0,
            DayPredicate::Exactly(n) => days == n,
            DayPredicate::Between(lo, hi) => lo <= days && days <= hi,
            DayPredicate::Any => true,
        }
    }
}

/// One row of the category table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub predicate: DayPredicate,
    pub category: UrgencyCategory,
}

impl CategoryRule {
    pub const fn new(predicate: DayPredicate, category: UrgencyCategory) -> Self {
        Self {
            predicate,
            category,
        }
    }
}

/// Default category table. Order matters: the first matching rule wins.
pub const DEFAULT_RULES: [CategoryRule; 5] = [
    CategoryRule::new(DayPredicate::Negative, UrgencyCategory::Expired),
    CategoryRule::new(DayPredicate::Exactly(0), UrgencyCategory::Today),
    CategoryRule::new(DayPredicate::Exactly(7), UrgencyCategory::SevenDays),
    CategoryRule::new(DayPredicate::Exactly(14), UrgencyCategory::FourteenDays),
    CategoryRule::new(DayPredicate::Any, UrgencyCategory::ThirtyDays),
];

/// Whole calendar days from `now` to `expiry`; negative once the date has passed
pub fn day_distance(expiry: NaiveDate, now: DateTime<Utc>) -> i64 {
    (expiry - now.date_naive()).num_days()
}

/// Maps certificate records to urgency categories using an ordered rule table
#[derive(Debug, Clone)]
pub struct ExpiryClassifier {
    rules: Vec<CategoryRule>,
    fallback: UrgencyCategory,
}

impl ExpiryClassifier {
    /// Create a classifier with a custom rule table
    ///
    /// `fallback` is used when no rule matches, which keeps categorisation total
    /// for tables that do not end with a catch-all rule.
    pub fn new(rules: Vec<CategoryRule>, fallback: UrgencyCategory) -> Self {
        Self { rules, fallback }
    }

    /// Rule table in evaluation order
    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Category for a day-distance
    pub fn categorize(&self, days_until_expiry: i64) -> UrgencyCategory {
        self.rules
            .iter()
            .find(|rule| rule.predicate.matches(days_until_expiry))
            .map(|rule| rule.category)
            .unwrap_or(self.fallback)
    }

    /// Classify a single record at `now`
    pub fn classify(&self, record: CertificateRecord, now: DateTime<Utc>) -> ClassifiedRecord {
        let days_until_expiry = day_distance(record.expiry_date, now);
        let urgency = self.categorize(days_until_expiry);

        ClassifiedRecord {
            record,
            days_until_expiry,
            urgency,
        }
    }

    /// Classify a whole batch against the same evaluation time
    pub fn classify_batch(
        &self,
        records: Vec<CertificateRecord>,
        now: DateTime<Utc>,
    ) -> Vec<ClassifiedRecord> {
        records
            .into_iter()
            .map(|record| self.classify(record, now))
            .collect()
    }
}

impl Default for ExpiryClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.to_vec(), UrgencyCategory::ThirtyDays)
    }
}
