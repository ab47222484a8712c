// Notification Pipeline
//
// Drives one run: pull a batch from the source, classify it, group it, then
// render and send one notification per group. Batches are independent; a group
// never spans two batches.

pub mod summary;

pub use summary::{RunSummary, SendFailureReport};

use crate::Result;
use crate::expiry::{Clock, ExpiryClassifier, SystemClock};
use crate::grouping::{GroupingEngine, RecipientGroup};
use crate::notify::{NotificationFormatter, NotificationSender};
use crate::source::CertificateSource;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Classifies, groups and notifies
pub struct ExpiryNotifier {
    classifier: ExpiryClassifier,
    grouping: GroupingEngine,
    formatter: NotificationFormatter,
    sender: Arc<dyn NotificationSender>,
    clock: Arc<dyn Clock>,
}

impl ExpiryNotifier {
    /// Create a notifier with the default classifier, substring grouping and wall clock
    pub fn new(formatter: NotificationFormatter, sender: Arc<dyn NotificationSender>) -> Self {
        Self {
            classifier: ExpiryClassifier::default(),
            grouping: GroupingEngine::default(),
            formatter,
            sender,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_classifier(mut self, classifier: ExpiryClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_grouping(mut self, grouping: GroupingEngine) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn sender_name(&self) -> &str {
        self.sender.sender_name()
    }

    /// Process every batch the source yields
    ///
    /// The evaluation time is taken once so all batches see the same "today".
    /// A source failure aborts the run; skipped records and failed sends are
    /// collected in the returned summary.
    pub async fn run(&self, source: &mut dyn CertificateSource) -> Result<RunSummary> {
        let now = self.clock.now();
        let mut summary = RunSummary::default();

        tracing::info!(
            "Starting notification run over {} source (evaluation date {}, sender: {}, resolver: {})",
            source.source_name(),
            now.date_naive(),
            self.sender.sender_name(),
            self.grouping.resolver_name()
        );

        loop {
            let batch = match source.next_batch().await {
                Ok(Some(batch)) => batch,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(
                        "Aborting run after {} batch(es): {}",
                        summary.batches,
                        e
                    );
                    return Err(e);
                }
            };

            summary.batches += 1;
            summary.records_seen += batch.len();
            tracing::info!("Processing batch {} ({} certificate(s))", summary.batches, batch.len());

            self.process_batch(batch, now, &mut summary).await;
        }

        tracing::info!(
            "Run complete: {} notification(s) sent, {} skipped, {} failed",
            summary.notifications_sent,
            summary.skipped.len(),
            summary.failures.len()
        );

        Ok(summary)
    }

    async fn process_batch(
        &self,
        batch: Vec<crate::model::CertificateRecord>,
        now: DateTime<Utc>,
        summary: &mut RunSummary,
    ) {
        let classified = self.classifier.classify_batch(batch, now);
        for record in &classified {
            summary.record_category(record.urgency);
        }

        // grouping completes before anything is sent
        let outcome = self.grouping.group(classified);
        summary.groups_built += outcome.groups.len();
        summary.skipped.extend(outcome.skipped);

        for group in &outcome.groups {
            match self.deliver(group, now).await {
                Ok(()) => summary.notifications_sent += 1,
                Err(report) => {
                    tracing::error!(
                        "Notification to {} [{}] failed: {}",
                        report.recipients,
                        report.urgency,
                        report.reason
                    );
                    summary.failures.push(report);
                }
            }
        }
    }

    async fn deliver(
        &self,
        group: &RecipientGroup,
        now: DateTime<Utc>,
    ) -> std::result::Result<(), SendFailureReport> {
        tracing::debug!("Group {}: {}", group.key, group.certificate_names().join(", "));

        let notification = self
            .formatter
            .render(group, now)
            .map_err(|e| SendFailureReport::new(group, e))?;

        self.sender
            .send(&notification)
            .await
            .map_err(|e| SendFailureReport::new(group, e))
    }
}
