// NotifyCommand - Runs the expiry notification pipeline
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use super::Command;
use crate::config::{NotifierConfig, SourceConfig};
use crate::db::DatabasePool;
use crate::error::NotifyError;
use crate::expiry::{Clock, FixedClock, SystemClock};
use crate::grouping::GroupingEngine;
use crate::notifier::{ExpiryNotifier, RunSummary};
use crate::notify::{DryRunSender, EmailSender, NotificationFormatter, NotificationSender};
use crate::source::{CertificateSource, CsvCertificateSource, SqlCertificateSource, WindowFilter};
use crate::{Args, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// NotifyCommand handles the default mode: read the inventory, group
/// expiring certificates by recipient and send one message per group
pub struct NotifyCommand {
    args: Args,
}

impl NotifyCommand {
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    fn evaluation_time(&self) -> DateTime<Utc> {
        match self.args.notify.as_of {
            Some(date) => FixedClock::at_date(date).now(),
            None => SystemClock.now(),
        }
    }

    fn build_sender(&self, config: &NotifierConfig) -> Result<Arc<dyn NotificationSender>> {
        if self.args.notify.dry_run {
            let sender = match &self.args.notify.dry_run_dir {
                Some(dir) => DryRunSender::with_output_dir(dir),
                None => DryRunSender::new(),
            };
            return Ok(Arc::new(sender));
        }

        let email = config.email.clone().ok_or_else(|| {
            NotifyError::config("no [email] section in the configuration, use --dry-run to only render")
        })?;
        Ok(Arc::new(EmailSender::new(email)?))
    }

    async fn build_source(
        config: &NotifierConfig,
        filter: WindowFilter,
    ) -> Result<(Box<dyn CertificateSource>, Option<DatabasePool>)> {
        let batch_size = config.notifier.batch_size;

        match &config.source {
            SourceConfig::Database(db) => {
                let pool = DatabasePool::new(db)
                    .await
                    .map_err(NotifyError::source_unavailable)?;
                let source = SqlCertificateSource::new(pool.clone(), batch_size, filter);
                Ok((Box::new(source), Some(pool)))
            }
            SourceConfig::Csv { path } => {
                let source = CsvCertificateSource::open(path, batch_size, filter)?;
                Ok((Box::new(source), None))
            }
        }
    }

    /// Run the pipeline and return its summary
    pub async fn run(&self) -> Result<RunSummary> {
        let config = self.args.load_config()?;
        let now = self.evaluation_time();

        let sender = self.build_sender(&config)?;
        let formatter =
            NotificationFormatter::new(&config.notifier.subject_prefix, &config.notifier.signature)?;
        let notifier = ExpiryNotifier::new(formatter, sender)
            .with_grouping(GroupingEngine::new(config.identities.resolver()))
            .with_clock(Arc::new(FixedClock::new(now)));

        let filter = WindowFilter::new(config.notifier.window.clone(), now);
        let (mut source, pool) = Self::build_source(&config, filter).await?;

        let result = notifier.run(source.as_mut()).await;

        if let Some(pool) = pool {
            pool.close().await;
        }

        result
    }
}

#[async_trait]
impl Command for NotifyCommand {
    async fn execute(&self) -> Result<()> {
        let summary = self.run().await?;

        println!("{}", summary);

        if let Some(path) = &self.args.notify.summary_json {
            let json = serde_json::to_string_pretty(&summary)?;
            std::fs::write(path, json).map_err(|source| NotifyError::FileSystemError {
                path: path.display().to_string(),
                source,
            })?;
        }

        if self.args.notify.strict && !summary.is_clean() {
            crate::notify_bail!(
                "{} record(s) skipped and {} notification(s) failed",
                summary.skipped_count(),
                summary.failure_count()
            );
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "NotifyCommand"
    }
}
