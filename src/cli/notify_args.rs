// Notification run arguments
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;

/// Notification run options
///
/// Values given here override the matching settings of the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct NotifyArgs {
    /// Records fetched per batch (overrides notifier.batch_size)
    #[arg(long = "batch-size", value_name = "COUNT")]
    pub batch_size: Option<usize>,

    /// Render notifications and log them instead of sending email
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Write the HTML of every dry-run notification into this directory
    #[arg(long = "dry-run-dir", value_name = "DIR", requires = "dry_run")]
    pub dry_run_dir: Option<PathBuf>,

    /// Evaluate expiry as of this date instead of today (YYYY-MM-DD)
    #[arg(long = "as-of", value_name = "DATE")]
    pub as_of: Option<NaiveDate>,

    /// Check SMTP connectivity and exit
    #[arg(long = "test-smtp")]
    pub test_smtp: bool,

    /// Write the run summary as JSON
    #[arg(long = "summary-json", value_name = "FILE")]
    pub summary_json: Option<PathBuf>,

    /// Exit with an error if any record was skipped or any notification failed
    #[arg(long = "strict")]
    pub strict: bool,
}
