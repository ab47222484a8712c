// CLI module - Command line interface and argument parsing
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use crate::config::{NotifierConfig, SourceConfig};
use crate::db::DatabaseConfig;
use clap::Parser;
use std::path::PathBuf;

// Sub-modules for organized CLI arguments
mod database_args;
mod notify_args;
mod source_args;

// Re-export sub-structs
pub use database_args::DatabaseArgs;
pub use notify_args::NotifyArgs;
pub use source_args::SourceArgs;

/// certnotify - Certificate expiry notifications
///
/// The Args struct composes domain-specific sub-structs with
/// #[command(flatten)]:
/// - Notification run options (NotifyArgs)
/// - Inventory source selection (SourceArgs)
/// - Database maintenance (DatabaseArgs)
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, long_about = None)]
#[command(name = "certnotify")]
#[command(about = "Notify certificate owners about expiring certificates", long_about = None)]
pub struct Args {
    /// Configuration file (TOML format)
    #[arg(short = 'c', long = "config", value_name = "FILE", env = "CERTNOTIFY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write an example configuration file and exit
    #[arg(long = "config-example", value_name = "FILE")]
    pub config_example: Option<PathBuf>,

    // ============ Notification Run ============
    #[command(flatten)]
    pub notify: NotifyArgs,

    // ============ Inventory Source ============
    #[command(flatten)]
    pub source: SourceArgs,

    // ============ Database Maintenance ============
    #[command(flatten)]
    pub database: DatabaseArgs,
}

impl Args {
    /// Validate CLI arguments for logical consistency
    pub fn validate(&self) -> crate::Result<()> {
        if self.notify.batch_size == Some(0) {
            return Err(crate::error::NotifyError::config(
                "--batch-size must be positive",
            ));
        }

        if self.database.requested() && self.source.csv.is_some() {
            return Err(crate::error::NotifyError::config(
                "--csv cannot be used with database operations, use --import-csv to load a CSV export",
            ));
        }

        Ok(())
    }

    /// Load the configuration file (or defaults) and apply command-line overrides
    pub fn load_config(&self) -> crate::Result<NotifierConfig> {
        let mut config = match &self.config {
            Some(path) => NotifierConfig::from_file(path)?,
            None => NotifierConfig::default(),
        };

        if let Some(batch_size) = self.notify.batch_size {
            config.notifier.batch_size = batch_size;
        }

        if let Some(path) = &self.source.csv {
            config.source = SourceConfig::Csv { path: path.clone() };
        } else if let Some(path) = &self.source.sqlite {
            config.source = SourceConfig::Database(DatabaseConfig::sqlite(path.clone()));
        }

        config.validate()?;
        Ok(config)
    }
}
