// Database maintenance arguments
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use clap::Args;
use std::path::PathBuf;

/// Inventory database maintenance
///
/// These operations run against the database source of the configuration
/// (or `--sqlite`) and exit without sending notifications.
#[derive(Args, Debug, Clone, Default)]
pub struct DatabaseArgs {
    /// Initialize database (create the certificates table and index)
    #[arg(long = "db-init")]
    pub init: bool,

    /// Load a CSV inventory export into the database
    #[arg(long = "import-csv", value_name = "FILE")]
    pub import_csv: Option<PathBuf>,
}

impl DatabaseArgs {
    pub fn requested(&self) -> bool {
        self.init || self.import_csv.is_some()
    }
}
