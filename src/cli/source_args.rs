// Certificate source arguments
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use clap::Args;
use std::path::PathBuf;

/// Inventory source selection
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Read the inventory from a CSV export instead of the configured source
    #[arg(long = "csv", value_name = "FILE", conflicts_with = "sqlite")]
    pub csv: Option<PathBuf>,

    /// Read the inventory from this SQLite database instead of the configured source
    #[arg(long = "sqlite", value_name = "FILE")]
    pub sqlite: Option<PathBuf>,
}

impl SourceArgs {
    /// Whether the command line overrides the configured source
    pub fn overrides_source(&self) -> bool {
        self.csv.is_some() || self.sqlite.is_some()
    }
}
