// DatabaseCommand - Inventory database maintenance (init, CSV import)
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use super::Command;
use crate::config::SourceConfig;
use crate::db::{DatabasePool, ensure_schema, insert_certificate};
use crate::error::NotifyError;
use crate::source::read_inventory;
use crate::{Args, Result};
use async_trait::async_trait;

/// DatabaseCommand handles database operations
///
/// This command is responsible for:
/// - Initializing the inventory schema (--db-init)
/// - Loading a CSV export into the inventory (--import-csv)
pub struct DatabaseCommand {
    args: Args,
}

impl DatabaseCommand {
    /// Create a new DatabaseCommand with the given arguments
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    /// Import a CSV export, returning the number of inserted rows
    async fn import(&self, pool: &DatabasePool) -> Result<usize> {
        let Some(path) = &self.args.database.import_csv else {
            return Ok(0);
        };

        let rows = read_inventory(path)?;
        for (record, active) in &rows {
            insert_certificate(pool, record, *active).await?;
        }

        tracing::info!("Imported {} certificate(s) from {}", rows.len(), path.display());
        Ok(rows.len())
    }
}

#[async_trait]
impl Command for DatabaseCommand {
    async fn execute(&self) -> Result<()> {
        let config = self.args.load_config()?;
        let SourceConfig::Database(db_config) = &config.source else {
            return Err(NotifyError::config(
                "database operations need a database source, set [source] kind = \"database\" or pass --sqlite",
            ));
        };

        let pool = DatabasePool::new(db_config).await?;

        // The schema is always ensured so an import into a fresh file works
        ensure_schema(&pool).await?;
        if self.args.database.init {
            println!("✓ Database initialized successfully");
        }

        let imported = self.import(&pool).await;
        pool.close().await;

        let imported = imported?;
        if self.args.database.import_csv.is_some() {
            println!("✓ Imported {} certificate(s)", imported);
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "DatabaseCommand"
    }
}
