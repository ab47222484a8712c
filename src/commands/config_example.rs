// ConfigExampleCommand - Writes an example configuration file
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use super::Command;
use crate::config::NotifierConfig;
use crate::{Args, Result};
use async_trait::async_trait;
use std::path::PathBuf;

pub struct ConfigExampleCommand {
    path: PathBuf,
}

impl ConfigExampleCommand {
    pub fn new(args: Args) -> Self {
        Self {
            path: args
                .config_example
                .unwrap_or_else(|| PathBuf::from("certnotify.toml")),
        }
    }
}

#[async_trait]
impl Command for ConfigExampleCommand {
    async fn execute(&self) -> Result<()> {
        NotifierConfig::create_example().save_to_file(&self.path)?;
        println!("✓ Example configuration saved to: {}", self.path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ConfigExampleCommand"
    }
}
