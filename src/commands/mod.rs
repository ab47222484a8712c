// Commands module - Command Pattern implementation
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

mod command;
mod router;

// Individual command implementations
mod config_example;
mod database;
mod notify;
mod smtp_test;

pub use command::Command;
pub use router::CommandRouter;

// Re-export individual commands for testing purposes
pub use config_example::ConfigExampleCommand;
pub use database::DatabaseCommand;
pub use notify::NotifyCommand;
pub use smtp_test::SmtpTestCommand;
