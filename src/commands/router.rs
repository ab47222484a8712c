// CommandRouter - Routes CLI arguments to appropriate Command
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use super::{Command, ConfigExampleCommand, DatabaseCommand, NotifyCommand, SmtpTestCommand};
use crate::error::NotifyError;
use crate::{Args, Result};

/// CommandRouter determines which Command to execute based on CLI arguments
///
/// Priority order:
/// 1. Example configuration (--config-example)
/// 2. Database maintenance (--db-init, --import-csv)
/// 3. SMTP connectivity test (--test-smtp)
/// 4. Notification run (default)
pub struct CommandRouter;

impl CommandRouter {
    /// Route CLI arguments to the appropriate Command
    pub fn route(args: Args) -> Result<Box<dyn Command>> {
        Self::validate_routing(&args)?;

        if args.config_example.is_some() {
            return Ok(Box::new(ConfigExampleCommand::new(args)));
        }

        if args.database.requested() {
            return Ok(Box::new(DatabaseCommand::new(args)));
        }

        if args.notify.test_smtp {
            return Ok(Box::new(SmtpTestCommand::new(args)));
        }

        Ok(Box::new(NotifyCommand::new(args)))
    }

    /// Reject argument combinations that select more than one mode
    pub fn validate_routing(args: &Args) -> Result<()> {
        let mode_count = [
            args.config_example.is_some(),
            args.database.requested(),
            args.notify.test_smtp,
        ]
        .iter()
        .filter(|&&x| x)
        .count();

        if mode_count > 1 {
            return Err(NotifyError::config(
                "Cannot combine --config-example, database operations and --test-smtp",
            ));
        }

        if mode_count == 1 && args.notify.dry_run {
            return Err(NotifyError::config(
                "--dry-run only applies to a notification run",
            ));
        }

        args.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_route_notify_default() {
        let cmd = CommandRouter::route(Args::default()).expect("test assertion should succeed");
        assert_eq!(cmd.name(), "NotifyCommand");
    }

    #[test]
    fn test_route_config_example() {
        let args = Args {
            config_example: Some(PathBuf::from("certnotify.toml")),
            ..Default::default()
        };
        let cmd = CommandRouter::route(args).expect("test assertion should succeed");
        assert_eq!(cmd.name(), "ConfigExampleCommand");
    }

    #[test]
    fn test_route_database() {
        let mut args = Args::default();
        args.database.init = true;
        let cmd = CommandRouter::route(args).expect("test assertion should succeed");
        assert_eq!(cmd.name(), "DatabaseCommand");

        let mut args = Args::default();
        args.database.import_csv = Some(PathBuf::from("inventory.csv"));
        let cmd = CommandRouter::route(args).expect("test assertion should succeed");
        assert_eq!(cmd.name(), "DatabaseCommand");
    }

    #[test]
    fn test_route_smtp_test() {
        let mut args = Args::default();
        args.notify.test_smtp = true;
        let cmd = CommandRouter::route(args).expect("test assertion should succeed");
        assert_eq!(cmd.name(), "SmtpTestCommand");
    }

    #[test]
    fn test_validate_conflicting_modes() {
        let mut args = Args::default();
        args.database.init = true;
        args.notify.test_smtp = true;
        assert!(CommandRouter::validate_routing(&args).is_err());
    }

    #[test]
    fn test_validate_dry_run_outside_notify() {
        let mut args = Args::default();
        args.notify.test_smtp = true;
        args.notify.dry_run = true;
        assert!(CommandRouter::validate_routing(&args).is_err());
    }
}
