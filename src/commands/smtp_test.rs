// SmtpTestCommand - Checks SMTP connectivity without sending anything
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use super::Command;
use crate::error::NotifyError;
use crate::notify::{EmailSender, NotificationSender};
use crate::{Args, Result};
use async_trait::async_trait;

pub struct SmtpTestCommand {
    args: Args,
}

impl SmtpTestCommand {
    pub fn new(args: Args) -> Self {
        Self { args }
    }
}

#[async_trait]
impl Command for SmtpTestCommand {
    async fn execute(&self) -> Result<()> {
        let config = self.args.load_config()?;
        let email = config
            .email
            .ok_or_else(|| NotifyError::config("no [email] section in the configuration"))?;

        let server = format!("{}:{}", email.smtp_server, email.smtp_port);
        let sender = EmailSender::new(email)?;

        tracing::info!("Testing SMTP connection to {}", server);
        sender.test_connection().await?;
        println!("✓ SMTP server {} accepted the connection", server);

        Ok(())
    }

    fn name(&self) -> &'static str {
        "SmtpTestCommand"
    }
}
