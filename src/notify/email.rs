// Email Notification Sender - Using lettre

use crate::Result;
use crate::error::NotifyError;
use crate::notify::{Notification, NotificationSender};
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use serde::{Deserialize, Serialize};

fn default_smtp_port() -> u16 {
    587
}

fn default_use_tls() -> bool {
    true
}

fn default_password_env() -> Option<String> {
    Some("SMTP_PASSWORD".to_string())
}

/// SMTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub from_address: String,
    #[serde(default)]
    pub username: String,
    /// Inline password; prefer `password_env`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Environment variable holding the SMTP password
    #[serde(default = "default_password_env")]
    pub password_env: Option<String>,
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,
    /// Copied on every notification
    #[serde(default)]
    pub cc_addresses: Vec<String>,
    /// Appended to recipient identities that are not full addresses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_domain: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_server: "smtp.example.com".to_string(),
            smtp_port: default_smtp_port(),
            from_address: "certificates@example.com".to_string(),
            username: "certificates@example.com".to_string(),
            password: None,
            password_env: default_password_env(),
            use_tls: true,
            cc_addresses: Vec::new(),
            recipient_domain: Some("example.com".to_string()),
        }
    }
}

impl EmailConfig {
    /// Password from the config, falling back to the environment
    pub fn resolve_password(&self) -> Option<String> {
        self.password.clone().or_else(|| {
            self.password_env
                .as_deref()
                .and_then(|var| std::env::var(var).ok())
        })
    }

    /// Turn a recipient identity into a mailbox address
    pub fn qualify(&self, identity: &str) -> String {
        match &self.recipient_domain {
            Some(domain) if !identity.contains('@') => format!("{}@{}", identity, domain),
            _ => identity.to_string(),
        }
    }
}

/// Email notification sender
pub struct EmailSender {
    config: EmailConfig,
}

impl EmailSender {
    /// Create new email sender
    pub fn new(config: EmailConfig) -> Result<Self> {
        if config.smtp_server.trim().is_empty() {
            return Err(NotifyError::config("email.smtp_server must not be empty"));
        }
        // fail early on a bad sender address instead of once per group
        config.from_address.parse::<Mailbox>()?;

        Ok(Self { config })
    }

    /// Build the multipart message for a notification
    fn build_message(&self, notification: &Notification) -> Result<Message> {
        let mut message_builder = Message::builder()
            .from(self.config.from_address.parse()?)
            .subject(notification.subject.clone());

        let mut has_recipient = false;
        for identity in notification.addresses() {
            let address = self.config.qualify(identity);
            message_builder = message_builder.to(address.parse()?);
            has_recipient = true;
        }
        if !has_recipient {
            return Err(NotifyError::EmailError(format!(
                "no recipient addresses in '{}'",
                notification.recipients
            )));
        }

        for cc in &self.config.cc_addresses {
            message_builder = message_builder.cc(cc.parse()?);
        }

        let message = message_builder.multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(header::ContentType::TEXT_PLAIN)
                        .body(notification.text_body.clone()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(header::ContentType::TEXT_HTML)
                        .body(notification.html_body.clone()),
                ),
        )?;

        Ok(message)
    }

    /// Get SMTP transport
    fn get_transport(&self) -> Result<SmtpTransport> {
        let transport = if self.config.use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_server)?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_server)
        };

        let mut transport = transport.port(self.config.smtp_port);

        if !self.config.username.is_empty() {
            let password = self.config.resolve_password().unwrap_or_default();
            if password.is_empty() {
                tracing::warn!(
                    "No SMTP password configured for {}, authenticating with an empty password",
                    self.config.username
                );
            }
            transport = transport.credentials(Credentials::new(self.config.username.clone(), password));
        }

        Ok(transport.build())
    }
}

#[async_trait]
impl NotificationSender for EmailSender {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let message = self.build_message(notification)?;
        let transport = self.get_transport()?;

        // Send email (blocking operation, run in blocking task)
        tokio::task::spawn_blocking(move || {
            transport
                .send(&message)
                .map_err(|e| NotifyError::EmailError(format!("Failed to send email: {}", e)))
        })
        .await??;

        tracing::info!(
            "Sent {} notification to {} ({} certificate(s))",
            notification.urgency,
            notification.recipients,
            notification.certificates.len()
        );
        Ok(())
    }

    fn sender_name(&self) -> &str {
        "email"
    }

    async fn test_connection(&self) -> Result<()> {
        let transport = self.get_transport()?;

        let reachable = tokio::task::spawn_blocking(move || {
            transport
                .test_connection()
                .map_err(|e| NotifyError::EmailError(format!("SMTP connection test failed: {}", e)))
        })
        .await??;

        if !reachable {
            return Err(NotifyError::EmailError(format!(
                "SMTP server {}:{} did not accept the connection",
                self.config.smtp_server, self.config.smtp_port
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expiry::UrgencyCategory;
    use crate::grouping::Recipients;

    fn create_test_config() -> EmailConfig {
        EmailConfig {
            smtp_server: "smtp.example.com".to_string(),
            smtp_port: 587,
            from_address: "pki@example.com".to_string(),
            username: "pki".to_string(),
            password: Some("pass".to_string()),
            password_env: None,
            use_tls: true,
            cc_addresses: vec!["audit@example.com".to_string()],
            recipient_domain: Some("corp.example".to_string()),
        }
    }

    fn notification(recipients: &str) -> Notification {
        Notification {
            recipients: Recipients::new(recipients),
            urgency: UrgencyCategory::SevenDays,
            subject: "Certificates expiring".to_string(),
            html_body: "<p>body</p>".to_string(),
            text_body: "body".to_string(),
            certificates: vec!["CertC".to_string()],
        }
    }

    #[test]
    fn test_email_sender_new() {
        assert!(EmailSender::new(create_test_config()).is_ok());

        let mut bad = create_test_config();
        bad.from_address = "not an address".to_string();
        assert!(EmailSender::new(bad).is_err());
    }

    #[test]
    fn test_qualify_identities() {
        let config = create_test_config();
        assert_eq!(config.qualify("dave"), "dave@corp.example");
        assert_eq!(config.qualify("carol@other.example"), "carol@other.example");

        let bare = EmailConfig {
            recipient_domain: None,
            ..create_test_config()
        };
        assert_eq!(bare.qualify("dave"), "dave");
    }

    #[test]
    fn test_build_message_addresses_every_recipient() {
        let sender = EmailSender::new(create_test_config()).unwrap();
        let message = sender.build_message(&notification("dave,carol")).unwrap();

        let headers = message.headers().to_string();
        assert!(headers.contains("dave@corp.example"));
        assert!(headers.contains("carol@corp.example"));
        assert!(headers.contains("audit@example.com"));
        assert!(headers.contains("Certificates expiring"));
    }

    #[test]
    fn test_build_message_rejects_unqualified_identity() {
        let config = EmailConfig {
            recipient_domain: None,
            ..create_test_config()
        };
        let sender = EmailSender::new(config).unwrap();
        assert!(sender.build_message(&notification("dave")).is_err());
    }

    #[test]
    fn test_password_resolution_prefers_inline_value() {
        let config = create_test_config();
        assert_eq!(config.resolve_password().as_deref(), Some("pass"));

        let from_env = EmailConfig {
            password: None,
            password_env: Some("CERTNOTIFY_TEST_UNSET_PASSWORD_VAR".to_string()),
            ..create_test_config()
        };
        assert!(from_env.resolve_password().is_none());
    }

    #[test]
    fn test_sender_name() {
        let sender = EmailSender::new(create_test_config()).unwrap();
        assert_eq!(sender.sender_name(), "email");
    }
}
