// Notification delivery - formatter and sender implementations

pub mod dry_run;
pub mod email;
pub mod template;

pub use dry_run::DryRunSender;
pub use email::{EmailConfig, EmailSender};
pub use template::NotificationFormatter;

use crate::Result;
use crate::expiry::UrgencyCategory;
use crate::grouping::Recipients;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A rendered message for one recipient group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub recipients: Recipients,
    pub urgency: UrgencyCategory,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    /// Certificate names covered by this message, in group order
    pub certificates: Vec<String>,
}

impl Notification {
    /// Individual recipient addresses
    pub fn addresses(&self) -> Vec<&str> {
        self.recipients.addresses().collect()
    }
}

/// Notification sender trait - implement this for custom delivery channels
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Deliver one notification
    async fn send(&self, notification: &Notification) -> Result<()>;

    /// Sender name for logging
    fn sender_name(&self) -> &str;

    /// Test the sender connectivity (optional)
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }
}
