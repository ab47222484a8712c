// Dry-run sender: logs notifications instead of delivering them

use crate::Result;
use crate::error::NotifyError;
use crate::notify::{Notification, NotificationSender};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Logs every notification and optionally writes the HTML body to disk
#[derive(Debug, Default)]
pub struct DryRunSender {
    output_dir: Option<PathBuf>,
    sent: AtomicUsize,
}

impl DryRunSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also write each rendered HTML body into `dir`
    pub fn with_output_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: Some(dir.into()),
            sent: AtomicUsize::new(0),
        }
    }

    /// Notifications handled so far
    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::Relaxed)
    }

    fn file_name(index: usize, notification: &Notification) -> String {
        let recipients: String = notification
            .recipients
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
            .collect();
        format!("{:04}_{}_{}.html", index, notification.urgency.tag(), recipients)
    }
}

#[async_trait]
impl NotificationSender for DryRunSender {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let index = self.sent.fetch_add(1, Ordering::Relaxed) + 1;

        tracing::info!(
            "[dry-run] {} -> {}: {}",
            notification.urgency,
            notification.recipients,
            notification.certificates.join(", ")
        );
        tracing::debug!("[dry-run] subject: {}", notification.subject);

        if let Some(dir) = &self.output_dir {
            let path = dir.join(Self::file_name(index, notification));
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| NotifyError::FileSystemError {
                    path: dir.display().to_string(),
                    source,
                })?;
            tokio::fs::write(&path, &notification.html_body)
                .await
                .map_err(|source| NotifyError::FileSystemError {
                    path: path.display().to_string(),
                    source,
                })?;
        }

        Ok(())
    }

    fn sender_name(&self) -> &str {
        "dry-run"
    }
}
