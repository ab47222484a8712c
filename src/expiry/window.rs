// Notification window
//
// Decides which day-distances qualify for a notification at all. Sources apply
// it before records reach the classifier.

use crate::error::NotifyError;
use serde::{Deserialize, Serialize};

/// Days-before-expiry on which owners are notified, plus the expired flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryWindow {
    pub notify_days: Vec<i64>,
    #[serde(default = "default_include_expired")]
    pub include_expired: bool,
}

fn default_include_expired() -> bool {
    true
}

impl ExpiryWindow {
    pub fn new(notify_days: Vec<i64>, include_expired: bool) -> Self {
        Self {
            notify_days,
            include_expired,
        }
    }

    /// Whether a record `days` away from expiry qualifies
    pub fn admits(&self, days: i64) -> bool {
        (days < 0 && self.include_expired) || self.notify_days.contains(&days)
    }

    /// Furthest day-distance that can qualify, used to narrow source queries
    pub fn horizon_days(&self) -> i64 {
        self.notify_days.iter().copied().max().unwrap_or(0).max(0)
    }

    /// Reject windows that could never admit anything or contain past days
    pub fn validate(&self) -> crate::Result<()> {
        if let Some(day) = self.notify_days.iter().find(|d| **d < 0) {
            return Err(NotifyError::config(format!(
                "notify_days must not contain negative values (got {}), use include_expired instead",
                day
            )));
        }

        if self.notify_days.is_empty() && !self.include_expired {
            return Err(NotifyError::config(
                "notification window is empty: set notify_days or include_expired",
            ));
        }

        Ok(())
    }
}

impl Default for ExpiryWindow {
    fn default() -> Self {
        Self::new(vec![0, 7, 14, 30], true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window() {
        let window = ExpiryWindow::default();
        for days in [-100, -1, 0, 7, 14, 30] {
            assert!(window.admits(days), "{} should qualify", days);
        }
        for days in [1, 6, 8, 13, 15, 29, 31, 60] {
            assert!(!window.admits(days), "{} should not qualify", days);
        }
        assert_eq!(window.horizon_days(), 30);
    }

    #[test]
    fn test_window_without_expired() {
        let window = ExpiryWindow::new(vec![1, 60], false);
        assert!(!window.admits(-1));
        assert!(window.admits(60));
        assert_eq!(window.horizon_days(), 60);
    }

    #[test]
    fn test_validate() {
        assert!(ExpiryWindow::default().validate().is_ok());
        assert!(ExpiryWindow::new(vec![-3], true).validate().is_err());
        assert!(ExpiryWindow::new(vec![], false).validate().is_err());
        assert!(ExpiryWindow::new(vec![], true).validate().is_ok());
    }

    #[test]
    fn test_toml_defaults() {
        let window: ExpiryWindow = toml::from_str("notify_days = [0, 3]").unwrap();
        assert!(window.include_expired);
        assert_eq!(window.notify_days, vec![0, 3]);
    }
}
