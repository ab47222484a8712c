// Urgency categories

use serde::{Deserialize, Serialize};

/// Urgency of a notification, derived from the day-distance to expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UrgencyCategory {
    Expired,
    Today,
    SevenDays,
    FourteenDays,
    ThirtyDays,
}

impl UrgencyCategory {
    /// All categories, most urgent first
    pub const ALL: [UrgencyCategory; 5] = [
        UrgencyCategory::Expired,
        UrgencyCategory::Today,
        UrgencyCategory::SevenDays,
        UrgencyCategory::FourteenDays,
        UrgencyCategory::ThirtyDays,
    ];

    /// Short machine tag, used in logs and template data
    pub fn tag(&self) -> &'static str {
        match self {
            UrgencyCategory::Expired => "expired",
            UrgencyCategory::Today => "today",
            UrgencyCategory::SevenDays => "7days",
            UrgencyCategory::FourteenDays => "14days",
            UrgencyCategory::ThirtyDays => "30days",
        }
    }

    /// Human readable headline for subjects and message bodies
    pub fn headline(&self) -> &'static str {
        match self {
            UrgencyCategory::Expired => "have expired",
            UrgencyCategory::Today => "expire today",
            UrgencyCategory::SevenDays => "expire in 7 days",
            UrgencyCategory::FourteenDays => "expire in 14 days",
            UrgencyCategory::ThirtyDays => "expire within 30 days",
        }
    }

    /// Whether recipients must act immediately
    pub fn is_critical(&self) -> bool {
        matches!(self, UrgencyCategory::Expired | UrgencyCategory::Today)
    }
}

impl std::fmt::Display for UrgencyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrgencyCategory::Expired => write!(f, "Expired"),
            UrgencyCategory::Today => write!(f, "Today"),
            UrgencyCategory::SevenDays => write!(f, "7 Days"),
            UrgencyCategory::FourteenDays => write!(f, "14 Days"),
            UrgencyCategory::ThirtyDays => write!(f, "30 Days"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(UrgencyCategory::Expired.to_string(), "Expired");
        assert_eq!(UrgencyCategory::SevenDays.to_string(), "7 Days");
        assert_eq!(UrgencyCategory::ThirtyDays.to_string(), "30 Days");
    }

    #[test]
    fn test_tags_are_unique() {
        let tags: std::collections::HashSet<_> =
            UrgencyCategory::ALL.iter().map(|c| c.tag()).collect();
        assert_eq!(tags.len(), UrgencyCategory::ALL.len());
    }

    #[test]
    fn test_ordering_most_urgent_first() {
        assert!(UrgencyCategory::Expired < UrgencyCategory::Today);
        assert!(UrgencyCategory::Today < UrgencyCategory::ThirtyDays);
        assert!(UrgencyCategory::Expired.is_critical());
        assert!(!UrgencyCategory::FourteenDays.is_critical());
    }
}
