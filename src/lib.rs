// certnotify - Certificate expiry classification and owner notification
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

//! certnotify reads a certificate inventory, classifies every certificate by
//! how close it is to expiry, groups certificates by the people responsible
//! for them and sends one notification per recipient group and urgency.

pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod expiry;
pub mod grouping;
pub mod model;
pub mod notifier;
pub mod notify;
pub mod source;

// Re-export commonly used types
pub use crate::cli::Args;
pub use crate::error::NotifyError;
pub use crate::expiry::{ExpiryClassifier, ExpiryWindow, UrgencyCategory};
pub use crate::grouping::{GroupKey, GroupingEngine, RecipientGroup};
pub use crate::model::{CertificateRecord, ClassifiedRecord};
pub use crate::notifier::{ExpiryNotifier, RunSummary};

/// Result type for certnotify operations
pub type Result<T> = std::result::Result<T, NotifyError>;
