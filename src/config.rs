// Notifier configuration
//
// TOML file with four sections:
// - [notifier]   batch size, notification window, subject and signature
// - [source]     where the inventory comes from (database or csv)
// - [email]      SMTP delivery, optional when running dry
// - [identities] alias directory mapping free-text identities to recipients

use crate::Result;
use crate::db::DatabaseConfig;
use crate::error::NotifyError;
use crate::expiry::ExpiryWindow;
use crate::grouping::{AliasDirectoryResolver, IdentityResolver, SubstringResolver};
use crate::notify::EmailConfig;
use crate::notify::template::{DEFAULT_SIGNATURE, DEFAULT_SUBJECT_PREFIX};
use crate::source::DEFAULT_BATCH_SIZE;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Complete configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifierConfig {
    #[serde(default)]
    pub notifier: NotifierSettings,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailConfig>,
    #[serde(default)]
    pub identities: IdentitiesConfig,
}

/// Core notifier settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierSettings {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
    #[serde(default = "default_signature")]
    pub signature: String,
    #[serde(default)]
    pub window: ExpiryWindow,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_subject_prefix() -> String {
    DEFAULT_SUBJECT_PREFIX.to_string()
}

fn default_signature() -> String {
    DEFAULT_SIGNATURE.to_string()
}

impl Default for NotifierSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            subject_prefix: default_subject_prefix(),
            signature: default_signature(),
            window: ExpiryWindow::default(),
        }
    }
}

/// Inventory location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    Database(DatabaseConfig),
    Csv { path: PathBuf },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Database(DatabaseConfig::default())
    }
}

/// Alias directory for recipient resolution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentitiesConfig {
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

impl IdentitiesConfig {
    /// Resolver for these settings; plain substring matching without aliases
    pub fn resolver(&self) -> Arc<dyn IdentityResolver> {
        if self.aliases.is_empty() {
            Arc::new(SubstringResolver)
        } else {
            Arc::new(AliasDirectoryResolver::from_map(&self.aliases))
        }
    }
}

impl NotifierConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| NotifyError::FileSystemError {
            path: path.display().to_string(),
            source,
        })?;

        let config: NotifierConfig = toml::from_str(&contents)?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_str = toml::to_string_pretty(self)?;

        let path = path.as_ref();
        fs::write(path, toml_str).map_err(|source| NotifyError::FileSystemError {
            path: path.display().to_string(),
            source,
        })?;

        Ok(())
    }

    /// Example configuration with every section filled in
    pub fn create_example() -> Self {
        let mut aliases = HashMap::new();
        aliases.insert("Jane Doe".to_string(), "jane.doe".to_string());
        aliases.insert("PKI Team".to_string(), "pki-team".to_string());

        Self {
            notifier: NotifierSettings::default(),
            source: SourceConfig::Database(DatabaseConfig::sqlite(PathBuf::from("clm.db"))),
            email: Some(EmailConfig::default()),
            identities: IdentitiesConfig { aliases },
        }
    }

    /// Check values the TOML schema cannot express
    pub fn validate(&self) -> Result<()> {
        if self.notifier.batch_size == 0 {
            return Err(NotifyError::config("notifier.batch_size must be positive"));
        }

        self.notifier.window.validate()?;

        if let SourceConfig::Database(db) = &self.source {
            db.connection_string()?;
        }

        if let Some(email) = &self.email
            && email.smtp_server.trim().is_empty()
        {
            return Err(NotifyError::config("email.smtp_server must not be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = NotifierConfig::default();
        assert_eq!(config.notifier.batch_size, 500);
        assert_eq!(config.notifier.window, ExpiryWindow::default());
        assert_eq!(config.notifier.subject_prefix, DEFAULT_SUBJECT_PREFIX);
        assert!(config.email.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_csv_source() {
        let config: NotifierConfig = toml::from_str(
            r#"
            [notifier]
            batch_size = 100

            [notifier.window]
            notify_days = [0, 7, 14, 30, 60]

            [source]
            kind = "csv"
            path = "inventory.csv"

            [identities.aliases]
            "Jane Doe" = "jane.doe"
            "#,
        )
        .unwrap();

        assert_eq!(config.notifier.batch_size, 100);
        assert!(config.notifier.window.include_expired);
        assert!(config.notifier.window.admits(60));
        assert_eq!(
            config.source,
            SourceConfig::Csv {
                path: PathBuf::from("inventory.csv")
            }
        );
        assert_eq!(config.identities.resolver().resolver_name(), "alias-directory");
    }

    #[test]
    fn test_parse_database_source() {
        let config: NotifierConfig = toml::from_str(
            r#"
            [source]
            kind = "database"
            type = "sqlite"
            path = "/var/lib/clm.db"
            "#,
        )
        .unwrap();

        match config.source {
            SourceConfig::Database(db) => {
                assert_eq!(db.path, Some(PathBuf::from("/var/lib/clm.db")));
            }
            other => panic!("unexpected source {:?}", other),
        }
        assert_eq!(config.identities.resolver().resolver_name(), "substring");
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let mut config = NotifierConfig::default();
        config.notifier.batch_size = 0;
        assert!(matches!(
            config.validate(),
            Err(NotifyError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_example_round_trips_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("certnotify.toml");

        let example = NotifierConfig::create_example();
        example.save_to_file(&path).unwrap();

        let loaded = NotifierConfig::from_file(&path).unwrap();
        assert_eq!(loaded.source, example.source);
        assert_eq!(loaded.identities.aliases.len(), 2);
        assert_eq!(
            loaded.email.unwrap().password_env.as_deref(),
            Some("SMTP_PASSWORD")
        );
    }

    #[test]
    fn test_missing_file() {
        let result = NotifierConfig::from_file("/nonexistent/certnotify.toml");
        assert!(matches!(result, Err(NotifyError::FileSystemError { .. })));
    }
}
