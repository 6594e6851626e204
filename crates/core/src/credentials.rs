//! On-disk credential store for the Dialog Analytics API.
//!
//! The store is a single JSON file holding `{accessToken, botId}`. It is
//! created with empty values on first load. A token supplied through the
//! environment always wins over the stored one.

use crate::config::CredentialsConfig;
use crate::error::{DialogError, DialogResult};
use crate::types::Credentials;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct CredentialStore {
    path: PathBuf,
    token_override: Option<String>,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            token_override: None,
        }
    }

    /// Build a store from configuration, reading the override token from the
    /// configured environment variable.
    pub fn from_config(config: &CredentialsConfig) -> Self {
        let token = std::env::var(&config.token_env).ok();
        Self::new(&config.path).with_token_override(token)
    }

    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        self.token_override = token.filter(|t| !t.is_empty());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> DialogResult<Credentials> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "Credentials file missing, creating defaults");
            self.save(&Credentials::default())?;
        }

        let contents = fs::read_to_string(&self.path)?;
        let mut credentials: Credentials = serde_json::from_str(&contents).map_err(|e| {
            DialogError::Credentials(format!("{}: {}", self.path.display(), e))
        })?;

        if let Some(token) = &self.token_override {
            debug!("Access token taken from environment");
            credentials.access_token = token.clone();
        }

        Ok(credentials)
    }

    pub fn save(&self, credentials: &Credentials) -> DialogResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_vec(credentials)?)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_load_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modules").join("botpress-dialog.json");
        let store = CredentialStore::new(&path);

        let creds = store.load().unwrap();
        assert_eq!(creds, Credentials::default());
        assert!(path.exists());

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({ "accessToken": "", "botId": "" }));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("creds.json"));

        store.save(&Credentials::new("tok-1", "bot-1")).unwrap();
        assert_eq!(store.load().unwrap(), Credentials::new("tok-1", "bot-1"));
    }

    #[test]
    fn test_env_token_overrides_stored_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("creds.json"))
            .with_token_override(Some("env-token".into()));

        store.save(&Credentials::new("file-token", "bot-1")).unwrap();
        let creds = store.load().unwrap();
        assert_eq!(creds.access_token, "env-token");
        assert_eq!(creds.bot_id, "bot-1");
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("creds.json"))
            .with_token_override(Some(String::new()));

        store.save(&Credentials::new("file-token", "bot-1")).unwrap();
        assert_eq!(store.load().unwrap().access_token, "file-token");
    }

    #[test]
    fn test_corrupt_file_reports_credentials_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        fs::write(&path, "not json").unwrap();

        let err = CredentialStore::new(&path).load().unwrap_err();
        assert!(matches!(err, DialogError::Credentials(_)));
    }
}
