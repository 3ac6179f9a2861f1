//! Static admin configuration, read once at startup.
//!
//! Sources, in order of use:
//! 1. A JSON file (`passwordHash`, `passwordSalt`, `password`, `hideAdminEntry`).
//! 2. Environment variables (`PHONEBOOK_ADMIN_*`), which override file values when set.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_ADMIN_PASSWORD;
use crate::{PhonebookError, Result};

pub const ENV_PASSWORD_HASH: &str = "PHONEBOOK_ADMIN_PASSWORD_HASH";
pub const ENV_PASSWORD_SALT: &str = "PHONEBOOK_ADMIN_PASSWORD_SALT";
pub const ENV_PASSWORD: &str = "PHONEBOOK_ADMIN_PASSWORD";
pub const ENV_HIDE_ADMIN_ENTRY: &str = "PHONEBOOK_HIDE_ADMIN_ENTRY";

fn default_password() -> String {
    DEFAULT_ADMIN_PASSWORD.to_string()
}

/// Deployment-supplied admin settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminConfig {
    /// Salted digest, optionally prefixed with `sha256:`.
    #[serde(default)]
    pub password_hash: String,
    #[serde(default)]
    pub password_salt: String,
    /// Legacy plaintext password.
    #[serde(default = "default_password")]
    pub password: String,
    /// Hide the admin entry point in the UI.
    #[serde(default)]
    pub hide_admin_entry: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            password_hash: String::new(),
            password_salt: String::new(),
            password: default_password(),
            hide_admin_entry: false,
        }
    }
}

impl AdminConfig {
    /// Digest-mode configuration.
    #[must_use]
    pub fn with_digest(salt: impl Into<String>, digest_hex: impl Into<String>) -> Self {
        Self {
            password_hash: digest_hex.into(),
            password_salt: salt.into(),
            password: String::new(),
            hide_admin_entry: false,
        }
    }

    /// Plaintext-mode configuration.
    #[must_use]
    pub fn with_password(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs_err::read_to_string(path.as_ref()).map_err(|err| {
            PhonebookError::InvalidConfig {
                reason: err.to_string(),
            }
        })?;
        Self::from_json_str(&text)
    }

    /// Defaults overlaid with environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Overrides fields with any `PHONEBOOK_ADMIN_*` variables that are set.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup(ENV_PASSWORD_HASH) {
            self.password_hash = value;
        }
        if let Some(value) = lookup(ENV_PASSWORD_SALT) {
            self.password_salt = value;
        }
        if let Some(value) = lookup(ENV_PASSWORD) {
            self.password = value;
        }
        if let Some(value) = lookup(ENV_HIDE_ADMIN_ENTRY) {
            self.hide_admin_entry = parse_bool(&value).ok_or_else(|| {
                PhonebookError::InvalidConfig {
                    reason: format!("{ENV_HIDE_ADMIN_ENTRY}: expected a boolean, got '{value}'"),
                }
            })?;
        }
        tracing::debug!(
            config.has_hash = !self.password_hash.trim().is_empty(),
            config.hide_admin_entry = self.hide_admin_entry,
            "admin config resolved"
        );
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn json_fields_are_optional() {
        let config = AdminConfig::from_json_str(r#"{"passwordSalt":"s1"}"#).unwrap();
        assert_eq!(config.password_salt, "s1");
        assert_eq!(config.password, DEFAULT_ADMIN_PASSWORD);
        assert!(config.password_hash.is_empty());
        assert!(!config.hide_admin_entry);
    }

    #[test]
    fn env_vars_override_fields() {
        let vars = HashMap::from([
            (ENV_PASSWORD_HASH, "sha256:ABC"),
            (ENV_HIDE_ADMIN_ENTRY, "yes"),
        ]);
        let mut config = AdminConfig::default();
        config
            .apply_vars(|name| vars.get(name).map(|v| (*v).to_string()))
            .unwrap();
        assert_eq!(config.password_hash, "sha256:ABC");
        assert!(config.hide_admin_entry);
        assert_eq!(config.password, DEFAULT_ADMIN_PASSWORD);
    }

    #[test]
    fn invalid_bool_is_rejected() {
        let mut config = AdminConfig::default();
        let err = config
            .apply_vars(|name| (name == ENV_HIDE_ADMIN_ENTRY).then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("expected a boolean"));
    }
}
