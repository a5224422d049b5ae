use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::ConfigStore;

/// Stored API token for one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub token: String,
}

fn creds_path(store: &ConfigStore, profile: &str) -> Result<PathBuf> {
    store.file(&format!("credentials.{profile}.json"))
}

pub fn load_credentials(store: &ConfigStore, profile: &str) -> Result<Option<StoredCredentials>> {
    let path = creds_path(store, profile)?;
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let creds: StoredCredentials = serde_json::from_str(&content)
        .with_context(|| format!("Invalid credentials file {}", path.display()))?;
    Ok(Some(creds))
}

pub fn save_credentials(
    store: &ConfigStore,
    profile: &str,
    creds: &StoredCredentials,
) -> Result<()> {
    let path = creds_path(store, profile)?;
    let content = serde_json::to_string_pretty(creds)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn remove_credentials(store: &ConfigStore, profile: &str) -> Result<bool> {
    let path = creds_path(store, profile)?;
    if path.exists() {
        fs::remove_file(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Shows the first 12 characters of a token and masks the rest.
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(12).collect();
    let hidden = token.chars().count().saturating_sub(12);
    format!("{visible}{}", "*".repeat(hidden))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path());
        assert_eq!(load_credentials(&store, "default").unwrap(), None);

        let creds = StoredCredentials {
            token: "sh_live_abcdef".to_string(),
        };
        save_credentials(&store, "default", &creds).unwrap();
        assert!(dir.path().join("credentials.default.json").exists());
        assert_eq!(load_credentials(&store, "default").unwrap(), Some(creds));
        assert_eq!(load_credentials(&store, "staging").unwrap(), None);

        assert!(remove_credentials(&store, "default").unwrap());
        assert!(!remove_credentials(&store, "default").unwrap());
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("sh_live_1234567890"), "sh_live_1234******");
        assert_eq!(mask_token("short"), "short");
        assert_eq!(mask_token(""), "");
    }
}
