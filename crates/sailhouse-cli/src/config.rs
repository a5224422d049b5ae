use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::cli::{Cli, OutputFormat};
use crate::client::SailhouseClient;

pub const DEFAULT_API_URL: &str = "https://api.sailhouse.dev";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProfileConfig {
    pub api_url: Option<String>,
    pub team: Option<String>,
    pub app: Option<String>,
    pub format: Option<OutputFormat>,
}

impl ProfileConfig {
    /// Sets one key by name, as used by `config set`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api_url" => self.api_url = Some(value.to_string()),
            "team" => self.team = Some(value.to_string()),
            "app" => self.app = Some(value.to_string()),
            "format" => {
                let format = <OutputFormat as clap::ValueEnum>::from_str(value, true)
                    .map_err(|_| {
                        anyhow::anyhow!("Unknown format: {value}. Valid formats: text, json, yaml")
                    })?;
                self.format = Some(format);
            }
            other => {
                anyhow::bail!("Unknown config key: {other}. Valid keys: api_url, team, app, format")
            }
        }
        Ok(())
    }
}

pub type ConfigFile = HashMap<String, ProfileConfig>;

/// Directory holding `config.toml` and per-profile credentials.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// `$SAILHOUSE_HOME`, or `~/.sailhouse`.
    pub fn from_env() -> Result<Self> {
        let dir = match std::env::var_os("SAILHOUSE_HOME") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .context("Cannot determine home directory")?
                .join(".sailhouse"),
        };
        Ok(Self { dir })
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of a file in the store, creating the directory if needed.
    pub fn file(&self, name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        Ok(self.dir.join(name))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load_all(&self) -> Result<ConfigFile> {
        let path = self.file("config.toml")?;
        if !path.exists() {
            return Ok(ConfigFile::new());
        }
        let content = fs::read_to_string(&path)?;
        let cfg: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_profile(&self, profile: &str) -> Result<ProfileConfig> {
        let mut all = self.load_all()?;
        Ok(all.remove(profile).unwrap_or_default())
    }

    pub fn save_profile(&self, profile: &str, config: &ProfileConfig) -> Result<()> {
        let mut all = self.load_all()?;
        all.insert(profile.to_string(), config.clone());
        let content = toml::to_string_pretty(&all)?;
        fs::write(self.file("config.toml")?, content)?;
        Ok(())
    }
}

/// Settings of one invocation, resolved from flags, env and the profile.
#[derive(Debug, Clone)]
pub struct Session {
    pub profile: String,
    pub api_url: String,
    pub token: Option<String>,
    pub team: Option<String>,
    pub app: Option<String>,
    pub format: OutputFormat,
}

impl Session {
    pub fn resolve(cli: &Cli, store: &ConfigStore) -> Result<Self> {
        let cfg = store.load_profile(&cli.profile)?;
        // 1. --flag / SAILHOUSE_* env, 2. stored credentials or config.toml profile
        let token = match &cli.token {
            Some(t) => Some(t.clone()),
            None => auth::load_credentials(store, &cli.profile)?.map(|c| c.token),
        };
        Ok(Self {
            profile: cli.profile.clone(),
            api_url: cli
                .api_url
                .clone()
                .or(cfg.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            token,
            team: cli.team.clone().or(cfg.team),
            app: cli.app.clone().or(cfg.app),
            format: cli.format.or(cfg.format).unwrap_or_default(),
        })
    }

    pub fn client(&self) -> Result<SailhouseClient> {
        let token = self
            .token
            .as_deref()
            .context("Not logged in. Run: sailhouse login <token>, or set SAILHOUSE_TOKEN")?;
        SailhouseClient::new(&self.api_url, token)
    }

    pub fn team(&self) -> Result<&str> {
        self.team.as_deref().context(
            "No team selected. Use --team, set SAILHOUSE_TEAM, or run: sailhouse teams set <slug>",
        )
    }

    /// The configured app, or the team's only app.
    pub async fn app(&self, client: &SailhouseClient, team: &str) -> Result<String> {
        if let Some(app) = &self.app {
            return Ok(app.clone());
        }
        let apps = client.list_apps(team).await?;
        match apps.as_slice() {
            [] => anyhow::bail!(
                "No apps found in team {team}. Create one with: sailhouse apps create <slug>"
            ),
            [only] => {
                tracing::debug!(app = %only.slug, "using the team's only app");
                Ok(only.slug.clone())
            }
            many => {
                let slugs: Vec<&str> = many.iter().map(|a| a.slug.as_str()).collect();
                anyhow::bail!(
                    "Several apps found ({}). Use --app, set SAILHOUSE_APP, or run: sailhouse config set app <slug>",
                    slugs.join(", ")
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["sailhouse"];
        full.extend_from_slice(args);
        full.push("status");
        Cli::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_profile_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path());
        assert_eq!(store.load_profile("default").unwrap(), ProfileConfig::default());

        let mut cfg = ProfileConfig::default();
        cfg.set("team", "acme").unwrap();
        cfg.set("format", "JSON").unwrap();
        store.save_profile("default", &cfg).unwrap();
        store.save_profile("staging", &ProfileConfig::default()).unwrap();

        let loaded = store.load_profile("default").unwrap();
        assert_eq!(loaded.team.as_deref(), Some("acme"));
        assert_eq!(loaded.format, Some(OutputFormat::Json));
        assert_eq!(store.load_all().unwrap().len(), 2);
    }

    #[test]
    fn test_set_rejects_unknown_values() {
        let mut cfg = ProfileConfig::default();
        assert!(cfg.set("colour", "blue").is_err());
        assert!(cfg.set("format", "xml").is_err());
        assert_eq!(cfg, ProfileConfig::default());
    }

    #[test]
    fn test_flags_override_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path());
        let cfg = ProfileConfig {
            api_url: Some("https://api.example.test".to_string()),
            team: Some("acme".to_string()),
            app: Some("shop".to_string()),
            format: Some(OutputFormat::Yaml),
        };
        store.save_profile("default", &cfg).unwrap();

        let session = Session::resolve(
            &cli(&["--team", "other", "--token", "tok", "-f", "json"]),
            &store,
        )
        .unwrap();
        assert_eq!(session.team.as_deref(), Some("other"));
        assert_eq!(session.app.as_deref(), Some("shop"));
        assert_eq!(session.api_url, "https://api.example.test");
        assert_eq!(session.format, OutputFormat::Json);
        assert_eq!(session.token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_missing_team_message() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path());
        let session = Session::resolve(&cli(&["--profile", "empty-profile"]), &store).unwrap();
        if session.team.is_none() {
            let err = session.team().unwrap_err();
            assert!(err.to_string().contains("sailhouse teams set"));
        }
    }
}
