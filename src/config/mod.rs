use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Remote names tried in order when picking the main remote.
    pub remote_priority: Vec<String>,
    /// Used when the main remote does not advertise a HEAD.
    pub default_branch: String,
    /// Prune stale remote-tracking refs while fetching.
    pub prune: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote_priority: vec![
                "upstream".to_string(),
                "github".to_string(),
                "origin".to_string(),
            ],
            default_branch: "main".to_string(),
            prune: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn config_path() -> PathBuf {
        #[cfg(windows)]
        {
            let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("git-sync").join("config.toml")
        }

        #[cfg(not(windows))]
        {
            if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
                return PathBuf::from(xdg).join("git-sync").join("config.toml");
            }
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config").join("git-sync").join("config.toml")
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;

        if config.default_branch.trim().is_empty() {
            return Err(Error::Config("default_branch must not be empty".to_string()));
        }

        Ok(config)
    }
}
