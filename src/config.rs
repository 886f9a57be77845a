//! Settings: TOML config file plus environment overrides for credentials.
//!
//! The reconciliation core treats settings as opaque identifiers; everything
//! is validated here, before any network call.

use crate::error::SyncError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "changelogd.toml";

/// Environment overrides so credentials can stay out of the config file.
const ENV_GITHUB_TOKEN: &str = "CHANGELOGD_GITHUB_TOKEN";
const ENV_WIKI_TOKEN: &str = "CHANGELOGD_WIKI_TOKEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub github: GithubSettings,
    pub wiki: WikiSettings,
    #[serde(default)]
    pub sync: SyncSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubSettings {
    /// Repository owner (user or organization)
    #[serde(default)]
    pub owner: String,

    /// Repository name
    #[serde(default)]
    pub repo: String,

    /// Branch merged change requests must target
    #[serde(default = "default_branch")]
    pub branch: String,

    /// API token; usually supplied via CHANGELOGD_GITHUB_TOKEN
    #[serde(default)]
    pub token: String,

    /// API base URL, overridable for GitHub Enterprise
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            branch: default_branch(),
            token: String::new(),
            api_base: default_api_base(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WikiSettings {
    /// Wiki base URL, e.g. "https://acme.example.com/wiki"
    #[serde(default)]
    pub base_url: String,

    /// Identifier of the changelog page
    #[serde(default)]
    pub page_id: String,

    /// Account the updates are written as
    #[serde(default)]
    pub username: String,

    /// API token; usually supplied via CHANGELOGD_WIKI_TOKEN
    #[serde(default)]
    pub api_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Repository path of the version manifest
    #[serde(default = "default_manifest_path")]
    pub manifest_path: String,

    /// Per-request timeout, seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Age after which a leftover busy fence is reclaimed, seconds
    #[serde(default = "default_stale_lock")]
    pub stale_lock_secs: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            manifest_path: default_manifest_path(),
            request_timeout_secs: default_request_timeout(),
            stale_lock_secs: default_stale_lock(),
        }
    }
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_manifest_path() -> String {
    "package.json".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_stale_lock() -> u64 {
    900
}

impl Settings {
    /// Load settings from an explicit path, or the default locations
    /// (./changelogd.toml, then the per-user config directory). Credentials
    /// from the environment override the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()
                .context("No changelogd.toml found; run `changelogd init` first")?,
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if let Ok(token) = std::env::var(ENV_GITHUB_TOKEN) {
            settings.github.token = token;
        }
        if let Ok(token) = std::env::var(ENV_WIKI_TOKEN) {
            settings.wiki.api_token = token;
        }

        Ok(settings)
    }

    /// First existing default config location.
    pub fn default_path() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }
        let user = dirs::config_dir()?.join("changelogd").join(CONFIG_FILE);
        user.exists().then_some(user)
    }

    /// Check that every identifier and credential the pass needs is present.
    /// Raised before any network call.
    pub fn validate(&self) -> std::result::Result<(), SyncError> {
        let mut missing = Vec::new();
        if self.github.owner.is_empty() {
            missing.push("github.owner");
        }
        if self.github.repo.is_empty() {
            missing.push("github.repo");
        }
        if self.github.branch.is_empty() {
            missing.push("github.branch");
        }
        if self.wiki.base_url.is_empty() {
            missing.push("wiki.base_url");
        }
        if self.wiki.page_id.is_empty() {
            missing.push("wiki.page_id");
        }
        if self.wiki.username.is_empty() {
            missing.push("wiki.username");
        }
        if self.wiki.api_token.is_empty() {
            missing.push("wiki.api_token (or CHANGELOGD_WIKI_TOKEN)");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SyncError::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )))
        }
    }

    /// Commented template written by `changelogd init`.
    pub fn template() -> &'static str {
        r#"# changelogd configuration

[github]
owner = ""          # repository owner (user or organization)
repo = ""           # repository name
branch = "main"     # branch merged pull requests must target
# token is usually supplied via CHANGELOGD_GITHUB_TOKEN
token = ""

[wiki]
base_url = ""       # e.g. "https://acme.example.com/wiki"
page_id = ""        # identifier of the changelog page
username = ""       # account updates are written as
# api_token is usually supplied via CHANGELOGD_WIKI_TOKEN
api_token = ""

[sync]
manifest_path = "package.json"  # where the release version is declared
request_timeout_secs = 30
stale_lock_secs = 900
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> Settings {
        let mut settings = Settings::default();
        settings.github.owner = "acme".to_string();
        settings.github.repo = "widget".to_string();
        settings.wiki.base_url = "https://wiki.example.com".to_string();
        settings.wiki.page_id = "12345".to_string();
        settings.wiki.username = "bot".to_string();
        settings.wiki.api_token = "secret".to_string();
        settings
    }

    #[test]
    fn test_complete_settings_validate() {
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn test_missing_fields_are_all_named() {
        let mut settings = complete();
        settings.github.owner.clear();
        settings.wiki.page_id.clear();

        let err = settings.validate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("github.owner"));
        assert!(message.contains("wiki.page_id"));
        assert!(!message.contains("github.repo"));
    }

    #[test]
    fn test_defaults_fill_in_from_minimal_toml() {
        let settings: Settings = toml::from_str(
            r#"
            [github]
            owner = "acme"
            repo = "widget"

            [wiki]
            base_url = "https://wiki.example.com"
            page_id = "1"
            username = "bot"
            api_token = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(settings.github.branch, "main");
        assert_eq!(settings.github.api_base, "https://api.github.com");
        assert_eq!(settings.sync.manifest_path, "package.json");
        assert_eq!(settings.sync.request_timeout_secs, 30);
    }

    #[test]
    fn test_template_parses() {
        let settings: Settings = toml::from_str(Settings::template()).unwrap();
        assert!(settings.validate().is_err());
    }
}
