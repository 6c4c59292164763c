//! Configuration for ticklist
//!
//! Stored in $XDG_CONFIG_HOME/ticklist/config.toml

use crate::Identity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "ticklist";
const CONFIG_FILE: &str = "config.toml";

/// Name of the list that favorites land in unless configured otherwise
pub const DEFAULT_LIST_NAME: &str = "기본";

/// ticklist configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the durable store keeps its files
    pub data_dir: Option<PathBuf>,

    /// Name of the distinguished default list
    pub default_list_name: String,

    /// Local identity used by `tick login`
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            default_list_name: DEFAULT_LIST_NAME.to_string(),
            identity: IdentityConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

/// Identity the CLI signs in with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub is_admin: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        let name = std::env::var("USER")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "local".to_string());
        Self {
            user_id: format!("local-{}", name),
            email: String::new(),
            display_name: name,
            is_admin: false,
        }
    }
}

impl From<&IdentityConfig> for Identity {
    fn from(cfg: &IdentityConfig) -> Self {
        Identity {
            user_id: cfg.user_id.clone(),
            email: cfg.email.clone(),
            display_name: cfg.display_name.clone(),
            is_admin: cfg.is_admin,
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use colors in output
    pub colors: bool,

    /// Date format for display
    pub date_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            colors: true,
            date_format: "%Y-%m-%d %H:%M".to_string(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Other(format!("Invalid config: {}", e)))?;
        Ok(config)
    }

    /// Save config to a TOML file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Other(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default config file location
    pub fn default_path() -> crate::Result<PathBuf> {
        let base = std::env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::config_dir)
            .ok_or_else(|| crate::Error::Other("Could not determine config directory".into()))?;
        Ok(base.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Data directory, falling back to $XDG_DATA_HOME/ticklist
    pub fn resolved_data_dir(&self) -> crate::Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let base = std::env::var("XDG_DATA_HOME")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
            .ok_or_else(|| crate::Error::Other("Could not determine data directory".into()))?;
        Ok(base.join(APP_DIR))
    }

    /// Generate a default config file with comments
    ///
    /// The identity matches [`IdentityConfig::default`], so resetting the
    /// config does not sign the user in as someone else.
    pub fn default_with_comments() -> String {
        let identity = IdentityConfig::default();
        format!(
            r#"# ticklist configuration

# Where lists, items and settings are stored
# (defaults to $XDG_DATA_HOME/ticklist)
# data_dir = "/home/me/.local/share/ticklist"

# Name of the default list that favorites are added to
default_list_name = {}

[identity]
# Identity used by `tick login`
user_id = {}
email = ""
display_name = {}
is_admin = false

[display]
# Use colors in output
colors = true

# Date format for display (strftime format)
date_format = "%Y-%m-%d %H:%M"
"#,
            toml_str(DEFAULT_LIST_NAME),
            toml_str(&identity.user_id),
            toml_str(&identity.display_name),
        )
    }
}

/// Quote and escape a TOML basic string
fn toml_str(s: &str) -> String {
    toml::Value::String(s.to_string()).to_string()
}
