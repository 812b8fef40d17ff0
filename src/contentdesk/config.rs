use crate::error::{DeskError, Result};
use crate::model::RepositoryLocation;
use crate::store::client::ReadPolicy;
use crate::store::http::DEFAULT_API_BASE;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";

pub const KEYS: [&str; 5] = ["token", "owner", "repo", "api-base", "strict-reads"];

/// Connection settings, stored as `config.json` in the config directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeskConfig {
    /// GitHub personal access token
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default)]
    pub repo: Option<String>,

    /// API root, for GitHub Enterprise installs
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Surface failed existence checks and listings instead of treating them
    /// as "absent"
    #[serde(default)]
    pub strict_reads: bool,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            token: None,
            owner: None,
            repo: None,
            api_base: default_api_base(),
            strict_reads: false,
        }
    }
}

impl DeskConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(DeskError::Io)?;
        let config: DeskConfig =
            serde_json::from_str(&content).map_err(DeskError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory. The file holds a credential, so on
    /// Unix it is readable by the owner only.
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(DeskError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(DeskError::Serialization)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&config_path).map_err(DeskError::Io)?;

        // `mode` only applies to newly created files.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(DeskError::Io)?;
        }
        file.write_all(content.as_bytes()).map_err(DeskError::Io)?;
        Ok(())
    }

    /// The repository location, when token, owner and repo are all set.
    pub fn location(&self) -> Option<RepositoryLocation> {
        let location = RepositoryLocation::new(
            self.owner.clone()?,
            self.repo.clone()?,
            self.token.clone()?,
        );
        location.is_complete().then_some(location)
    }

    pub fn read_policy(&self) -> ReadPolicy {
        if self.strict_reads {
            ReadPolicy::Strict
        } else {
            ReadPolicy::Lenient
        }
    }

    /// Display value for a key. The token is masked.
    pub fn get(&self, key: &str) -> Option<String> {
        let unset = || "(not set)".to_string();
        match key {
            "token" => Some(self.token.as_deref().map(mask_token).unwrap_or_else(unset)),
            "owner" => Some(self.owner.clone().unwrap_or_else(unset)),
            "repo" => Some(self.repo.clone().unwrap_or_else(unset)),
            "api-base" => Some(self.api_base.clone()),
            "strict-reads" => Some(self.strict_reads.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        let value = value.trim();
        let non_empty = |v: &str| {
            if v.is_empty() {
                Err(format!("{} cannot be empty", key))
            } else {
                Ok(v.to_string())
            }
        };
        match key {
            "token" => self.token = Some(non_empty(value)?),
            "owner" => self.owner = Some(non_empty(value)?),
            "repo" => self.repo = Some(non_empty(value)?),
            "api-base" => {
                let base = non_empty(value)?;
                if !base.starts_with("https://") && !base.starts_with("http://") {
                    return Err(format!("api-base must be an http(s) URL: {}", base));
                }
                self.api_base = base.trim_end_matches('/').to_string();
            }
            "strict-reads" => {
                self.strict_reads = match value.to_ascii_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => true,
                    "false" | "no" | "off" | "0" => false,
                    other => return Err(format!("strict-reads must be true or false, got {}", other)),
                }
            }
            other => {
                return Err(format!(
                    "Unknown config key: {} (known keys: {})",
                    other,
                    KEYS.join(", ")
                ))
            }
        }
        Ok(())
    }
}

fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    if token.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}
