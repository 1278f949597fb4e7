use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{CollationError, Result};
use crate::fetch::{IdentityPatcher, RewritePatcher, UrlPatcher};

/// Default name of the configuration file looked up by the CLI.
pub const CONFIG_FILENAME: &str = "collation.json";

/// Substring rewrite applied to pointer URLs before fetching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRewrite {
    pub find: String,
    pub replace: String,
}

/// Configuration for dereferencing collation documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollationConfig {
    /// Schema version of the configuration.
    pub version: u32,
    /// Local name of pointer marker elements.
    pub pointer_tag: String,
    /// Attribute on pointer markers holding `url#locator`.
    pub target_attribute: String,
    /// Attribute the identifier tier matches locators against.
    pub id_attribute: String,
    /// Optional URL rewrite; absent means URLs are fetched as written.
    pub url_rewrite: Option<UrlRewrite>,
    /// Per-request timeout for HTTP fetches, in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for CollationConfig {
    fn default() -> Self {
        Self {
            version: 1,
            pointer_tag: "ptr".to_string(),
            target_attribute: "target".to_string(),
            id_attribute: "xml:id".to_string(),
            url_rewrite: None,
            fetch_timeout_secs: 30,
        }
    }
}

impl CollationConfig {
    /// Returns the URL patcher described by this configuration.
    pub fn url_patcher(&self) -> Arc<dyn UrlPatcher> {
        match &self.url_rewrite {
            Some(rule) => Arc::new(RewritePatcher::new(&rule.find, &rule.replace)),
            None => Arc::new(IdentityPatcher),
        }
    }

    /// Checks values that would make every pass fail.
    pub fn validate(&self) -> Result<()> {
        if self.pointer_tag.is_empty() || self.target_attribute.is_empty() {
            return Err(CollationError::Config {
                message: "pointer_tag and target_attribute must not be empty".to_string(),
            });
        }
        if self.id_attribute.is_empty() {
            return Err(CollationError::Config {
                message: "id_attribute must not be empty".to_string(),
            });
        }
        if let Some(rule) = &self.url_rewrite {
            if rule.find.is_empty() {
                return Err(CollationError::Config {
                    message: "url_rewrite.find must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Loads the configuration from `path`.
///
/// A missing file yields the default configuration.
pub fn load_config(path: &Path) -> Result<CollationConfig> {
    if !path.exists() {
        return Ok(CollationConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(|e| CollationError::Config {
        message: format!("failed to read config file '{}': {}", path.display(), e),
    })?;

    let config: CollationConfig =
        serde_json::from_str(&contents).map_err(|e| CollationError::Config {
            message: format!("failed to parse config file '{}': {}", path.display(), e),
        })?;

    config.validate()?;
    Ok(config)
}

/// Saves the configuration to `path` using an atomic write.
///
/// Writes to a temporary file first and then renames it over the target.
pub fn save_config(path: &Path, config: &CollationConfig) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CollationError::Config {
            message: format!(
                "failed to create config directory '{}': {}",
                parent.display(),
                e
            ),
        })?;
    }

    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(config).map_err(|e| CollationError::Config {
        message: format!("failed to serialize config: {}", e),
    })?;

    fs::write(&tmp_path, &json).map_err(|e| CollationError::Config {
        message: format!(
            "failed to write temporary config file '{}': {}",
            tmp_path.display(),
            e
        ),
    })?;

    fs::rename(&tmp_path, path).map_err(|e| CollationError::Config {
        message: format!(
            "failed to rename temporary config file '{}' to '{}': {}",
            tmp_path.display(),
            path.display(),
            e
        ),
    })?;

    Ok(())
}
