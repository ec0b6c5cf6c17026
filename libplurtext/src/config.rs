//! Configuration management for Plurtext

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::platforms::{CapabilityTable, CharWeighting, MediaConstraints, PlatformCapability, BLUESKY};
use crate::resolver::StaticResolver;
use crate::text::MentionPolicy;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub facets: FacetsConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Known handles and their account identifiers
    #[serde(default)]
    pub mentions: BTreeMap<String, String>,
    /// Capability overrides and additional platforms, keyed by name
    #[serde(default)]
    pub platforms: BTreeMap<String, PlatformOverride>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetsConfig {
    #[serde(default)]
    pub mention_policy: MentionPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub platforms: Vec<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            platforms: vec![BLUESKY.to_string()],
        }
    }
}

/// Partial capability row; unset fields keep the built-in value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformOverride {
    pub max_text_length: Option<usize>,
    pub url_weight: Option<usize>,
    /// Count links by their literal length, clearing any `url_weight`
    pub count_urls_literally: Option<bool>,
    pub weighting: Option<CharWeighting>,
    pub reply_mentions_free: Option<bool>,
    /// `false` turns media off for the platform
    pub media_enabled: Option<bool>,
    pub media: Option<MediaConstraints>,
}

impl PlatformOverride {
    /// Layer this override onto `base`, or build a new row when `base` is `None`
    fn apply(&self, name: &str, base: Option<&PlatformCapability>) -> Result<PlatformCapability> {
        let mut capability = match base {
            Some(existing) => existing.clone(),
            None => {
                let max = self.max_text_length.ok_or_else(|| {
                    ConfigError::MissingField(format!("platforms.{}.max_text_length", name))
                })?;
                PlatformCapability::text_only(name.to_lowercase(), max)
            }
        };

        if let Some(max) = self.max_text_length {
            if max == 0 {
                return Err(ConfigError::InvalidValue {
                    field: format!("platforms.{}.max_text_length", name),
                    reason: "must be greater than zero".to_string(),
                }
                .into());
            }
            capability.max_text_length = max;
        }

        match (self.count_urls_literally, self.url_weight) {
            (Some(true), Some(_)) => {
                return Err(ConfigError::InvalidValue {
                    field: format!("platforms.{}.url_weight", name),
                    reason: "cannot be combined with count_urls_literally".to_string(),
                }
                .into());
            }
            (Some(true), None) => capability.url_weight = None,
            (_, Some(weight)) => capability.url_weight = Some(weight),
            (_, None) => {}
        }

        if let Some(weighting) = self.weighting {
            capability.weighting = weighting;
        }

        if let Some(free) = self.reply_mentions_free {
            capability.reply_mentions_free = free;
        }

        if let Some(media) = &self.media {
            capability.media = Some(media.clone());
        }

        match self.media_enabled {
            Some(false) => capability.media = None,
            Some(true) if capability.media.is_none() => {
                return Err(ConfigError::MissingField(format!("platforms.{}.media", name)).into());
            }
            _ => {}
        }

        Ok(capability)
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from the default location, falling back to defaults
    /// when no file exists there
    pub fn load_or_default() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default_config());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self::default()
    }

    pub fn mention_policy(&self) -> MentionPolicy {
        self.facets.mention_policy
    }

    /// Built-in capability rows with this configuration's overrides applied
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a new platform lacks
    /// `max_text_length` and [`ConfigError::InvalidValue`] for contradictory
    /// or out-of-range settings.
    pub fn capabilities(&self) -> Result<CapabilityTable> {
        let mut table = CapabilityTable::builtin();
        for (name, platform_override) in &self.platforms {
            let capability = platform_override.apply(name, table.get(name))?;
            table.insert(capability);
        }
        Ok(table)
    }

    /// Resolver over the `[mentions]` table
    pub fn resolver(&self) -> StaticResolver {
        self.mentions.iter().collect()
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("PLURTEXT_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("plurtext").join("config.toml"))
}
