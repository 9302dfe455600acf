use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ConvertError;

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub ratings: RatingsConfig,
    pub blocks: BlocksConfig,
}

/// Colour names used for vulnerability ratings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RatingsConfig {
    pub critical: String,
    pub high: String,
    pub medium: String,
    pub default: String,
}

impl Default for RatingsConfig {
    fn default() -> Self {
        Self {
            critical: "Red".to_string(),
            high: "Orange".to_string(),
            medium: "Dandelion".to_string(),
            default: "Black".to_string(),
        }
    }
}

impl RatingsConfig {
    /// Get the display colour for a rating, ignoring case.
    /// Unrecognised ratings get the default colour.
    pub fn color_for(&self, rating: &str) -> &str {
        match rating.trim().to_lowercase().as_str() {
            "critical" => &self.critical,
            "high" => &self.high,
            "medium" => &self.medium,
            _ => &self.default,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct BlocksConfig {
    /// Blank-line runs at least this long render as a page break.
    pub page_break_after: usize,
    /// Declaration keys stored verbatim instead of being formatted.
    pub verbatim_fields: Vec<String>,
}

impl Default for BlocksConfig {
    fn default() -> Self {
        Self {
            page_break_after: 3,
            verbatim_fields: vec!["logo".to_string(), "graphic".to_string(), "date".to_string()],
        }
    }
}

impl BlocksConfig {
    pub fn is_verbatim(&self, key: &str) -> bool {
        self.verbatim_fields.iter().any(|field| field == key)
    }
}

impl Config {
    /// The configuration bundled with the binary.
    pub fn compiled_default() -> Self {
        // build.rs rejects an invalid bundled file, so this cannot fail at runtime
        Self::from_toml_str(include_str!("default_config.toml"))
            .expect("bundled default_config.toml is valid")
    }

    /// Parse a configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConvertError> {
        Ok(toml::from_str(content)?)
    }

    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConvertError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConvertError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }
}
