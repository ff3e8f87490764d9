use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub colors: ColorConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// Region code -> boundary GeoJSON file. Fixed at startup.
    pub regions: HashMap<String, PathBuf>,
}

/// Fill color rules for the map. A selected municipality gets the region's
/// override color if one exists, otherwise the shared highlight color.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ColorConfig {
    #[serde(default = "default_unselected")]
    pub unselected: String,
    #[serde(default = "default_highlight")]
    pub highlight: String,
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

impl ColorConfig {
    pub fn fill_for(&self, region: &str, selected: bool) -> &str {
        if !selected {
            return &self.unselected;
        }
        self.overrides
            .get(region)
            .map(String::as_str)
            .unwrap_or(&self.highlight)
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        let mut overrides = HashMap::new();
        overrides.insert("para".to_string(), "#ff0000".to_string());
        overrides.insert("tocantins".to_string(), "#ffff00".to_string());
        ColorConfig {
            unselected: default_unselected(),
            highlight: default_highlight(),
            overrides,
        }
    }
}

fn default_unselected() -> String {
    "#ccccff".to_string()
}

fn default_highlight() -> String {
    "#00ff00".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    #[serde(default = "default_filename")]
    pub filename: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            filename: default_filename(),
        }
    }
}

fn default_filename() -> String {
    "selected_cities_map.html".to_string()
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}
