use crate::core::interfaces::ConfigProvider;
use crate::core::models::FormatStyle;
use crate::utils::{Logger, OjPackError, Result};
use std::path::Path;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "ojpack.config.json";

/// Configuration file format (ojpack.config.json)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OjPackConfig {
    /// Extra `-I` directories for oj-bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_path: Option<Vec<String>>,

    /// Keep `#line N` but drop the file path (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_path: Option<bool>,

    /// Drop `#line` directives entirely; wins over hidePath (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub erase_line_directives: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub minify: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_style: Option<FormatStyle>,

    /// "clipboard" or a path template such as "${fileDirname}/submit${fileExtname}"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundled_file_destination: Option<String>,

    /// Resolve dependencies before delivering (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle: Option<bool>,
}

impl OjPackConfig {
    pub fn defaults() -> Self {
        Self {
            include_path: Some(Vec::new()),
            hide_path: Some(false),
            erase_line_directives: Some(false),
            minify: Some(false),
            format_style: Some(FormatStyle::Never),
            bundled_file_destination: Some("clipboard".to_string()),
            bundle: Some(true),
        }
    }

    /// Fields set here win; unset ones come from `base`
    pub fn layered_over(self, base: OjPackConfig) -> OjPackConfig {
        OjPackConfig {
            include_path: self.include_path.or(base.include_path),
            hide_path: self.hide_path.or(base.hide_path),
            erase_line_directives: self.erase_line_directives.or(base.erase_line_directives),
            minify: self.minify.or(base.minify),
            format_style: self.format_style.or(base.format_style),
            bundled_file_destination: self.bundled_file_destination.or(base.bundled_file_destination),
            bundle: self.bundle.or(base.bundle),
        }
    }
}

/// Settings held as JSON values, looked up by their camelCase key
#[derive(Debug, Clone, Default)]
pub struct JsonConfigProvider {
    values: serde_json::Map<String, serde_json::Value>,
}

impl JsonConfigProvider {
    pub fn from_config(config: &OjPackConfig) -> Result<Self> {
        match serde_json::to_value(config)? {
            serde_json::Value::Object(values) => Ok(Self { values }),
            other => Err(OjPackError::config(format!("expected a JSON object, got {}", other))),
        }
    }

    pub fn set(&mut self, key: &str, value: serde_json::Value) {
        self.values.insert(key.to_string(), value);
    }
}

impl ConfigProvider for JsonConfigProvider {
    fn lookup(&self, name: &str) -> Option<serde_json::Value> {
        self.values.get(name).cloned()
    }
}

/// Config loader that supports config files with CLI override
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file if it exists
    /// Searches for ojpack.config.json in the workspace folder
    pub fn load_from_file(root: &Path) -> Result<Option<OjPackConfig>> {
        let config_path = root.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            Logger::debug(&format!("No {} found, using defaults", CONFIG_FILE_NAME));
            return Ok(None);
        }

        Logger::debug(&format!("Loading config from {}", config_path.display()));

        let content = std::fs::read_to_string(&config_path)?;

        let config: OjPackConfig = serde_json::from_str(&content)
            .map_err(|e| OjPackError::config(format!(
                "Failed to parse {}: {}",
                config_path.display(),
                e
            )))?;

        Logger::debug("✅ Config file loaded successfully");
        Ok(Some(config))
    }

    /// Defaults, then the config file, then CLI flags (CLI takes precedence)
    pub fn merge_with_cli(file_config: Option<OjPackConfig>, cli: OjPackConfig) -> OjPackConfig {
        let file_layer = file_config
            .unwrap_or_default()
            .layered_over(OjPackConfig::defaults());
        cli.layered_over(file_layer)
    }

    pub fn provider(root: &Path, cli: OjPackConfig) -> Result<JsonConfigProvider> {
        let file_config = Self::load_from_file(root)?;
        JsonConfigProvider::from_config(&Self::merge_with_cli(file_config, cli))
    }

    /// Generate example config file
    pub fn generate_example() -> String {
        let example = OjPackConfig {
            include_path: Some(vec!["${userHome}/library".to_string()]),
            format_style: Some(FormatStyle::Inherit),
            ..OjPackConfig::defaults()
        };
        serde_json::to_string_pretty(&example).unwrap_or_else(|_| {
            r#"{
  "includePath": ["${userHome}/library"],
  "hidePath": false,
  "eraseLineDirectives": false,
  "minify": false,
  "formatStyle": "Inherit",
  "bundledFileDestination": "clipboard",
  "bundle": true
}"#.to_string()
        })
    }
}
