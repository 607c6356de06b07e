//! Configuration loading from TOML files
//!
//! The binary picks the file from `--config`, then the `CONFIG_FILE`
//! environment variable, then `config/dev.toml`.
//!
//! Every section is optional; missing values fall back to the defaults below.

use crate::domain::types::Timestamp;
use crate::services::run_colors::GroupingMode;
use anyhow::Context;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// JSONL file with one sighting per line
    #[serde(default = "default_input_file")]
    pub file: String,
    /// Service UUID of exposure notification beacons
    #[serde(default = "default_service_uuid")]
    pub service_uuid: String,
    /// Drop sightings that carry no service UUID at all
    #[serde(default)]
    pub require_service_uuid: bool,
    /// Only keep sightings strictly after this date or date time
    #[serde(default)]
    pub not_before: Option<String>,
    /// Sort by identifier before colouring (stable)
    #[serde(default = "default_order_by_identifier")]
    pub order_by_identifier: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            file: default_input_file(),
            service_uuid: default_service_uuid(),
            require_service_uuid: false,
            not_before: None,
            order_by_identifier: default_order_by_identifier(),
        }
    }
}

fn default_input_file() -> String {
    "sightings.jsonl".to_string()
}

fn default_service_uuid() -> String {
    "fd6f".to_string()
}

fn default_order_by_identifier() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// File path for display points (JSONL format)
    #[serde(default = "default_output_file")]
    pub file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { file: default_output_file() }
    }
}

fn default_output_file() -> String {
    "export.jsonl".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct JitterConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Wrap displaced longitudes into [-180, 180)
    #[serde(default)]
    pub normalize_longitude: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColorsConfig {
    #[serde(default)]
    pub grouping: GroupingMode,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self { grouping: GroupingMode::default(), alpha: default_alpha() }
    }
}

fn default_alpha() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelConfig {
    #[serde(default = "default_label_separator")]
    pub separator: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self { separator: default_label_separator() }
    }
}

fn default_label_separator() -> String {
    "<br>".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RandomConfig {
    /// Fixed seed for reproducible output (entropy when absent)
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub jitter: JitterConfig,
    #[serde(default)]
    pub colors: ColorsConfig,
    #[serde(default)]
    pub label: LabelConfig,
    #[serde(default)]
    pub random: RandomConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    input_file: String,
    service_uuid: String,
    require_service_uuid: bool,
    not_before: Option<NaiveDateTime>,
    order_by_identifier: bool,
    output_file: String,
    jitter_enabled: bool,
    normalize_longitude: bool,
    grouping_mode: GroupingMode,
    color_alpha: f64,
    label_separator: String,
    seed: Option<u64>,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: default_input_file(),
            service_uuid: default_service_uuid(),
            require_service_uuid: false,
            not_before: None,
            order_by_identifier: true,
            output_file: default_output_file(),
            jitter_enabled: false,
            normalize_longitude: false,
            grouping_mode: GroupingMode::Adjacency,
            color_alpha: default_alpha(),
            label_separator: default_label_separator(),
            seed: None,
            config_file: "default".to_string(),
        }
    }
}

/// Parse a cutoff such as `2020-06-21` or `2020-06-21 18:00:00`
pub fn parse_not_before(value: &str) -> anyhow::Result<NaiveDateTime> {
    Timestamp::Text(value.to_string())
        .to_naive()
        .with_context(|| format!("Invalid not_before date '{}'", value))
}

impl Config {
    /// Build configuration from already parsed TOML sections
    pub fn from_toml(toml_config: TomlConfig, source: &str) -> anyhow::Result<Self> {
        let not_before = toml_config.input.not_before.as_deref().map(parse_not_before).transpose()?;

        if !(0.0..=1.0).contains(&toml_config.colors.alpha) {
            anyhow::bail!("colors.alpha must be within [0, 1], got {}", toml_config.colors.alpha);
        }

        Ok(Self {
            input_file: toml_config.input.file,
            service_uuid: toml_config.input.service_uuid,
            require_service_uuid: toml_config.input.require_service_uuid,
            not_before,
            order_by_identifier: toml_config.input.order_by_identifier,
            output_file: toml_config.output.file,
            jitter_enabled: toml_config.jitter.enabled,
            normalize_longitude: toml_config.jitter.normalize_longitude,
            grouping_mode: toml_config.colors.grouping,
            color_alpha: toml_config.colors.alpha,
            label_separator: toml_config.label.separator,
            seed: toml_config.random.seed,
            config_file: source.to_string(),
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Self::from_toml(toml_config, &path.display().to_string())
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Load configuration from a path, falling back to defaults
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "config_load_failed_using_defaults");
                Self::default()
            }
        }
    }

    pub fn input_file(&self) -> &str {
        &self.input_file
    }

    pub fn service_uuid(&self) -> &str {
        &self.service_uuid
    }

    pub fn require_service_uuid(&self) -> bool {
        self.require_service_uuid
    }

    pub fn not_before(&self) -> Option<NaiveDateTime> {
        self.not_before
    }

    pub fn order_by_identifier(&self) -> bool {
        self.order_by_identifier
    }

    pub fn output_file(&self) -> &str {
        &self.output_file
    }

    pub fn jitter_enabled(&self) -> bool {
        self.jitter_enabled
    }

    pub fn normalize_longitude(&self) -> bool {
        self.normalize_longitude
    }

    pub fn grouping_mode(&self) -> GroupingMode {
        self.grouping_mode
    }

    pub fn color_alpha(&self) -> f64 {
        self.color_alpha
    }

    pub fn label_separator(&self) -> &str {
        &self.label_separator
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    // Command line overrides

    pub fn with_input_file(mut self, file: &str) -> Self {
        self.input_file = file.to_string();
        self
    }

    pub fn with_output_file(mut self, file: &str) -> Self {
        self.output_file = file.to_string();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_jitter(mut self, enabled: bool) -> Self {
        self.jitter_enabled = enabled;
        self
    }

    pub fn with_not_before(mut self, not_before: NaiveDateTime) -> Self {
        self.not_before = Some(not_before);
        self
    }
}
