//! Configuration loading and parsing for rebind
//!
//! Provides functionality to load and parse `rebind.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::exports::NameFilter;

pub const CONFIG_FILENAME: &str = "rebind.toml";

const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["rename", "exports", "naming"];
const KNOWN_RENAME_KEYS: &[&str] = &["widen_methods", "conflicts", "batch"];
const KNOWN_EXPORTS_KEYS: &[&str] = &["include", "exclude", "skip_tests"];
const KNOWN_NAMING_KEYS: &[&str] = &["initialisms"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid TOML in '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
    #[error("Invalid name pattern in [exports]: {source}")]
    InvalidPattern {
        #[from]
        source: regex::Error,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ConfigResult {
    pub config: Config,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub rename: RenameConfig,
    pub exports: ExportsConfig,
    pub naming: NamingConfig,
}

/// What to do when one rename of a batch is rejected.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Stop the batch and report failure.
    #[default]
    Abort,
    /// Skip the rejected rename and continue.
    Ignore,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BatchMode {
    /// Check and apply each request in turn.
    #[default]
    PerRequest,
    /// Apply nothing unless every request applies cleanly.
    AllOrNothing,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenameConfig {
    pub widen_methods: bool,
    pub conflicts: ConflictPolicy,
    pub batch: BatchMode,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportsConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub skip_tests: bool,
}

impl Default for ExportsConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            skip_tests: true,
        }
    }
}

impl ExportsConfig {
    pub fn name_filter(&self) -> Result<NameFilter, ConfigError> {
        Ok(NameFilter::from_patterns(&self.include, &self.exclude)?)
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct NamingConfig {
    pub initialisms: Vec<String>,
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

fn read(path: &Path) -> Result<(String, Config), ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;

    Ok((content, config))
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    read(path).map(|(_, config)| config)
}

pub fn load_config_with_warnings(path: &Path) -> Result<ConfigResult, ConfigError> {
    let (content, config) = read(path)?;
    let warnings = detect_unknown_keys(&content);

    Ok(ConfigResult { config, warnings })
}

fn detect_unknown_keys(content: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    let table: toml::Table = match content.parse() {
        Ok(t) => t,
        Err(_) => return warnings,
    };

    let known_top: HashSet<&str> = KNOWN_TOP_LEVEL_KEYS.iter().copied().collect();
    for key in table.keys() {
        if !known_top.contains(key.as_str()) {
            warnings.push(format!("Unknown config option: '{}'", key));
        }
    }

    let sections = [
        ("rename", KNOWN_RENAME_KEYS),
        ("exports", KNOWN_EXPORTS_KEYS),
        ("naming", KNOWN_NAMING_KEYS),
    ];
    for (section, known) in sections {
        if let Some(toml::Value::Table(entries)) = table.get(section) {
            let known: HashSet<&str> = known.iter().copied().collect();
            for key in entries.keys() {
                if !known.contains(key.as_str()) {
                    warnings.push(format!(
                        "Unknown config option in [{}]: '{}'",
                        section, key
                    ));
                }
            }
        }
    }

    warnings
}

pub fn load_config_or_default(start_dir: &Path) -> Config {
    find_config_file(start_dir)
        .and_then(|path| load_config(&path).ok())
        .unwrap_or_default()
}

pub fn load_config_or_default_with_warnings(start_dir: &Path) -> ConfigResult {
    match find_config_file(start_dir) {
        Some(path) => load_config_with_warnings(&path).unwrap_or_default(),
        None => ConfigResult::default(),
    }
}
