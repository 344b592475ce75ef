use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "PATENT_LENS_CONFIG";
/// Environment variable overriding the configured passcode.
pub const PASSCODE_ENV: &str = "PATENT_LENS_PASSCODE";
/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "patent-lens.toml";

/// Contents of `patent-lens.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Shared passcode for the gate. Unset leaves the gate open.
    pub passcode: Option<String>,
    /// Dataset loaded at start-up.
    pub data_path: Option<PathBuf>,
    /// Bars shown in distribution charts.
    pub top_n: usize,
    /// IPC groups plotted in the growth chart.
    pub growth_groups: usize,
    /// Normalized datasets kept in memory.
    pub cache_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            passcode: None,
            data_path: None,
            top_n: 10,
            growth_groups: 10,
            cache_capacity: 4,
        }
    }
}

impl AppConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("parsing config")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Resolve the config from `$PATENT_LENS_CONFIG`, then `./patent-lens.toml`,
    /// then defaults, and apply `$PATENT_LENS_PASSCODE`.
    ///
    /// An explicitly named file must load; the default file is optional.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    log::debug!("No {DEFAULT_CONFIG_FILE} found, using defaults");
                    Self::default()
                }
            }
        };
        if let Ok(passcode) = std::env::var(PASSCODE_ENV) {
            config.passcode = Some(passcode);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(AppConfig::from_toml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn parses_all_fields() {
        let config = AppConfig::from_toml(
            r#"
            passcode = "open sesame"
            data_path = "data/patents.csv"
            top_n = 5
            growth_groups = 3
            cache_capacity = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.passcode.as_deref(), Some("open sesame"));
        assert_eq!(config.data_path, Some(PathBuf::from("data/patents.csv")));
        assert_eq!(config.top_n, 5);
        assert_eq!(config.growth_groups, 3);
        assert_eq!(config.cache_capacity, 1);
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(AppConfig::from_toml("pasword = \"typo\"").is_err());
    }

    #[test]
    fn from_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patent-lens.toml");
        std::fs::write(&path, "top_n = \"ten\"").unwrap();
        let err = AppConfig::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("patent-lens.toml"));
    }
}
