//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `$RANKSPEC_CONFIG` environment variable
//! 2. `~/.config/rankspec/config.toml`
//! 3. Built-in defaults (everything is optional)

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub johnson: JohnsonConfig,
    pub output: OutputConfig,
}

/// Range of n whose Johnson graphs are built up front.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct JohnsonConfig {
    pub min_n: usize,
    pub max_n: usize,
}

/// Report rendering.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Rows of each ranked component shown in table mode.
    pub top: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

// --- Defaults ---

impl Default for JohnsonConfig {
    fn default() -> Self {
        Self { min_n: 2, max_n: 5 }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Table,
            top: 10,
        }
    }
}

impl Config {
    fn validate(self) -> Result<Self> {
        if self.johnson.min_n < 2 {
            bail!("johnson.min_n must be at least 2, got {}", self.johnson.min_n);
        }
        if self.johnson.min_n > self.johnson.max_n {
            bail!(
                "johnson.min_n ({}) is larger than johnson.max_n ({})",
                self.johnson.min_n,
                self.johnson.max_n
            );
        }
        Ok(self)
    }
}

/// Load config from disk. Returns defaults if no config file exists.
pub fn load_config() -> Result<Config> {
    match config_path() {
        Some(p) if p.exists() => load_from(&p),
        _ => Ok(Config::default()),
    }
}

fn load_from(path: &Path) -> Result<Config> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))
}

/// Resolve the config file path.
fn config_path() -> Option<PathBuf> {
    // 1. Environment variable
    if let Ok(p) = std::env::var("RANKSPEC_CONFIG") {
        return Some(PathBuf::from(p));
    }

    // 2. ~/.config/rankspec/config.toml
    directories::BaseDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(".config")
            .join("rankspec")
            .join("config.toml")
    })
}

/// Show the active config path (for `rankspec config`).
pub fn show_config_path() -> String {
    match config_path() {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (not found, using defaults)", p.display()),
        None => "no config path resolved (using defaults)".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.johnson.min_n, 2);
        assert_eq!(config.johnson.max_n, 5);
        assert_eq!(config.output.format, OutputFormat::Table);
        assert_eq!(config.output.top, 10);
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_str = r#"
[johnson]
max_n = 8
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.johnson.max_n, 8);
        // Other fields should be defaults
        assert_eq!(config.johnson.min_n, 2);
        assert_eq!(config.output.top, 10);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[johnson]
min_n = 3
max_n = 7

[output]
format = "json"
top = 3
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.johnson.min_n, 3);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.top, 3);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let result: Result<Config, _> = toml::from_str("[output]\nformat = \"xml\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file_validates_range() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[johnson]\nmin_n = 6\nmax_n = 4").unwrap();
        let err = load_from(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("larger than"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[johnson]\nmin_n = 3\nmax_n = 4").unwrap();
        let config = load_from(file.path()).unwrap();
        assert_eq!(config.johnson.min_n, 3);
    }
}
