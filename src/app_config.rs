//! Application configuration loading for CLI defaults.

use std::env;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use wallget_core::{Categories, Order, Purity, Sorting, TopRange};

/// File configuration read from `config.toml`. Every key is optional and
/// unknown keys are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Default output directory for downloads.
    pub output_dir: Option<PathBuf>,
    /// Default concurrency (same range as CLI).
    pub concurrency: Option<u8>,
    /// Default per-file deadline in seconds.
    pub timeout_secs: Option<u64>,
    /// Default category mask, e.g. `"110"`.
    #[serde(deserialize_with = "token")]
    pub categories: Option<Categories>,
    /// Default purity mask.
    #[serde(deserialize_with = "token")]
    pub purity: Option<Purity>,
    #[serde(deserialize_with = "token")]
    pub sorting: Option<Sorting>,
    #[serde(deserialize_with = "token")]
    pub order: Option<Order>,
    /// Toplist window, only sent with `sorting = "toplist"`.
    #[serde(deserialize_with = "token")]
    pub top_range: Option<TopRange>,
    /// Search endpoint override.
    pub api_url: Option<String>,
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(concurrency) = self.concurrency
            && !(1..=100).contains(&concurrency)
        {
            bail!("Invalid config value for `concurrency`: {concurrency}. Expected range: 1..=100");
        }

        if let Some(timeout_secs) = self.timeout_secs
            && !(1..=3600).contains(&timeout_secs)
        {
            bail!("Invalid config value for `timeout_secs`: {timeout_secs}. Expected range: 1..=3600");
        }

        if let Some(api_url) = &self.api_url
            && !(api_url.starts_with("http://") || api_url.starts_with("https://"))
        {
            bail!("Invalid config value for `api_url`: '{api_url}'. Expected an http(s) URL");
        }

        Ok(())
    }
}

/// Search tokens are written as strings and parsed with the same `FromStr`
/// the CLI uses.
fn token<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| raw.parse::<T>().map_err(de::Error::custom))
        .transpose()
}

/// `verbosity` values accepted in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/wallget/config.toml`
/// 2. `$HOME/.config/wallget/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    let base = match env_var_non_empty_os("XDG_CONFIG_HOME") {
        Some(xdg_config_home) => PathBuf::from(xdg_config_home),
        None => PathBuf::from(env_var_non_empty_os("HOME")?).join(".config"),
    };
    Some(base.join("wallget").join("config.toml"))
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    env::var_os(name).filter(|value| !value.is_empty())
}

/// Loads config from default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path) if path.exists() => Some(load_file_config(path)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let cfg: FileConfig = toml::from_str(raw)?;
    cfg.validate()?;
    Ok(cfg)
}
