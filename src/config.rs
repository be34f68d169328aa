// Client configuration.
//
// Values are layered: built-in defaults, then the optional JSON file at
// `<config dir>/dhokla-cli/config.json`, then `DHOKLA_*` environment
// variables.

use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://dhokla.net/";

/// Path prefixes for each endpoint, relative to the base URL. The id or
/// search query is appended as one extra path segment.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Endpoints {
    pub root: String,
    pub directory: String,
    pub search: String,
    pub download: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            root: "api/d/".into(),
            directory: "api/d/".into(),
            search: "api/s/".into(),
            download: "f/".into(),
        }
    }
}

/// Shape of `config.json`. Every key is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub endpoints: Option<Endpoints>,
    pub download_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub endpoints: Endpoints,
    /// Where downloaded files are written.
    pub download_dir: PathBuf,
    /// No timeout unless configured.
    pub timeout: Option<Duration>,
}

impl Config {
    /// Config for a given base URL with default endpoints.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Ok(Config {
            base_url: parse_base_url(base_url)?,
            endpoints: Endpoints::default(),
            download_dir: PathBuf::from("."),
            timeout: None,
        })
    }

    /// Load from the user's config file (if any) and the process
    /// environment.
    pub fn load() -> Result<Self> {
        let file = match config_path() {
            Some(path) if path.exists() => {
                log::debug!("reading config from {}", path.display());
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let parsed: ConfigFile = serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse {}", path.display()))?;
                Some(parsed)
            }
            _ => None,
        };
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Combine an optional config file with environment lookups. `env` is
    /// a parameter so callers can supply something other than the real
    /// process environment.
    pub fn from_sources<F>(file: Option<ConfigFile>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::with_base_url(DEFAULT_BASE_URL)?;

        if let Some(file) = file {
            if let Some(url) = file.base_url {
                config.base_url = parse_base_url(&url)?;
            }
            if let Some(endpoints) = file.endpoints {
                config.endpoints = endpoints;
            }
            if let Some(dir) = file.download_dir {
                config.download_dir = dir;
            }
            config.timeout = file.timeout_secs.map(Duration::from_secs);
        }

        if let Some(url) = env("DHOKLA_URL") {
            config.base_url = parse_base_url(&url)?;
        }
        if let Some(dir) = env("DHOKLA_DOWNLOAD_DIR") {
            config.download_dir = PathBuf::from(dir);
        }
        if let Some(secs) = env("DHOKLA_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("invalid DHOKLA_TIMEOUT_SECS: {secs:?}"))?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

/// `<config dir>/dhokla-cli/config.json`, if the platform has a config dir.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dhokla-cli").join("config.json"))
}

/// Parse a base URL and make sure it ends with `/`, otherwise joining an
/// endpoint would replace its last path segment.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim()).with_context(|| format!("invalid base URL: {raw:?}"))?;
    if url.cannot_be_a_base() {
        anyhow::bail!("invalid base URL: {raw:?}");
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
