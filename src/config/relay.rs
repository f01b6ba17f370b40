// src/config/relay.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use crate::relay::EndpointKind;
use crate::scrape::{default_targets, CommodityTarget};
use crate::upstream::UpstreamRequest;

pub const DEFAULT_CONFIG_PATH: &str = "config/relay.toml";
pub const ENV_CONFIG_PATH: &str = "RELAY_CONFIG_PATH";

const ENV_HOST: &str = "RELAY_HOST";
const ENV_PORT: &str = "RELAY_PORT";
const ENV_STATIC_DIR: &str = "RELAY_STATIC_DIR";
const ENV_INTL_FRESH_MS: &str = "RELAY_INTL_FRESH_MS";
const ENV_OPEN_BROWSER: &str = "RELAY_OPEN_BROWSER";

/// Copy of `config/relay.toml` baked in at build time, used when no file is found.
const EMBEDDED_CONFIG: &str = include_str!("../../config/relay.toml");

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}
fn default_true() -> bool {
    true
}
fn default_fresh_window_ms() -> u64 {
    60_000
}
fn default_min_markup_lines() -> usize {
    100
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamSettings,
    #[serde(default)]
    pub intl_metals: IntlMetalsConfig,
    pub endpoints: EndpointTable,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding `index.html`, `styles.css` and `script.js`.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    /// Open the dashboard in the default browser once the listener is up.
    #[serde(default = "default_true")]
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            open_browser: true,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn dashboard_url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamSettings {
    /// Per-request timeout. `None` keeps the transport default (no timeout).
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl UpstreamSettings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntlMetalsConfig {
    #[serde(default = "default_fresh_window_ms")]
    pub fresh_window_ms: u64,
    /// Pages shorter than this are treated as a block/captcha response.
    #[serde(default = "default_min_markup_lines")]
    pub min_markup_lines: usize,
    #[serde(default = "default_targets")]
    pub targets: Vec<CommodityTarget>,
}

impl Default for IntlMetalsConfig {
    fn default() -> Self {
        Self {
            fresh_window_ms: default_fresh_window_ms(),
            min_markup_lines: default_min_markup_lines(),
            targets: default_targets(),
        }
    }
}

impl IntlMetalsConfig {
    pub fn fresh_window(&self) -> Duration {
        Duration::from_millis(self.fresh_window_ms)
    }
}

/// Upstream request per data kind.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointTable {
    pub market_stats: UpstreamRequest,
    pub all_indices: UpstreamRequest,
    pub metals: UpstreamRequest,
    pub intl_metals: UpstreamRequest,
    pub fii_dii_react: UpstreamRequest,
    pub fii_dii_nse: UpstreamRequest,
    pub volume_gainers: UpstreamRequest,
}

impl EndpointTable {
    pub fn get(&self, kind: EndpointKind) -> &UpstreamRequest {
        match kind {
            EndpointKind::MarketStats => &self.market_stats,
            EndpointKind::AllIndices => &self.all_indices,
            EndpointKind::Metals => &self.metals,
            EndpointKind::IntlMetals => &self.intl_metals,
            EndpointKind::FiiDiiReact => &self.fii_dii_react,
            EndpointKind::FiiDiiNse => &self.fii_dii_nse,
            EndpointKind::VolumeGainers => &self.volume_gainers,
        }
    }
}

impl RelayConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: RelayConfig = toml::from_str(s).context("parsing relay config toml")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading relay config from {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("in {}", path.display()))
    }

    /// The configuration shipped with the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(EMBEDDED_CONFIG)
    }

    /// Load using env var + fallbacks:
    /// 1) $RELAY_CONFIG_PATH (must exist)
    /// 2) config/relay.toml
    /// 3) the embedded copy
    pub fn load_default() -> Result<Self> {
        if let Some(p) = get_env(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_CONFIG_PATH} points to non-existent path {}", pb.display());
            }
            return Self::load_from(&pb);
        }
        let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            return Self::load_from(&default_path);
        }
        Self::embedded()
    }

    /// Apply `RELAY_*` environment overrides on top of the file values.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(h) = get_env(ENV_HOST) {
            self.server.host = h;
        }
        if let Some(p) = get_env(ENV_PORT) {
            self.server.port = p
                .parse::<u16>()
                .map_err(|e| anyhow!("{ENV_PORT} invalid port: {e}"))?;
        }
        if let Some(d) = get_env(ENV_STATIC_DIR) {
            self.server.static_dir = PathBuf::from(d);
        }
        if let Some(ms) = get_env(ENV_INTL_FRESH_MS) {
            self.intl_metals.fresh_window_ms = ms
                .parse::<u64>()
                .map_err(|e| anyhow!("{ENV_INTL_FRESH_MS} invalid int: {e}"))?;
        }
        self.server.open_browser = get_env_bool(ENV_OPEN_BROWSER, self.server.open_browser);
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for kind in EndpointKind::ALL {
            let req = self.endpoints.get(kind);
            if req.url.trim().is_empty() {
                bail!("endpoint `{}` has an empty url", kind.config_key());
            }
        }
        if self.intl_metals.targets.is_empty() {
            bail!("intl_metals.targets must list at least one commodity");
        }
        Ok(())
    }
}

fn get_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn get_env_bool(key: &str, default: bool) -> bool {
    match get_env(key) {
        None => default,
        Some(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "y" | "on"),
    }
}
