//! Controller configuration, read from TOML.
//!
//! Lookup order: an explicit `--config` path, then
//! `<config dir>/sackbut/config.toml`, then the embedded `config.toml`.
//! Every section is optional and every key inside it too; a file that cannot
//! be read or parsed is logged and the embedded defaults are used instead.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use sackbut_engine::EngineConfig;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

/// Longest accepted cycle period.
const MAX_CYCLE_PERIOD_MS: u64 = 1_000;

// ════════════════════════════════════════════════════════════════════════════
// Sections
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ControllerSection {
    pub cycle_period_ms: u64,
}

impl Default for ControllerSection {
    fn default() -> Self {
        ControllerSection { cycle_period_ms: 50 }
    }
}

/// Where events are sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    #[default]
    Midi,
    Debug,
    Null,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub transport:   TransportKind,
    /// Case-insensitive substring of the preferred port name; empty = first.
    pub port:        String,
    pub client_name: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        OutputSection {
            transport:   TransportKind::Midi,
            port:        String::new(),
            client_name: "sackbut".to_string(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Config
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub controller: ControllerSection,
    pub output:     OutputSection,
    #[serde(flatten)]
    pub engine:     EngineConfig,
}

impl Config {
    /// Resolve and load the configuration. Never fails: problems are logged
    /// and the embedded defaults are used.
    pub fn load(explicit: Option<&Path>) -> Self {
        let base = Self::embedded();

        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match user_config_path() {
                Some(p) if p.exists() => p,
                _ => {
                    log::info!(target: "config", "using built-in configuration");
                    return base;
                }
            },
        };

        match Self::from_file(&path) {
            Ok(cfg) => {
                log::info!(target: "config", "loaded {}", path.display());
                cfg
            }
            Err(e) => {
                log::warn!(target: "config", "ignoring config {}: {}", path.display(), e);
                base
            }
        }
    }

    /// The configuration shipped inside the binary.
    pub fn embedded() -> Self {
        Self::from_toml(DEFAULT_CONFIG).unwrap_or_else(|e| {
            log::warn!(target: "config", "embedded config.toml is invalid: {}", e);
            Config::default()
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, String> {
        let cfg: Config = toml::from_str(text).map_err(|e| e.to_string())?;
        Ok(cfg.sanitized())
    }

    fn sanitized(mut self) -> Self {
        let ms = self.controller.cycle_period_ms.clamp(1, MAX_CYCLE_PERIOD_MS);
        if ms != self.controller.cycle_period_ms {
            log::warn!(target: "config",
                "cycle_period_ms = {} out of range, using {}", self.controller.cycle_period_ms, ms);
            self.controller.cycle_period_ms = ms;
        }
        self
    }

    pub fn cycle_period(&self) -> Duration {
        Duration::from_millis(self.controller.cycle_period_ms)
    }

    /// The configured port preference, if any.
    pub fn port_hint(&self) -> Option<&str> {
        let p = self.output.port.trim();
        (!p.is_empty()).then_some(p)
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sackbut").join("config.toml"))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
