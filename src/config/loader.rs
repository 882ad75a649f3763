// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::bridge::HtmlGenOptions;
use crate::config::consts::{DEFAULT_FUEL_LEVEL, MAX_FUEL_LEVEL, MIN_FUEL_LEVEL};
use crate::errors::ConfigError;
use crate::host::{DiagnosticSink, SilentSink, StdoutSink, TracingSink};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for the TapirMD bridge.
///
/// All fields are optional; an empty document yields the same behavior as
/// running without a config file.
///
/// # Fields
/// * `module` - Path to the TapirMD WASM module (optional, falls back to the embedded image)
/// * `diagnostics` - Where messages printed by the module go (optional, defaults to stdout)
/// * `fuel` - Execution budget per exported call (optional, disabled when absent)
/// * `render` - Default HTML generation options for `tmd gen` (optional)
///
/// # Example
/// ```yaml
/// module: assets/tmd.wasm
/// diagnostics: tracing
/// fuel:
///   limit: 100000000
/// render:
///   enabled_custom_apps: html
///   ident_suffix: "-doc"
///   render_root: false
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct BridgeConfig {
    pub module: Option<PathBuf>,
    #[serde(default)]
    pub diagnostics: DiagnosticsMode,
    pub fuel: Option<FuelConfig>,
    #[serde(default)]
    pub render: RenderConfig,
}

impl BridgeConfig {
    /// Fuel granted to every exported call, or `None` when metering is off.
    pub fn fuel_limit(&self) -> Option<u64> {
        self.fuel.as_ref().map(FuelConfig::resolved)
    }
}

/// Destination for diagnostics printed by the module through `env.print`.
///
/// # Variants
/// * `Stdout` - Write each message as a line on standard output
/// * `Tracing` - Emit each message as an `info!` event
/// * `Silent` - Discard messages
#[derive(Debug, Default, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticsMode {
    #[default]
    Stdout,
    Tracing,
    Silent,
}

impl DiagnosticsMode {
    /// Build the sink this mode selects.
    pub fn sink(self) -> Box<dyn DiagnosticSink> {
        match self {
            DiagnosticsMode::Stdout => Box::new(StdoutSink),
            DiagnosticsMode::Tracing => Box::new(TracingSink),
            DiagnosticsMode::Silent => Box::new(SilentSink),
        }
    }
}

/// Fuel consumption configuration for exported calls.
///
/// Fuel limits the number of instructions the module may execute in a single
/// call. The store is refueled before every call, so the limit applies per
/// call rather than per instance.
///
/// # Example
/// ```yaml
/// fuel:
///   limit: 100000000   # 100 million instructions
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct FuelConfig {
    pub limit: Option<u64>,
}

impl FuelConfig {
    /// Get the configured limit, clamped to the allowed bounds.
    ///
    /// # Example
    /// ```
    /// use tmd_bridge::config::FuelConfig;
    ///
    /// let config = FuelConfig { limit: Some(10) };
    /// assert_eq!(config.resolved(), 1_000_000); // Clamped to minimum
    /// ```
    pub fn resolved(&self) -> u64 {
        let requested = self.limit.unwrap_or(DEFAULT_FUEL_LEVEL);
        let clamped = requested.clamp(MIN_FUEL_LEVEL, MAX_FUEL_LEVEL);
        if clamped != requested {
            tracing::warn!(
                "Fuel limit {} outside [{}, {}], using {}",
                requested,
                MIN_FUEL_LEVEL,
                MAX_FUEL_LEVEL,
                clamped
            );
        }
        clamped
    }
}

/// Default HTML generation options applied by `tmd gen`.
///
/// Unset fields fall back to what the command line tool has always used:
/// no custom apps, empty suffixes, and the root block rendered.
#[derive(Debug, Default, Deserialize)]
pub struct RenderConfig {
    pub enabled_custom_apps: Option<String>,
    pub ident_suffix: Option<String>,
    pub auto_ident_suffix: Option<String>,
    pub render_root: Option<bool>,
}

impl RenderConfig {
    pub fn to_options(&self) -> HtmlGenOptions {
        HtmlGenOptions {
            enabled_custom_apps: self.enabled_custom_apps.clone().unwrap_or_default(),
            ident_suffix: self.ident_suffix.clone().unwrap_or_default(),
            auto_ident_suffix: self.auto_ident_suffix.clone().unwrap_or_default(),
            render_root: self.render_root.unwrap_or(true),
        }
    }
}

/// Load a config file, picking the format from its extension.
///
/// `.json` files are parsed as JSON, `.toml` files as TOML, everything else
/// as YAML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BridgeConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        }),
        Some("toml") => toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        }),
        _ => parse_yaml(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse_yaml(content: &str) -> Result<BridgeConfig, serde_yaml::Error> {
    // serde_yaml rejects an empty document instead of applying defaults
    if content.trim().is_empty() {
        return Ok(BridgeConfig::default());
    }
    serde_yaml::from_str(content)
}
