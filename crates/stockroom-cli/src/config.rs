// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use stockroom_app::{InventoryColumn, SortDirection, SortState, SubmitPolicy};
use tracing_subscriber::EnvFilter;

pub const APP_NAME: &str = "stockroom";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_API_TIMEOUT: &str = "5s";
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_API_BASE_URL.to_owned()),
            timeout: Some(DEFAULT_API_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
    pub submit_policy: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("STOCKROOM_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set STOCKROOM_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` and put values under [api], [ui], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Run `stockroom --print-example-config` for a template",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.api_base_url().is_empty() {
            bail!("api.base_url in {} must not be empty", path.display());
        }

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)
                .with_context(|| format!("api.timeout in {}", path.display()))?;
            if parsed.is_zero() {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        self.sort_state()
            .with_context(|| format!("invalid [ui] sort settings in {}", path.display()))?;
        self.submit_policy()
            .with_context(|| format!("invalid [ui] submit_policy in {}", path.display()))?;

        if let Some(level) = &self.log.level {
            EnvFilter::try_new(level).map_err(|error| {
                anyhow!(
                    "log.level {:?} in {} is not a valid filter ({}); try \"warn\" or \"stockroom_app=debug\"",
                    level,
                    path.display(),
                    error
                )
            })?;
        }

        Ok(())
    }

    pub fn api_base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn api_timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_API_TIMEOUT))
    }

    pub fn sort_state(&self) -> Result<SortState> {
        let direction = match self.ui.sort_direction.as_deref() {
            None => SortDirection::Asc,
            Some(raw) => SortDirection::parse(raw).ok_or_else(|| {
                anyhow!("unknown sort_direction {raw:?}; use \"asc\" or \"desc\"")
            })?,
        };
        let Some(raw) = self.ui.sort_by.as_deref() else {
            return Ok(SortState {
                order_by: None,
                direction,
            });
        };
        let column = InventoryColumn::parse(raw).ok_or_else(|| {
            let known = InventoryColumn::ALL
                .iter()
                .map(|column| column.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            anyhow!("unknown sort_by {raw:?}; use one of: {known}")
        })?;
        Ok(SortState::by(column, direction))
    }

    pub fn submit_policy(&self) -> Result<SubmitPolicy> {
        match self.ui.submit_policy.as_deref() {
            None => Ok(SubmitPolicy::default()),
            Some(raw) => SubmitPolicy::parse(raw).ok_or_else(|| {
                anyhow!("unknown submit_policy {raw:?}; use \"dirty\" or \"dirty-and-valid\"")
            }),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log.file {
            return Ok(PathBuf::from(path));
        }
        let data_root = dirs::data_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].file in the config")
        })?;
        Ok(data_root.join(APP_NAME).join("stockroom.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# stockroom config\n# Place this file at: {}\n\nversion = 1\n\n[api]\nbase_url = \"{}\"\ntimeout = \"{}\"\n\n[ui]\n# Optional initial sort: name, productType, description, averagePrice, amount,\n# unitOfMeasurement or bestBeforeDate\n# sort_by = \"name\"\nsort_direction = \"asc\"\n# dirty: save is enabled once anything changed\n# dirty-and-valid: save also waits for the required fields\nsubmit_policy = \"dirty\"\n\n[log]\nlevel = \"{}\"\n# Optional. Default is the platform data dir (for example ~/.local/share/stockroom/stockroom.log)\n# file = \"/absolute/path/to/stockroom.log\"\n",
            path.display(),
            DEFAULT_API_BASE_URL,
            DEFAULT_API_TIMEOUT,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}
