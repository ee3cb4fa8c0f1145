// src/config/sources.rs — Layered configuration loading

use std::collections::HashMap;
use std::path::PathBuf;

use serde_json::{Map, Value};

use super::{merge, schema, GlobalConfig};
use crate::cli::Cli;
use crate::infra::errors::{Error, Result};
use crate::infra::paths;

/// Snapshot of the three external configuration sources. Capturing them up
/// front keeps loading deterministic and testable.
#[derive(Debug, Default)]
pub struct ConfigSources {
    /// Config file to read, already resolved (explicit `--config` path or the
    /// first default candidate that exists).
    pub file: Option<PathBuf>,
    /// Environment snapshot, filtered by `DEPKEEPER_*` names during loading.
    pub env: HashMap<String, String>,
    /// Top-priority overrides (the command line).
    pub overrides: Map<String, Value>,
}

impl ConfigSources {
    /// Capture the live process: real environment, CLI overrides, and the
    /// config file the CLI points at (or the first default candidate found in
    /// the working directory).
    pub fn from_process(cli: &Cli) -> Self {
        let file = cli.config.clone().or_else(|| {
            paths::default_config_candidates()
                .into_iter()
                .find(|candidate| candidate.exists())
        });
        Self {
            file,
            env: std::env::vars().collect(),
            overrides: cli.to_overrides(),
        }
    }
}

/// Assemble the global configuration: built-in defaults, then the config
/// file, then the environment, then CLI overrides, each layer deep-merged
/// over the previous one. Malformed input at any layer is a configuration
/// error (fatal, reported as a setup problem).
pub async fn load(sources: &ConfigSources) -> Result<GlobalConfig> {
    let mut value = serde_json::to_value(GlobalConfig::default())?;

    if let Some(path) = &sources.file {
        let text = tokio::fs::read_to_string(path).await.map_err(|err| {
            Error::Configuration(format!("cannot read config file {}: {err}", path.display()))
        })?;
        let file_value = parse_file(path, &text)?;
        merge::deep_merge(&mut value, &file_value);
    }

    let env_value = env_layer(&sources.env)?;
    merge::deep_merge(&mut value, &Value::Object(env_value));
    merge::deep_merge(&mut value, &Value::Object(sources.overrides.clone()));

    serde_json::from_value(value)
        .map_err(|err| Error::Configuration(format!("invalid configuration: {err}")))
}

fn parse_file(path: &PathBuf, text: &str) -> Result<Value> {
    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);
    let parsed: std::result::Result<Value, String> = if is_toml {
        toml::from_str(text).map_err(|err| err.to_string())
    } else {
        serde_json::from_str(text).map_err(|err| err.to_string())
    };
    parsed.map_err(|err| {
        Error::Configuration(format!("cannot parse config file {}: {err}", path.display()))
    })
}

fn env_layer(env: &HashMap<String, String>) -> Result<Map<String, Value>> {
    let mut layer = Map::new();
    for def in schema::FIELDS {
        let Some(raw) = env.get(&schema::env_var_name(def.name)) else {
            continue;
        };
        if let Some(value) = schema::parse_env_value(def, raw)? {
            layer.insert(def.name.to_string(), value);
        }
    }
    Ok(layer)
}
