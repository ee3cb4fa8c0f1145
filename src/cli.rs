// src/cli.rs — CLI definition (clap derive)

use std::path::PathBuf;

use clap::Parser;
use serde_json::{Map, Value};

use crate::config::FailurePolicy;

#[derive(Parser, Debug)]
#[command(
    name = "depkeeper",
    about = "Sequential multi-repository update orchestrator",
    version
)]
pub struct Cli {
    /// Repositories to process (overrides the configured list)
    pub repositories: Vec<String>,

    /// Config file path (depkeeper.toml / depkeeper.json in the working
    /// directory by default)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Hosting platform (currently: github)
    #[arg(long)]
    pub platform: Option<String>,

    /// Platform API endpoint (for self-hosted installations)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Platform access token
    #[arg(long)]
    pub token: Option<String>,

    /// Base working directory for repository checkouts
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Discover processable repositories from the platform
    #[arg(long)]
    pub autodiscover: bool,

    /// Glob filter applied to autodiscovered repository names
    #[arg(long)]
    pub autodiscover_filter: Option<String>,

    /// Log planned work without executing update commands
    #[arg(long)]
    pub dry_run: bool,

    /// Maximum commits to create during this run
    #[arg(long)]
    pub commits_per_run: Option<u64>,

    /// What to do with the rest of the run when one repository fails
    #[arg(long, value_enum)]
    pub failure_policy: Option<FailurePolicy>,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Arguments as the top configuration layer. Flags the user did not pass
    /// are left out so lower layers keep their values.
    pub fn to_overrides(&self) -> Map<String, Value> {
        let mut overrides = Map::new();
        if !self.repositories.is_empty() {
            overrides.insert(
                "repositories".into(),
                Value::Array(
                    self.repositories
                        .iter()
                        .map(|name| Value::String(name.clone()))
                        .collect(),
                ),
            );
        }
        if let Some(platform) = &self.platform {
            overrides.insert("platform".into(), Value::String(platform.clone()));
        }
        if let Some(endpoint) = &self.endpoint {
            overrides.insert("endpoint".into(), Value::String(endpoint.clone()));
        }
        if let Some(token) = &self.token {
            overrides.insert("token".into(), Value::String(token.clone()));
        }
        if let Some(base_dir) = &self.base_dir {
            overrides.insert(
                "base_dir".into(),
                Value::String(base_dir.to_string_lossy().into_owned()),
            );
        }
        if self.autodiscover {
            overrides.insert("autodiscover".into(), Value::Bool(true));
        }
        if let Some(filter) = &self.autodiscover_filter {
            overrides.insert("autodiscover_filter".into(), Value::String(filter.clone()));
        }
        if self.dry_run {
            overrides.insert("dry_run".into(), Value::Bool(true));
        }
        if let Some(max) = self.commits_per_run {
            overrides.insert("commits_per_run".into(), Value::Number(max.into()));
        }
        if let Some(policy) = self.failure_policy {
            if let Ok(value) = serde_json::to_value(policy) {
                overrides.insert("failure_policy".into(), value);
            }
        }
        overrides
    }
}
