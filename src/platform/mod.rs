// src/platform/mod.rs — Hosting platform collaborators

pub mod github;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::GlobalConfig;
use crate::infra::errors::{Error, Result};

/// A repository hosting platform. The orchestrator drives the three lifecycle
/// phases; everything else about the platform is opaque to the core.
#[async_trait]
pub trait Platform: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Validate credentials and enrich the global config with derived fields
    /// (e.g. the commit author identity). Failures abort the run.
    async fn initialize(&self, config: &mut GlobalConfig) -> Result<()>;

    /// List the repositories the configured credentials can reach.
    async fn autodiscover(&self) -> Result<Vec<String>>;

    /// Release platform state. Called on every exit path, including after a
    /// failed initialization, so it must tolerate partial state.
    async fn finalize(&self);
}

/// Build the platform named by the config.
pub fn create(config: &GlobalConfig) -> Result<Arc<dyn Platform>> {
    match config.platform.as_str() {
        "github" => Ok(Arc::new(github::GithubPlatform::new(config)?)),
        other => Err(Error::Configuration(format!(
            "unknown platform '{other}'"
        ))),
    }
}
