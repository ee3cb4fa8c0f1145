// src/core/worker.rs — Per-repository work unit

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, info};

use super::context::RunContext;
use super::limits::Limit;
use crate::config::RepoConfig;
use crate::infra::errors::{Error, Result};

/// The unit of work the orchestration loop invokes for each repository.
///
/// Implementations read shared state (credential rules, budgets) through
/// `ctx`; registry and active-config mutation stays with the orchestrator.
/// An `Err` is a fatal failure for the repository and, under the fail-fast
/// policy, for the whole run; recoverable problems should be logged at error
/// level instead (they flip the exit code without stopping the loop).
#[async_trait]
pub trait RepositoryWorker: Send + Sync {
    async fn process(&self, config: &RepoConfig, ctx: &mut RunContext) -> Result<()>;
}

/// Bundled worker: runs the configured `update_command` through `sh -c`
/// inside the repository checkout, with the registry's credential variables
/// in the environment. A successful run is assumed to create at most one
/// commit and charges the commits budget accordingly.
pub struct CommandWorker;

#[async_trait]
impl RepositoryWorker for CommandWorker {
    async fn process(&self, config: &RepoConfig, ctx: &mut RunContext) -> Result<()> {
        if !config.enabled {
            debug!(repository = %config.repository, "repository is disabled, skipping");
            return Ok(());
        }
        let Some(command) = &config.update_command else {
            debug!(repository = %config.repository, "no update command configured, skipping");
            return Ok(());
        };
        if config.dry_run {
            info!(
                repository = %config.repository,
                command = %command,
                "dry run: would execute update command"
            );
            return Ok(());
        }

        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(&config.local_dir)
            .envs(ctx.host_rules.env_vars())
            .output()
            .await
            .map_err(|err| Error::Worker {
                repository: config.repository.clone(),
                message: format!("failed to spawn update command: {err}"),
            })?;

        if output.status.success() {
            ctx.limits.consume(Limit::CommitsPerRun, 1);
            info!(repository = %config.repository, "update command completed");
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(
                repository = %config.repository,
                code = output.status.code(),
                "update command failed: {}",
                stderr.trim()
            );
        }
        Ok(())
    }
}
