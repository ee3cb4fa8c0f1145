// src/core/orchestrator.rs — The sequential multi-repository run

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::context::RunContext;
use super::limits::Limit;
use super::worker::RepositoryWorker;
use crate::config::{self, ConfigSources, FailurePolicy, GlobalConfig, RepoEntry};
use crate::infra::errors::{Error, Result};
use crate::infra::logger::ErrorSink;
use crate::platform::{self, Platform};

type PlatformFactory = Box<dyn Fn(&GlobalConfig) -> Result<Arc<dyn Platform>> + Send + Sync>;

/// Drives one whole run: configuration load, platform initialization,
/// autodiscovery, the per-repository loop, finalization, and the exit code.
///
/// Repositories are processed strictly sequentially, in discovery order; one
/// repository fully completes before the next starts.
pub struct Orchestrator {
    worker: Arc<dyn RepositoryWorker>,
    sink: ErrorSink,
    platform_factory: PlatformFactory,
}

impl Orchestrator {
    pub fn new(worker: Arc<dyn RepositoryWorker>, sink: ErrorSink) -> Self {
        Self {
            worker,
            sink,
            platform_factory: Box::new(platform::create),
        }
    }

    /// Replace the platform factory. Primarily useful in tests.
    pub fn with_platform_factory(
        mut self,
        factory: impl Fn(&GlobalConfig) -> Result<Arc<dyn Platform>> + Send + Sync + 'static,
    ) -> Self {
        self.platform_factory = Box::new(factory);
        self
    }

    /// Run to completion and produce the process exit code: 0 when no
    /// error-level record was logged, 1 otherwise. Fatal errors abort the
    /// remainder of the run; finalization happens on every path.
    pub async fn run(&self, sources: ConfigSources) -> i32 {
        let mut platform: Option<Arc<dyn Platform>> = None;

        if let Err(err) = self.execute(&sources, &mut platform).await {
            match err {
                Error::Configuration(message) => error!("{message}"),
                err => error!("fatal error: {err}"),
            }
        }

        self.sink.clear_repository();
        if let Some(platform) = platform {
            platform.finalize().await;
        }
        debug!("depkeeper exiting");

        let errors = self.sink.collected();
        if errors.is_empty() {
            return 0;
        }
        let messages: Vec<&str> = errors.iter().map(|record| record.message.as_str()).collect();
        info!(
            errors = ?messages,
            "exiting with a non-zero code due to logged errors"
        );
        1
    }

    async fn execute(
        &self,
        sources: &ConfigSources,
        platform_slot: &mut Option<Arc<dyn Platform>>,
    ) -> Result<()> {
        let mut config = config::load(sources).await?;

        let platform = (self.platform_factory)(&config)?;
        // Record the platform before initializing so a failed initialization
        // still gets its teardown.
        *platform_slot = Some(platform.clone());
        platform.initialize(&mut config).await?;
        debug!(platform = %config.platform, "platform initialized");

        if config.autodiscover {
            self.autodiscover(platform.as_ref(), &mut config).await?;
        }

        let mut ctx = RunContext::new(&config);
        let entries = config.repositories.clone();
        for entry in &entries {
            if ctx.limits.is_exhausted(Limit::CommitsPerRun) {
                info!("maximum commits created for this run, stopping");
                break;
            }
            if let Err(err) = self.process_repository(&config, entry, &mut ctx).await {
                match config.failure_policy {
                    FailurePolicy::FailFast => return Err(err),
                    FailurePolicy::Isolate => {
                        error!(
                            repository = entry.name().unwrap_or("<unknown>"),
                            "repository processing failed: {err}"
                        );
                    }
                }
            }
            self.sink.clear_repository();
        }
        Ok(())
    }

    /// One repository, start to finish: resolve the effective config,
    /// publish it to shared state, swap the credential registry over to this
    /// repository's rules, and hand off to the worker.
    async fn process_repository(
        &self,
        global: &GlobalConfig,
        entry: &RepoEntry,
        ctx: &mut RunContext,
    ) -> Result<()> {
        let mut repo_config = config::resolve(global, entry).await?;
        self.sink.set_repository(&repo_config.repository);
        debug!(repository = %repo_config.repository, "processing repository");

        ctx.set_active_config(&repo_config);

        // Unconditional reset: a repository declaring no rules must not see
        // the previous repository's credentials.
        ctx.host_rules.clear();
        for rule in std::mem::take(&mut repo_config.host_rules) {
            ctx.host_rules.add(rule);
        }

        self.worker.process(&repo_config, ctx).await
    }

    async fn autodiscover(&self, platform: &dyn Platform, config: &mut GlobalConfig) -> Result<()> {
        let mut repositories = platform.autodiscover().await?;
        if let Some(filter) = &config.autodiscover_filter {
            let pattern = glob::Pattern::new(filter).map_err(|err| {
                Error::Configuration(format!("invalid autodiscover filter '{filter}': {err}"))
            })?;
            repositories.retain(|name| pattern.matches(name));
        }
        if repositories.is_empty() {
            warn!("autodiscovery returned no repositories");
        } else {
            info!(count = repositories.len(), "autodiscovered repositories");
        }
        config.repositories = repositories.into_iter().map(RepoEntry::Name).collect();
        Ok(())
    }
}
