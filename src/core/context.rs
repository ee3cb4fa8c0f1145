// src/core/context.rs — Per-run shared state

use std::path::PathBuf;

use super::host_rules::HostRuleRegistry;
use super::limits::{Limit, Limits};
use crate::config::{GlobalConfig, RepoConfig};

/// Subset of the active repository's configuration that shared utilities
/// need between resolution and worker completion.
#[derive(Debug, Clone)]
pub struct ActiveConfig {
    pub repository: String,
    pub local_dir: PathBuf,
    pub dry_run: bool,
}

/// Everything the loop shares with workers: run budgets, the credential rule
/// registry and the active-config slot. One instance lives for the whole
/// run; exactly one repository's data occupies the registry and the slot at
/// any time, and only the orchestrator writes them.
pub struct RunContext {
    pub limits: Limits,
    pub host_rules: HostRuleRegistry,
    active: Option<ActiveConfig>,
}

impl RunContext {
    pub fn new(config: &GlobalConfig) -> Self {
        let mut limits = Limits::new();
        if let Some(max) = config.commits_per_run {
            limits.set(Limit::CommitsPerRun, max);
        }
        Self {
            limits,
            host_rules: HostRuleRegistry::new(),
            active: None,
        }
    }

    /// Publish the repository about to be processed to shared state.
    pub fn set_active_config(&mut self, config: &RepoConfig) {
        self.active = Some(ActiveConfig {
            repository: config.repository.clone(),
            local_dir: config.local_dir.clone(),
            dry_run: config.dry_run,
        });
    }

    pub fn active_config(&self) -> Option<&ActiveConfig> {
        self.active.as_ref()
    }
}
