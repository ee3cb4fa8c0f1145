// src/config/mod.rs — Configuration model

pub mod merge;
pub mod resolve;
pub mod schema;
pub mod sources;

pub use resolve::resolve;
pub use sources::{load, ConfigSources};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::host_rules::HostRule;
use crate::infra::paths;

/// What happens to the rest of the run when one repository fails.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the whole run on the first repository failure.
    #[default]
    FailFast,
    /// Log the failure at error level and continue with the next repository.
    Isolate,
}

/// The resolved top-level configuration, assembled from defaults, the config
/// file, the environment and the command line. Mutated in place as
/// initialization phases fill derived fields (platform enrichment,
/// autodiscovered repository list).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub platform: String,
    pub endpoint: Option<String>,
    pub token: Option<String>,
    /// Commit author identity, filled in by platform initialization when unset.
    pub git_author: Option<String>,
    pub base_dir: PathBuf,
    pub repositories: Vec<RepoEntry>,
    pub autodiscover: bool,
    pub autodiscover_filter: Option<String>,
    pub dry_run: bool,
    /// Run-wide budget for commits created; absent means unlimited.
    pub commits_per_run: Option<u64>,
    pub failure_policy: FailurePolicy,
    pub host_rules: Vec<HostRule>,
    pub schedule: Vec<String>,
    pub labels: Vec<String>,
    pub branch_prefix: String,
    pub enabled: bool,
    /// Shell command the bundled worker runs inside each repository checkout.
    pub update_command: Option<String>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            platform: "github".into(),
            endpoint: None,
            token: None,
            git_author: None,
            base_dir: paths::default_base_dir(),
            repositories: Vec::new(),
            autodiscover: false,
            autodiscover_filter: None,
            dry_run: false,
            commits_per_run: None,
            failure_policy: FailurePolicy::default(),
            host_rules: Vec::new(),
            schedule: Vec::new(),
            labels: Vec::new(),
            branch_prefix: "depkeeper/".into(),
            enabled: true,
            update_command: None,
        }
    }
}

/// One configured repository: either a bare `"org/name"` string or an object
/// carrying `repository` plus per-repository overrides for any
/// repository-scope field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepoEntry {
    Name(String),
    Detailed(Map<String, Value>),
}

impl RepoEntry {
    /// The repository identifier, if the entry carries one.
    pub fn name(&self) -> Option<&str> {
        match self {
            RepoEntry::Name(name) => Some(name),
            RepoEntry::Detailed(map) => map.get("repository").and_then(Value::as_str),
        }
    }

    /// The entry as an override map for deep-merging over the global config.
    pub(crate) fn overrides(&self) -> Map<String, Value> {
        match self {
            RepoEntry::Name(name) => {
                let mut map = Map::new();
                map.insert("repository".into(), Value::String(name.clone()));
                map
            }
            RepoEntry::Detailed(map) => map.clone(),
        }
    }
}

/// The effective configuration for one repository: global config deep-merged
/// with the entry's overrides, augmented with the derived checkout directory
/// and filtered down to repository-scope fields. Created fresh per iteration
/// and dropped when the repository completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    pub repository: String,
    pub local_dir: PathBuf,
    pub platform: String,
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub git_author: Option<String>,
    pub dry_run: bool,
    /// Populated from config during resolution, then drained into the
    /// credential registry before the worker sees this struct.
    pub host_rules: Vec<HostRule>,
    pub schedule: Vec<String>,
    pub labels: Vec<String>,
    pub branch_prefix: String,
    pub enabled: bool,
    pub update_command: Option<String>,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            repository: String::new(),
            local_dir: PathBuf::new(),
            platform: "github".into(),
            endpoint: None,
            token: None,
            git_author: None,
            dry_run: false,
            host_rules: Vec::new(),
            schedule: Vec::new(),
            labels: Vec::new(),
            branch_prefix: "depkeeper/".into(),
            enabled: true,
            update_command: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn repo_entry_deserializes_from_bare_string() {
        let entry: RepoEntry = serde_json::from_str("\"org/app\"").unwrap();
        assert_eq!(entry.name(), Some("org/app"));
    }

    #[test]
    fn repo_entry_deserializes_from_object() {
        let entry: RepoEntry =
            serde_json::from_str(r#"{"repository": "org/app", "labels": ["deps"]}"#).unwrap();
        assert_eq!(entry.name(), Some("org/app"));
        let overrides = entry.overrides();
        assert_eq!(overrides["labels"], serde_json::json!(["deps"]));
    }

    #[test]
    fn bare_entry_overrides_carry_only_repository() {
        let entry = RepoEntry::Name("org/app".into());
        let overrides = entry.overrides();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides["repository"], Value::String("org/app".into()));
    }

    #[test]
    fn failure_policy_serde_names() {
        assert_eq!(
            serde_json::to_value(FailurePolicy::FailFast).unwrap(),
            Value::String("fail-fast".into())
        );
        let policy: FailurePolicy = serde_json::from_str("\"isolate\"").unwrap();
        assert_eq!(policy, FailurePolicy::Isolate);
    }

    #[test]
    fn global_defaults() {
        let config = GlobalConfig::default();
        assert_eq!(config.platform, "github");
        assert!(config.enabled);
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
        assert!(config.commits_per_run.is_none());
        assert_eq!(config.branch_prefix, "depkeeper/");
    }
}
