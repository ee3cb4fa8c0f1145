// src/config/resolve.rs — Per-repository configuration resolution

use serde_json::Value;

use super::{merge, schema, GlobalConfig, RepoConfig, RepoEntry};
use crate::infra::errors::{Error, Result};

/// Resolve the effective configuration for one repository.
///
/// The entry's overrides are deep-merged over the global config, the checkout
/// directory `<base_dir>/repos/<platform>/<repository>` is derived from the
/// pre-merge base dir and created on disk, `base_dir` is removed, and the
/// result is filtered down to repository-scope fields.
pub async fn resolve(global: &GlobalConfig, entry: &RepoEntry) -> Result<RepoConfig> {
    let repository = entry
        .name()
        .ok_or_else(|| {
            Error::Configuration("repository entry is missing the 'repository' field".into())
        })?
        .to_string();

    let mut merged = serde_json::to_value(global)?;
    merge::deep_merge(&mut merged, &Value::Object(entry.overrides()));
    let Value::Object(mut fields) = merged else {
        return Err(Error::Configuration(
            "global configuration did not serialize to an object".into(),
        ));
    };

    let platform = fields
        .get("platform")
        .and_then(Value::as_str)
        .unwrap_or(&global.platform)
        .to_string();
    let local_dir = global
        .base_dir
        .join("repos")
        .join(&platform)
        .join(&repository);
    tokio::fs::create_dir_all(&local_dir).await?;

    fields.remove("base_dir");
    fields.insert("local_dir".into(), serde_json::to_value(&local_dir)?);
    schema::filter_repository_scope(&mut fields);

    Ok(serde_json::from_value(Value::Object(fields))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host_rules::HostRule;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn global_in(dir: &tempfile::TempDir) -> GlobalConfig {
        GlobalConfig {
            base_dir: dir.path().to_path_buf(),
            ..GlobalConfig::default()
        }
    }

    fn detailed(value: Value) -> RepoEntry {
        let Value::Object(map) = value else {
            panic!("detailed entry must be an object")
        };
        RepoEntry::Detailed(map)
    }

    #[tokio::test]
    async fn local_dir_is_derived_and_created() {
        let dir = tempfile::tempdir().unwrap();
        let global = global_in(&dir);

        let resolved = resolve(&global, &RepoEntry::Name("org/app".into()))
            .await
            .unwrap();

        let expected = dir.path().join("repos").join("github").join("org/app");
        assert_eq!(resolved.local_dir, expected);
        assert!(expected.is_dir());
    }

    #[tokio::test]
    async fn resolution_is_idempotent_for_existing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let global = global_in(&dir);
        let entry = RepoEntry::Name("org/app".into());

        resolve(&global, &entry).await.unwrap();
        let second = resolve(&global, &entry).await.unwrap();
        assert_eq!(second.repository, "org/app");
    }

    #[tokio::test]
    async fn overrides_win_and_arrays_replace() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalConfig {
            labels: vec!["global".into()],
            dry_run: false,
            ..global_in(&dir)
        };
        let entry = detailed(json!({
            "repository": "org/app",
            "dry_run": true,
            "labels": ["override"],
        }));

        let resolved = resolve(&global, &entry).await.unwrap();
        assert!(resolved.dry_run);
        assert_eq!(resolved.labels, vec!["override".to_string()]);
    }

    #[tokio::test]
    async fn global_only_fields_are_filtered_out() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalConfig {
            repositories: vec![RepoEntry::Name("org/app".into())],
            commits_per_run: Some(5),
            ..global_in(&dir)
        };

        let resolved = resolve(&global, &RepoEntry::Name("org/app".into()))
            .await
            .unwrap();
        let value = serde_json::to_value(&resolved).unwrap();
        let fields = value.as_object().unwrap();
        assert!(!fields.contains_key("base_dir"));
        assert!(!fields.contains_key("repositories"));
        assert!(!fields.contains_key("commits_per_run"));
    }

    #[tokio::test]
    async fn host_rules_are_inherited_from_global() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalConfig {
            host_rules: vec![HostRule {
                match_host: Some("crates.io".into()),
                token: Some("global-token".into()),
                ..HostRule::default()
            }],
            ..global_in(&dir)
        };

        let resolved = resolve(&global, &RepoEntry::Name("org/app".into()))
            .await
            .unwrap();
        assert_eq!(resolved.host_rules.len(), 1);
        assert_eq!(resolved.host_rules[0].match_host.as_deref(), Some("crates.io"));
    }

    #[tokio::test]
    async fn repo_host_rules_replace_global_ones() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalConfig {
            host_rules: vec![HostRule {
                match_host: Some("crates.io".into()),
                ..HostRule::default()
            }],
            ..global_in(&dir)
        };
        let entry = detailed(json!({
            "repository": "org/app",
            "host_rules": [{"match_host": "npmjs.org", "token": "t"}],
        }));

        let resolved = resolve(&global, &entry).await.unwrap();
        assert_eq!(resolved.host_rules.len(), 1);
        assert_eq!(resolved.host_rules[0].match_host.as_deref(), Some("npmjs.org"));
    }

    #[tokio::test]
    async fn entry_without_repository_field_fails() {
        let dir = tempfile::tempdir().unwrap();
        let global = global_in(&dir);
        let entry = detailed(json!({"labels": ["deps"]}));

        let err = resolve(&global, &entry).await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[tokio::test]
    async fn directory_collision_with_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let global = global_in(&dir);
        std::fs::create_dir_all(dir.path().join("repos").join("github")).unwrap();
        std::fs::write(dir.path().join("repos").join("github").join("org"), b"x").unwrap();

        let err = resolve(&global, &RepoEntry::Name("org/app".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
