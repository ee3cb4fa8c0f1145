// src/config/schema.rs — Field registry: kinds, scopes, env mapping

use serde_json::{Map, Value};

use crate::infra::errors::{Error, Result};

/// Where a field may appear. `Global` fields are stripped from resolved
/// per-repository configs; `Repository` fields survive resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Global,
    Repository,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Bool,
    Integer,
    Str,
    StringList,
    ObjectList,
}

pub struct FieldDef {
    pub name: &'static str,
    pub kind: Kind,
    pub scope: Scope,
}

const fn field(name: &'static str, kind: Kind, scope: Scope) -> FieldDef {
    FieldDef { name, kind, scope }
}

/// Every config field depkeeper understands. Drives repository-scope
/// filtering and environment variable mapping.
pub const FIELDS: &[FieldDef] = &[
    field("repository", Kind::Str, Scope::Repository),
    field("local_dir", Kind::Str, Scope::Repository),
    field("platform", Kind::Str, Scope::Repository),
    field("endpoint", Kind::Str, Scope::Repository),
    field("token", Kind::Str, Scope::Repository),
    field("git_author", Kind::Str, Scope::Repository),
    field("base_dir", Kind::Str, Scope::Global),
    field("repositories", Kind::StringList, Scope::Global),
    field("autodiscover", Kind::Bool, Scope::Global),
    field("autodiscover_filter", Kind::Str, Scope::Global),
    field("dry_run", Kind::Bool, Scope::Repository),
    field("commits_per_run", Kind::Integer, Scope::Global),
    field("failure_policy", Kind::Str, Scope::Global),
    field("host_rules", Kind::ObjectList, Scope::Repository),
    field("schedule", Kind::StringList, Scope::Repository),
    field("labels", Kind::StringList, Scope::Repository),
    field("branch_prefix", Kind::Str, Scope::Repository),
    field("enabled", Kind::Bool, Scope::Repository),
    field("update_command", Kind::Str, Scope::Repository),
];

pub fn lookup(name: &str) -> Option<&'static FieldDef> {
    FIELDS.iter().find(|def| def.name == name)
}

pub fn is_repository_scope(name: &str) -> bool {
    matches!(
        lookup(name),
        Some(FieldDef {
            scope: Scope::Repository,
            ..
        })
    )
}

/// Drop every field not valid at repository scope, including fields the
/// schema does not know at all.
pub fn filter_repository_scope(fields: &mut Map<String, Value>) {
    fields.retain(|name, _| is_repository_scope(name));
}

/// Environment variable carrying a field's value, e.g. `base_dir` →
/// `DEPKEEPER_BASE_DIR`.
pub fn env_var_name(field: &str) -> String {
    format!("DEPKEEPER_{}", field.to_ascii_uppercase())
}

/// Parse an environment value according to the field's declared kind.
/// String lists are comma-separated; object lists are not env-sourced.
pub fn parse_env_value(def: &FieldDef, raw: &str) -> Result<Option<Value>> {
    let value = match def.kind {
        Kind::Bool => match raw {
            "1" | "true" | "yes" => Value::Bool(true),
            "0" | "false" | "no" => Value::Bool(false),
            other => {
                return Err(Error::Configuration(format!(
                    "invalid boolean '{other}' in {}",
                    env_var_name(def.name)
                )))
            }
        },
        Kind::Integer => {
            let parsed: u64 = raw.parse().map_err(|_| {
                Error::Configuration(format!(
                    "invalid integer '{raw}' in {}",
                    env_var_name(def.name)
                ))
            })?;
            Value::Number(parsed.into())
        }
        Kind::Str => Value::String(raw.to_string()),
        Kind::StringList => Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| Value::String(part.to_string()))
                .collect(),
        ),
        Kind::ObjectList => return Ok(None),
    };
    Ok(Some(value))
}
