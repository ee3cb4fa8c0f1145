// src/core/host_rules.rs — Host-scoped credential rules

use serde::{Deserialize, Serialize};

/// A host-pattern-scoped credential entry. Workers authenticate outbound
/// requests by looking rules up in the registry, never by reading raw
/// credentials from the repository config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostRule {
    /// Host category (e.g. `"github"`, `"cargo"`); `None` matches any.
    pub host_type: Option<String>,
    /// Host name the rule applies to, matched against the host itself and
    /// its subdomains; `None` matches any host.
    pub match_host: Option<String>,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl HostRule {
    fn matches(&self, host_type: Option<&str>, host: &str) -> bool {
        let type_ok = match (&self.host_type, host_type) {
            (Some(rule_type), Some(query_type)) => rule_type == query_type,
            (Some(_), None) => false,
            (None, _) => true,
        };
        let host_ok = match &self.match_host {
            Some(pattern) => host == pattern || host.ends_with(&format!(".{pattern}")),
            None => true,
        };
        type_ok && host_ok
    }

    fn specificity(&self) -> (usize, usize) {
        (
            self.match_host.as_ref().map(String::len).unwrap_or(0),
            usize::from(self.host_type.is_some()),
        )
    }
}

/// Registry of the credential rules for the repository currently being
/// processed. The orchestrator clears and repopulates it on every iteration;
/// workers only read.
#[derive(Debug, Default)]
pub struct HostRuleRegistry {
    rules: Vec<HostRule>,
}

impl HostRuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every held rule.
    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// Append one rule, preserving declaration order.
    pub fn add(&mut self, rule: HostRule) {
        self.rules.push(rule);
    }

    pub fn all(&self) -> &[HostRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The most specific rule applying to `host` (longest `match_host` wins,
    /// then typed rules over untyped; later rules win ties).
    pub fn find(&self, host_type: Option<&str>, host: &str) -> Option<&HostRule> {
        self.rules
            .iter()
            .filter(|rule| rule.matches(host_type, host))
            .max_by_key(|rule| rule.specificity())
    }

    /// Credential environment for subprocesses: each rule with a host and a
    /// token becomes `<HOST>_TOKEN` (e.g. `github.com` → `GITHUB_COM_TOKEN`).
    pub fn env_vars(&self) -> Vec<(String, String)> {
        self.rules
            .iter()
            .filter_map(|rule| match (&rule.match_host, &rule.token) {
                (Some(host), Some(token)) => Some((host_env_name(host), token.clone())),
                _ => None,
            })
            .collect()
    }
}

fn host_env_name(host: &str) -> String {
    let mut name: String = host
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    name.push_str("_TOKEN");
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rule(match_host: Option<&str>, token: &str) -> HostRule {
        HostRule {
            match_host: match_host.map(str::to_string),
            token: Some(token.to_string()),
            ..HostRule::default()
        }
    }

    #[test]
    fn clear_then_add_replaces_contents() {
        let mut registry = HostRuleRegistry::new();
        registry.add(rule(Some("crates.io"), "old"));
        registry.clear();
        registry.add(rule(Some("github.com"), "a"));
        registry.add(rule(Some("npmjs.org"), "b"));

        let hosts: Vec<_> = registry
            .all()
            .iter()
            .map(|r| r.match_host.clone().unwrap())
            .collect();
        assert_eq!(hosts, vec!["github.com".to_string(), "npmjs.org".to_string()]);
    }

    #[test]
    fn find_matches_subdomains() {
        let mut registry = HostRuleRegistry::new();
        registry.add(rule(Some("github.com"), "t"));
        assert!(registry.find(None, "api.github.com").is_some());
        assert!(registry.find(None, "github.com").is_some());
        assert!(registry.find(None, "notgithub.com").is_none());
    }

    #[test]
    fn find_prefers_most_specific_host() {
        let mut registry = HostRuleRegistry::new();
        registry.add(rule(None, "wildcard"));
        registry.add(rule(Some("github.com"), "broad"));
        registry.add(rule(Some("api.github.com"), "narrow"));

        let found = registry.find(None, "api.github.com").unwrap();
        assert_eq!(found.token.as_deref(), Some("narrow"));
    }

    #[test]
    fn find_honors_host_type() {
        let mut registry = HostRuleRegistry::new();
        registry.add(HostRule {
            host_type: Some("cargo".into()),
            token: Some("cargo-token".into()),
            ..HostRule::default()
        });
        assert!(registry.find(Some("cargo"), "crates.io").is_some());
        assert!(registry.find(Some("npm"), "crates.io").is_none());
        // Typed rules require a typed lookup.
        assert!(registry.find(None, "crates.io").is_none());
    }

    #[test]
    fn later_rule_wins_ties() {
        let mut registry = HostRuleRegistry::new();
        registry.add(rule(Some("github.com"), "first"));
        registry.add(rule(Some("github.com"), "second"));
        let found = registry.find(None, "github.com").unwrap();
        assert_eq!(found.token.as_deref(), Some("second"));
    }

    #[test]
    fn env_vars_mapping() {
        let mut registry = HostRuleRegistry::new();
        registry.add(rule(Some("github.com"), "gh-token"));
        registry.add(rule(None, "no-host"));
        registry.add(rule(Some("registry.npmjs.org"), "npm-token"));

        let env = registry.env_vars();
        assert_eq!(
            env,
            vec![
                ("GITHUB_COM_TOKEN".to_string(), "gh-token".to_string()),
                (
                    "REGISTRY_NPMJS_ORG_TOKEN".to_string(),
                    "npm-token".to_string()
                ),
            ]
        );
    }
}
