// src/platform/github.rs — GitHub platform implementation

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::Platform;
use crate::config::GlobalConfig;
use crate::infra::errors::{Error, Result};

const DEFAULT_ENDPOINT: &str = "https://api.github.com";
const PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct GithubUser {
    login: String,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct GithubRepo {
    full_name: String,
}

#[derive(Debug)]
pub struct GithubPlatform {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl GithubPlatform {
    pub fn new(config: &GlobalConfig) -> Result<Self> {
        let token = config.token.clone().ok_or_else(|| {
            Error::Configuration(
                "a personal access token is required for the github platform".into(),
            )
        })?;
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.into())
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            token,
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(format!("{}{}", self.endpoint, path))
            .header("authorization", format!("token {}", self.token))
            .header("user-agent", "depkeeper")
            .header("accept", "application/vnd.github.v3+json")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Configuration(
                "github rejected the configured token (401)".into(),
            ));
        }
        if !status.is_success() {
            return Err(Error::Platform {
                platform: "github".into(),
                message: format!("GET {path} returned {status}"),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Platform for GithubPlatform {
    fn name(&self) -> &str {
        "github"
    }

    async fn initialize(&self, config: &mut GlobalConfig) -> Result<()> {
        let user: GithubUser = self.get("/user").await?;
        debug!(login = %user.login, "github token validated");
        if config.git_author.is_none() {
            config.git_author = Some(format!(
                "{login} <{id}+{login}@users.noreply.github.com>",
                login = user.login,
                id = user.id,
            ));
        }
        Ok(())
    }

    async fn autodiscover(&self) -> Result<Vec<String>> {
        let mut repositories = Vec::new();
        let mut page = 1;
        loop {
            let batch: Vec<GithubRepo> = self
                .get(&format!("/user/repos?per_page={PAGE_SIZE}&page={page}"))
                .await?;
            let batch_len = batch.len();
            repositories.extend(batch.into_iter().map(|repo| repo.full_name));
            if batch_len < PAGE_SIZE {
                break;
            }
            page += 1;
        }
        Ok(repositories)
    }

    async fn finalize(&self) {
        debug!("github platform teardown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_defaults_and_trims_trailing_slash() {
        let platform = GithubPlatform::new(&GlobalConfig {
            token: Some("t".into()),
            ..GlobalConfig::default()
        })
        .unwrap();
        assert_eq!(platform.endpoint, DEFAULT_ENDPOINT);

        let platform = GithubPlatform::new(&GlobalConfig {
            token: Some("t".into()),
            endpoint: Some("https://github.example.com/api/v3/".into()),
            ..GlobalConfig::default()
        })
        .unwrap();
        assert_eq!(platform.endpoint, "https://github.example.com/api/v3");
    }

    #[test]
    fn missing_token_is_a_configuration_error() {
        let err = GithubPlatform::new(&GlobalConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
