use std::time::Duration;

use async_trait::async_trait;
use eyre::{bail, Result, WrapErr};
use log::debug;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::Deserialize;
use types::error::Error;

use crate::domain::identity::RemoteIdentity;
use crate::provider::IdentityProvider;

const PROVIDER_NAME: &str = "github";
const USER_AGENT: &str = "tomatoes-session-api";
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    id: u64,
    login: String,
    name: Option<String>,
    email: Option<String>,
}

impl From<GithubUser> for RemoteIdentity {
    fn from(user: GithubUser) -> Self {
        RemoteIdentity {
            provider: PROVIDER_NAME.to_string(),
            uid: user.id.to_string(),
            name: user.name.filter(|name| !name.is_empty()).unwrap_or(user.login),
            email: user.email,
        }
    }
}

impl GithubClient {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(GithubClient {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl IdentityProvider for GithubClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<RemoteIdentity> {
        let url = format!("{}/user", self.api_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .send()
            .await
            .wrap_err_with(|| format!("request to {} failed", url))?;

        let status = response.status();
        debug!("github responded {} for {}", status, url);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => bail!(Error::AuthenticationFailed),
            status if !status.is_success() => bail!("unexpected github status {}", status),
            _ => {}
        }

        let user: GithubUser = response
            .json()
            .await
            .wrap_err("malformed github user payload")?;
        Ok(user.into())
    }
}
