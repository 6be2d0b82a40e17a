use eyre::{eyre, Result};
use log::debug;
use reqwest::Client as ReqwestClient;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use types::domain::{CreateSessionRequest, SessionResponse, UserProfile};
use types::error::{Error, ErrorBody};

const BASE_URL: &str = "http://localhost:8080";

pub struct Client {
    pub client: ReqwestClient,
    pub base_url: String,
    pub token: Option<String>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: ReqwestClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Exchanges a provider access token for a session token and keeps it.
    pub async fn login(&mut self, provider: &str, access_token: &str) -> Result<SessionResponse> {
        let url = format!("{}/api/session", self.base_url);
        let request = CreateSessionRequest {
            provider: provider.to_string(),
            access_token: access_token.to_string(),
        };
        let response = self.client.post(url).json(&request).send().await?;
        let session: SessionResponse = match response.status() {
            StatusCode::OK | StatusCode::CREATED => response.json().await?,
            _ => return Err(error_from(response).await),
        };
        self.token = Some(session.token.clone());
        Ok(session)
    }

    pub async fn logout(&mut self) -> Result<()> {
        let token = self.token.clone().ok_or_else(|| eyre!("No token"))?;
        let url = format!("{}/api/session", self.base_url);
        let response = self
            .client
            .delete(url)
            .query(&[("token", token.as_str())])
            .send()
            .await?;
        match response.status() {
            StatusCode::NO_CONTENT => {
                self.token = None;
                Ok(())
            }
            _ => Err(error_from(response).await),
        }
    }

    pub async fn get_profile(&self) -> Result<UserProfile> {
        let token = self.token.clone().ok_or_else(|| eyre!("No token"))?;
        let url = format!("{}/api/user", self.base_url);
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;
        parse_ok(response).await
    }
}

async fn parse_ok<T: DeserializeOwned>(response: Response) -> Result<T> {
    match response.status() {
        StatusCode::OK => Ok(response.json().await?),
        _ => Err(error_from(response).await),
    }
}

/// Maps an error response back onto the shared error type when its message is known.
async fn error_from(response: Response) -> eyre::Report {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    debug!("request failed with {}: {}", status, text);
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    match message.as_str() {
        "provider not supported" => Error::ProviderNotSupported.into(),
        "authentication failed" => Error::AuthenticationFailed.into(),
        _ => eyre!("{}: {}", status, message),
    }
}
