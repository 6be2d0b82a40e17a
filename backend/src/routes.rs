use eyre::{ensure, ContextCompat, Result};
use validator::Validate;

use types::domain::{CreateSessionRequest, SessionResponse, UserProfile};
use types::error::Error;

use crate::domain::user::User;
use crate::service::sessions::SessionService;

#[derive(Clone)]
pub struct Api {
    pub session_service: SessionService,
}

impl Api {
    pub async fn create_session(&self, request: CreateSessionRequest) -> Result<SessionResponse> {
        ensure!(
            self.session_service.supports(&request.provider),
            Error::ProviderNotSupported
        );
        request
            .validate()
            .map_err(|_| Error::AuthenticationFailed)?;
        let session = self
            .session_service
            .create_session(&request.provider, &request.access_token)
            .await?;
        session
            .to_session_response()
            .wrap_err("issued authorization is not a session")
    }

    pub async fn destroy_session(&self, token: String) -> Result<()> {
        self.session_service.destroy_session(&token).await?;
        Ok(())
    }

    pub async fn get_user_by_session_token(&self, token: &str) -> Result<Option<User>> {
        self.session_service.get_user_by_session_token(token).await
    }

    pub fn get_profile(&self, user: User) -> UserProfile {
        user.into()
    }
}
